use sqlx::AnyPool;

use crate::reviews::repo_types::{now_micros, Review, ReviewFields, ReviewRow};

const SELECT_REVIEW: &str = r#"
    SELECT r.id, r.title, r.genre, r.rating, r.content, r.created_at, r.user_id,
           u.username AS author
    FROM reviews r
    JOIN users u ON u.id = r.user_id
"#;

fn into_reviews(rows: Vec<ReviewRow>) -> anyhow::Result<Vec<Review>> {
    rows.into_iter().map(Review::try_from).collect()
}

/// Escapes LIKE wildcards so the term matches literally. Case folding is left
/// to the store's `LOWER()`, applied to both sides.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

impl Review {
    /// Inserts a review stamped with the current server time.
    pub async fn create(db: &AnyPool, owner_id: i64, fields: &ReviewFields) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (title, genre, rating, content, created_at, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.genre)
        .bind(fields.rating)
        .bind(&fields.content)
        .bind(now_micros())
        .bind(owner_id)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    pub async fn list_all(db: &AnyPool) -> anyhow::Result<Vec<Review>> {
        let sql = format!("{SELECT_REVIEW} ORDER BY r.created_at DESC, r.id DESC");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql).fetch_all(db).await?;
        into_reviews(rows)
    }

    pub async fn list_by_owner(db: &AnyPool, user_id: i64) -> anyhow::Result<Vec<Review>> {
        let sql =
            format!("{SELECT_REVIEW} WHERE r.user_id = $1 ORDER BY r.created_at DESC, r.id DESC");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await?;
        into_reviews(rows)
    }

    /// Case-insensitive substring match on title, genre or content. Callers
    /// reject blank terms.
    pub async fn search(db: &AnyPool, term: &str) -> anyhow::Result<Vec<Review>> {
        let sql = format!(
            r#"{SELECT_REVIEW}
            WHERE LOWER(r.title) LIKE LOWER($1) ESCAPE '\'
               OR LOWER(r.genre) LIKE LOWER($1) ESCAPE '\'
               OR LOWER(r.content) LIKE LOWER($1) ESCAPE '\'
            ORDER BY r.created_at DESC, r.id DESC"#
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(like_pattern(term))
            .fetch_all(db)
            .await?;
        into_reviews(rows)
    }

    pub async fn get_by_id(db: &AnyPool, id: i64) -> anyhow::Result<Option<Review>> {
        let sql = format!("{SELECT_REVIEW} WHERE r.id = $1");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        row.map(Review::try_from).transpose()
    }

    /// Overwrites the mutable fields; owner and timestamp are left alone.
    /// Authorization is the caller's job.
    pub async fn update(db: &AnyPool, id: i64, fields: &ReviewFields) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reviews
            SET title = $1, genre = $2, rating = $3, content = $4
            WHERE id = $5
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.genre)
        .bind(fields.rating)
        .bind(&fields.content)
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Returns false when nothing was deleted.
    pub async fn delete(db: &AnyPool, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count_by_owner(db: &AnyPool, user_id: i64) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::users::repo_types::User;

    fn fields(title: &str, genre: &str, content: &str) -> ReviewFields {
        ReviewFields {
            title: title.into(),
            genre: genre.into(),
            rating: 4,
            content: content.into(),
        }
    }

    async fn user(state: &AppState, name: &str) -> i64 {
        User::insert(&state.db, name, None, "hash").await.unwrap().id
    }

    async fn post(state: &AppState, owner: i64, title: &str, genre: &str, content: &str) -> i64 {
        Review::create(&state.db, owner, &fields(title, genre, content)).await.unwrap()
    }

    async fn search_ids(state: &AppState, term: &str) -> Vec<i64> {
        let hits = Review::search(&state.db, term).await.unwrap();
        hits.iter().map(|r| r.id).collect()
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("HoRRor"), "%HoRRor%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[tokio::test]
    async fn list_all_is_newest_first() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let r1 = post(&state, owner, "R1", "drama", "one").await;
        let r2 = post(&state, owner, "R2", "drama", "two").await;
        let r3 = post(&state, owner, "R3", "drama", "three").await;

        let all = Review::list_all(&state.db).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, [r3, r2, r1]);
    }

    #[tokio::test]
    async fn list_by_owner_filters_and_keeps_order() {
        let state = AppState::for_tests().await;
        let alice = user(&state, "alice").await;
        let bob = user(&state, "bob").await;
        let a1 = post(&state, alice, "A1", "x", "x").await;
        post(&state, bob, "B1", "x", "x").await;
        let a2 = post(&state, alice, "A2", "x", "x").await;

        let mine = Review::list_by_owner(&state.db, alice).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), [a2, a1]);
        assert!(mine.iter().all(|r| r.author == "alice"));
        assert_eq!(Review::count_by_owner(&state.db, alice).await.unwrap(), 2);
        assert_eq!(Review::count_by_owner(&state.db, bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let by_genre = post(&state, owner, "It", "horror", "clowns").await;
        let by_content = post(&state, owner, "Jaws", "thriller", "Horror movie at sea").await;
        post(&state, owner, "Drama", "drama", "nothing scary").await;

        assert_eq!(search_ids(&state, "HORROR").await, [by_content, by_genre]);
    }

    #[tokio::test]
    async fn search_finds_exact_non_ascii_substring() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let hit = post(&state, owner, "Élan vital", "drama", "x").await;

        assert_eq!(search_ids(&state, "Élan").await, [hit]);
        assert_eq!(search_ids(&state, "élan VITAL").await, [hit]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let hit = post(&state, owner, "100% fun", "comedy", "x").await;
        post(&state, owner, "1000 fun", "comedy", "x").await;

        assert_eq!(search_ids(&state, "100%").await, [hit]);
    }

    #[tokio::test]
    async fn update_leaves_owner_and_timestamp() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let id = post(&state, owner, "Old", "drama", "old").await;
        let before = Review::get_by_id(&state.db, id).await.unwrap().unwrap();

        let new = ReviewFields {
            title: "New".into(),
            genre: "comedy".into(),
            rating: -3,
            content: "new".into(),
        };
        assert!(Review::update(&state.db, id, &new).await.unwrap());

        let after = Review::get_by_id(&state.db, id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.user_id, before.user_id);
        assert_eq!(
            (after.title.as_str(), after.genre.as_str(), after.rating, after.content.as_str()),
            ("New", "comedy", -3, "new")
        );
    }

    #[tokio::test]
    async fn delete_removes_everywhere() {
        let state = AppState::for_tests().await;
        let owner = user(&state, "alice").await;
        let id = post(&state, owner, "Gone", "x", "x").await;

        assert!(Review::delete(&state.db, id).await.unwrap());
        assert!(Review::get_by_id(&state.db, id).await.unwrap().is_none());
        assert!(Review::list_all(&state.db).await.unwrap().is_empty());
        assert!(Review::list_by_owner(&state.db, owner).await.unwrap().is_empty());
        assert!(!Review::delete(&state.db, id).await.unwrap());
    }

    #[tokio::test]
    async fn create_requires_existing_owner() {
        let state = AppState::for_tests().await;
        assert!(Review::create(&state.db, 4242, &fields("Orphan", "x", "x")).await.is_err());
    }
}
