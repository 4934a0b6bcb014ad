use sqlx::AnyPool;

use crate::error::{classify_unique_violation, StoreError};
use crate::users::repo_types::{User, UserRow, UserSummary};

impl User {
    pub async fn find_by_username(
        db: &AnyPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, COALESCE(email, '') AS email, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .map(|row| row.map(User::from))
    }

    pub async fn find_by_email(db: &AnyPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, COALESCE(email, '') AS email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .map(|row| row.map(User::from))
    }

    pub async fn find_by_id(db: &AnyPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, COALESCE(email, '') AS email, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map(|row| row.map(User::from))
    }

    /// Inserts a user with an already hashed password. Unique violations come
    /// back as `DuplicateUsername` / `DuplicateEmail`.
    pub async fn insert(
        db: &AnyPool,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, COALESCE(email, '') AS email, password_hash
            "#,
        )
        .bind(username)
        .bind(email.map(str::to_owned))
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map(User::from)
        .map_err(classify_unique_violation)
    }

    pub async fn list_with_review_counts(db: &AnyPool) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, COUNT(r.id) AS review_count
            FROM users u
            LEFT JOIN reviews r ON r.user_id = u.id
            GROUP BY u.id, u.username
            ORDER BY u.id
            "#,
        )
        .fetch_all(db)
        .await
    }
}
