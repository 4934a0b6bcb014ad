use sqlx::FromRow;
use time::OffsetDateTime;

/// Raw review row; `created_at` is stored as microseconds since the epoch so
/// the schema is identical on Postgres and SQLite.
#[derive(Debug, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub rating: i64,
    pub content: String,
    pub created_at: i64,
    pub user_id: i64,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub rating: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub user_id: i64,
    pub author: String, // owner's username
}

/// The four fields an owner may write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFields {
    pub title: String,
    pub genre: String,
    pub rating: i64,
    pub content: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = anyhow::Error;

    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        let created_at =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(r.created_at) * 1_000)?;
        Ok(Self {
            id: r.id,
            title: r.title,
            genre: r.genre,
            rating: r.rating,
            content: r.content,
            created_at,
            user_id: r.user_id,
            author: r.author,
        })
    }
}

pub(crate) fn now_micros() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_timestamp_converts_from_micros() {
        let row = ReviewRow {
            id: 1,
            title: "Alien".into(),
            genre: "horror".into(),
            rating: 5,
            content: "In space no one can hear you scream".into(),
            created_at: 1_700_000_000_123_456,
            user_id: 9,
            author: "ripley".into(),
        };
        let review = Review::try_from(row).unwrap();
        assert_eq!(review.created_at.unix_timestamp(), 1_700_000_000);
        assert_eq!(review.created_at.microsecond(), 123_456);
    }
}
