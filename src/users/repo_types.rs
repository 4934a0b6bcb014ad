use sqlx::FromRow;

/// Raw user row. Queries select `COALESCE(email, '')`, since the `Any` driver
/// cannot decode a NULL text column.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String, // Argon2 PHC string, never rendered
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: Some(r.email).filter(|e| !e.is_empty()),
            password_hash: r.password_hash,
        }
    }
}

/// Row of the users directory.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub review_count: i64,
}
