use std::net::SocketAddr;

use anyhow::Context;
use tracing::warn;

const DEV_SECRET: &str = "dev-key-please-change-in-prod";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60 * 24 * 7;
// one year
const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbBackend {
    Postgres,
    Sqlite,
}

impl DbBackend {
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or("");
            anyhow::bail!("unsupported database url scheme: {scheme}")
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_backend: DbBackend,
    pub max_connections: u32,
    pub session: SessionConfig,
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the
    /// process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret = var("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set; using the development key");
            DEV_SECRET.into()
        });

        let database_url = database_url(&var);
        let db_backend = DbBackend::from_url(&database_url)?;

        let session = SessionConfig {
            secret,
            issuer: var("SESSION_ISSUER").unwrap_or_else(|| "movie-reviews".into()),
            ttl_minutes: var("SESSION_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES)
                .clamp(1, MAX_SESSION_TTL_MINUTES),
            cookie_secure: var("COOKIE_SECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = var("APP_PORT").unwrap_or_else(|| "8080".into());
        let listen_addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;

        Ok(Self {
            database_url,
            db_backend,
            max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            session,
            listen_addr,
        })
    }
}

// DATABASE_URL wins; otherwise DB_HOST selects Postgres and its absence the
// embedded SQLite file.
fn database_url(var: &impl Fn(&str) -> Option<String>) -> String {
    if let Some(url) = var("DATABASE_URL") {
        return url;
    }
    match var("DB_HOST") {
        Some(host) => {
            let user = var("DB_USERNAME").unwrap_or_else(|| "postgres".into());
            let pass = var("DB_PASSWORD").unwrap_or_default();
            let port = var("DB_PORT").unwrap_or_else(|| "5432".into());
            let name = var("DB_NAME").unwrap_or_else(|| "movie_reviews_db".into());
            format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&user),
                urlencoding::encode(&pass),
                host,
                port,
                name
            )
        }
        None => {
            let path = var("SQLITE_PATH").unwrap_or_else(|| "local_movies.db".into());
            format!("sqlite://{}?mode=rwc", path)
        }
    }
}
