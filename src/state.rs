use std::sync::Arc;

use anyhow::Context;
use sqlx::{any::AnyPoolOptions, AnyPool};

use crate::config::{AppConfig, DbBackend};

#[derive(Clone)]
pub struct AppState {
    pub db: AnyPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        sqlx::any::install_default_drivers();

        let db = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: AnyPool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        match self.config.db_backend {
            DbBackend::Postgres => sqlx::migrate!("./migrations/postgres").run(&self.db).await,
            DbBackend::Sqlite => sqlx::migrate!("./migrations/sqlite").run(&self.db).await,
        }
        .context("run migrations")?;
        tracing::info!(backend = ?self.config.db_backend, "migrations applied");
        Ok(())
    }

    /// Fresh in-memory SQLite store with the schema applied.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        sqlx::any::install_default_drivers();

        let config = AppConfig::from_lookup(|k| match k {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "SECRET_KEY" => Some("test-secret".into()),
            "SESSION_ISSUER" => Some("test-issuer".into()),
            _ => None,
        })
        .expect("test config");

        // every in-memory connection is its own database, so pin the pool to one
        let db = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.database_url)
            .await
            .expect("in-memory sqlite");

        let state = Self::from_parts(db, Arc::new(config));
        state.migrate().await.expect("migrations");
        state
    }
}
