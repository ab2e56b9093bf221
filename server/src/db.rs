use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migrations(Box<dyn std::error::Error + Send + Sync>),
}

pub fn create_pool(database_url: &str) -> Result<DbPool, DbSetupError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(DbSetupError::Migrations)?;
    for version in &applied {
        tracing::info!(%version, "Applied migration");
    }

    Ok(pool)
}

/// Pool that only connects on first checkout. Migrations are not run.
pub fn lazy_pool(database_url: &str) -> DbPool {
    r2d2::Pool::builder()
        .min_idle(Some(0))
        .build_unchecked(ConnectionManager::new(database_url))
}
