use anyhow::{Context, Result};
use sqlx::PgPool;

// Database connection pool for PostgreSQL
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    // Create database connection
    pub async fn new(db_url: &str) -> Result<Self> {
        let pool = PgPool::connect(db_url)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    // Get connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Run migrations from the migrations/ folder
    pub async fn initialize(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(self.pool())
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}
