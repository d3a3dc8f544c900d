use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};

use crate::domains::auth::models::session::{SessionCreate, SessionRecord};

/// Session Repository
///
/// Exclusive owner of the sessions table. The per-user device cap is NOT
/// enforced here; the sign-in flow runs list_for_user / delete_by_id / create
/// as a read-then-conditionally-delete-then-insert sequence, so two
/// concurrent sign-ins can transiently exceed the cap by one (documented
/// soft cap).
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session record
    pub async fn create(&self, data: SessionCreate) -> Result<SessionRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO sessions (user_id, device_id, token_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, device_id, token_hash, created_at
            "#,
        )
        .bind(data.user_id as i64)
        .bind(&data.device_id)
        .bind(&data.token_hash)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create session record")?;

        Ok(Self::map_record(&row))
    }

    /// Exact-match lookup used on every cookie-path resolution
    pub async fn find_active(
        &self,
        token_hash: &str,
        device_id: &str,
    ) -> Result<Option<SessionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, device_id, token_hash, created_at
            FROM sessions
            WHERE token_hash = $1 AND device_id = $2
            "#,
        )
        .bind(token_hash)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find session record")?;

        Ok(row.as_ref().map(Self::map_record))
    }

    /// All live sessions for a user, oldest first (device-cap check)
    pub async fn list_for_user(&self, user_id: u64) -> Result<Vec<SessionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, device_id, token_hash, created_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list session records")?;

        Ok(rows.iter().map(Self::map_record).collect())
    }

    /// Delete by (device, token) pair on sign-out. Matching zero rows is a
    /// no-op, not an error (idempotent sign-out).
    pub async fn delete(&self, device_id: &str, token_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE device_id = $1 AND token_hash = $2
            "#,
        )
        .bind(device_id)
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .context("Failed to delete session record")?;

        Ok(result.rows_affected())
    }

    /// Delete by primary key (stale/tampered record cleanup)
    pub async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to delete session record by id")?;

        Ok(())
    }

    /// Remove records older than the refresh-token lifetime (background
    /// sweep; stands in for a TTL index)
    pub async fn delete_expired(&self, max_age: Duration) -> Result<u64> {
        let cutoff = Utc::now() - max_age;

        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .context("Failed to delete expired session records")?;

        Ok(result.rows_affected())
    }

    fn map_record(row: &sqlx::postgres::PgRow) -> SessionRecord {
        SessionRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            device_id: row.get("device_id"),
            token_hash: row.get("token_hash"),
            created_at: row.get("created_at"),
        }
    }
}
