use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{PgPool, Row};

use crate::domains::auth::models::user::{Role, User, UserSnapshot};

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, 'user', $4, $5)
            RETURNING id, email, username, password_hash, role, ban_until,
                      last_username_change, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(Self::map_user(&row))
    }

    // Get user by email (for sign-in)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, username, password_hash, role, ban_until,
                   last_username_change, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(row.as_ref().map(Self::map_user))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, username, password_hash, role, ban_until,
                   last_username_change, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by username")?;

        Ok(row.as_ref().map(Self::map_user))
    }

    /// Lighter read used by the resolver's cookie path: only the snapshot
    /// fields authorization decisions are built from.
    pub async fn get_snapshot_by_id(&self, id: u64) -> Result<Option<UserSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, role, ban_until
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user snapshot")?;

        Ok(row.map(|row| UserSnapshot {
            id: row.get::<i64, _>("id") as u64,
            username: row.get("username"),
            role: Role::from_str_or_default(row.get("role")),
            ban_until: row.get("ban_until"),
        }))
    }

    fn map_user(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get::<i64, _>("id") as u64,
            email: row.get("email"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            role: Role::from_str_or_default(row.get("role")),
            ban_until: row.get("ban_until"),
            last_username_change: row.get("last_username_change"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
