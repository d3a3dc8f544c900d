use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session record (one per user+device pair, database-backed)
///
/// Binds a hashed refresh token to the device it was issued for. A refresh
/// token is only usable while its record is live; sign-out deletes the row,
/// which is what makes refresh tokens revocable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub device_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Session creation request (on sign-in)
#[derive(Debug)]
pub struct SessionCreate {
    pub user_id: u64,
    pub device_id: String,
    pub token_hash: String,
}
