use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::auth::models::user::{Role, UserSnapshot};

/// JWT Claims (data included in both token classes)
///
/// Access and refresh tokens embed the same user snapshot, so either one
/// alone can reconstruct an authorization decision without a database read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub user_id: u64,

    /// Username at issuance time
    pub username: String,

    /// Role at issuance time
    pub role: Role,

    /// Ban expiry at issuance time; consumers must re-derive the ban flag
    /// from this at resolution time, not trust a precomputed boolean
    pub ban_until: Option<DateTime<Utc>>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create new Claims for a snapshot (expiration computed from lifetime)
    pub fn new(snapshot: &UserSnapshot, lifetime_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            user_id: snapshot.id,
            username: snapshot.username.clone(),
            role: snapshot.role,
            ban_until: snapshot.ban_until,
            exp: now + lifetime_secs,
            iat: now,
        }
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.user_id,
            username: self.username.clone(),
            role: self.role,
            ban_until: self.ban_until,
        }
    }

    /// Seconds until expiry (negative once past)
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        self.exp - now.timestamp()
    }
}
