use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Moderation role hierarchy
/// Ordering matters: `Moderator` outranks `User`, `Admin` outranks both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    /// Database representation (TEXT column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Parse from the database TEXT column; unknown values fall back to `User`
    /// rather than failing resolution.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            _ => Role::User,
        }
    }
}

/// Full user record (includes password hash, never serialized to clients)
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub ban_until: Option<DateTime<Utc>>,
    pub last_username_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            ban_until: self.ban_until,
        }
    }
}

/// The subset of the user record embedded in tokens and carried through
/// resolution. Either token alone suffices to rebuild an authorization
/// decision from this snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub ban_until: Option<DateTime<Utc>>,
}

impl UserSnapshot {
    /// Ban state is always derived at resolution time, never read verbatim
    /// from a stale claim.
    pub fn is_banned(&self, now: DateTime<Utc>) -> bool {
        matches!(self.ban_until, Some(until) if until > now)
    }
}

/// User information returned to clients (without password hash)
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = UserResponse)]
pub struct UserResponse {
    /// User ID
    #[schema(example = 1)]
    pub id: u64,

    /// Email address
    #[schema(example = "user@example.com")]
    pub email: String,

    /// Username
    #[schema(example = "moviebuff42")]
    pub username: String,

    /// Moderation role
    pub role: Role,

    /// End of the active ban, if any
    pub ban_until: Option<DateTime<Utc>>,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            ban_until: user.ban_until,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn role_ordering_follows_hierarchy() {
        assert!(Role::Admin > Role::Moderator);
        assert!(Role::Moderator > Role::User);
    }

    #[test]
    fn role_round_trips_through_db_repr() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(Role::from_str_or_default(role.as_str()), role);
        }
        assert_eq!(Role::from_str_or_default("banned?"), Role::User);
    }

    #[test]
    fn is_banned_requires_future_ban_until() {
        let now = Utc::now();
        let mut snapshot = UserSnapshot {
            id: 1,
            username: "moviebuff42".to_string(),
            role: Role::User,
            ban_until: None,
        };
        assert!(!snapshot.is_banned(now));

        snapshot.ban_until = Some(now - Duration::hours(1));
        assert!(!snapshot.is_banned(now));

        snapshot.ban_until = Some(now + Duration::hours(1));
        assert!(snapshot.is_banned(now));
    }
}
