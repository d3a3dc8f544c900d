use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification delivered over a user's realtime channel.
///
/// The content pipeline that produces these is an external collaborator;
/// the session core only guards and carries them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Event kind, e.g. "friend_request", "review_vote"
    pub kind: String,

    /// Human-readable message
    pub message: String,

    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
