use axum::{http::StatusCode, Json};
use serde_json::json;
use thiserror::Error;

/// Authentication-related errors
///
/// The first three variants are the resolver's terminal auth outcomes; they
/// are handled entirely inside the gate and never bubble up as generic
/// exceptions. `DatabaseError`/`Internal` are infrastructure faults and map
/// to 500 so "you are not signed in" is never confused with "the system is
/// broken".
#[derive(Error, Debug)]
pub enum AuthError {
    /// No usable credential presented at all
    #[error("Please sign in")]
    Unauthenticated,

    /// A device/refresh pair was presented but matches no live session
    #[error("Session not recognized, please sign in again")]
    SessionNotRecognized,

    /// A session record was found but the refresh token failed verification
    #[error("Invalid session")]
    InvalidSession,

    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already exists
    #[error("Email already exists: {email}")]
    EmailAlreadyExists { email: String },

    /// Username already exists
    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    PasswordHashingFailed(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated
            | AuthError::SessionNotRecognized
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidSession => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyExists { .. } | AuthError::UsernameAlreadyExists { .. } => {
                StatusCode::BAD_REQUEST
            }
            AuthError::PasswordHashingFailed(_)
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The invalidation outcomes that require clearing the session cookies
    /// on the way out.
    pub fn clears_cookies(&self) -> bool {
        matches!(
            self,
            AuthError::SessionNotRecognized | AuthError::InvalidSession
        )
    }
}

/// Convert AuthError to HTTP response parts
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        (err.status(), Json(json!({ "error": err.to_string() })))
    }
}
