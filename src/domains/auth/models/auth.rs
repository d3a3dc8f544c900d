use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domains::auth::models::user::{Role, UserResponse};

// Sign-up request model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = SignupRequest)]
pub struct SignupRequest {
    /// Email address
    #[schema(example = "user@example.com")]
    pub email: String,

    /// Username
    #[schema(example = "moviebuff42")]
    pub username: String,

    /// Password (will be hashed)
    #[schema(example = "password123")]
    pub password: String,
}

// Sign-up response model
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = SignupResponse)]
pub struct SignupResponse {
    /// User information (without password)
    pub user: UserResponse,

    /// Success message
    pub message: String,
}

// Sign-in request model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(as = SigninRequest)]
pub struct SigninRequest {
    /// Email address
    #[schema(example = "user@example.com")]
    pub email: String,

    /// Password
    #[schema(example = "password123")]
    pub password: String,
}

// Sign-in response model
//
// The refresh token and device id are not part of the body; they travel in
// the httpOnly cookies set alongside this response.
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = SigninResponse)]
pub struct SigninResponse {
    /// User information (without password)
    pub user: UserResponse,

    /// JWT access token (short lifetime, held client-side in memory)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,

    /// Success message
    pub message: String,
}

/// Refresh response model (cookie-path renewal)
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = RefreshResponse)]
pub struct RefreshResponse {
    /// Fresh access token
    pub access_token: String,

    /// Resolved user information
    pub user: MeResponse,
}

/// Resolved identity as returned by `/me` and `/refresh`
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = MeResponse)]
pub struct MeResponse {
    /// User ID
    #[schema(example = 1)]
    pub id: u64,

    /// Username
    #[schema(example = "moviebuff42")]
    pub username: String,

    /// Moderation role
    pub role: Role,

    /// Whether an active ban covers the current moment (always derived,
    /// never a stored field)
    pub is_banned: bool,
}
