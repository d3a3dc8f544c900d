use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::domains::auth::models::{SessionCreate, User};
use crate::domains::auth::services::token_service::{TokenPair, TokenService};
use crate::shared::database::{Database, SessionRepository, UserRepository};
use crate::shared::errors::AuthError;

/// Outcome of a successful sign-in: the user, the freshly minted token pair,
/// and the device id the session was bound to (new or carried over from the
/// client's existing deviceId cookie).
pub struct SigninOutcome {
    pub user: User,
    pub tokens: TokenPair,
    pub device_id: String,
}

// AuthService: handles authentication business logic
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    token_service: TokenService,
    max_sessions_per_user: i64,
}

impl AuthService {
    pub fn new(db: Database, token_service: TokenService, max_sessions_per_user: i64) -> Self {
        Self {
            db,
            token_service,
            max_sessions_per_user,
        }
    }

    // Sign-up (business logic)
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user_repo = UserRepository::new(self.db.pool().clone());

        // 1. Uniqueness checks
        let existing = user_repo
            .get_user_by_email(email)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to check email: {}", e)))?;
        if existing.is_some() {
            return Err(AuthError::EmailAlreadyExists {
                email: email.to_string(),
            });
        }

        let existing = user_repo
            .get_user_by_username(username)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to check username: {}", e)))?;
        if existing.is_some() {
            return Err(AuthError::UsernameAlreadyExists {
                username: username.to_string(),
            });
        }

        // 2. Hash password
        let password_hash = Self::hash_password(password)?;

        // 3. Create user
        let user = user_repo
            .create_user(email, username, &password_hash)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to create user: {}", e)))?;

        Ok(user)
    }

    // Sign-in (business logic)
    //
    // `device_id` is the client's existing deviceId cookie when present;
    // otherwise a fresh one is minted so the refresh token stays scoped to
    // this browser/client instance.
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
        device_id: Option<String>,
    ) -> Result<SigninOutcome, AuthError> {
        let user_repo = UserRepository::new(self.db.pool().clone());

        // 1. Look up user by email
        let user = user_repo
            .get_user_by_email(email)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidCredentials)?;

        // 2. Verify password
        Self::verify_password(password, &user.password_hash)?;

        // 3. Mint the token pair
        let tokens = self.token_service.issue(&user.snapshot())?;

        let device_id = device_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // 4. Device-cap eviction, then insert. Deliberately not a
        // transaction: concurrent sign-ins may leave cap+1 rows for a
        // moment (soft cap).
        let sessions = SessionRepository::new(self.db.pool().clone());
        let live = sessions
            .list_for_user(user.id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to list sessions: {}", e)))?;

        if live.len() as i64 >= self.max_sessions_per_user {
            // Oldest-by-created_at is first; evict exactly one.
            if let Some(oldest) = live.first() {
                sessions.delete_by_id(oldest.id).await.map_err(|e| {
                    AuthError::DatabaseError(format!("Failed to evict oldest session: {}", e))
                })?;
                tracing::debug!(
                    user_id = user.id,
                    evicted_session = oldest.id,
                    "session cap reached, evicted oldest device session"
                );
            }
        }

        sessions
            .create(SessionCreate {
                user_id: user.id,
                device_id: device_id.clone(),
                token_hash: TokenService::hash_refresh_token(&tokens.refresh_token),
            })
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to create session: {}", e)))?;

        Ok(SigninOutcome {
            user,
            tokens,
            device_id,
        })
    }

    /// Sign-out: delete the (device, refresh) session if it exists. A second
    /// call with the same pair matches nothing and still succeeds.
    pub async fn signout(&self, device_id: &str, refresh_token: &str) -> Result<(), AuthError> {
        let sessions = SessionRepository::new(self.db.pool().clone());
        let token_hash = TokenService::hash_refresh_token(refresh_token);

        let removed = sessions
            .delete(device_id, &token_hash)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to delete session: {}", e)))?;

        tracing::debug!(device_id, removed, "sign-out");
        Ok(())
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHashingFailed(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(())
    }
}
