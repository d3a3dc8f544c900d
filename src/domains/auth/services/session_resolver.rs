use chrono::Utc;

use crate::domains::auth::models::user::UserSnapshot;
use crate::domains::auth::services::token_service::{TokenError, TokenService};
use crate::shared::database::{Database, SessionRepository, UserRepository};
use crate::shared::errors::AuthError;

/// The per-request outcome of successful authentication. Constructed fresh
/// on every request; never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub user_id: u64,
    pub username: String,
    pub role: crate::domains::auth::models::user::Role,
    pub ban_until: Option<chrono::DateTime<chrono::Utc>>,
    /// Derived as `ban_until > now` at resolution time
    pub is_banned: bool,
}

impl ResolvedIdentity {
    fn from_snapshot(snapshot: UserSnapshot) -> Self {
        let now = Utc::now();
        Self {
            is_banned: snapshot.is_banned(now),
            user_id: snapshot.id,
            username: snapshot.username,
            role: snapshot.role,
            ban_until: snapshot.ban_until,
        }
    }
}

/// Successful resolution, possibly carrying a replacement access token the
/// caller relays back to the client out-of-band. Renewal is advisory: the
/// request proceeds with the identity either way.
#[derive(Debug)]
pub struct Resolution {
    pub identity: ResolvedIdentity,
    pub renewed_access_token: Option<String>,
}

/// Session Resolver: the central authentication gate.
///
/// Strict evaluation order: bearer fast path first, cookie fallback second.
/// Every terminal outcome is exactly one of a Resolution or an AuthError;
/// infrastructure faults surface as `DatabaseError`, never as an auth
/// rejection.
#[derive(Clone)]
pub struct SessionResolver {
    db: Database,
    tokens: TokenService,
}

impl SessionResolver {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    pub async fn resolve(
        &self,
        bearer: Option<&str>,
        refresh_cookie: Option<&str>,
        device_cookie: Option<&str>,
    ) -> Result<Resolution, AuthError> {
        // 1. Bearer fast path: stateless, trusts the embedded snapshot.
        if let Some(token) = bearer {
            match self.tokens.verify_access_token(token) {
                Ok(claims) => {
                    let now = Utc::now();
                    let renewed = if self.tokens.needs_renewal(&claims, now) {
                        Some(self.tokens.issue_access_token(&claims.snapshot())?)
                    } else {
                        None
                    };

                    return Ok(Resolution {
                        identity: ResolvedIdentity::from_snapshot(claims.snapshot()),
                        renewed_access_token: renewed,
                    });
                }
                // Expired bearer tokens are the expected, frequent case;
                // fall through to the cookie path silently.
                Err(TokenError::Expired) => {
                    tracing::debug!("access token expired, falling back to cookie path");
                }
                // Malformed/invalid signature: tolerated, logged, degraded
                // to the cookie path rather than rejected outright.
                Err(TokenError::Invalid) => {
                    tracing::warn!("malformed bearer token presented, falling back to cookie path");
                }
            }
        }

        // 2. Cookie fallback requires both cookies; with no session to
        // clear, absence is plain Unauthenticated.
        let (refresh_token, device_id) = match (refresh_cookie, device_cookie) {
            (Some(r), Some(d)) => (r, d),
            _ => return Err(AuthError::Unauthenticated),
        };

        let sessions = SessionRepository::new(self.db.pool().clone());
        let token_hash = TokenService::hash_refresh_token(refresh_token);

        // 3. Store membership check: exact (token, device) match.
        let record = sessions
            .find_active(&token_hash, device_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to look up session: {}", e)))?
            .ok_or(AuthError::SessionNotRecognized)?;

        // 4. Cryptographic check plus cross-user mismatch guard. A record
        // that fails here is stale or tampered and gets cleaned up.
        let claims = match self.tokens.verify_refresh_token(refresh_token) {
            Ok(claims) if claims.user_id == record.user_id as u64 => claims,
            _ => {
                sessions.delete_by_id(record.id).await.map_err(|e| {
                    AuthError::DatabaseError(format!("Failed to delete stale session: {}", e))
                })?;
                return Err(AuthError::InvalidSession);
            }
        };

        // 5. Read the live user row so role changes and bans applied after
        // issuance take effect immediately on this path.
        let users = UserRepository::new(self.db.pool().clone());
        let snapshot = users
            .get_snapshot_by_id(claims.user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?;

        let snapshot = match snapshot {
            Some(s) => s,
            // Session outlived its user (account deleted); treat like a
            // stale record.
            None => {
                sessions.delete_by_id(record.id).await.map_err(|e| {
                    AuthError::DatabaseError(format!("Failed to delete orphan session: {}", e))
                })?;
                return Err(AuthError::InvalidSession);
            }
        };

        let access_token = self.tokens.issue_access_token(&snapshot)?;

        Ok(Resolution {
            identity: ResolvedIdentity::from_snapshot(snapshot),
            renewed_access_token: Some(access_token),
        })
    }
}
