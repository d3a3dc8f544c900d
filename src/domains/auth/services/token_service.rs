use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};

use crate::domains::auth::models::claims::Claims;
use crate::domains::auth::models::user::UserSnapshot;
use crate::shared::errors::AuthError;

/// Why a token failed verification. The resolver treats expiry and
/// malformed/invalid-signature differently on the bearer path, so the two
/// cases stay distinct here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Issued pair: short-lived stateless access token plus long-lived
/// store-checked refresh token.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Credential Issuer
///
/// Two independently-revocable credential classes with distinct trust
/// anchors: separate secrets, separate lifetimes. Both embed the same user
/// snapshot. Pure function of input and configuration; no side effects.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    renewal_threshold_secs: i64,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
        renewal_threshold_secs: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_ref()),
            access_decoding: DecodingKey::from_secret(access_secret.as_ref()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_ref()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_ref()),
            access_ttl_secs,
            refresh_ttl_secs,
            renewal_threshold_secs,
        }
    }

    /// Mint an access/refresh pair for a user snapshot
    pub fn issue(&self, snapshot: &UserSnapshot) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(snapshot)?,
            refresh_token: self.issue_refresh_token(snapshot)?,
        })
    }

    /// Mint just an access token (silent renewal path)
    pub fn issue_access_token(&self, snapshot: &UserSnapshot) -> Result<String, AuthError> {
        let claims = Claims::new(snapshot, self.access_ttl_secs);

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))
    }

    fn issue_refresh_token(&self, snapshot: &UserSnapshot) -> Result<String, AuthError> {
        let claims = Claims::new(snapshot, self.refresh_ttl_secs);

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to generate refresh token: {}", e)))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.access_decoding)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.refresh_decoding)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        Ok(token_data.claims)
    }

    /// Hash a refresh token for storage; the session store only ever sees
    /// the hash.
    pub fn hash_refresh_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Renewal fencepost: remaining lifetime at or below the threshold
    /// triggers reissue; one second above it does not.
    pub fn needs_renewal(&self, claims: &Claims, now: DateTime<Utc>) -> bool {
        claims.remaining_secs(now) <= self.renewal_threshold_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::models::user::Role;
    use chrono::{Duration, TimeZone};

    fn service() -> TokenService {
        TokenService::new("access-secret", "refresh-secret", 4 * 3600, 14 * 24 * 3600, 3600)
    }

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            id: 42,
            username: "moviebuff42".to_string(),
            role: Role::Moderator,
            ban_until: Some(Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_the_snapshot() {
        let service = service();
        let original = snapshot();

        let pair = service.issue(&original).unwrap();

        let access_claims = service.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access_claims.snapshot(), original);

        let refresh_claims = service.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh_claims.snapshot(), original);
    }

    #[test]
    fn tokens_are_not_interchangeable_across_secrets() {
        let service = service();
        let pair = service.issue(&snapshot()).unwrap();

        // A refresh token must not verify as an access token and vice versa.
        assert_eq!(
            service.verify_access_token(&pair.refresh_token),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            service.verify_refresh_token(&pair.access_token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn tampered_token_is_invalid_not_expired() {
        let service = service();
        let pair = service.issue(&snapshot()).unwrap();

        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert_eq!(
            service.verify_access_token(&tampered),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn renewal_triggers_at_threshold_but_not_one_second_above() {
        let service = service();
        let now = Utc::now();

        let mut claims = Claims::new(&snapshot(), 4 * 3600);

        // Exactly at the threshold: renew.
        claims.exp = (now + Duration::seconds(3600)).timestamp();
        assert!(service.needs_renewal(&claims, now));

        // One second above: do not renew.
        claims.exp = (now + Duration::seconds(3601)).timestamp();
        assert!(!service.needs_renewal(&claims, now));

        // Well below: renew.
        claims.exp = (now + Duration::seconds(10)).timestamp();
        assert!(service.needs_renewal(&claims, now));
    }

    #[test]
    fn refresh_token_hash_is_stable_and_not_the_token() {
        let hash1 = TokenService::hash_refresh_token("some-token");
        let hash2 = TokenService::hash_refresh_token("some-token");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, "some-token");
        assert_eq!(hash1.len(), 64);
    }
}
