// Auth domain state
use crate::domains::auth::services::{AuthService, SessionResolver, TokenService};
use crate::shared::config::AppConfig;
use crate::shared::database::Database;

/// Auth domain state: the services the auth surface and the gate need.
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: AuthService,
    pub token_service: TokenService,
    pub resolver: SessionResolver,
}

impl AuthState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let token_service = TokenService::new(
            &config.access_token_secret,
            &config.refresh_token_secret,
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
            config.renewal_threshold_secs,
        );

        Self {
            auth_service: AuthService::new(
                db.clone(),
                token_service.clone(),
                config.max_sessions_per_user,
            ),
            resolver: SessionResolver::new(db, token_service.clone()),
            token_service,
        }
    }
}
