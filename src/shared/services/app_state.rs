use crate::domains::auth::services::AuthState;
use crate::domains::notifications::services::NotificationHub;
use crate::shared::config::AppConfig;
use crate::shared::database::Database;

/// Application state (combines all domain states)
///
/// The notification hub lives here and is handed to its consumers through
/// this struct at construction time; nothing looks it up through ambient
/// registries.
#[derive(Clone)]
pub struct AppState {
    /// Database connection (shared)
    pub db: Database,
    pub config: AppConfig,
    pub auth_state: AuthState,
    pub notification_hub: NotificationHub,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let auth_state = AuthState::new(db.clone(), &config);
        let notification_hub = NotificationHub::new(64);

        Self {
            db,
            config,
            auth_state,
            notification_hub,
        }
    }
}
