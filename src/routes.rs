// Routes module: combines all domain routers

use axum::Router;

use crate::domains::auth::routes::create_auth_router;
use crate::domains::notifications::routes::create_notifications_router;
use crate::shared::services::AppState;

/// Create main router (combines all domain routers)
///
/// Takes the state up front because the session gate is a stateful layer on
/// the guarded routes.
pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", create_auth_router(state))
        .nest("/api/notifications", create_notifications_router())
}
