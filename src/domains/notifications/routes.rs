// Notifications domain routes
use axum::{routing::get, Router};

use crate::domains::notifications::handlers::ws_handler;
use crate::shared::services::AppState;

/// Realtime notification router
pub fn create_notifications_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler::notifications_ws))
}
