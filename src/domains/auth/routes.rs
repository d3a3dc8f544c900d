// Auth domain routes
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::domains::auth::handlers::auth_handler;
use crate::shared::middleware::auth::session_gate;
use crate::shared::services::AppState;

/// Create authentication router
///
/// Only `/me` sits behind the session gate; the other routes are the
/// entry/exit points of the session lifecycle itself.
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth_handler::signup))
        .route("/signin", post(auth_handler::signin))
        .route("/refresh", post(auth_handler::refresh))
        .route("/signout", post(auth_handler::signout))
        .route(
            "/me",
            get(auth_handler::me)
                .route_layer(middleware::from_fn_with_state(state, session_gate)),
        )
}
