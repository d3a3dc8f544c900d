use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::domains::notifications::services::NotificationHub;
use crate::shared::middleware::auth::bearer_token;
use crate::shared::services::AppState;

/// The exact rejection body for a failed realtime handshake. The web client
/// substring-matches this to distinguish "force sign-out" from a retryable
/// network blip; the wording is a compatibility contract.
pub const AUTH_ERROR_MESSAGE: &str = "Authentication error";

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    /// Handshake-level auth field (alternative to the Authorization header)
    pub token: Option<String>,
}

/// Handshake token: dedicated auth field first, bearer header second
fn handshake_token<'a>(query_token: &'a Option<String>, headers: &'a HeaderMap) -> Option<&'a str> {
    query_token.as_deref().or_else(|| bearer_token(headers))
}

/// Realtime Gate
///
/// Authenticates the connection once, before the upgrade completes. Only the
/// access-token class is accepted here; there is no cookie/refresh fallback
/// on this path. Missing and invalid tokens reject identically — the client
/// treats both as a hard sign-out trigger. After admission the connection is
/// trusted until disconnect; tokens are not re-checked mid-connection.
pub async fn notifications_ws(
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
) -> Response {
    let claims = handshake_token(&query.token, &headers)
        .and_then(|token| state.auth_state.token_service.verify_access_token(token).ok());

    let claims = match claims {
        Some(claims) => claims,
        None => {
            tracing::debug!("realtime handshake rejected");
            return (StatusCode::UNAUTHORIZED, AUTH_ERROR_MESSAGE).into_response();
        }
    };

    // Extracted as a Result so the auth check above runs first; a plain
    // `WebSocketUpgrade` argument would reject bad upgrades before it.
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let user_id = claims.user_id;
    let hub = state.notification_hub.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, user_id, hub))
}

/// Pump notifications from the user's channel to the socket until either
/// side goes away.
async fn handle_connection(socket: WebSocket, user_id: u64, hub: NotificationHub) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut rx = hub.subscribe(user_id).await;

    tracing::debug!(
        user_id,
        channel = %NotificationHub::channel_name(user_id),
        "realtime connection admitted"
    );

    let mut send_task = tokio::spawn(async move {
        while let Ok(notification) = rx.recv().await {
            let json = match serde_json::to_string(&notification) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("failed to serialize notification: {}", e);
                    continue;
                }
            };

            if ws_sender.send(Message::Text(json)).await.is_err() {
                // Client went away
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
            // Inbound messages are ignored; this channel is one-way.
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.prune(user_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn handshake_prefers_the_dedicated_auth_field() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        let query = Some("from-query".to_string());
        assert_eq!(handshake_token(&query, &headers), Some("from-query"));
        assert_eq!(handshake_token(&None, &headers), Some("from-header"));
        assert_eq!(handshake_token(&None, &HeaderMap::new()), None);
    }
}
