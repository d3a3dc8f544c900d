use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::domains::auth::services::ResolvedIdentity;
use crate::shared::middleware::cookies::{clear_session_cookies, DEVICE_COOKIE, REFRESH_COOKIE};
use crate::shared::services::AppState;

/// Response header carrying a silently renewed access token back to the
/// client. Out-of-band: the guarded request itself proceeds either way.
pub const RENEWED_TOKEN_HEADER: &str = "x-access-token";

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The authentication gate.
///
/// Runs the Session Resolver against the request's bearer header and cookie
/// pair. On success the ResolvedIdentity is attached as a request extension
/// and a renewed access token, when staged, is relayed on the response. On
/// the invalidation outcomes both session cookies are cleared. A request
/// never proceeds past this layer without a definitive outcome.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = bearer_token(request.headers()).map(str::to_owned);
    let refresh_cookie = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned());
    let device_cookie = jar.get(DEVICE_COOKIE).map(|c| c.value().to_owned());

    let resolution = state
        .auth_state
        .resolver
        .resolve(
            bearer.as_deref(),
            refresh_cookie.as_deref(),
            device_cookie.as_deref(),
        )
        .await;

    match resolution {
        Ok(resolution) => {
            request.extensions_mut().insert(resolution.identity);
            let mut response = next.run(request).await;

            if let Some(token) = resolution.renewed_access_token {
                if let Ok(value) = HeaderValue::from_str(&token) {
                    response.headers_mut().insert(RENEWED_TOKEN_HEADER, value);
                }
            }

            response
        }
        Err(err) => {
            tracing::debug!("request rejected at session gate: {}", err);
            let parts: (StatusCode, Json<serde_json::Value>) =
                (err.status(), Json(json!({ "error": err.to_string() })));

            if err.clears_cookies() {
                let [refresh, device] = clear_session_cookies();
                (jar.add(refresh).add(device), parts).into_response()
            } else {
                parts.into_response()
            }
        }
    }
}

/// Extractor for handlers sitting behind the gate.
///
/// Usage:
/// ```ignore
/// pub async fn me(identity: ResolvedIdentity) -> ... { identity.user_id }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for ResolvedIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ResolvedIdentity>().cloned().ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Please sign in" })),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }
}
