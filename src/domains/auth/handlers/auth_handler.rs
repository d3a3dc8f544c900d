use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::domains::auth::models::{
    MeResponse, RefreshResponse, SigninRequest, SigninResponse, SignupRequest, SignupResponse,
};
use crate::domains::auth::services::ResolvedIdentity;
use crate::shared::errors::AuthError;
use crate::shared::middleware::cookies::{
    clear_session_cookies, session_cookies, DEVICE_COOKIE, REFRESH_COOKIE,
};
use crate::shared::services::AppState;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Bad request (email or username already exists)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), (StatusCode, Json<serde_json::Value>)> {
    let user = app_state
        .auth_state
        .auth_service
        .signup(&request.email, &request.username, &request.password)
        .await
        .map_err(|e: AuthError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            message: "User created successfully".to_string(),
        }),
    ))
}

// Sign-in handler
//
// On success the refresh token and device id are set as httpOnly cookies
// with max-age equal to the refresh-token lifetime; the access token is
// returned in the body for the client to hold in memory.
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = SigninResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn signin(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SigninRequest>,
) -> Result<(CookieJar, Json<SigninResponse>), (StatusCode, Json<serde_json::Value>)> {
    // An existing deviceId cookie keeps the session bound to this client
    // instance; otherwise a fresh one is minted.
    let device_id = jar.get(DEVICE_COOKIE).map(|c| c.value().to_owned());

    let outcome = app_state
        .auth_state
        .auth_service
        .signin(&request.email, &request.password, device_id)
        .await
        .map_err(|e: AuthError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    let [refresh_cookie, device_cookie] = session_cookies(
        &outcome.tokens.refresh_token,
        &outcome.device_id,
        app_state.config.refresh_token_ttl_secs,
    );

    Ok((
        jar.add(refresh_cookie).add(device_cookie),
        Json(SigninResponse {
            user: outcome.user.into(),
            access_token: outcome.tokens.access_token,
            message: "Sign-in successful".to_string(),
        }),
    ))
}

/// Explicit cookie-path renewal for clients that want a fresh access token
/// without waiting for the silent gate renewal. Same state machine as the
/// gate, bearer path skipped.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed successfully", body = RefreshResponse),
        (status = 401, description = "No session cookies, or session not recognized"),
        (status = 403, description = "Session failed verification"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn refresh(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    let refresh_cookie = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned());
    let device_cookie = jar.get(DEVICE_COOKIE).map(|c| c.value().to_owned());

    let resolution = app_state
        .auth_state
        .resolver
        .resolve(None, refresh_cookie.as_deref(), device_cookie.as_deref())
        .await;

    match resolution {
        Ok(resolution) => {
            // The cookie path always stages a fresh access token.
            let access_token = resolution.renewed_access_token.unwrap_or_default();
            let identity = resolution.identity;

            Json(RefreshResponse {
                access_token,
                user: MeResponse {
                    id: identity.user_id,
                    username: identity.username,
                    role: identity.role,
                    is_banned: identity.is_banned,
                },
            })
            .into_response()
        }
        Err(err) => {
            let invalidated = err.clears_cookies();
            let parts: (StatusCode, Json<serde_json::Value>) = err.into();

            if invalidated {
                let [refresh_cookie, device_cookie] = clear_session_cookies();
                (jar.add(refresh_cookie).add(device_cookie), parts).into_response()
            } else {
                parts.into_response()
            }
        }
    }
}

/// Sign-out handler
///
/// Deletes the session matched by the (deviceId, refreshToken) cookie pair
/// and clears both cookies. Succeeds even when nothing matches, so a second
/// sign-out is not an error.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses(
        (status = 200, description = "Sign-out successful"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn signout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    if let (Some(refresh), Some(device)) = (jar.get(REFRESH_COOKIE), jar.get(DEVICE_COOKIE)) {
        let (refresh, device) = (refresh.value().to_owned(), device.value().to_owned());
        app_state
            .auth_state
            .auth_service
            .signout(&device, &refresh)
            .await
            .map_err(|e: AuthError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;
    }

    let [refresh_cookie, device_cookie] = clear_session_cookies();

    Ok((
        jar.add(refresh_cookie).add(device_cookie),
        Json(json!({ "message": "Sign-out successful" })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Resolved identity", body = MeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(identity: ResolvedIdentity) -> Json<MeResponse> {
    Json(MeResponse {
        id: identity.user_id,
        username: identity.username,
        role: identity.role,
        is_banned: identity.is_banned,
    })
}
