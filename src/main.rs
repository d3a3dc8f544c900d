use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cinelog_api::domains::auth::models::*;
use cinelog_api::domains::auth::services::SessionSweeper;
use cinelog_api::routes::create_router;
use cinelog_api::shared::config::AppConfig;
use cinelog_api::shared::database::Database;
use cinelog_api::shared::services::AppState;

// OpenAPI schema definition for Swagger document generation
#[derive(OpenApi)]
#[openapi(
    paths(
        cinelog_api::domains::auth::handlers::auth_handler::signup,
        cinelog_api::domains::auth::handlers::auth_handler::signin,
        cinelog_api::domains::auth::handlers::auth_handler::refresh,
        cinelog_api::domains::auth::handlers::auth_handler::signout,
        cinelog_api::domains::auth::handlers::auth_handler::me,
    ),
    components(schemas(
        SignupRequest,
        SignupResponse,
        SigninRequest,
        SigninResponse,
        RefreshResponse,
        MeResponse,
        UserResponse,
        Role,
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Auth", description = "Session and authentication endpoints")
    ),
    info(
        title = "Cinelog API",
        description = "Session/authentication core of the cinelog movie-cataloging service",
        version = "1.0.0"
    )
)]
struct ApiDoc;

// Security scheme definition: adds the "Authorize" button in Swagger UI
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let db = Database::new(&config.database_url).await?;
    db.initialize().await?;

    // Background sweep: the TTL contract for session records
    let sweeper = SessionSweeper::new(
        db.clone(),
        config.refresh_token_ttl_secs,
        config.session_sweep_interval_secs,
    );
    sweeper.start();

    let app_state = AppState::new(db, config.clone());

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = axum::Router::new()
        .merge(create_router(app_state.clone()))
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/api", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
