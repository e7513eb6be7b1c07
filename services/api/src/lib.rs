//! services/api/src/lib.rs
//!
//! Wiring shared by the `api` binary and the integration tests: building the
//! catalog, the shared state and the router.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

use adapters::{load_catalog, MemoryLibrary};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use chrono::{Duration, Utc};
use config::{Config, ConfigError};
use error::ApiError;
use flame_core::{sample::sample_catalog, CatalogStore, SystemClock};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use web::{rest::ApiDoc, state::AppState};

/// Loads the configured seed file, or the built-in sample catalog.
pub fn build_catalog(config: &Config) -> Result<CatalogStore, ApiError> {
    match &config.catalog_path {
        Some(path) => Ok(load_catalog(path)?),
        None => {
            info!("No CATALOG_PATH set, serving the sample catalog");
            Ok(sample_catalog(Utc::now())?)
        }
    }
}

pub fn build_state(config: Config, catalog: CatalogStore) -> Arc<AppState> {
    let library = Arc::new(MemoryLibrary::new(
        catalog,
        Arc::new(SystemClock),
        Duration::days(config.session_ttl_days),
    ));
    Arc::new(AppState {
        catalog: library.clone(),
        reading: library,
        config: Arc::new(config),
    })
}

/// Builds the full router: public catalog routes, reader routes and Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signin", post(web::signin_handler))
        .route("/auth/signout", post(web::signout_handler))
        .route("/stories", get(web::list_stories_handler))
        .route("/stories/{story_id}", get(web::get_story_handler))
        .route("/stories/{story_id}/chapters/{index}", get(web::get_chapter_handler))
        .route(
            "/stories/{story_id}/chapters/{index}/next",
            get(web::next_chapter_handler),
        )
        .route(
            "/stories/{story_id}/chapters/{index}/previous",
            get(web::previous_chapter_handler),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/progress", put(web::record_progress_handler))
        .route("/stories/{story_id}/bookmark", post(web::toggle_bookmark_handler))
        .route("/me", get(web::me_handler))
        .route("/me/bookmarks", get(web::bookmarks_handler))
        .route("/me/continue-reading", get(web::continue_reading_handler))
        .route(
            "/me/settings",
            get(web::get_settings_handler).put(web::put_settings_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            web::require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
