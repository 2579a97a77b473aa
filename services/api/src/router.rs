//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ChatPayload, ChatResponse, ErrorResponse, HealthResponse, MotorPayload, MotorResponse,
        SensorData,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat,
        handlers::sensors,
        handlers::motor,
        handlers::health,
    ),
    components(
        schemas(ChatPayload, ChatResponse, SensorData, MotorPayload, MotorResponse, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "Krishi Sahayak API", description = "Farm assistant chat, sensor readings and motor control")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/sensors", get(handlers::sensors))
        .route("/motor", post(handlers::motor))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http())
}
