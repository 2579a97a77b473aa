//! Axum Handlers for the REST API
//!
//! This module contains the chat, sensor, motor and health handlers. It uses
//! `utoipa` doc comments to generate OpenAPI documentation.

use anyhow::anyhow;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use krishi_core::telemetry::MotorCommand;
use std::{any::Any, sync::Arc};
use tracing::{error, info};

use crate::{
    models::{
        ChatPayload, ChatResponse, ErrorResponse, HealthResponse, MotorPayload, MotorResponse,
        SensorData,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        message: err.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Renders a handler panic as a 500 carrying the panic message.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown internal error".to_string()
    };
    ApiError::InternalServerError(anyhow!(detail)).into_response()
}

/// Answer a chat message.
///
/// Fetches the latest readings, classifies the message and replies with a
/// report, a motor confirmation or a model-generated answer.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 400, description = "No message provided", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("No message provided".to_string()));
    }

    let reply = state.composer.reply(&payload.message).await;
    Ok(Json(ChatResponse::from(reply)))
}

/// Get the latest sensor readings.
#[utoipa::path(
    get,
    path = "/sensors",
    responses(
        (status = 200, description = "Latest readings", body = SensorData),
        (status = 500, description = "Telemetry store unavailable", body = ErrorResponse)
    )
)]
pub async fn sensors(State(state): State<Arc<AppState>>) -> Result<Json<SensorData>, ApiError> {
    let snapshot = state
        .telemetry
        .latest_snapshot()
        .await
        .ok_or_else(|| ApiError::InternalServerError(anyhow!("Could not fetch sensor data")))?;
    Ok(Json(SensorData::from(&snapshot)))
}

/// Switch the irrigation motor on or off.
#[utoipa::path(
    post,
    path = "/motor",
    request_body = MotorPayload,
    responses(
        (status = 200, description = "Command sent", body = MotorResponse),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn motor(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MotorPayload>, JsonRejection>,
) -> Result<Json<MotorResponse>, ApiError> {
    let Json(payload) = payload?;
    let command = MotorCommand::from_action(payload.action);

    let success = state.telemetry.set_motor(command).await;
    info!(?command, success, "Motor command from API");

    let label = match command {
        MotorCommand::On => "ON",
        MotorCommand::Off => "OFF",
    };
    Ok(Json(MotorResponse {
        success,
        message: format!("Motor turned {}", label),
    }))
}

/// Report that the service is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Krishi Sahayak Chatbot is running!".to_string(),
    })
}
