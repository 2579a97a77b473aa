//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the service clients
//! every handler needs. Nothing in it changes after startup.

use krishi_core::{composer::ResponseComposer, telemetry::TelemetryStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<dyn TelemetryStore>,
    pub composer: Arc<ResponseComposer>,
}
