//! Main Entrypoint for the Krishi Sahayak API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the telemetry and language-model clients.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use krishi_api::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
};
use krishi_core::{
    composer::ResponseComposer,
    llm_client::{GenerationParams, HuggingFaceClient, LanguageModel, OpenAICompatibleClient},
    telemetry::{TelemetryStore, ThingSpeakClient},
};
use std::{collections::HashMap, fs, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// A helper function to load prompts from a directory.
fn load_prompts(prompts_path: &std::path::Path) -> anyhow::Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    for entry in std::fs::read_dir(prompts_path)
        .with_context(|| format!("Could not read prompts directory {}", prompts_path.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("🌱 Krishi Sahayak Chatbot Backend Starting...");

    // --- 3. Initialize Shared Services ---
    let prompts = load_prompts(&config.prompts_path)?;
    let system_prompt = Arc::new(
        prompts
            .get("system_prompt")
            .context("system_prompt.md not found in prompts directory")?
            .clone(),
    );

    let telemetry: Arc<dyn TelemetryStore> = Arc::new(ThingSpeakClient::new(config.thingspeak()));

    let params = GenerationParams::default();
    let model: Arc<dyn LanguageModel> = match &config.provider {
        Provider::HuggingFace => {
            info!(url = %config.hf_api_url, "Using Hugging Face inference provider.");
            Arc::new(HuggingFaceClient::new(config.hugging_face(), params))
        }
        Provider::OpenAI => {
            info!(model = %config.chat_model, "Using OpenAI-compatible provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(&config.openai_api_base);
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
                params,
            ))
        }
    };

    let composer = Arc::new(ResponseComposer::new(
        telemetry.clone(),
        model,
        system_prompt,
    ));
    let app_state = Arc::new(AppState {
        telemetry,
        composer,
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        channel = %config.channel_id,
        provider = ?config.provider,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
