use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use learning_api::{
    api::{AppState, create_router},
    config::{Config, LoggingConfig},
    log_system_event,
    llm_service::LLMService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    let _guard = setup_logging(&config.logging)?;
    config.log_configuration_summary();
    config.validate()?;

    log_system_event!(startup, component = "server", "Starting Learning API server");

    let llm_service =
        LLMService::from_config(&config.llm).context("Failed to build LLM HTTP client")?;
    info!(
        provider = llm_service.provider_name(),
        model = llm_service.model_name(),
        base_url = %config.llm.base_url,
        "Initialized LLM service"
    );

    let state = AppState { llm_service };

    // Development posture: any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(ServiceBuilder::new().layer(cors));

    let addr = config.server.address();
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_system_event!(shutdown, component = "server", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use std::fs;
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new("info,learning_api=debug"));

    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
    });

    let mut guard = None;
    let file_layer = if config.file_enabled {
        // Create logs directory if it doesn't exist
        fs::create_dir_all(&config.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });

        // Set up file appender with daily rotation
        let file_appender = tracing_appender::rolling::daily(&config.log_directory, "learning-api.log");
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        // No ANSI colors for files
        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(non_blocking_file),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        directory = %config.log_directory,
        file_enabled = config.file_enabled,
        console_enabled = config.console_enabled,
        "Logging initialized"
    );

    Ok(guard)
}
