//! Main entry point for the GreenLine365 platform server.
//!
//! Sets up configuration, logging, the database connection, the shared
//! integration clients, the weather watcher, and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use greenline_core::service::weather;
use greenline_server::{
    model::{self, common::AppState},
    startup::{self, GracefulShutdown},
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize configuration and logging
    let configuration = model::common::Configuration::new();

    let logging_config = startup::LoggingConfig::from_config(
        configuration.log_dir(),
        configuration.log_console_enabled(),
        configuration.log_level(),
    );
    let _logging_guard = startup::init_logging(&logging_config)?;

    info!(version = %configuration.version(), "Starting GreenLine365 server");

    // Extract configuration parameters
    let server_address = configuration.server_address();
    let server_port = configuration.server_port();
    let context_path = configuration.server_context_path();
    let watcher_enabled = configuration.weather_watcher_enabled();
    let watcher_interval = configuration.weather_watcher_interval_secs();

    // Connect to the managed database
    let database_connection = configuration.database_connection().await?;
    info!("Database connection established");

    // Create application state with the shared integration clients
    let app_state = Arc::new(AppState::new(configuration, database_connection));

    // Initialize graceful shutdown handler
    let shutdown_signal = startup::wait_for_shutdown_signal().await;
    let graceful_shutdown = GracefulShutdown::new(shutdown_signal.clone(), Duration::from_secs(30));

    // Start the weather watcher background task
    let watcher_handle = if watcher_enabled {
        info!(
            interval_secs = watcher_interval,
            "Starting weather watcher"
        );
        Some(weather::spawn_watcher(
            app_state.database_connection.clone(),
            app_state.weather.clone(),
            Some(app_state.email.clone()),
            watcher_interval,
        ))
    } else {
        info!("Weather watcher is disabled");
        None
    };

    // Start the HTTP server with graceful shutdown support
    info!(
        "Starting GreenLine365 server on {}:{}",
        server_address, server_port
    );
    let server = startup::http_server(
        app_state.clone(),
        context_path,
        server_address,
        server_port,
    )?;

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = graceful_shutdown.wait_for_shutdown() => {
            info!("Server shutting down gracefully");
        }
    }

    // Cleanup: stop the watcher if running
    if let Some(handle) = watcher_handle {
        info!("Stopping weather watcher...");
        handle.abort();
        info!("Weather watcher stopped");
    }

    info!("GreenLine365 server shutdown complete");
    Ok(())
}
