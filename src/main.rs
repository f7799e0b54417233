//! # Sourcetrace
//!
//! A Rust web service that finds the earliest discoverable source of an
//! X/Twitter post and summarizes its author's recent topics and sentiment.
//!
//! ## Environment Variables
//!
//! - `xapi_access_token`: X API Bearer token (required)
//! - `NLP_SERVICE_URL`: Sentiment/tagging service (defaults to `http://127.0.0.1:5005`)
//! - `PORT`: Server port (defaults to 3000)
//!
//! ## API Endpoints
//!
//! - `GET /`: URL form
//! - `POST /`: Form submission
//! - `GET /api/source?url=...`: JSON trace report
//! - `GET /health`: Returns service health status

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use sourcetrace::twitter::OEmbedClient;
use sourcetrace::{get_server_port, router, AppState, ServiceSettings, SourceTracer, TwitterConfig};

/// Main entry point for the sourcetrace web service.
///
/// Initializes logging, loads the X API credentials and service settings, and
/// serves the routes until terminated.
///
/// # Logging
///
/// The application uses the `env_logger` crate. Log levels can be controlled via
/// the `RUST_LOG` environment variable.
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 3000
/// cargo run
///
/// # Run with debug logging
/// RUST_LOG=debug cargo run
/// ```
///
/// # Panics
///
/// This function will panic if `PORT` is not a valid port number.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize the logging system
    env_logger::init();

    let config = TwitterConfig::from_env()?;
    let settings = ServiceSettings::from_env();

    let state = AppState {
        tracer: SourceTracer::from_settings(config, &settings),
        embedder: Arc::new(OEmbedClient::new()),
    };

    let app = router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Starting sourcetrace server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
