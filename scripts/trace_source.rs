//! Command-line tracer
//!
//! Traces one post URL and prints the JSON report.
//!
//! ```bash
//! xapi_access_token=... cargo run --bin trace_source -- https://x.com/user/status/123
//! ```

use sourcetrace::{ServiceSettings, SourceTracer, TwitterConfig};

#[tokio::main]
async fn main() {
    env_logger::init();

    let url = match std::env::args().nth(1) {
        Some(url) => url,
        None => {
            eprintln!("Usage: trace_source <post-url>");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&url).await {
        eprintln!("Failed to trace {}: {}", url, e);
        std::process::exit(1);
    }
}

async fn run(url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = TwitterConfig::from_env()?;
    let settings = ServiceSettings::from_env();
    let tracer = SourceTracer::from_settings(config, &settings);

    let report = tracer.trace(url).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
