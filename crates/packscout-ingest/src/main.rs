//! Ingestion worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p packscout-ingest
//! ```
//!
//! Configuration is loaded from environment variables.

use packscout_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Ingestion failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        mode = %config.ingest.mode,
        "Starting packscout ingestion..."
    );

    let stats = packscout_ingest::run(config).await?;

    info!(
        processed = stats.messages_processed,
        skipped = stats.messages_skipped,
        packs_upserted = stats.packs_upserted,
        emoji_upserted = stats.emoji_upserted,
        "Ingestion complete"
    );

    Ok(())
}
