use anyhow::Result;
use molstruct::{config, server};
use tracing::info;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration is needed before logging can be set up
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    // RUST_LOG may carry a full directive list; only a bare level is checked
    if !log_level.contains('=') {
        if let Err(e) = validate_log_level(&log_level) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", log_level, e))?;
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting molstruct with log level: {}", log_level);

    server::run(config).await?;

    Ok(())
}
