use anime_lookup_bot::config::Settings;
use anime_lookup_bot::logging::{self, Redactor};
use anime_lookup_bot::runner;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};

/// Environment variables that may carry the bot token
const TOKEN_VARS: [&str; 2] = ["TELEGRAM_TOKEN", "APP__TELEGRAM_TOKEN"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Redaction must be ready before the first log line
    let redactor = TOKEN_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .fold(
            Redactor::new().map_err(|e| {
                eprintln!("Failed to compile redaction patterns: {e}");
                e
            })?,
            |redactor, token| redactor.with_secret(token),
        );
    logging::init(redactor);

    info!("Starting Anime Lookup Bot...");

    let settings = init_settings();

    runner::run_bot(settings).await;

    info!("Bot stopped.");
    Ok(())
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}
