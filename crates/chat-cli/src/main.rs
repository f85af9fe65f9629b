//! Chat CLI entry point
//!
//! Run with:
//! ```bash
//! cargo run -p chat-cli -- lobby
//! ```
//!
//! The optional argument is the room to join (a leading `#` is accepted).
//! Configuration is loaded from environment variables.

use chat_common::{try_init_tracing_with_config, AppConfig, ErrorResponse, TracingConfig};
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
    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_log_config(&config.log)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        default_room = %config.chat.default_room,
        "Configuration loaded"
    );

    let room = std::env::args().nth(1);
    if let Err(e) = chat_cli::run(config, room.as_deref()).await {
        error!(error = %e, "Chat CLI failed");
        eprintln!("{}", ErrorResponse::from(e));
        std::process::exit(1);
    }
}
