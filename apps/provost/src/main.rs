//! # Provost - Academic Records Server
//!
//! The main binary for the Provost degree-progression engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for registrar operations
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------+
//! |               apps/provost (THE BINARY)            |
//! |                                                    |
//! |   +-------------+          +-------------+        |
//! |   |   CLI       |          |   HTTP API  |        |
//! |   |  (clap)     |          |   (axum)    |        |
//! |   +------+------+          +------+------+        |
//! |          |                        |               |
//! |          +-----------+------------+               |
//! |                      v                            |
//! |              +---------------+                    |
//! |              | provost-core  |                    |
//! |              |  (THE LOGIC)  |                    |
//! |              +---------------+                    |
//! +----------------------------------------------------+
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! provost server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! provost status
//! provost progression --student 1
//! provost attendance --enrollment 3
//! ```

use clap::Parser;
use provost::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — PROVOST_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PROVOST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "provost=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Provost startup banner.
fn print_banner() {
    println!(
        r#"
  ██████╗ ██████╗  ██████╗ ██╗   ██╗ ██████╗ ███████╗████████╗
  ██╔══██╗██╔══██╗██╔═══██╗██║   ██║██╔═══██╗██╔════╝╚══██╔══╝
  ██████╔╝██████╔╝██║   ██║██║   ██║██║   ██║███████╗   ██║
  ██╔═══╝ ██╔══██╗██║   ██║╚██╗ ██╔╝██║   ██║╚════██║   ██║
  ██║     ██║  ██║╚██████╔╝ ╚████╔╝ ╚██████╔╝███████║   ██║
  ╚═╝     ╚═╝  ╚═╝ ╚═════╝   ╚═══╝   ╚═════╝ ╚══════╝   ╚═╝

  Academic Records Server v{}

  Deterministic • Auditable • Integer-exact
"#,
        env!("CARGO_PKG_VERSION")
    );
}
