//! # Provost CLI Module
//!
//! This module implements the CLI interface for Provost.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show database and policy status
//! - `progression` - Show a student's degree progression
//! - `history` - Show a student's per-term GPA history
//! - `attendance` - Show attendance standing for an enrollment
//! - `seed` - Load students, enrollments, grades and attendance from a file
//! - `apply` - File a retake/resit request for an enrollment
//! - `decide` - Approve or reject a pending request
//! - `init` - Initialize new database

mod commands;

use clap::{Parser, Subcommand};
use provost_core::ProvostError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Provost - Academic Records Server
///
/// A deterministic degree-progression engine. GPA, classification,
/// attendance eligibility and retake/resit workflows over exact
/// fixed-point integer arithmetic.
#[derive(Parser, Debug)]
#[command(name = "provost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the records database
    #[arg(short = 'D', long, global = true, default_value = "provost.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (ephemeral)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML policy file overriding institutional defaults
    #[arg(short = 'P', long, global = true)]
    pub policy: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show database and policy status
    Status,

    /// Show a student's degree progression
    Progression {
        /// Student ID
        #[arg(short, long)]
        student: u64,
    },

    /// Show a student's per-term GPA history
    History {
        /// Student ID
        #[arg(short, long)]
        student: u64,
    },

    /// Show attendance standing for an enrollment
    Attendance {
        /// Enrollment ID
        #[arg(short, long)]
        enrollment: u64,
    },

    /// Load students, enrollments, grades and attendance from a JSON file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// File a retake/resit request for a failed enrollment
    Apply {
        /// Enrollment ID
        #[arg(short, long)]
        enrollment: u64,

        /// Reason for the application
        #[arg(short, long)]
        reason: String,
    },

    /// Approve or reject a pending request
    Decide {
        /// Request ID
        #[arg(short = 'R', long)]
        request: u64,

        /// Outcome: "approved" or "rejected"
        #[arg(short, long)]
        outcome: String,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ProvostError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;
    let policy = cli.policy.as_deref();

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(&cli.database, backend, policy, &host, port).await
        }
        Some(Commands::Status) => cmd_status(&cli.database, backend, policy, json_mode),
        Some(Commands::Progression { student }) => {
            cmd_progression(&cli.database, backend, policy, json_mode, student)
        }
        Some(Commands::History { student }) => {
            cmd_history(&cli.database, backend, policy, json_mode, student)
        }
        Some(Commands::Attendance { enrollment }) => {
            cmd_attendance(&cli.database, backend, policy, json_mode, enrollment)
        }
        Some(Commands::Seed { file }) => {
            cmd_seed(&cli.database, backend, policy, json_mode, &file)
        }
        Some(Commands::Apply { enrollment, reason }) => {
            cmd_apply(&cli.database, backend, policy, json_mode, enrollment, &reason)
        }
        Some(Commands::Decide { request, outcome }) => {
            cmd_decide(&cli.database, backend, policy, json_mode, request, &outcome)
        }
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, backend, policy, json_mode)
        }
    }
}
