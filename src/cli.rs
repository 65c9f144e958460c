//! CLI definitions for playrec.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// playrec CLI.
#[derive(Parser)]
#[command(name = "playrec")]
#[command(about = "Turn recorded browser interactions into Playwright tests")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.playrec/config.toml)
    #[arg(short, long, global = true, env = "PLAYREC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the recorder API in foreground (default)
    Serve {
        /// Server host (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate code for a JSON file of captured steps
    Generate {
        /// Path to a JSON array of steps
        #[arg(short, long)]
        steps: PathBuf,

        /// Output format (javascript, python, pytest)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Session history commands
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show one session record as JSON
    Show {
        /// Session ID
        session_id: String,
    },

    /// Delete a session from history
    Delete {
        /// Session ID
        session_id: String,
    },

    /// Export a session
    Export {
        /// Session ID
        session_id: String,

        /// What to export (json, playwright)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
