//! Command-line interface definition for hookchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot sends, history
//! management, and account creation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hookchat - chat with a webhook from the terminal
///
/// Messages are relayed to the configured reply webhook; sessions are kept
/// per user in local storage.
#[derive(Parser, Debug, Clone)]
#[command(name = "hookchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the session database path
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for hookchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    ///
    /// The identity comes from `--user`, else from logging in with
    /// `--email`, else from the auth backend's current session.
    Chat {
        /// Local user id to chat as, skipping the auth backend
        #[arg(short, long, conflicts_with = "email")]
        user: Option<String>,

        /// Email to log in with; the password is prompted
        #[arg(short, long)]
        email: Option<String>,

        /// Keep sessions in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Send one message in the selected session and print the reply
    Send {
        /// Local user id whose sessions are used
        #[arg(short, long)]
        user: String,

        /// Message text
        message: String,
    },

    /// Manage stored sessions
    History {
        /// Local user id whose sessions are managed
        #[arg(short, long)]
        user: String,

        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Create an account on the auth backend
    Signup {
        /// Full name for the new account
        #[arg(short, long)]
        name: String,

        /// Email for the new account; the password is prompted
        #[arg(short, long)]
        email: String,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// List sessions, newest first
    List,

    /// Print every message of a session
    Show {
        /// Session id
        id: String,
    },

    /// Rename a session
    Rename {
        /// Session id
        id: String,

        /// New title
        title: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },

    /// Delete every session of the user
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
