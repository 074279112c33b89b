//! CLI command definitions for the `chatdesk` binary.
//!
//! Uses clap derive macros for argument parsing. Commands other than `serve`
//! and `completions` run directly against the local database.

pub mod admin;
pub mod chat;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use chatdesk_types::user::UserRole;

/// Chatbot conversation backend.
#[derive(Parser)]
#[command(name = "chatdesk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config.toml).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (default from config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage user accounts.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// List a user's chats, most recently active first.
    Chats {
        /// Numeric user id.
        user_id: i64,
    },

    /// Show the merged text and voice history of a chat.
    History {
        /// Chat id.
        chat_id: String,

        /// Owner's numeric user id.
        #[arg(long)]
        user: i64,
    },

    /// Show user, conversation, and message totals.
    Metrics,

    /// Show the most recently active conversations across all users.
    Recent {
        /// Maximum conversations to show (default: 10).
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account (offline until it logs in).
    Create {
        /// Login name.
        username: String,

        /// Initial password.
        #[arg(long, env = "CHATDESK_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Account role: user or admin.
        #[arg(long, default_value_t = UserRole::User)]
        role: UserRole,
    },
}

/// Singular or plural noun for a count.
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
