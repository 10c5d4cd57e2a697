//! CLI module - Command-line interface for codegen-gate
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BackendMode;
use crate::domain::{Language, UserId};

/// codegen-gate - subscription-gated code snippet generator
/// Ask for Python or Lua snippets from the terminal
#[derive(Parser)]
#[command(name = "codegen-gate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (default: search ./config.toml and user dirs)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured backend mode
    #[arg(long, global = true, value_parser = parse_backend_mode)]
    pub backend: Option<BackendMode>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    #[command(alias = "c")]
    Chat {
        /// Log in with this email right away
        #[arg(long)]
        email: Option<String>,
        /// Display name used for login
        #[arg(long, default_value = "")]
        name: String,
        /// Initial target language
        #[arg(long, short, value_parser = parse_language)]
        language: Option<Language>,
    },

    /// Send a single request and print the answer
    #[command(alias = "a")]
    Ask {
        /// Email to log in with
        #[arg(long)]
        email: String,
        /// Display name used for login
        #[arg(long, default_value = "")]
        name: String,
        /// Target language
        #[arg(long, short, value_parser = parse_language, default_value = "python")]
        language: Language,
        /// Buy a subscription for this user before sending
        #[arg(long)]
        subscribe: bool,
        /// What the snippet should do
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// List users and their subscription status (admin)
    #[command(alias = "ls")]
    Users {
        #[command(flatten)]
        admin: AdminLogin,
    },

    /// Grant a subscription to a user (admin)
    Grant {
        /// User ID
        user_id: UserId,
        #[command(flatten)]
        admin: AdminLogin,
    },

    /// Revoke a user's subscription (admin)
    Revoke {
        /// User ID
        user_id: UserId,
        #[command(flatten)]
        admin: AdminLogin,
    },

    /// Run the mock backend (auth, subscriptions, generate)
    #[command(alias = "server")]
    Serve {
        /// Port to listen on (default from config)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Create default config file
    Init,
}

/// Credentials for admin-only one-shot commands.
#[derive(clap::Args)]
pub struct AdminLogin {
    /// Admin email (default: first configured admin)
    #[arg(long)]
    pub email: Option<String>,
    /// Admin display name
    #[arg(long, default_value = "")]
    pub name: String,
}

fn parse_language(raw: &str) -> Result<Language, String> {
    raw.parse().map_err(|e: crate::domain::UnsupportedLanguage| e.to_string())
}

fn parse_backend_mode(raw: &str) -> Result<BackendMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(BackendMode::Local),
        "remote" => Ok(BackendMode::Remote),
        other => Err(format!("unknown backend '{other}' (expected local or remote)")),
    }
}

pub use commands::*;
