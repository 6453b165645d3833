//! CLI argument definitions and parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::AccountStatus;
use crate::generation::DEFAULT_LANGUAGE;

/// Speechix voice cloning and text-to-speech client.
#[derive(Parser, Debug)]
#[command(name = "speechix")]
#[command(about = "Voice cloning and text-to-speech from the command line")]
#[command(version)]
pub struct Args {
    /// API server origin (overrides SPEECHIX_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm_password: String,
    },

    /// Continue as a guest with a fixed trial profile
    Guest,

    /// Sign out and forget the stored session
    Logout,

    /// Show usage, credits and account details
    Dashboard,

    /// Generate speech and wait for the result
    Generate {
        /// Text to generate speech from
        #[arg(short, long)]
        text: String,

        /// Voice id to speak with
        #[arg(long)]
        voice: Option<String>,

        /// Language code
        #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
        language: String,

        /// Cancel the job if it has not finished after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Save the finished audio to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cancel a running generation job
    Cancel {
        /// Job id
        id: String,
    },

    /// List past generations
    History {
        /// Download the audio of this history item
        #[arg(long)]
        download: Option<String>,
    },

    /// Manage cloned voices
    Voices {
        #[command(subcommand)]
        command: VoicesCommand,
    },

    /// Play the audio of a voice or history item
    Play {
        #[arg(value_enum)]
        kind: PlayKind,
        /// Item id
        id: String,
    },

    /// Administrator tools
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum VoicesCommand {
    /// List your voices
    List,

    /// Upload a reference recording as a new voice
    Upload {
        /// Audio file
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List users, optionally filtered by email
    Users {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one user
    User { id: String },

    /// Change a user's credits, expiry or status
    Update {
        id: String,
        #[arg(long)]
        credits: Option<String>,
        /// Expiry date as YYYY-MM-DD
        #[arg(long)]
        expiry: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
}

/// What kind of item `play` refers to.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayKind {
    Voice,
    History,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Active,
    Disabled,
}

impl From<StatusArg> for AccountStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => AccountStatus::Active,
            StatusArg::Disabled => AccountStatus::Disabled,
        }
    }
}
