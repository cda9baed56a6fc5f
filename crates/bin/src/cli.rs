//! CLI argument definitions for the Filefly binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development)
    Inmemory,
}

/// Output format of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

/// Filefly account and preference store
#[derive(Parser, Debug)]
#[command(name = "filefly")]
#[command(about = "Manage the Filefly account and preference store")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Output format
    #[arg(long, global = true, default_value = "human", env = "FILEFLY_FORMAT")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store lives and how it is opened.
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, global = true, default_value = "sqlite", env = "FILEFLY_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores filefly.db
    /// For InMemory: stores filefly.json
    #[arg(short = 'D', long, global = true, env = "FILEFLY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, global = true, env = "FILEFLY_POSTGRES_URL")]
    pub postgres_url: Option<String>,

    /// Milliseconds a stuck access-queue holder is tolerated
    #[arg(long, global = true, env = "FILEFLY_LOCK_TIMEOUT_MS")]
    pub lock_timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Read and write account preferences
    #[command(subcommand)]
    Pref(PrefCommand),
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create an account
    Create {
        username: String,
        #[command(flatten)]
        password: PasswordArg,
        /// Grant the administrator role
        #[arg(long)]
        admin: bool,
        /// Accept passwords and usernames the policy would reject
        #[arg(long)]
        skip_policy: bool,
    },
    /// Delete an account and its preferences
    Delete { username: String },
    /// List all accounts
    List,
    /// Show one account
    Show { username: String },
    /// Check a password and record the login
    Verify {
        username: String,
        #[command(flatten)]
        password: PasswordArg,
    },
    /// Change an account's password
    Passwd {
        username: String,
        #[command(flatten)]
        password: PasswordArg,
        /// Accept passwords the policy would reject
        #[arg(long)]
        skip_policy: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct PasswordArg {
    /// Account password
    #[arg(long = "password", env = "FILEFLY_PASSWORD", hide_env_values = true)]
    pub value: String,
}

#[derive(Subcommand, Debug)]
pub enum PrefCommand {
    /// Print one preference, or the whole document without a key
    Get { username: String, key: Option<String> },
    /// Set a preference; without a value the key is removed
    Set {
        username: String,
        key: String,
        /// `true`/`false`, a number, or any other text
        value: Option<String>,
    },
}
