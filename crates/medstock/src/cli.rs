//! Clap derive structures for the `medstock` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of workspace crates so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// medstock -- browse and manage a medical-supply inventory
#[derive(Debug, Parser)]
#[command(
    name = "medstock",
    version,
    about = "Browse and manage a medical-supply inventory from the command line",
    long_about = "Command-line client for the medstock inventory service.\n\n\
        Lists are fetched whole and then searched, filtered, and sorted locally,\n\
        exactly like the table screens of medstock-tui.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "MEDSTOCK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'a', env = "MEDSTOCK_API", global = true)]
    pub api: Option<String>,

    /// Bearer token (overrides stored credentials)
    #[arg(long, env = "MEDSTOCK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MEDSTOCK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "MEDSTOCK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile; default 30)
    #[arg(long, env = "MEDSTOCK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage user accounts
    #[command(alias = "users")]
    Accounts(RecordsArgs),

    /// Manage staff accounts
    Staff(RecordsArgs),

    /// Manage catalogue items
    #[command(alias = "i")]
    Items(RecordsArgs),

    /// Manage storage locations
    #[command(alias = "storage")]
    Storages(RecordsArgs),

    /// Manage storage categories
    #[command(alias = "storage-categories")]
    Categories(RecordsArgs),

    /// Manage item lots
    #[command(alias = "item-lots")]
    Lots(RecordsArgs),

    /// View lot storage requests
    #[command(alias = "lot-storage-requests")]
    LotRequests(RecordsArgs),

    /// View lot creation requests
    #[command(alias = "lot-create-requests")]
    CreateRequests(RecordsArgs),

    /// Sign in, sign out, inspect the session
    Auth(AuthArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Record commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List records, searched, filtered, and sorted locally
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record by ID
    Get {
        /// Record ID
        id: String,
    },

    /// Server-side search (items and lot requests)
    Search {
        /// Text passed to the server as `?query=`
        query: String,
    },

    /// Create a record
    Create(WriteArgs),

    /// Update a record by ID
    Update {
        /// Record ID
        id: String,

        #[command(flatten)]
        body: WriteArgs,
    },

    /// Delete a record by ID
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },
}

/// Search, filter, and sort flags shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive text matched against the resource's search fields
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Exact-match constraint, repeatable (e.g. status=1, role=Admin, unit=all)
    #[arg(long, short = 'f', value_name = "FIELD=VALUE")]
    pub filter: Vec<String>,

    /// Sort key; each occurrence acts like one header click
    #[arg(long, value_name = "KEY")]
    pub sort: Vec<String>,

    /// Force descending order on the final sort key
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Print total, shown, and distinct counts after the table
    #[arg(long)]
    pub summary: bool,

    /// Only lots held in this storage (lots only)
    #[arg(long, value_name = "STORAGE_ID")]
    pub storage: Option<String>,
}

/// Request body for create and update.
#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Read the record from a JSON file; `--set` fields override it
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Set one field, repeatable
    #[arg(long, value_name = "FIELD=VALUE", required_unless_present = "from_file")]
    pub set: Vec<String>,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store a token for the active profile (prompted when --token is absent)
    Login {
        /// Save the token in the config file instead of the system keyring
        #[arg(long)]
        plaintext: bool,
    },

    /// Forget the active profile's stored token
    Logout,

    /// Show who the current token belongs to
    Whoami,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current configuration (tokens redacted)
    Show,

    /// Set a profile value
    Set {
        /// Key (api_url, token_env, ca_cert, insecure, timeout)
        key: String,
        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Switch the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
