//! Clap derive structures for the `geoport` CLI.
//!
//! Defines the complete command tree, global flags, and shared enums.
//! Kept free of crate-internal imports so `build.rs` can include it
//! standalone for man-page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// geoport -- portal connection checks and small data utilities
#[derive(Debug, Parser)]
#[command(
    name = "geoport",
    version,
    about = "Connect to mapping portals with tiered certificate handling",
    long_about = "Utilities around mapping-platform portals: a tiered connect\n\
        sequence with certificate and credential handling, a certificate\n\
        trust probe, a small page fetcher, and tabular statistics helpers.",
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
    /// Portal profile to use
    #[arg(long, short = 'p', env = "GEOPORT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Portal URL (overrides profile)
    #[arg(long, short = 'c', env = "GEOPORT_PORTAL", global = true)]
    pub portal: Option<String>,

    /// Username to sign in as
    #[arg(long, short = 'u', env = "GEOPORT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (prefer the secret store or the interactive prompt)
    #[arg(long, env = "GEOPORT_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GEOPORT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip TLS certificate verification entirely
    #[arg(long, short = 'k', env = "GEOPORT_INSECURE", global = true)]
    pub insecure: bool,

    /// Never consult the secret store or prompt for missing credentials
    #[arg(long, env = "GEOPORT_NO_KEYRING", global = true)]
    pub no_keyring: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GEOPORT_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,

    /// Append log lines to this file in addition to the console
    #[arg(long, env = "GEOPORT_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Comma-separated values
    Csv,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to a portal and show the signed-in identity
    #[command(alias = "co")]
    Connect(ConnectArgs),

    /// Certificate trust utilities
    Cert(CertArgs),

    /// Manage secrets in the platform credential store
    Cred(CredArgs),

    /// Fetch a web page and extract links or readable text
    Fetch(FetchArgs),

    /// Clean a CSV table and report descriptive statistics
    Stats(StatsArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Connect ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Also fetch and display portal metadata
    #[arg(long)]
    pub info: bool,
}

// ── Cert ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CertArgs {
    #[command(subcommand)]
    pub command: CertCommand,
}

#[derive(Debug, Subcommand)]
pub enum CertCommand {
    /// Probe TLS trust for a portal URL
    Verify {
        /// Portal URL to probe
        url: String,

        /// Local certificate-store directory
        #[arg(long, default_value = "./certificates")]
        store_dir: PathBuf,
    },
}

// ── Cred ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CredArgs {
    #[command(subcommand)]
    pub command: CredCommand,
}

#[derive(Debug, Subcommand)]
pub enum CredCommand {
    /// Store a secret for a username (prompts, input not echoed)
    Set {
        /// Username the secret belongs to
        username: String,
    },

    /// Remove a stored secret
    Clear {
        /// Username whose secret to remove
        username: String,
    },
}

// ── Fetch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Page URL to fetch
    pub url: String,

    /// Extract links instead of the page report
    #[arg(long, conflicts_with = "text")]
    pub links: bool,

    /// Extract readable text instead of the page report
    #[arg(long, conflicts_with = "links")]
    pub text: bool,

    /// Write the output to a file instead of stdout
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,
}

// ── Stats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// CSV file to analyze
    pub file: PathBuf,

    /// Field separator
    #[arg(long, default_value_t = ',')]
    pub sep: char,

    /// Drop rows containing empty cells
    #[arg(long)]
    pub drop_missing: bool,

    /// Fill empty cells with VALUE instead of dropping rows
    #[arg(long, value_name = "VALUE", conflicts_with = "drop_missing")]
    pub fill: Option<String>,

    /// Trend analysis: the date column to order by
    #[arg(long, requires = "value_column")]
    pub date_column: Option<String>,

    /// Trend analysis: the numeric column to analyze
    #[arg(long, requires = "date_column")]
    pub value_column: Option<String>,

    /// Write the cleaned table to a CSV file
    #[arg(long, value_name = "PATH")]
    pub export_cleaned: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file with an example profile
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
