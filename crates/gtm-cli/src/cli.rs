//! CLI argument definitions for the tag deployer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "gtm-deploy",
    version,
    about = "Deploy variables, triggers and tags into a Tag Manager workspace",
    long_about = "Deploy a tag configuration into a Tag Manager workspace.\n\n\
                  Accepts canonical JSON, container exports and .xlsx/.xls workbooks.\n\
                  Input is validated before anything is sent to the API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a configuration file and create its resources.
    Deploy(DeployArgs),

    /// Print the canonical form of a configuration file.
    Normalize(NormalizeArgs),
}

#[derive(Parser)]
pub struct DeployArgs {
    /// Configuration file (.json, .xlsx or .xls).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Account that owns the container; skips container lookup.
    #[arg(long = "account-id", env = "GTM_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Numeric container ID or public ID (GTM-XXXX).
    #[arg(long = "container-id", env = "GTM_CONTAINER_ID")]
    pub container_id: Option<String>,

    /// Workspace to reuse or create.
    #[arg(long = "workspace", env = "GTM_WORKSPACE_NAME")]
    pub workspace: Option<String>,

    /// Only deploy resources of this type.
    #[arg(long = "template-type", value_name = "TYPE")]
    pub template_type: Option<String>,

    /// Validate only; no credentials are needed and nothing is created.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Service-account JSON key file.
    #[arg(
        long = "service-account",
        env = "SERVICE_ACCOUNT_JSON_PATH",
        value_name = "PATH"
    )]
    pub service_account: Option<PathBuf>,

    /// Configuration file (default: gtm-deploy.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Retry transient API failures this many times.
    #[arg(long = "retries", value_name = "N")]
    pub retries: Option<u32>,

    /// Print a machine-readable JSON result instead of the summary table.
    #[arg(long = "json")]
    pub json: bool,

    /// Pixel identifier recorded in the logs.
    #[arg(long = "pixel", value_name = "ID")]
    pub pixel: Option<String>,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Configuration file (.json, .xlsx or .xls).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Keep only resources of this type.
    #[arg(long = "template-type", value_name = "TYPE")]
    pub template_type: Option<String>,

    /// Write the document to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
