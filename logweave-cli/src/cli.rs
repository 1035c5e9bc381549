//! CLI argument parsing using clap derive API
//!
//! Purely declarative. No side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Settings file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "logweave.toml";

/// logweave -- compile log pipeline manifests into fluentd configuration.
///
/// Use `logweave <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logweave", version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file (default: ./logweave.toml, optional).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Report format for `validate` and `config`.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Rendered document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    /// fluentd block grammar.
    Fluent,
    /// JSON directive tree.
    Json,
}

impl DocumentFormat {
    /// Name understood by `compiler.format`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fluent => "fluent",
            Self::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a manifest and write the configuration document.
    Render(RenderArgs),

    /// Compile a manifest, discard the document and report counts.
    Validate(ValidateArgs),

    /// Manage settings.
    Config(ConfigArgs),
}

// ---- render ----

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Pipeline manifest (YAML).
    pub manifest: PathBuf,

    /// Write the document to FILE instead of stdout.
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Document format (overrides `compiler.format`).
    #[arg(long)]
    pub format: Option<DocumentFormat>,

    /// Indent width (overrides `compiler.indent`).
    #[arg(long)]
    pub indent: Option<usize>,
}

// ---- validate ----

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Pipeline manifest (YAML).
    pub manifest: PathBuf,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the settings file and report errors.
    Validate,
    /// Show the effective settings (file + env overrides + defaults).
    Show {
        /// Show only one section (general, compiler, secret).
        #[arg(long)]
        section: Option<String>,
    },
}
