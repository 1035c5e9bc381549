//! `logweave config` command handler and settings loading

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use logweave_core::config::LogweaveConfig;
use logweave_core::error::{ConfigError, LogweaveError};

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Source label used when no settings file was read.
const DEFAULTS_SOURCE: &str = "(defaults)";

/// Effective settings and where they came from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: LogweaveConfig,
    pub source: String,
}

/// Load settings from `path`, or from `./logweave.toml` when no path is given.
///
/// An explicit path must exist. A missing default file falls back to
/// built-in defaults plus `LOGWEAVE_*` env overrides.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    match LogweaveConfig::load(&path).await {
        Ok(config) => Ok(Settings {
            config,
            source: path.display().to_string(),
        }),
        Err(LogweaveError::Config(ConfigError::FileNotFound { .. })) if !explicit => {
            let mut config = LogweaveConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(Settings {
                config,
                source: DEFAULTS_SOURCE.to_owned(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the settings file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if the settings are invalid.
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    info!(path = %source, "validating settings");

    let report = match load_settings(config_path).await {
        Ok(settings) => ConfigValidationReport {
            source: settings.source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("settings are invalid".to_owned()));
    }
    Ok(())
}

/// Display the effective settings (file + env overrides + defaults).
///
/// # Errors
///
/// Returns `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let settings = load_settings(config_path).await?;
    info!(source = %settings.source, "showing settings");
    let report = ConfigReport::build(&settings, section.as_deref())?;
    writer.render(&report)
}

/// Settings display report.
///
/// Text output prints TOML, JSON output nests the same values under `settings`.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub settings: serde_json::Value,
    #[serde(skip)]
    pub settings_toml: String,
}

impl ConfigReport {
    /// Build the report for the whole settings or one section.
    pub fn build(settings: &Settings, section: Option<&str>) -> Result<Self, CliError> {
        let config = &settings.config;
        let (settings_toml, value) = match section {
            None => (to_toml(config)?, serde_json::to_value(config)?),
            Some("general") => (
                to_toml(&config.general)?,
                serde_json::to_value(&config.general)?,
            ),
            Some("compiler") => (
                to_toml(&config.compiler)?,
                serde_json::to_value(&config.compiler)?,
            ),
            Some("secret") => (
                to_toml(&config.secret)?,
                serde_json::to_value(&config.secret)?,
            ),
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {other} (expected: general, compiler, secret)"
                )));
            }
        };

        Ok(Self {
            source: settings.source.clone(),
            section: section.map(str::to_owned),
            settings: value,
            settings_toml,
        })
    }
}

fn to_toml<T: Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value).map_err(|e| CliError::Config(e.to_string()))
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.section {
            Some(section) => writeln!(w, "# [{section}] (source: {})", self.source)?,
            None => writeln!(w, "# settings (source: {})", self.source)?,
        }
        write!(w, "{}", self.settings_toml)
    }
}

/// Settings validation report.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Settings validation: {}", self.source)?;
        if self.valid {
            writeln!(w, "  Result: VALID")?;
        } else {
            writeln!(w, "  Result: INVALID")?;
            for err in &self.errors {
                writeln!(w, "  Error: {err}")?;
            }
        }
        Ok(())
    }
}
