//! `logweave render` command handler

use std::io::Write;

use tracing::info;

use logweave_core::config::LogweaveConfig;

use crate::cli::RenderArgs;
use crate::error::CliError;

/// Execute the `render` command.
///
/// The document goes to `--out` when given, otherwise to stdout. Logs never
/// share stdout with the document.
pub async fn execute(args: RenderArgs, config: &LogweaveConfig) -> Result<(), CliError> {
    let config = effective_config(&args, config)?;
    let (manifest, resolver) = super::load_manifest(&args.manifest, &config).await?;

    let document = logweave_compiler::compile(&manifest, &resolver, &config.compiler)?;

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, document.as_bytes()).await?;
            info!(
                path = %path.display(),
                bytes = document.len(),
                "document written"
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(document.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}

/// Apply `--format` and `--indent` on top of the loaded settings.
fn effective_config(
    args: &RenderArgs,
    config: &LogweaveConfig,
) -> Result<LogweaveConfig, CliError> {
    let mut config = config.clone();
    if let Some(format) = args.format {
        config.compiler.format = format.as_str().to_owned();
    }
    if let Some(indent) = args.indent {
        config.compiler.indent = indent;
    }
    config.validate()?;
    Ok(config)
}
