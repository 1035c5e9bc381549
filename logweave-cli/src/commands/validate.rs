//! `logweave validate` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logweave_core::Directive;
use logweave_core::config::LogweaveConfig;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate` command.
///
/// Runs the full compile, discards the document and reports counts. A
/// manifest that fails to load is returned as-is; one that loads but is
/// rejected by the compiler is reported before the error is returned.
pub async fn execute(
    args: ValidateArgs,
    config: &LogweaveConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (manifest, resolver) = super::load_manifest(&args.manifest, config).await?;
    let source = args.manifest.display().to_string();

    match logweave_compiler::assemble(&manifest, &resolver, &config.compiler.router_id) {
        Ok(document) => {
            let report = ValidationReport::valid(source, manifest.flows.len(), &document);
            info!(
                flows = report.flows,
                directives = report.directives,
                "manifest is valid"
            );
            writer.render(&report)
        }
        Err(e) => {
            let report = ValidationReport::invalid(source, manifest.flows.len(), e.to_string());
            writer.render(&report)?;
            Err(e.into())
        }
    }
}

/// Manifest validation report.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub manifest: String,
    pub valid: bool,
    /// Flows declared in the manifest
    pub flows: usize,
    /// Top-level blocks in the compiled document
    pub blocks: usize,
    /// Directive nodes at every depth
    pub directives: usize,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn valid(manifest: String, flows: usize, document: &[Box<dyn Directive>]) -> Self {
        Self {
            manifest,
            valid: true,
            flows,
            blocks: document.len(),
            directives: count_directives(document),
            errors: Vec::new(),
        }
    }

    fn invalid(manifest: String, flows: usize, error: String) -> Self {
        Self {
            manifest,
            valid: false,
            flows,
            blocks: 0,
            directives: 0,
            errors: vec![error],
        }
    }
}

fn count_directives(directives: &[Box<dyn Directive>]) -> usize {
    directives
        .iter()
        .map(|d| 1 + count_directives(d.sections()))
        .sum()
}

impl Render for ValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Manifest validation: {}", self.manifest)?;
        if self.valid {
            writeln!(w, "  Result: VALID")?;
            writeln!(w, "  Flows: {}", self.flows)?;
            writeln!(w, "  Blocks: {}", self.blocks)?;
            writeln!(w, "  Directives: {}", self.directives)?;
        } else {
            writeln!(w, "  Result: INVALID")?;
            for err in &self.errors {
                writeln!(w, "  Error: {err}")?;
            }
        }
        Ok(())
    }
}
