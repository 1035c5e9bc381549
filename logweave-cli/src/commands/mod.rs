//! Command handlers -- one module per subcommand

pub mod config;
pub mod render;
pub mod validate;

use std::path::Path;

use tracing::debug;

use logweave_compiler::PipelineManifest;
use logweave_core::config::LogweaveConfig;
use logweave_core::secret::StoreSecretResolver;

use crate::error::CliError;

/// Load a manifest and build the secret resolver for it.
///
/// The resolver follows the `[secret]` settings and is seeded with the
/// manifest's inline `secrets` entries.
pub(crate) async fn load_manifest(
    path: &Path,
    config: &LogweaveConfig,
) -> Result<(PipelineManifest, StoreSecretResolver), CliError> {
    let manifest = PipelineManifest::load(path).await?;
    let mut resolver = StoreSecretResolver::from_config(&config.secret);
    manifest.seed_secrets(&mut resolver);
    debug!(
        path = %path.display(),
        flows = manifest.flows.len(),
        secrets = resolver.len(),
        "manifest ready"
    );
    Ok((manifest, resolver))
}
