//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod install;
pub mod plan;
pub mod services;
pub mod templates;

use std::sync::Arc;

use homelab_adapters::{
    BuiltinTemplateLoader, FilesystemTemplateLoader, LayeredTemplateLoader, LocalFilesystem,
    OsReleaseProbe, ProcessRunner, StaticProbe,
};
use homelab_core::prelude::*;
use tracing::debug;

use crate::cli::TargetArgs;
use crate::config::AppConfig;
use crate::error::CliResult;

/// User templates first, built-ins underneath.
fn template_loader(config: &AppConfig, target: &TargetArgs) -> Arc<dyn TemplateLoader> {
    let mut layered = LayeredTemplateLoader::new();
    if let Some(dir) = config.templates_dir(target) {
        debug!(dir = %dir.display(), "Using override templates");
        layered = layered.with_layer(Arc::new(FilesystemTemplateLoader::new(dir)));
    }
    Arc::new(layered.with_layer(Arc::new(BuiltinTemplateLoader::new())))
}

/// `--distribution` pins the answer; otherwise the host is inspected.
fn platform_probe(target: &TargetArgs) -> CliResult<Arc<dyn PlatformProbe>> {
    Ok(match &target.distribution {
        Some(id) => {
            let distribution: Distribution = id.parse().map_err(HomelabError::from)?;
            Arc::new(StaticProbe::new(distribution))
        }
        None => Arc::new(OsReleaseProbe::new()),
    })
}

/// Provisioner wired to the real host.
fn host_provisioner(config: &AppConfig, target: &TargetArgs) -> CliResult<Provisioner> {
    Ok(Provisioner::new(
        Arc::new(ProcessRunner::new()),
        template_loader(config, target),
        Arc::new(LocalFilesystem::new()),
        platform_probe(target)?,
    ))
}
