//! Implementation of the `homelab templates` command.

use serde_json::json;

use homelab_core::prelude::*;

use super::host_provisioner;
use crate::{cli::TemplatesArgs, config::AppConfig, error::CliResult, output::OutputManager};

pub fn execute(args: TemplatesArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let provisioner = host_provisioner(&config, &args.target)?;

    let Some(service) = args.render else {
        let names = provisioner.engine().available_templates();
        if output.is_json() {
            return output.json(&names);
        }
        output.header("Available Templates:")?;
        for name in names {
            output.print(&format!("  {name}"))?;
        }
        return Ok(());
    };

    let service_type: ServiceType = service.parse().map_err(HomelabError::from)?;
    let homelab = config.to_homelab_config(&args.target)?;
    let files = provisioner.preview(&homelab, service_type)?;

    if output.is_json() {
        let rendered: Vec<_> = files
            .iter()
            .map(|(path, content)| json!({ "path": path, "content": content }))
            .collect();
        return output.json(&rendered);
    }

    for (path, content) in files {
        output.header(&format!("# {}", path.display()))?;
        output.print(content.trim_end())?;
        output.print("")?;
    }
    Ok(())
}
