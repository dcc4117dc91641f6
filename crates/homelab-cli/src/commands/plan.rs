//! Implementation of the `homelab plan` command.

use crate::{cli::TargetArgs, config::AppConfig, error::CliResult, output::OutputManager};

use super::host_provisioner;

pub fn execute(target: TargetArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let homelab = config.to_homelab_config(&target)?;
    let plan = host_provisioner(&config, &target)?.plan(&homelab)?;

    if output.is_json() {
        return output.json(&plan);
    }

    output.header(&format!(
        "Installation order (network '{}', root {})",
        plan.network,
        plan.install_root.display()
    ))?;
    for (position, service) in plan.services.iter().enumerate() {
        let kind = if service.is_core { "core" } else { "optional" };
        output.print(&format!(
            "  {}. {:<14} {:<9} {}",
            position + 1,
            service.display_name,
            kind,
            service.access_url
        ))?;
        if !service.dependencies.is_empty() {
            let deps: Vec<String> = service.dependencies.iter().map(ToString::to_string).collect();
            output.print(&format!("       requires: {}", deps.join(", ")))?;
        }
        for file in &service.files {
            output.print(&format!("       writes:   {}", file.display()))?;
        }
    }
    Ok(())
}
