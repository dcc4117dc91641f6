//! Implementation of the `homelab install` command.

use std::sync::Arc;

use homelab_adapters::{MemoryFilesystem, RecordingRunner};
use homelab_core::application::{InstallSummary, RollbackReport};
use homelab_core::prelude::*;
use serde_json::json;
use tracing::{info, warn};

use super::{host_provisioner, platform_probe, template_loader};
use crate::{
    cli::InstallArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    signal,
};

pub fn execute(args: InstallArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let homelab = config.to_homelab_config(&args.target)?;

    if args.dry_run {
        return dry_run(&args, &config, &homelab, &output);
    }

    let provisioner = host_provisioner(&config, &args.target)?;
    let plan = provisioner.plan(&homelab)?;

    if !output.is_json() {
        output.header(&format!(
            "Installing {} services for {}",
            plan.services.len(),
            homelab.domain()
        ))?;
        for service in &plan.services {
            output.info(&format!("{} -> {}", service.display_name, service.access_url))?;
        }
    }

    let cancellation = CancellationFlag::new();
    if let Err(e) = signal::spawn_cancel_listener(cancellation.clone()) {
        warn!(error = %e, "Continuing without interrupt handling");
    }
    let mut ctx = RunContext::with_cancellation(cancellation);

    match provisioner.run(&homelab, &mut ctx)? {
        RunOutcome::Completed(summary) => report_success(&summary, &output),
        RunOutcome::Cancelled {
            rolled_back,
            rollback,
        } => {
            if !rolled_back.is_empty() {
                let names: Vec<String> = rolled_back.iter().map(ToString::to_string).collect();
                output.warning(&format!("Rolled back: {}", names.join(", ")))?;
            }
            if let Some(report) = rollback {
                report_rollback(&report, &output)?;
            }
            Err(CliError::Cancelled)
        }
    }
}

fn report_success(summary: &InstallSummary, output: &OutputManager) -> CliResult<()> {
    info!(
        installed = summary.installed.len(),
        duration_ms = summary.duration().num_milliseconds(),
        "Install finished"
    );

    if output.is_json() {
        return output.json(summary);
    }

    for service in &summary.installed {
        output.success(&format!(
            "{:<12} {}",
            service.service_type.as_str(),
            service.access_url
        ))?;
    }
    output.print(&format!(
        "\nInstalled {} services on {} in {}s (finished {})",
        summary.installed.len(),
        summary.distribution,
        summary.duration().num_seconds(),
        summary
            .finished_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    ))?;
    Ok(())
}

fn report_rollback(report: &RollbackReport, output: &OutputManager) -> CliResult<()> {
    for description in &report.succeeded {
        output.info(&format!("Undone: {description}"))?;
    }
    for (description, reason) in &report.failed {
        output.error(&format!("Could not undo '{description}': {reason}"))?;
    }
    Ok(())
}

/// Full run over a recording runner and an in-memory filesystem.
fn dry_run(
    args: &InstallArgs,
    config: &AppConfig,
    homelab: &HomelabConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let runner = RecordingRunner::dry_run();
    let fs = MemoryFilesystem::new();
    let provisioner = Provisioner::new(
        Arc::new(runner.clone()),
        template_loader(config, &args.target),
        Arc::new(fs.clone()),
        platform_probe(&args.target)?,
    );

    let plan = provisioner.plan(homelab)?;
    provisioner.run(homelab, &mut RunContext::new())?;
    let files = fs.list_files();
    let commands = runner.commands();

    if output.is_json() {
        return output.json(&json!({
            "plan": plan,
            "files": files,
            "commands": commands,
        }));
    }

    output.header("Dry run: nothing is written and no command is executed")?;
    for (position, service) in plan.services.iter().enumerate() {
        output.print(&format!(
            "  {}. {} ({})",
            position + 1,
            service.display_name,
            service.access_url
        ))?;
    }
    output.header("\nFiles that would be written:")?;
    for file in &files {
        output.print(&format!("  {}", file.display()))?;
    }
    output.header("\nCommands that would run:")?;
    for command in &commands {
        output.print(&format!("  {command}"))?;
    }
    Ok(())
}
