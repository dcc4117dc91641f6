//! `homelab config`: inspect configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&format!("{key} = {value:?}"))?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config.masked()).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            let path = global.config.unwrap_or_else(AppConfig::config_path);
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let masked = config.masked();
    let homelab = &config.homelab;
    let display = |path: &Option<std::path::PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    match key {
        "homelab.ip" => Ok(homelab.ip.clone().unwrap_or_default()),
        "homelab.domain" => Ok(homelab.domain.clone().unwrap_or_default()),
        "homelab.network" => Ok(homelab.network.clone()),
        "homelab.services" => Ok(homelab.services.join(",")),
        "homelab.install_root" => Ok(homelab.install_root.display().to_string()),
        "credentials.postgres_password" => {
            Ok(masked.credentials.postgres_password.unwrap_or_default())
        }
        "credentials.minio_root_password" => {
            Ok(masked.credentials.minio_root_password.unwrap_or_default())
        }
        "templates.local_path" => Ok(display(&config.templates.local_path)),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.clone()),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
