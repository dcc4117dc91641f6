//! Implementation of the `homelab services` command.

use serde::Serialize;

use homelab_core::domain::{SERVICE_CATALOG, ServiceDef};

use crate::{
    cli::{ListFormat, ServicesArgs},
    error::CliResult,
    output::OutputManager,
};

/// One catalog entry as printed.
#[derive(Debug, Serialize)]
struct ServiceRow {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    core: bool,
    port: u16,
    dependencies: Vec<String>,
    credentials: Vec<String>,
}

impl From<&ServiceDef> for ServiceRow {
    fn from(def: &ServiceDef) -> Self {
        Self {
            name: def.name(),
            display_name: def.display_name,
            description: def.description,
            core: def.is_core,
            port: def.port,
            dependencies: def.dependencies.iter().map(ToString::to_string).collect(),
            credentials: def.credentials.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn execute(args: ServicesArgs, output: OutputManager) -> CliResult<()> {
    let rows = select(&args);

    if args.format == ListFormat::Json || output.is_json() {
        return output.json(&rows);
    }

    match args.format {
        ListFormat::List => {
            for row in &rows {
                output.print(row.name)?;
            }
        }
        _ => {
            output.header("Available Services:")?;
            for row in &rows {
                let kind = if row.core { "core" } else { "optional" };
                output.print(&format!(
                    "  {:<12} {:<9} :{:<5} {}",
                    row.name, kind, row.port, row.description
                ))?;
                if !row.dependencies.is_empty() {
                    output.print(&format!("{:>16}requires: {}", "", row.dependencies.join(", ")))?;
                }
                if !row.credentials.is_empty() {
                    output.print(&format!("{:>16}needs:    {}", "", row.credentials.join(", ")))?;
                }
            }
        }
    }
    Ok(())
}

fn select(args: &ServicesArgs) -> Vec<ServiceRow> {
    SERVICE_CATALOG
        .iter()
        .filter(|def| !args.core || def.is_core)
        .filter(|def| !args.optional || !def.is_core)
        .map(ServiceRow::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(core: bool, optional: bool) -> ServicesArgs {
        ServicesArgs {
            core,
            optional,
            format: ListFormat::Table,
        }
    }

    #[test]
    fn lists_whole_catalog_by_default() {
        assert_eq!(select(&args(false, false)).len(), SERVICE_CATALOG.len());
    }

    #[test]
    fn core_filter_keeps_proxy_dashboard_and_files() {
        let names: Vec<_> = select(&args(true, false)).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["caddy", "portainer", "copyparty"]);
    }

    #[test]
    fn outline_row_lists_dependencies_and_credentials() {
        let rows = select(&args(false, true));
        let outline = rows.iter().find(|r| r.name == "outline").unwrap();

        assert!(!outline.core);
        assert_eq!(outline.dependencies, vec!["postgresql", "redis"]);
        assert_eq!(outline.credentials, vec!["postgres_password"]);
    }
}
