//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns it; the core crate only ever sees the [`HomelabConfig`]
//! built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (merged in [`AppConfig::to_homelab_config`])
//! 2. `HOMELAB_*` environment variables, `__` between sections, e.g.
//!    `HOMELAB_CREDENTIALS__POSTGRES_PASSWORD`
//! 3. Config file (`--config`, or [`AppConfig::config_path`] when present)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use homelab_core::{
    domain::{
        Credentials,
        config::{DEFAULT_INSTALL_ROOT, DEFAULT_NETWORK},
    },
    prelude::*,
};

use crate::cli::TargetArgs;
use crate::error::CliResult;

const ENV_PREFIX: &str = "HOMELAB";
const MASK: &str = "********";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What to install and where.
    pub homelab: HomelabSection,
    /// Secrets required by some optional services.
    pub credentials: Credentials,
    /// Template settings.
    pub templates: TemplateConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomelabSection {
    pub ip: Option<String>,
    pub domain: Option<String>,
    pub network: String,
    pub services: Vec<String>,
    pub install_root: PathBuf,
}

impl Default for HomelabSection {
    fn default() -> Self {
        Self {
            ip: None,
            domain: None,
            network: DEFAULT_NETWORK.into(),
            services: Vec::new(),
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory whose templates override the built-in ones.
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        Self::load_with_env(path, required, Self::environment())
    }

    /// `HOMELAB_*` variables, read as strings. Only `homelab.services` is
    /// split into a list.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("homelab.services")
    }

    fn load_with_env(path: &Path, required: bool, env: Environment) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.homelab.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "homelab", "homelab")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".homelab.toml"))
    }

    /// Build the per-run configuration, letting `target` flags win.
    pub fn to_homelab_config(&self, target: &TargetArgs) -> CliResult<HomelabConfig> {
        let names = if target.services.is_empty() {
            &self.homelab.services
        } else {
            &target.services
        };
        let services = names
            .iter()
            .map(|name| name.parse::<ServiceType>().map_err(HomelabError::from))
            .collect::<Result<Vec<_>, _>>()?;

        let ip = target.ip.clone().or_else(|| self.homelab.ip.clone());
        let domain = target.domain.clone().or_else(|| self.homelab.domain.clone());

        Ok(HomelabConfig::builder()
            .ip(ip.unwrap_or_default())
            .domain(domain.unwrap_or_default())
            .network(target.network.as_ref().unwrap_or(&self.homelab.network))
            .services(services)
            .credentials(self.credentials.clone())
            .install_root(
                target
                    .install_root
                    .clone()
                    .unwrap_or_else(|| self.homelab.install_root.clone()),
            )
            .build())
    }

    /// Override template directory: the flag, then the config file.
    pub fn templates_dir<'a>(&'a self, target: &'a TargetArgs) -> Option<&'a Path> {
        target
            .templates_dir
            .as_deref()
            .or(self.templates.local_path.as_deref())
    }

    /// Copy with every supplied credential replaced by a mask.
    pub fn masked(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| MASK.to_string());
        let mut masked = self.clone();
        masked.credentials = Credentials {
            postgres_password: mask(&self.credentials.postgres_password),
            minio_root_password: mask(&self.credentials.minio_root_password),
        };
        masked
    }
}
