//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "homelab",
    bin_name = "homelab",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Provision a self-hosted homelab on a single host",
    long_about = "homelab renders configuration for a catalog of self-hosted \
                  services, brings each one up with docker compose, and rolls \
                  the whole run back if any step fails.",
    after_help = "EXAMPLES:\n\
        \x20 homelab install --ip 192.168.1.10 --domain home.lan\n\
        \x20 homelab install --ip 192.168.1.10 --domain home.lan -s outline -s postgresql -s redis\n\
        \x20 homelab plan --ip 192.168.1.10 --domain home.lan -s n8n\n\
        \x20 homelab services\n\
        \x20 homelab completions bash > /usr/share/bash-completion/completions/homelab",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the core services plus the selected ones.
    #[command(
        visible_alias = "i",
        about = "Install services",
        after_help = "EXAMPLES:\n\
            \x20 homelab install --ip 10.0.0.5 --domain lab.example\n\
            \x20 homelab install --ip 10.0.0.5 --domain lab.example -s minio\n\
            \x20 homelab install --ip 10.0.0.5 --domain lab.example -s n8n --dry-run"
    )]
    Install(InstallArgs),

    /// Validate a configuration and print the installation order.
    #[command(
        about = "Show what an install would do",
        after_help = "EXAMPLES:\n\
            \x20 homelab plan --ip 10.0.0.5 --domain lab.example -s outline\n\
            \x20 homelab plan --output-format json"
    )]
    Plan(TargetArgs),

    /// List the service catalog.
    #[command(
        visible_alias = "ls",
        about = "List available services",
        after_help = "EXAMPLES:\n\
            \x20 homelab services\n\
            \x20 homelab services --optional\n\
            \x20 homelab services --format json"
    )]
    Services(ServicesArgs),

    /// List templates, or render one service's configuration files.
    #[command(
        about = "List or render templates",
        after_help = "EXAMPLES:\n\
            \x20 homelab templates\n\
            \x20 homelab templates --render caddy --ip 10.0.0.5 --domain lab.example"
    )]
    Templates(TemplatesArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 homelab completions bash > ~/.local/share/bash-completion/completions/homelab\n\
            \x20 homelab completions zsh  > ~/.zfunc/_homelab\n\
            \x20 homelab completions fish > ~/.config/fish/completions/homelab.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the homelab configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 homelab config get homelab.domain\n\
            \x20 homelab config list\n\
            \x20 homelab config path"
    )]
    Config(ConfigCommands),
}

// ── shared target flags ───────────────────────────────────────────────────────

/// What to install and where. Every flag overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Host IP address the services are published on.
    #[arg(long = "ip", value_name = "ADDR", help = "Host IP address")]
    pub ip: Option<String>,

    /// Base domain; services are served from subdomains of it.
    #[arg(long = "domain", value_name = "DOMAIN", help = "Base domain")]
    pub domain: Option<String>,

    /// Container network shared by every service.
    #[arg(long = "network", value_name = "NAME", help = "Container network name")]
    pub network: Option<String>,

    /// Optional services to install, in order. Repeatable or comma-separated.
    #[arg(
        short = 's',
        long = "service",
        value_name = "SERVICE",
        value_delimiter = ',',
        help = "Optional service to install (repeatable)"
    )]
    pub services: Vec<String>,

    /// Root directory for generated configuration files.
    #[arg(
        long = "install-root",
        value_name = "DIR",
        help = "Where service configuration is written"
    )]
    pub install_root: Option<PathBuf>,

    /// Directory of templates that override the built-in ones.
    #[arg(
        long = "templates-dir",
        value_name = "DIR",
        help = "Directory of override templates"
    )]
    pub templates_dir: Option<PathBuf>,

    /// Skip host detection and assume this distribution.
    #[arg(
        long = "distribution",
        value_name = "ID",
        help = "Assume this distribution instead of detecting it"
    )]
    pub distribution: Option<String>,
}

// ── install ───────────────────────────────────────────────────────────────────

/// Arguments for `homelab install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Simulate the run: nothing is written and no command is executed.
    #[arg(
        long = "dry-run",
        help = "Show the plan and the commands that would run"
    )]
    pub dry_run: bool,
}

// ── services ──────────────────────────────────────────────────────────────────

/// Arguments for `homelab services`.
#[derive(Debug, Args)]
pub struct ServicesArgs {
    /// Only list core services.
    #[arg(long = "core", conflicts_with = "optional", help = "Only core services")]
    pub core: bool,

    /// Only list optional services.
    #[arg(long = "optional", help = "Only optional services")]
    pub optional: bool,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── templates ─────────────────────────────────────────────────────────────────

/// Arguments for `homelab templates`.
#[derive(Debug, Args)]
pub struct TemplatesArgs {
    /// Render this service's configuration files to stdout.
    #[arg(long = "render", value_name = "SERVICE", help = "Render a service's files")]
    pub render: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `homelab completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `homelab config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `homelab.domain`.
        key: String,
    },
    /// Print all configuration values. Credentials are masked.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
