//! Domain value objects: ServiceType, Credential, Distribution.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO per-service behaviour. Everything a service does lives in
//! `catalog.rs`. This file's only job is to define the types, their
//! string representations, and their `FromStr` parsers.
//!
//! # Adding New Services
//!
//! 1. Add the `ServiceType` variant here
//! 2. Add the `as_str` arm, the `FromStr` arm and the `ALL` entry here
//! 3. Add a `ServiceDef` entry in `catalog.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ServiceType ──────────────────────────────────────────────────────────────

/// An installable product.
///
/// Unique across the system; the sole key for caching and dependency
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Caddy,
    Portainer,
    Copyparty,
    N8n,
    Postgresql,
    Redis,
    Minio,
    Outline,
    UptimeKuma,
}

impl ServiceType {
    /// Every known service type, in catalog order.
    pub const ALL: [ServiceType; 9] = [
        Self::Caddy,
        Self::Portainer,
        Self::Copyparty,
        Self::N8n,
        Self::Postgresql,
        Self::Redis,
        Self::Minio,
        Self::Outline,
        Self::UptimeKuma,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Caddy => "caddy",
            Self::Portainer => "portainer",
            Self::Copyparty => "copyparty",
            Self::N8n => "n8n",
            Self::Postgresql => "postgresql",
            Self::Redis => "redis",
            Self::Minio => "minio",
            Self::Outline => "outline",
            Self::UptimeKuma => "uptime-kuma",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caddy" => Ok(Self::Caddy),
            "portainer" => Ok(Self::Portainer),
            "copyparty" => Ok(Self::Copyparty),
            "n8n" => Ok(Self::N8n),
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            "redis" => Ok(Self::Redis),
            "minio" => Ok(Self::Minio),
            "outline" => Ok(Self::Outline),
            "uptime-kuma" | "uptime_kuma" | "uptimekuma" => Ok(Self::UptimeKuma),
            other => Err(DomainError::UnknownService(other.to_string())),
        }
    }
}

// ── Credential ───────────────────────────────────────────────────────────────

/// A secret the operator must supply before a service can be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    PostgresPassword,
    MinioRootPassword,
}

impl Credential {
    /// Field name, shared by the config file and the template context.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostgresPassword => "postgres_password",
            Self::MinioRootPassword => "minio_root_password",
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Distribution ─────────────────────────────────────────────────────────────

/// Host operating system the provisioner knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Ubuntu,
    Debian,
    Fedora,
    Arch,
    MacOs,
}

impl Distribution {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ubuntu => "ubuntu",
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::Arch => "arch",
            Self::MacOs => "macos",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = DomainError;

    /// Parses an os-release `ID` (quotes tolerated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_matches('"').to_ascii_lowercase();
        match id.as_str() {
            "ubuntu" | "pop" | "linuxmint" => Ok(Self::Ubuntu),
            "debian" | "raspbian" => Ok(Self::Debian),
            "fedora" => Ok(Self::Fedora),
            "arch" | "manjaro" | "endeavouros" => Ok(Self::Arch),
            "macos" | "darwin" => Ok(Self::MacOs),
            _ => Err(DomainError::UnsupportedDistribution(id)),
        }
    }
}
