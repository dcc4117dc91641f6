//! Host distribution detection.

use std::fs;
use std::path::{Path, PathBuf};

use homelab_core::{
    application::{ApplicationError, ports::PlatformProbe},
    domain::{Distribution, DomainError},
    error::HomelabResult,
};
use tracing::debug;

const OS_RELEASE: &str = "/etc/os-release";

/// Reads `ID` (then `ID_LIKE`) from an os-release file. Always reports
/// macOS when built for it.
#[derive(Debug, Clone)]
pub struct OsReleaseProbe {
    path: PathBuf,
}

impl OsReleaseProbe {
    pub fn new() -> Self {
        Self::with_path(OS_RELEASE)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for OsReleaseProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProbe for OsReleaseProbe {
    fn detect(&self) -> HomelabResult<Distribution> {
        if cfg!(target_os = "macos") {
            return Ok(Distribution::MacOs);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| ApplicationError::PlatformDetection {
                reason: format!("cannot read {}: {e}", self.path.display()),
            })?;

        let distribution = parse_os_release(&content)?;
        debug!(distribution = %distribution, path = %self.path.display(), "Detected distribution");
        Ok(distribution)
    }
}

/// Resolve `ID`, falling back to the first supported `ID_LIKE` entry.
fn parse_os_release(content: &str) -> Result<Distribution, DomainError> {
    let field = |key: &str| {
        content.lines().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
        })
    };

    let id = field("ID").unwrap_or_default();
    match id.parse::<Distribution>() {
        Ok(distribution) => Ok(distribution),
        Err(unsupported) => field("ID_LIKE")
            .unwrap_or_default()
            .split_whitespace()
            .find_map(|like| like.parse().ok())
            .ok_or(unsupported),
    }
}

/// Probe with a fixed answer, for tests and `--distribution` overrides.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    answer: Result<Distribution, String>,
}

impl StaticProbe {
    pub fn new(distribution: Distribution) -> Self {
        Self {
            answer: Ok(distribution),
        }
    }

    /// Always report `id` as unsupported.
    pub fn unsupported(id: impl Into<String>) -> Self {
        Self {
            answer: Err(id.into()),
        }
    }
}

impl PlatformProbe for StaticProbe {
    fn detect(&self) -> HomelabResult<Distribution> {
        match &self.answer {
            Ok(distribution) => Ok(*distribution),
            Err(id) => Err(DomainError::UnsupportedDistribution(id.clone()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelab_core::error::ErrorKind;

    #[test]
    fn parses_quoted_id() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nVERSION_ID=\"24.04\"\n";
        assert_eq!(parse_os_release(content).unwrap(), Distribution::Ubuntu);
    }

    #[test]
    fn falls_back_to_id_like() {
        let content = "ID=\"elementary\"\nID_LIKE=\"ubuntu debian\"\n";
        assert_eq!(parse_os_release(content).unwrap(), Distribution::Ubuntu);
    }

    #[test]
    fn unknown_distribution_names_the_id() {
        let err = parse_os_release("ID=gentoo\n").unwrap_err();
        assert_eq!(err, DomainError::UnsupportedDistribution("gentoo".into()));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn reads_from_configured_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "ID=fedora\n").unwrap();

        let probe = OsReleaseProbe::with_path(temp.path());
        assert_eq!(probe.detect().unwrap(), Distribution::Fedora);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn missing_file_is_a_detection_failure() {
        let err = OsReleaseProbe::with_path("/no/such/os-release")
            .detect()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DistributionNotSupported);
    }

    #[test]
    fn static_probe_answers_fixed_values() {
        assert_eq!(
            StaticProbe::new(Distribution::Arch).detect().unwrap(),
            Distribution::Arch
        );
        assert_eq!(
            StaticProbe::unsupported("plan9").detect().unwrap_err().kind(),
            ErrorKind::DistributionNotSupported
        );
    }
}
