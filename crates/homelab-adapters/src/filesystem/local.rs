//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use homelab_core::{
    application::{ApplicationError, ports::ConfigWriter},
    error::{HomelabError, HomelabResult},
};
use tracing::debug;

/// Production config writer backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigWriter for LocalFilesystem {
    fn write_config(&self, path: &Path, content: &str) -> HomelabResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote config file");
        Ok(())
    }

    fn remove_config(&self, path: &Path) -> HomelabResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            // Already gone is what the caller wanted.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(path, e, "remove file")),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> HomelabError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
