//! Filesystem-based template loading and loader layering.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── caddy/
//! │   ├── docker-compose.toml   ← "caddy/docker-compose"
//! │   └── Caddyfile.json        ← "caddy/Caddyfile"
//! └── n8n/
//!     └── config.json           ← "n8n/config"
//! ```
//!
//! A template named `a/b` is read from `<dir>/a/b.json`, or `<dir>/a/b.toml`
//! when no JSON file exists. Both hold the same raw shape:
//!
//! ```toml
//! content = """
//! services:
//!   redis:
//!     image: {{image}}
//! """
//!
//! [variables]
//! image = "string"
//! ```
//!
//! [`LayeredTemplateLoader`] stacks loaders so user templates can override
//! the built-in ones by name.

use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use serde_json::Value;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use homelab_core::application::ports::{LoadError, TemplateLoader};

const EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Loads raw templates from `.json` / `.toml` files under a directory.
#[derive(Debug, Clone)]
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    /// Create a loader pointed at `templates_dir`.
    ///
    /// The directory does not need to exist; a missing directory simply has
    /// no templates.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    fn candidate(&self, name: &str, extension: &str) -> PathBuf {
        self.templates_dir.join(format!("{name}.{extension}"))
    }
}

impl TemplateLoader for FilesystemTemplateLoader {
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    fn load(&self, name: &str) -> Result<Value, LoadError> {
        if !is_safe_name(name) {
            return Err(LoadError::InvalidFormat(format!(
                "'{name}' is not a valid template name"
            )));
        }

        for extension in EXTENSIONS {
            let path = self.candidate(name, extension);
            if !path.is_file() {
                continue;
            }

            let raw = fs::read_to_string(&path).map_err(|e| {
                LoadError::InvalidFormat(format!("failed to read '{}': {e}", path.display()))
            })?;
            let parsed = match extension {
                "json" => serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()),
                _ => toml::from_str::<Value>(&raw).map_err(|e| e.to_string()),
            };

            debug!(path = %path.display(), "Loaded template file");
            return parsed.map_err(|e| {
                LoadError::InvalidFormat(format!("failed to parse '{}': {e}", path.display()))
            });
        }

        Err(LoadError::NotFound)
    }

    fn available(&self) -> Vec<String> {
        if !self.templates_dir.is_dir() {
            return Vec::new();
        }

        let mut names: Vec<String> = WalkDir::new(&self.templates_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable template entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| template_name(&self.templates_dir, entry.path()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Logical name of a template file relative to `root`, if it is one.
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&extension) {
        return None;
    }
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Names are relative paths made of plain components.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Tries each loader in order. `NotFound` falls through to the next layer;
/// any other error stops the search.
#[derive(Clone, Default)]
pub struct LayeredTemplateLoader {
    layers: Vec<Arc<dyn TemplateLoader>>,
}

impl LayeredTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones.
    pub fn with_layer(mut self, loader: Arc<dyn TemplateLoader>) -> Self {
        self.layers.push(loader);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl TemplateLoader for LayeredTemplateLoader {
    fn load(&self, name: &str) -> Result<Value, LoadError> {
        for layer in &self.layers {
            match layer.load(name) {
                Err(LoadError::NotFound) => continue,
                other => return other,
            }
        }
        Err(LoadError::NotFound)
    }

    fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.layers.iter().flat_map(|l| l.available()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_templates::BuiltinTemplateLoader;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_json_before_toml() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "redis/docker-compose.json", r#"{"content": "json"}"#);
        write(temp.path(), "redis/docker-compose.toml", r#"content = "toml""#);

        let raw = FilesystemTemplateLoader::new(temp.path())
            .load("redis/docker-compose")
            .unwrap();

        assert_eq!(raw["content"], "json");
    }

    #[test]
    fn loads_toml_with_variables() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "minio/docker-compose.toml",
            "content = \"image: {{image}}\"\n\n[variables]\nimage = \"string\"\n",
        );

        let raw = FilesystemTemplateLoader::new(temp.path())
            .load("minio/docker-compose")
            .unwrap();

        assert_eq!(raw["variables"]["image"], "string");
    }

    #[test]
    fn distinguishes_missing_from_malformed() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "broken.json", "{ not json");
        let loader = FilesystemTemplateLoader::new(temp.path());

        assert_eq!(loader.load("absent"), Err(LoadError::NotFound));
        assert!(matches!(
            loader.load("broken"),
            Err(LoadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let loader = FilesystemTemplateLoader::new(temp.path().join("templates"));

        assert!(matches!(
            loader.load("../secrets"),
            Err(LoadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn available_lists_nested_names() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "caddy/Caddyfile.json", "{}");
        write(temp.path(), "n8n/config.toml", "");
        write(temp.path(), "README.md", "ignored");

        let names = FilesystemTemplateLoader::new(temp.path()).available();

        assert_eq!(names, vec!["caddy/Caddyfile", "n8n/config"]);
    }

    #[test]
    fn missing_directory_has_no_templates() {
        let loader = FilesystemTemplateLoader::new("/does/not/exist/templates");
        assert!(loader.available().is_empty());
        assert_eq!(loader.load("x"), Err(LoadError::NotFound));
    }

    #[test]
    fn layered_loader_prefers_earlier_layers() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "redis/docker-compose.json",
            r#"{"content": "custom"}"#,
        );

        let loader = LayeredTemplateLoader::new()
            .with_layer(Arc::new(FilesystemTemplateLoader::new(temp.path())))
            .with_layer(Arc::new(BuiltinTemplateLoader::new()));

        assert_eq!(loader.load("redis/docker-compose").unwrap()["content"], "custom");
        assert!(loader.load("caddy/Caddyfile").is_ok());
        assert_eq!(loader.load("nope"), Err(LoadError::NotFound));
        assert!(loader.available().contains(&"caddy/Caddyfile".to_string()));
    }
}
