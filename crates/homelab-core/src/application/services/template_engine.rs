//! Template Engine - cached loading and rendering of named templates.
//!
//! Raw templates come from a [`TemplateLoader`]; the engine validates them
//! into [`Template`] values once and keeps them for the rest of the run.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{LoadError, TemplateLoader},
    },
    domain::{Template, TemplateContext},
    error::HomelabResult,
};

/// Loads, validates, caches and renders templates.
pub struct TemplateEngine {
    loader: Arc<dyn TemplateLoader>,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl TemplateEngine {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Return the named template, loading and validating it on first use.
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> HomelabResult<Arc<Template>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| ApplicationError::StoreLockError)?;
            if let Some(template) = cache.get(name) {
                return Ok(Arc::clone(template));
            }
        }

        let raw = self.loader.load(name).map_err(|e| {
            let reason = match e {
                LoadError::NotFound => "template not found".to_string(),
                LoadError::InvalidFormat(detail) => format!("invalid format: {detail}"),
            };
            ApplicationError::TemplateLoad {
                name: name.to_string(),
                reason,
            }
        })?;

        let template = Arc::new(self.validate(name, &raw)?);

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        // Another caller may have loaded it meanwhile; keep the first.
        let cached = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&template));
        debug!(placeholders = cached.placeholders().len(), "Template cached");
        Ok(Arc::clone(cached))
    }

    /// Check a raw value and build a template from it.
    pub fn validate(&self, name: &str, raw: &Value) -> HomelabResult<Template> {
        Ok(Template::from_raw(name, raw)?)
    }

    /// Substitute every placeholder of `template` from `context`.
    pub fn render(&self, template: &Template, context: &TemplateContext) -> HomelabResult<String> {
        Ok(template.render(context)?)
    }

    /// Load then render.
    pub fn render_named(&self, name: &str, context: &TemplateContext) -> HomelabResult<String> {
        let template = self.load(name)?;
        self.render(&template, context)
    }

    /// Names currently cached, sorted.
    pub fn cached_templates(&self) -> HomelabResult<Vec<String>> {
        let cache = self
            .cache
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let mut names: Vec<String> = cache.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Names the underlying loader can resolve.
    pub fn available_templates(&self) -> Vec<String> {
        self.loader.available()
    }

    pub fn clear_cache(&self) -> HomelabResult<()> {
        self.cache
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .clear();
        Ok(())
    }
}
