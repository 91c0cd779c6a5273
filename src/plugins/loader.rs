use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::PluginError;
use super::source::{DirectorySource, PluginSource};
use crate::registry::Namespace;
use crate::registry::address::NAMESPACE_SEP;

/// Plugins that exist but may not be installed.
pub const KNOWN_PLUGINS: &[&str] = &["cloud", "cordova"];

/// Finds plugin namespaces across its sources and loads each one at most once.
pub struct PluginLoader {
    sources: Vec<Arc<dyn PluginSource>>,
    cache: Mutex<HashMap<String, Arc<dyn Namespace>>>,
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLoader {
    /// A loader with no sources; every plugin is reported as not found.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Project-local `node_modules` first, then the global plugins directory.
    pub fn for_directories(cwd: &Path, config_dir: &Path) -> Self {
        Self::new()
            .with_source(DirectorySource::new(cwd.join("node_modules")))
            .with_source(DirectorySource::new(config_dir.join("plugins")))
    }

    pub fn with_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Whether `name` is a plugin this CLI knows how to install.
    pub fn has(&self, name: &str) -> bool {
        KNOWN_PLUGINS.contains(&name)
    }

    pub fn validate_name(name: &str) -> Result<(), PluginError> {
        let reason = if name.is_empty() {
            "name is empty"
        } else if name.contains(NAMESPACE_SEP) {
            "contains namespace separator"
        } else if name.chars().any(char::is_whitespace) {
            "contains whitespace"
        } else {
            return Ok(());
        };
        Err(PluginError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Loads the namespace exported by plugin `name`.
    ///
    /// Successful loads are cached for the life of the loader; failures are
    /// not, and nothing is cached for a plugin that fails validation.
    pub async fn load(&self, name: &str) -> Result<Arc<dyn Namespace>, PluginError> {
        Self::validate_name(name)?;

        let mut cache = self.cache.lock().await;
        if let Some(namespace) = cache.get(name) {
            return Ok(Arc::clone(namespace));
        }

        for source in &self.sources {
            if let Some(namespace) = source.locate(name).await? {
                tracing::debug!(plugin = name, source = source.name(), "plugin loaded");
                cache.insert(name.to_string(), Arc::clone(&namespace));
                return Ok(namespace);
            }
        }

        Err(PluginError::not_found(name, self.has(name)))
    }

    /// `Ok(false)` only when no source has the plugin; invalid plugins are errors.
    pub async fn is_installed(&self, name: &str) -> Result<bool, PluginError> {
        match self.load(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
