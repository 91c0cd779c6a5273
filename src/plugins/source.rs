use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::manifest::PluginManifest;
use super::namespace::PluginNamespace;
use super::{PACKAGE_PREFIX, PluginError};
use crate::registry::Namespace;

/// Somewhere plugin packages can be found.
///
/// `Ok(None)` means the plugin is not installed in this source. A package
/// that exists but cannot serve as a namespace is [`PluginError::Invalid`].
#[async_trait]
pub trait PluginSource: Send + Sync {
    fn name(&self) -> &str;

    async fn locate(&self, plugin: &str) -> Result<Option<Arc<dyn Namespace>>, PluginError>;
}

/// Plugin packages installed as `<dir>/@ionic/cli-plugin-<name>/plugin.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn package_dir(&self, plugin: &str) -> PathBuf {
        self.dir.join(format!("{}{}", PACKAGE_PREFIX, plugin))
    }
}

#[async_trait]
impl PluginSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn locate(&self, plugin: &str) -> Result<Option<Arc<dyn Namespace>>, PluginError> {
        let package_dir = self.package_dir(plugin);
        if !tokio::fs::try_exists(&package_dir).await.unwrap_or(false) {
            return Ok(None);
        }

        let Some(manifest) = PluginManifest::load(&package_dir, plugin).await? else {
            return Err(PluginError::invalid(
                plugin,
                format!("{} has no plugin.json", package_dir.display()),
            ));
        };

        tracing::debug!(
            plugin,
            version = %manifest.version,
            dir = %package_dir.display(),
            "found plugin package"
        );
        let namespace: Arc<dyn Namespace> = Arc::new(
            PluginNamespace::from_manifest(manifest, package_dir)
                .ok_or_else(|| PluginError::invalid(plugin, "root is not a namespace"))?,
        );
        Ok(Some(namespace))
    }
}

type NamespaceFactory =
    Box<dyn Fn() -> Result<Arc<dyn Namespace>, PluginError> + Send + Sync>;

/// In-process plugins, for embedding and tests.
#[derive(Default)]
pub struct StaticSource {
    factories: HashMap<String, NamespaceFactory>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<N, F>(self, plugin: impl Into<String>, factory: F) -> Self
    where
        N: Namespace + 'static,
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.with_factory(plugin, move || Ok(Arc::new(factory()) as Arc<dyn Namespace>))
    }

    pub fn with_factory<F>(mut self, plugin: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Namespace>, PluginError> + Send + Sync + 'static,
    {
        self.factories.insert(plugin.into(), Box::new(factory));
        self
    }
}

#[async_trait]
impl PluginSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn locate(&self, plugin: &str) -> Result<Option<Arc<dyn Namespace>>, PluginError> {
        match self.factories.get(plugin) {
            Some(factory) => factory().map(Some),
            None => Ok(None),
        }
    }
}
