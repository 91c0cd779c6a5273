//! Lazily loaded, explicitly saved `config.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::RwLock;

use super::env::EnvOverrides;
use super::file::ConfigFile;
use super::{ConfigError, ConfigResult};

pub const CONFIG_FILE: &str = "config.json";
const CONFIG_DIRECTORY: &str = ".ionic";

pub struct ConfigStore {
    directory: PathBuf,
    overrides: EnvOverrides,
    data: RwLock<Option<ConfigFile>>,
}

impl ConfigStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            overrides: EnvOverrides::default(),
            data: RwLock::new(None),
        }
    }

    /// `IONIC_DIRECTORY` if set, else `~/.ionic`.
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        let overrides = EnvOverrides::from_env(env);
        let directory = overrides
            .directory
            .clone()
            .unwrap_or_else(default_directory);
        Self {
            directory,
            overrides,
            data: RwLock::new(None),
        }
    }

    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(CONFIG_FILE)
    }

    async fn read(&self) -> ConfigResult<ConfigFile> {
        let path = self.path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(ConfigFile::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            key: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Loads the file on first use and returns a snapshot of it.
    pub async fn load(&self) -> ConfigResult<ConfigFile> {
        if let Some(data) = self.data.read().await.as_ref() {
            return Ok(data.clone());
        }

        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(self.read().await?);
        }
        Ok(data.clone().unwrap_or_default())
    }

    pub async fn update<F, R>(&self, f: F) -> ConfigResult<R>
    where
        F: FnOnce(&mut ConfigFile) -> R,
    {
        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(self.read().await?);
        }
        let file = data.get_or_insert_with(ConfigFile::default);
        Ok(f(file))
    }

    /// Writes the cached file back, if it was ever loaded.
    pub async fn save(&self) -> ConfigResult<()> {
        let mut data = self.data.write().await;
        let Some(file) = data.as_mut() else {
            return Ok(());
        };

        file.last_updated = Utc::now();
        tokio::fs::create_dir_all(&self.directory).await?;
        let content = serde_json::to_string_pretty(file)?;
        tokio::fs::write(self.path(), content).await?;
        Ok(())
    }

    pub async fn api_url(&self) -> ConfigResult<String> {
        if let Some(url) = &self.overrides.api_url {
            return Ok(url.clone());
        }
        Ok(self.load().await?.urls.api)
    }

    /// False in dry mode: disabled in config or by `IONIC_CLI_TELEMETRY`.
    pub async fn telemetry_enabled(&self) -> ConfigResult<bool> {
        if let Some(enabled) = self.overrides.telemetry {
            return Ok(enabled);
        }
        Ok(self.load().await?.cli_flags.enable_telemetry)
    }
}

fn default_directory() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_DIRECTORY))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIRECTORY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let file = store.load().await.unwrap();
        assert!(file.cli_flags.enable_telemetry);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_update_and_save_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));
        store
            .update(|c| c.tokens.user = Some("tok".into()))
            .await
            .unwrap();
        store.save().await.unwrap();

        let reopened = ConfigStore::new(dir.path().join("nested"));
        let file = reopened.load().await.unwrap();
        assert_eq!(file.tokens.user.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_save_without_load_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.save().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();
        let store = ConfigStore::new(dir.path());
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[tokio::test]
    async fn test_env_overrides() {
        let dir = tempdir().unwrap();
        let env: HashMap<String, String> = [
            ("IONIC_DIRECTORY", dir.path().to_str().unwrap()),
            ("IONIC_API_URL", "http://127.0.0.1:9"),
            ("IONIC_CLI_TELEMETRY", "false"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let store = ConfigStore::from_env(&env);
        assert_eq!(store.directory(), dir.path());
        assert_eq!(store.api_url().await.unwrap(), "http://127.0.0.1:9");
        assert!(!store.telemetry_enabled().await.unwrap());
    }
}
