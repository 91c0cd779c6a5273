//! The Ionic project in the working directory, if any.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const PROJECT_FILE: &str = "ionic.config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    dir: PathBuf,
    file: ProjectFile,
}

impl Project {
    pub fn new(dir: impl Into<PathBuf>, file: ProjectFile) -> Self {
        Self {
            dir: dir.into(),
            file,
        }
    }

    /// `Ok(None)` when `dir` holds no project file.
    pub async fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: ProjectFile = serde_json::from_str(&content).map_err(|e| {
            Error::fatal(format!("Could not parse {}: {}", path.display(), e))
        })?;
        Ok(Some(Self::new(dir, file)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn project_type(&self) -> Option<&str> {
        self.file.project_type.as_deref()
    }

    pub fn app_id(&self) -> Result<&str> {
        if self.file.app_id.is_empty() {
            return Err(Error::fatal(format!(
                "Your project file ({}) does not have an app_id.",
                PROJECT_FILE
            )));
        }
        Ok(&self.file.app_id)
    }
}
