use std::path::PathBuf;

use super::PACKAGE_PREFIX;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{}", not_found_message(.name, .known))]
    NotFound { name: String, known: bool },

    #[error("Plugin '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("Invalid plugin name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Failed to read plugin manifest at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PluginError {
    pub fn not_found(name: impl Into<String>, known: bool) -> Self {
        Self::NotFound {
            name: name.into(),
            known,
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The shell command that installs a plugin package.
pub fn install_command(name: &str) -> String {
    format!("npm install {}{}", PACKAGE_PREFIX, name)
}

fn not_found_message(name: &str, known: &bool) -> String {
    if *known {
        format!(
            "This plugin is not currently installed. Please execute the following to install it.\n    {}",
            install_command(name)
        )
    } else {
        format!("Unknown plugin: {}{}.", PACKAGE_PREFIX, name)
    }
}
