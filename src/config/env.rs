//! Read-only overrides taken from `IONIC_*` environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

pub const ENV_DIRECTORY: &str = "IONIC_DIRECTORY";
pub const ENV_API_URL: &str = "IONIC_API_URL";
pub const ENV_TELEMETRY: &str = "IONIC_CLI_TELEMETRY";

/// Environment variables are captured once per invocation and never written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub directory: Option<PathBuf>,
    pub api_url: Option<String>,
    pub telemetry: Option<bool>,
}

impl EnvOverrides {
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        let non_empty = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

        Self {
            directory: non_empty(ENV_DIRECTORY).map(PathBuf::from),
            api_url: non_empty(ENV_API_URL),
            telemetry: non_empty(ENV_TELEMETRY).and_then(|v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "0" | "false" | "off" | "no" => Some(false),
        "1" | "true" | "on" | "yes" => Some(true),
        other => {
            tracing::warn!(value = other, "ignoring unrecognized {}", ENV_TELEMETRY);
            None
        }
    }
}
