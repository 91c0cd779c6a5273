//! On-disk shape of `config.json`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.ionic.io";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub urls: Urls,
    #[serde(default)]
    pub tokens: Tokens,
    #[serde(default)]
    pub cli_flags: CliFlags,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            urls: Urls::default(),
            tokens: Tokens::default(),
            cli_flags: CliFlags::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Urls {
    #[serde(default = "default_api_url")]
    pub api: String,
}

impl Default for Urls {
    fn default() -> Self {
        Self {
            api: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// App id to app-user token.
    #[serde(default)]
    pub app_user: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliFlags {
    #[serde(default = "default_true")]
    pub enable_telemetry: bool,
    #[serde(default)]
    pub prompted_for_telemetry: bool,
}

impl Default for CliFlags {
    fn default() -> Self {
        Self {
            enable_telemetry: true,
            prompted_for_telemetry: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let file: ConfigFile =
            serde_json::from_str(r#"{"lastUpdated":"2017-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(file.urls.api, DEFAULT_API_URL);
        assert!(file.tokens.user.is_none());
        assert!(file.cli_flags.enable_telemetry);
    }

    #[test]
    fn test_camel_case_keys() {
        let mut file = ConfigFile::default();
        file.tokens.app_user.insert("abc123".into(), "tok".into());
        file.cli_flags.enable_telemetry = false;

        let value = serde_json::to_value(&file).unwrap();
        assert!(value.get("lastUpdated").is_some());
        assert_eq!(value["tokens"]["appUser"]["abc123"], "tok");
        assert_eq!(value["cliFlags"]["enableTelemetry"], false);
    }
}
