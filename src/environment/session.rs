//! User and app-user tokens backed by the config file.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::Project;
use crate::client::ApiClient;
use crate::config::ConfigStore;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Deserialize)]
struct AppUserToken {
    token: String,
    details: AppUserDetails,
}

#[derive(Debug, Deserialize)]
struct AppUserDetails {
    app_id: String,
}

pub struct Session<'a> {
    config: &'a ConfigStore,
    client: &'a ApiClient,
    project: Option<&'a Project>,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a ConfigStore, client: &'a ApiClient, project: Option<&'a Project>) -> Self {
        Self {
            config,
            client,
            project,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let request = self
            .client
            .make(Method::POST, "/login")
            .json(json!({ "email": email, "password": password }))?;
        let data = self.client.send(&request).await?.into_data(&request)?;
        let login: LoginData = serde_json::from_value(data)
            .map_err(|e| request.fault(200, format!("Unexpected response format: {}", e)))?;

        self.config
            .update(|c| {
                if c.tokens.user.as_deref() != Some(login.token.as_str()) {
                    c.tokens.user = Some(login.token);
                    // A new user token may be a different user.
                    c.tokens.app_user.clear();
                }
            })
            .await?;
        Ok(())
    }

    pub async fn get_user_token(&self) -> Result<String> {
        self.config
            .load()
            .await?
            .tokens
            .user
            .ok_or_else(|| Error::fatal("You are not logged in! Run 'ionic login'."))
    }

    /// Token for `app_id`, or for the current project's app when `None`.
    pub async fn get_app_user_token(&self, app_id: Option<&str>) -> Result<String> {
        let app_id = match app_id {
            Some(id) => id.to_string(),
            None => self
                .project
                .ok_or_else(|| {
                    Error::fatal("Sorry! This command must be run inside an Ionic project directory")
                })?
                .app_id()?
                .to_string(),
        };

        let cached = self.config.load().await?.tokens.app_user.get(&app_id).cloned();
        if let Some(token) = cached {
            return Ok(token);
        }

        let request = self
            .client
            .make(Method::GET, "/auth/tokens")
            .query("type", "app-user")
            .bearer(self.get_user_token().await?);
        let data = self.client.send(&request).await?.into_data(&request)?;
        let tokens: Vec<AppUserToken> = serde_json::from_value(data)
            .map_err(|e| request.fault(200, format!("Unexpected response format: {}", e)))?;

        let token = self
            .config
            .update(|c| {
                for t in tokens {
                    c.tokens.app_user.insert(t.details.app_id, t.token);
                }
                c.tokens.app_user.get(&app_id).cloned()
            })
            .await?;

        token.ok_or_else(|| {
            Error::fatal(format!(
                "A token does not exist for your account on App '{}'.",
                app_id
            ))
        })
    }
}
