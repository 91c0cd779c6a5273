//! Process-wide collaborators for one invocation.
//!
//! An [`Environment`] is built once in [`crate::run`] and passed by reference
//! through resolution and execution. Tests build their own with scripted
//! prompts and recording telemetry.

mod project;
mod session;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

pub use project::{PROJECT_FILE, Project, ProjectFile};
pub use session::Session;
pub use shell::{Shell, ShellOptions, TokioShell};

use crate::client::ApiClient;
use crate::config::ConfigStore;
use crate::logging;
use crate::prompt::{DialoguerPrompter, Prompter};
use crate::telemetry::{NoopTelemetry, Telemetry};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Environment {
    pub config: Arc<ConfigStore>,
    pub client: Arc<ApiClient>,
    pub project: Option<Project>,
    pub shell: Arc<dyn Shell>,
    pub prompter: Arc<dyn Prompter>,
    pub telemetry: Arc<dyn Telemetry>,
    /// Prompts are only shown when set.
    pub interactive: bool,
    pub log_level: String,
    pub version: String,
    pub cwd: PathBuf,
}

impl Environment {
    pub fn new(config: Arc<ConfigStore>, client: Arc<ApiClient>) -> Self {
        Self {
            config,
            client,
            project: None,
            shell: Arc::new(TokioShell),
            prompter: Arc::new(DialoguerPrompter),
            telemetry: Arc::new(NoopTelemetry),
            interactive: false,
            log_level: logging::DEFAULT_LEVEL.to_string(),
            version: VERSION.to_string(),
            cwd: PathBuf::from("."),
        }
    }

    pub fn project(mut self, project: Option<Project>) -> Self {
        self.project = project;
        self
    }

    pub fn shell(mut self, shell: impl Shell + 'static) -> Self {
        self.shell = Arc::new(shell);
        self
    }

    pub fn prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn session(&self) -> Session<'_> {
        Session::new(&self.config, &self.client, self.project.as_ref())
    }

    /// Dry mode is telemetry disabled. An unreadable config counts as dry.
    pub async fn telemetry_enabled(&self) -> bool {
        match self.config.telemetry_enabled().await {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::warn!(error = %e, "could not read telemetry flag");
                false
            }
        }
    }
}
