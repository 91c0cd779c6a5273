//! # ionic-cli
//!
//! Command routing, plugin resolution and lifecycle execution for the
//! `ionic` command-line tool.
//!
//! An invocation flows through four stages:
//!
//! 1. [`command::argv::UntypedArgs`] splits argv without knowing any option types.
//! 2. [`registry::ArgvResolver`] walks the [`registry::CommandTree`], loading
//!    plugin namespaces through [`plugins::PluginLoader`] for `plugin:command` tokens.
//! 3. The resolved command's options drive a typed re-parse.
//! 4. [`lifecycle::Executor`] runs the hooks, input collection, validation,
//!    `run` and telemetry, and maps the outcome to an exit code.
//!
//! ## Embedding
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let args: Vec<String> = std::env::args().skip(1).collect();
//!     let code = ionic_cli::run(args, std::env::vars().collect()).await;
//!     std::process::ExitCode::from(code)
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod cli;

pub mod client;
pub mod command;
pub mod commands;
pub mod config;
pub mod environment;
pub mod lifecycle;
pub mod logging;
pub mod plugins;
pub mod prompt;
pub mod registry;
pub mod telemetry;

pub use cli::{run, run_with};
pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use command::{
    Command, CommandContext, CommandMetadata, InputSpec, OptionSpec, OptionType, OptionValue,
    ParsedOptions, ParserConfig, PromptSpec, ValidationErrors, Validator,
};
pub use commands::IonicNamespace;
pub use config::{ConfigError, ConfigFile, ConfigStore};
pub use environment::{Environment, Project, Shell, TokioShell};
pub use lifecycle::{ExecutionResult, Executor, Phase};
pub use plugins::{PluginError, PluginLoader, PluginSource};
pub use prompt::{Prompter, Question};
pub use registry::{ArgvResolver, CommandTree, Namespace, RegistryError, Resolution};
pub use telemetry::{HttpTelemetry, NoopTelemetry, Telemetry, TelemetryEvent};

/// Error type for ionic-cli operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Deliberate abort. The message is shown verbatim.
    #[error("{message}")]
    Fatal { message: String, code: u8 },

    /// One or more inputs failed validation.
    #[error("{0}")]
    Validation(command::ValidationErrors),

    #[error(transparent)]
    Plugin(#[from] plugins::PluginError),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Argv does not match the command's declared options.
    #[error("{0}")]
    Usage(String),

    /// The API answered with an error envelope or an unexpected body.
    #[error("{method} {url} ({status}): {message}")]
    Api {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No command matched and no default command is registered.
    #[error("No command found and no default command is registered")]
    MissingDefaultCommand,

    /// An interactive prompt could not be shown or answered.
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

/// Error category for logging and top-level formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Argv, inputs or an explicit abort
    Usage,
    /// Config file or project file problems
    Configuration,
    /// Plugin lookup or plugin package problems
    Plugin,
    /// API responses and network failures
    Transport,
    /// IO, JSON, prompts and tree invariants
    Internal,
}

impl Error {
    /// Fatal abort with exit code 1.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::exit(message, 1)
    }

    pub fn exit(message: impl Into<String>, code: u8) -> Self {
        Error::Fatal {
            message: message.into(),
            code,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Fatal { code, .. } => *code,
            _ => 1,
        }
    }

    /// True for faults that carry an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Fatal { .. } | Error::Validation(_) | Error::Usage(_) => ErrorCategory::Usage,
            Error::Config(_) | Error::MissingDefaultCommand => ErrorCategory::Configuration,
            Error::Plugin(_) => ErrorCategory::Plugin,
            Error::Api { .. } | Error::Network(_) => ErrorCategory::Transport,
            Error::Registry(_) | Error::Json(_) | Error::Io(_) | Error::Prompt(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Renders a fault for the terminal.
pub fn format_fault(err: &Error) -> String {
    match err {
        Error::Api { .. } => err.to_string(),
        Error::Fatal { message, .. } => message.clone(),
        Error::Validation(errors) => errors.to_string(),
        other => format!("Error: {}", other),
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
