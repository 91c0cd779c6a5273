//! Subprocess runner.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOptions {
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl ShellOptions {
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
pub trait Shell: Send + Sync {
    /// Runs `program` to completion and returns its exit status.
    async fn run(&self, program: &str, args: &[String], options: &ShellOptions) -> Result<i32>;
}

/// Runs programs with `tokio::process`, sharing this process's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioShell;

#[async_trait]
impl Shell for TokioShell {
    async fn run(&self, program: &str, args: &[String], options: &ShellOptions) -> Result<i32> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .envs(options.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(program, ?args, "spawning");
        let status = command
            .status()
            .await
            .map_err(|e| Error::fatal(format!("Failed to run '{}': {}", program, e)))?;

        Ok(status.code().unwrap_or(1))
    }
}
