//! Command usage reporting.
//!
//! Each invocation reports its qualified command name and the arguments it
//! was given, minus anything declared private.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

use crate::Result;
use crate::client::ApiClient;
use crate::command::{CommandMetadata, ParsedOptions};

const METRICS_PATH: &str = "/events/metrics";
const METRIC_NAME: &str = "cli_command_metrics";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    /// `namespace:command`, or the bare name for root commands.
    pub command: String,
    pub args: Vec<String>,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    pub fn new(command: impl Into<String>, args: Vec<String>, version: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args,
            version: version.into(),
            timestamp: Utc::now(),
        }
    }

    /// Builds the event for a command run, dropping private inputs and options.
    pub fn for_command(
        command: impl Into<String>,
        metadata: &CommandMetadata,
        inputs: &[String],
        options: &ParsedOptions,
        version: impl Into<String>,
    ) -> Self {
        Self::new(command, sanitize(metadata, inputs, options), version)
    }
}

/// Inputs followed by options in `--name=value` form, private ones removed.
pub fn sanitize(metadata: &CommandMetadata, inputs: &[String], options: &ParsedOptions) -> Vec<String> {
    let mut args: Vec<String> = inputs
        .iter()
        .enumerate()
        .filter(|(i, _)| !metadata.inputs.get(*i).is_some_and(|spec| spec.private))
        .map(|(_, value)| value.clone())
        .collect();

    let mut public = options.clone();
    public.retain(|name, _| {
        !metadata
            .options
            .iter()
            .any(|spec| spec.private && spec.matches(name))
    });
    args.extend(public.to_argv());
    args
}

#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn send_command(&self, event: TelemetryEvent) -> Result<()>;
}

/// Posts events to the metrics endpoint of the API.
pub struct HttpTelemetry {
    client: ApiClient,
}

impl HttpTelemetry {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Telemetry for HttpTelemetry {
    async fn send_command(&self, event: TelemetryEvent) -> Result<()> {
        let request = self.client.make(Method::POST, METRICS_PATH).json(json!({
            "metrics": [{
                "name": METRIC_NAME,
                "timestamp": event.timestamp,
                "value": {
                    "command": event.command,
                    "arguments": event.args,
                    "version": event.version,
                },
            }],
            "sent_at": Utc::now(),
        }))?;

        let response = self.client.send(&request).await?;
        response.into_data(&request)?;
        tracing::debug!(command = %event.command, "telemetry sent");
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

#[async_trait]
impl Telemetry for NoopTelemetry {
    async fn send_command(&self, _event: TelemetryEvent) -> Result<()> {
        Ok(())
    }
}
