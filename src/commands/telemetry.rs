use async_trait::async_trait;

use crate::Result;
use crate::command::{
    Choices, Command, CommandContext, CommandMetadata, InputSpec, ParsedOptions, PromptSpec,
    Validator,
};

pub struct TelemetryCommand {
    metadata: CommandMetadata,
}

impl TelemetryCommand {
    pub fn new() -> Self {
        let status = InputSpec::new("status", "on or off")
            .validator(Validator::custom(|value, _| match value {
                "on" | "off" => Ok(()),
                _ => Err("status must be 'on' or 'off'.".to_string()),
            }))
            .prompt(PromptSpec::list(
                "Send anonymous usage data?",
                Choices::Static(vec!["on".to_string(), "off".to_string()]),
            ));

        Self {
            metadata: CommandMetadata::new("telemetry", "Opt in and out of telemetry")
                .input(status)
                .example("ionic telemetry off"),
        }
    }
}

impl Default for TelemetryCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for TelemetryCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        let config = &cx.env.config;
        let enabled = match inputs.first().map(String::as_str) {
            Some("on") => true,
            Some("off") => false,
            _ => {
                let current = config.load().await?.cli_flags.enable_telemetry;
                println!("Telemetry: {}", if current { "on" } else { "off" });
                return Ok(None);
            }
        };

        config
            .update(|c| {
                c.cli_flags.enable_telemetry = enabled;
                c.cli_flags.prompted_for_telemetry = true;
            })
            .await?;
        tracing::info!(enabled, "telemetry preference updated");
        println!("Telemetry: {}", if enabled { "on" } else { "off" });
        Ok(None)
    }
}
