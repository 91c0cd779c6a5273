use super::{ExecutionResult, Phase};
use crate::command::{
    Command, CommandContext, CommandMetadata, ParsedOptions, ValidationErrors, collect_inputs,
    validate_inputs,
};
use crate::telemetry::TelemetryEvent;
use crate::{Error, Result};

pub const PROJECT_REQUIRED: &str =
    "Sorry! This command must be run inside an Ionic project directory";

/// Runs one command invocation.
///
/// Phase order: `pre_inputs_prompt`, input collection, validation, `pre_run`,
/// then `run` and telemetry side by side. A hook signal skips every later
/// phase except telemetry. Faults before the run step end the invocation
/// without telemetry.
pub struct Executor<'a> {
    cx: &'a CommandContext<'a>,
}

impl<'a> Executor<'a> {
    pub fn new(cx: &'a CommandContext<'a>) -> Self {
        Self { cx }
    }

    pub async fn execute(
        &self,
        command: &dyn Command,
        mut inputs: Vec<String>,
        options: ParsedOptions,
    ) -> ExecutionResult {
        let metadata = command.metadata();

        if metadata.requires_project && self.cx.env.project.is_none() {
            return ExecutionResult::Fault(Error::fatal(PROJECT_REQUIRED));
        }

        let signal = match self.prepare(command, &mut inputs, &options).await {
            Ok(signal) => signal,
            Err(e) => return ExecutionResult::Fault(e),
        };

        let run = async {
            match signal {
                Some(code) => {
                    tracing::debug!(code, "run skipped by hook signal");
                    Ok(Some(code))
                }
                None => {
                    tracing::debug!(phase = %Phase::Run, command = %self.cx.qualified_name());
                    command.run(self.cx, &inputs, &options).await
                }
            }
        };
        let telemetry = self.record(metadata, &inputs, &options);

        let ((), outcome) = tokio::join!(telemetry, run);
        ExecutionResult::from(outcome)
    }

    /// Everything before `run`. `Some(code)` is a hook signal.
    async fn prepare(
        &self,
        command: &dyn Command,
        inputs: &mut Vec<String>,
        options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        let metadata = command.metadata();
        let env = self.cx.env;

        tracing::debug!(phase = %Phase::PreInputsPrompt);
        if let Some(code) = command.pre_inputs_prompt(self.cx, inputs).await? {
            return Ok(Some(code));
        }

        tracing::debug!(phase = %Phase::CollectInputs);
        collect_inputs(inputs, &metadata.inputs, env.prompter.as_ref(), env.interactive).await?;

        tracing::debug!(phase = %Phase::ValidateInputs);
        let errors = validate_inputs(inputs, &metadata.inputs);
        if !errors.is_empty() {
            return Err(Error::Validation(ValidationErrors(errors)));
        }

        tracing::debug!(phase = %Phase::PreRun);
        command.pre_run(self.cx, inputs, options).await
    }

    async fn record(&self, metadata: &CommandMetadata, inputs: &[String], options: &ParsedOptions) {
        let env = self.cx.env;
        if !env.telemetry_enabled().await {
            tracing::debug!("telemetry disabled");
            return;
        }

        let event = TelemetryEvent::for_command(
            self.cx.qualified_name(),
            metadata,
            inputs,
            options,
            env.version.clone(),
        );
        if let Err(e) = env.telemetry.send_command(event).await {
            tracing::warn!(phase = %Phase::Telemetry, error = %e, "failed to send telemetry");
        }
    }
}
