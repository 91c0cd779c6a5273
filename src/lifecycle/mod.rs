//! Drives a resolved command through its phases and maps the outcome to an exit code.

mod executor;

pub use executor::{Executor, PROJECT_REQUIRED};

use crate::Error;

/// Phases of one invocation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreInputsPrompt,
    CollectInputs,
    ValidateInputs,
    PreRun,
    Run,
    Telemetry,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreInputsPrompt => "pre_inputs_prompt",
            Phase::CollectInputs => "collect_inputs",
            Phase::ValidateInputs => "validate_inputs",
            Phase::PreRun => "pre_run",
            Phase::Run => "run",
            Phase::Telemetry => "telemetry",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum ExecutionResult {
    Success,
    /// Deliberate stop with a non-zero code.
    Exit(u8),
    Fault(Error),
}

impl ExecutionResult {
    /// Maps a hook or `run` signal: `0` (or nothing) is success.
    pub fn from_signal(signal: Option<u8>) -> Self {
        match signal {
            None | Some(0) => ExecutionResult::Success,
            Some(code) => ExecutionResult::Exit(code),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ExecutionResult::Success => 0,
            ExecutionResult::Exit(code) => *code,
            ExecutionResult::Fault(e) => e.exit_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success)
    }

    pub fn fault(&self) -> Option<&Error> {
        match self {
            ExecutionResult::Fault(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Result<Option<u8>>> for ExecutionResult {
    fn from(result: crate::Result<Option<u8>>) -> Self {
        match result {
            Ok(signal) => ExecutionResult::from_signal(signal),
            Err(e) => ExecutionResult::Fault(e),
        }
    }
}
