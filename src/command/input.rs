//! Positional input declarations, interactive collection and validation.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::Result;
use crate::prompt::{PromptKind, Prompter, Question};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
    })
}

pub type ValidatorFn = Arc<dyn Fn(&str, &str) -> std::result::Result<(), String> + Send + Sync>;

/// Check applied to a positional input. Returns a human readable message on failure.
#[derive(Clone)]
pub enum Validator {
    /// Fails on an absent or empty value. Unlike the other validators,
    /// [`validate_inputs`] also runs it when the input was never supplied,
    /// so a required input left empty after prompting is reported.
    Required,
    Email,
    Custom(ValidatorFn),
}

impl Validator {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&str, &str) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(check))
    }

    /// `key` is the input name, used to make the message specific.
    pub fn check(&self, value: &str, key: Option<&str>) -> std::result::Result<(), String> {
        match self {
            Validator::Required => {
                if value.trim().is_empty() {
                    Err(match key {
                        Some(key) => format!("{} must not be empty.", key),
                        None => "Must not be empty.".to_string(),
                    })
                } else {
                    Ok(())
                }
            }
            Validator::Email => {
                if email_regex().is_match(value) {
                    Ok(())
                } else {
                    Err(match key {
                        Some(key) => format!("{} is an invalid email address.", key),
                        None => "Invalid email address.".to_string(),
                    })
                }
            }
            Validator::Custom(check) => check(value, key.unwrap_or_default()),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "required" => Some(Validator::Required),
            "email" => Some(Validator::Email),
            _ => None,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Required => write!(f, "Required"),
            Validator::Email => write!(f, "Email"),
            Validator::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

pub type ChoicesFn = Arc<dyn Fn(&[String]) -> Vec<String> + Send + Sync>;

#[derive(Clone)]
pub enum Choices {
    Static(Vec<String>),
    /// Computed from the inputs collected so far.
    Dynamic(ChoicesFn),
}

impl Choices {
    pub fn resolve(&self, answers: &[String]) -> Vec<String> {
        match self {
            Choices::Static(choices) => choices.clone(),
            Choices::Dynamic(f) => f(answers),
        }
    }
}

impl fmt::Debug for Choices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choices::Static(choices) => f.debug_tuple("Static").field(choices).finish(),
            Choices::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PromptSpec {
    pub message: String,
    pub kind: PromptKind,
    pub choices: Option<Choices>,
}

impl PromptSpec {
    pub fn input(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn password(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: PromptKind::Password,
            choices: None,
        }
    }

    pub fn list(message: impl Into<String>, choices: Choices) -> Self {
        Self {
            message: message.into(),
            kind: PromptKind::List,
            choices: Some(choices),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputSpec {
    pub name: String,
    pub description: String,
    pub validators: Vec<Validator>,
    pub prompt: Option<PromptSpec>,
    /// Never reported to telemetry.
    pub private: bool,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn required(self) -> Self {
        self.validator(Validator::Required)
    }

    pub fn prompt(mut self, prompt: PromptSpec) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.validators
            .iter()
            .any(|v| matches!(v, Validator::Required))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub input_name: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Non-empty list of validation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", msgs.join("\n"))
    }
}

fn is_absent(inputs: &[String], index: usize) -> bool {
    inputs.get(index).is_none_or(|v| v.is_empty())
}

/// Fills missing positional inputs from prompts.
///
/// A gap is only filled when the input declares a prompt and the session is
/// interactive; otherwise it is left for validation to report.
pub async fn collect_inputs(
    inputs: &mut Vec<String>,
    specs: &[InputSpec],
    prompter: &dyn Prompter,
    interactive: bool,
) -> Result<()> {
    if !interactive {
        return Ok(());
    }

    for (index, spec) in specs.iter().enumerate() {
        let Some(prompt) = &spec.prompt else {
            continue;
        };
        if !is_absent(inputs, index) {
            continue;
        }

        let choices = prompt
            .choices
            .as_ref()
            .map(|c| c.resolve(&inputs[..index.min(inputs.len())]))
            .unwrap_or_default();

        let answer = prompter
            .prompt(Question {
                name: spec.name.clone(),
                message: prompt.message.clone(),
                kind: prompt.kind,
                choices,
            })
            .await?;

        if inputs.len() <= index {
            inputs.resize(index + 1, String::new());
        }
        inputs[index] = answer;
    }

    Ok(())
}

/// Runs each input's validators in order. The first failure for an input
/// stops that input's checks; failures across inputs accumulate.
pub fn validate_inputs(inputs: &[String], specs: &[InputSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, spec) in specs.iter().enumerate() {
        if spec.validators.is_empty() {
            continue;
        }

        let absent = is_absent(inputs, index);
        let value = inputs.get(index).map(String::as_str).unwrap_or_default();

        for validator in &spec.validators {
            if absent && !matches!(validator, Validator::Required) {
                continue;
            }
            if let Err(message) = validator.check(value, Some(&spec.name)) {
                errors.push(ValidationError {
                    input_name: spec.name.clone(),
                    message,
                });
                break;
            }
        }
    }

    errors
}
