//! Command descriptors and the command capability trait.
//!
//! A command is described by an immutable [`CommandMetadata`] (inputs,
//! options, project requirement) and implements [`Command`]. The optional
//! lifecycle hooks have default implementations that let execution continue.

pub mod argv;
mod input;
mod options;

use async_trait::async_trait;

use crate::Result;
use crate::environment::Environment;
use crate::plugins::PluginLoader;
use crate::registry::CommandTree;

pub use input::{
    Choices, ChoicesFn, InputSpec, PromptSpec, ValidationError, ValidationErrors, Validator,
    ValidatorFn, collect_inputs, validate_inputs,
};
pub use options::{OptionSpec, OptionType, OptionValue, ParsedOptions, ParserConfig};

#[derive(Clone, Debug, Default)]
pub struct CommandMetadata {
    pub name: String,
    pub description: String,
    /// Alternate names, for display. Routing aliases live in the parent's child map.
    pub aliases: Vec<String>,
    pub inputs: Vec<InputSpec>,
    pub options: Vec<OptionSpec>,
    pub requires_project: bool,
    pub examples: Vec<String>,
}

impl CommandMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn requires_project(mut self) -> Self {
        self.requires_project = true;
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::normalize(&self.options)
    }
}

/// Everything a running command may reach.
pub struct CommandContext<'a> {
    pub env: &'a Environment,
    pub tree: &'a CommandTree,
    pub plugins: &'a PluginLoader,
    /// Canonical path of the running command.
    pub path: &'a [String],
}

impl CommandContext<'_> {
    /// `namespace:command` form of the running command, or the bare name at the root.
    pub fn qualified_name(&self) -> String {
        self.path.join(":")
    }
}

/// An invocable command.
///
/// `pre_inputs_prompt` and `pre_run` may return `Some(code)` to stop the
/// invocation: `0` ends it successfully, anything else is a fatal exit with
/// that code. `run` returning `Some(code)` with a non-zero code is likewise a
/// fatal exit.
#[async_trait]
pub trait Command: Send + Sync {
    fn metadata(&self) -> &CommandMetadata;

    async fn pre_inputs_prompt(
        &self,
        _cx: &CommandContext<'_>,
        _inputs: &mut Vec<String>,
    ) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn pre_run(
        &self,
        _cx: &CommandContext<'_>,
        _inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        inputs: &[String],
        options: &ParsedOptions,
    ) -> Result<Option<u8>>;
}
