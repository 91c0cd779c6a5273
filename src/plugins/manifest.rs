use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::PluginError;
use crate::command::argv::check_option_flags;
use crate::command::{
    Choices, CommandMetadata, InputSpec, OptionSpec, OptionType, OptionValue, PromptSpec,
    Validator,
};
use crate::prompt::PromptKind;

pub(super) const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

/// `plugin.json` at the root of a plugin package.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub root: Entry,
}

/// A node of the plugin's command tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Namespace {
        #[serde(default)]
        description: String,
        #[serde(default)]
        commands: BTreeMap<String, Entry>,
    },
    Command(CommandEntry),
    Alias {
        target: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandEntry {
    #[serde(default)]
    pub description: String,
    /// Program to run, relative to the package directory or on `PATH`.
    pub exec: String,
    /// Arguments placed before the command's inputs.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<InputEntry>,
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    #[serde(default)]
    pub project: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub prompt: Option<PromptEntry>,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptEntry {
    pub message: String,
    #[serde(default)]
    pub kind: PromptKind,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub option_type: Option<OptionType>,
    #[serde(default)]
    pub default: Option<OptionValue>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub intent: Option<String>,
}

impl PluginManifest {
    /// Reads and validates the manifest of the package at `package_dir`.
    ///
    /// `Ok(None)` means there is no manifest, i.e. no package.
    pub async fn load(package_dir: &Path, plugin: &str) -> Result<Option<Self>, PluginError> {
        let path = package_dir.join(PLUGIN_MANIFEST_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PluginError::Io { path, source }),
        };
        Self::parse(&content, plugin).map(Some)
    }

    pub fn parse(content: &str, plugin: &str) -> Result<Self, PluginError> {
        let manifest: PluginManifest = serde_json::from_str(content)
            .map_err(|e| PluginError::invalid(plugin, e.to_string()))?;
        manifest.validate(plugin)?;
        Ok(manifest)
    }

    fn validate(&self, plugin: &str) -> Result<(), PluginError> {
        match &self.root {
            Entry::Namespace { commands, .. } => validate_children(plugin, plugin, commands),
            _ => Err(PluginError::invalid(plugin, "root is not a namespace")),
        }
    }
}

fn validate_children(
    plugin: &str,
    path: &str,
    children: &BTreeMap<String, Entry>,
) -> Result<(), PluginError> {
    for (name, entry) in children {
        let child_path = format!("{}:{}", path, name);
        match entry {
            Entry::Namespace { commands, .. } => validate_children(plugin, &child_path, commands)?,
            Entry::Command(command) => validate_command(plugin, &child_path, command)?,
            Entry::Alias { target } => match children.get(target) {
                Some(Entry::Command(_)) | Some(Entry::Namespace { .. }) => {}
                _ => {
                    return Err(PluginError::invalid(
                        plugin,
                        format!("alias '{}' points to missing sibling '{}'", child_path, target),
                    ));
                }
            },
        }
    }
    Ok(())
}

fn validate_command(plugin: &str, path: &str, command: &CommandEntry) -> Result<(), PluginError> {
    if command.exec.trim().is_empty() {
        return Err(PluginError::invalid(
            plugin,
            format!("command '{}' has no exec", path),
        ));
    }
    for input in &command.inputs {
        for validator in &input.validators {
            if Validator::from_name(validator).is_none() {
                return Err(PluginError::invalid(
                    plugin,
                    format!(
                        "input '{}' of '{}' uses unknown validator '{}'",
                        input.name, path, validator
                    ),
                ));
            }
        }
    }
    let options: Vec<OptionSpec> = command.options.iter().map(OptionEntry::spec).collect();
    check_option_flags(&options).map_err(|reason| {
        PluginError::invalid(plugin, format!("command '{}': {}", path, reason))
    })
}

impl CommandEntry {
    pub fn metadata(&self, name: &str) -> CommandMetadata {
        let mut metadata = CommandMetadata::new(name, self.description.clone());
        metadata.requires_project = self.project;
        metadata.inputs = self.inputs.iter().map(InputEntry::spec).collect();
        metadata.options = self.options.iter().map(OptionEntry::spec).collect();
        metadata
    }
}

impl InputEntry {
    fn spec(&self) -> InputSpec {
        let mut spec = InputSpec::new(self.name.clone(), self.description.clone());
        spec.validators = self
            .validators
            .iter()
            .filter_map(|name| Validator::from_name(name))
            .collect();
        spec.private = self.private;
        spec.prompt = self.prompt.as_ref().map(|prompt| PromptSpec {
            message: prompt.message.clone(),
            kind: prompt.kind,
            choices: (!prompt.choices.is_empty()).then(|| Choices::Static(prompt.choices.clone())),
        });
        spec
    }
}

impl OptionEntry {
    fn spec(&self) -> OptionSpec {
        OptionSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            option_type: self.option_type,
            default: self.default.clone(),
            aliases: self.aliases.clone(),
            private: self.private,
            intent: self.intent.clone(),
        }
    }
}
