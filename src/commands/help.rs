use std::fmt::Write as _;

use async_trait::async_trait;

use super::ROOT_NAMESPACE;
use crate::command::{
    Command, CommandContext, CommandMetadata, InputSpec, OptionType, OptionValue, ParsedOptions,
};
use crate::registry::{Entry, EntryKind, NodeRef, address};
use crate::{Error, Result};

pub struct HelpCommand {
    metadata: CommandMetadata,
}

impl HelpCommand {
    pub fn new() -> Self {
        Self {
            metadata: CommandMetadata::new("help", "Provides help for a certain command")
                .alias("h")
                .input(InputSpec::new("command", "The command you desire help with"))
                .example("ionic help")
                .example("ionic help cloud:ssh"),
        }
    }

    /// Help text for `path`, loading a plugin namespace if it is addressed.
    pub async fn render(cx: &CommandContext<'_>, path: &[String]) -> Result<String> {
        let segments: Vec<String> = path
            .iter()
            .flat_map(|token| address::segments(token).map(String::from).collect::<Vec<_>>())
            .collect();

        let tree = cx.tree;
        let mut node = tree.find(&segments)?;
        if node.is_none() {
            if let Some(first) = segments.first() {
                if tree.lookup(tree.root(), first)?.is_none() && cx.plugins.has(first) {
                    let namespace = cx.plugins.load(first).await?;
                    tree.mount(first, namespace)?;
                    node = tree.find(&segments)?;
                }
            }
        }

        let Some(id) = node else {
            return Err(Error::fatal(format!(
                "Unable to find command: {}",
                segments.join(" ")
            )));
        };

        match tree.node(id) {
            NodeRef::Namespace { path, namespace } => {
                let title = if path.is_empty() {
                    ROOT_NAMESPACE.to_string()
                } else {
                    format!("{} {}", ROOT_NAMESPACE, address::qualified(&path))
                };
                Ok(render_namespace(&title, namespace.description(), &tree.entries(id)?))
            }
            NodeRef::Command(resolved) => {
                let title = format!("{} {}", ROOT_NAMESPACE, resolved.qualified_name());
                Ok(render_command(&title, resolved.command.metadata()))
            }
        }
    }
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_namespace(title: &str, description: &str, entries: &[Entry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {} <command> [inputs] [options]", title);
    if !description.is_empty() {
        let _ = writeln!(out, "\n  {}", description);
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let _ = writeln!(out, "\nCommands:");
    for entry in entries {
        let detail = match &entry.kind {
            EntryKind::Command => entry.description.clone(),
            EntryKind::Namespace => format!("(namespace) {}", entry.description),
            EntryKind::Alias { target } => format!("alias for {}", target),
        };
        let _ = writeln!(out, "  {:width$}  {}", entry.name, detail.trim_end(), width = width);
    }
    out
}

pub fn render_command(title: &str, metadata: &CommandMetadata) -> String {
    let mut out = String::new();
    let inputs: Vec<String> = metadata
        .inputs
        .iter()
        .map(|i| format!("[{}]", i.name))
        .collect();
    let mut usage = title.to_string();
    if !inputs.is_empty() {
        usage.push(' ');
        usage.push_str(&inputs.join(" "));
    }
    if !metadata.options.is_empty() {
        usage.push_str(" [options]");
    }
    let _ = writeln!(out, "Usage: {}", usage);
    if !metadata.description.is_empty() {
        let _ = writeln!(out, "\n  {}", metadata.description);
    }

    if !metadata.inputs.is_empty() {
        let _ = writeln!(out, "\nInputs:");
        for input in &metadata.inputs {
            let _ = writeln!(out, "  {}  {}", input.name, input.description);
        }
    }

    if !metadata.options.is_empty() {
        let _ = writeln!(out, "\nOptions:");
        for option in &metadata.options {
            let mut flags = format!("--{}", option.name);
            for alias in &option.aliases {
                let dashes = if alias.chars().count() == 1 { "-" } else { "--" };
                let _ = write!(flags, ", {}{}", dashes, alias);
            }
            let default = match (option.resolved_type(), option.resolved_default()) {
                (OptionType::String, OptionValue::String(value)) => {
                    format!(" (default: {})", value)
                }
                _ => String::new(),
            };
            let _ = writeln!(out, "  {}  {}{}", flags, option.description, default);
        }
    }

    if !metadata.examples.is_empty() {
        let _ = writeln!(out, "\nExamples:");
        for example in &metadata.examples {
            let _ = writeln!(out, "  $ {}", example);
        }
    }
    out
}

#[async_trait]
impl Command for HelpCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        print!("{}", Self::render(cx, inputs).await?);
        Ok(None)
    }
}
