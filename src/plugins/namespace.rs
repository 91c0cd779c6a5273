//! Namespaces and commands declared by a plugin manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::manifest::{CommandEntry, Entry, PluginManifest};
use crate::Result;
use crate::command::{Command, CommandContext, CommandMetadata, ParsedOptions};
use crate::environment::ShellOptions;
use crate::registry::{ChildMap, Namespace};

/// A namespace node of an installed plugin package.
pub struct PluginNamespace {
    name: String,
    description: String,
    children: BTreeMap<String, Entry>,
    package_dir: Arc<PathBuf>,
}

impl PluginNamespace {
    /// The root namespace of a validated manifest. `None` if the root is not a namespace.
    pub fn from_manifest(manifest: PluginManifest, package_dir: PathBuf) -> Option<Self> {
        match manifest.root {
            Entry::Namespace {
                description,
                commands,
            } => Some(Self {
                name: manifest.name,
                description: if description.is_empty() {
                    manifest.description
                } else {
                    description
                },
                children: commands,
                package_dir: Arc::new(package_dir),
            }),
            _ => None,
        }
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }
}

impl Namespace for PluginNamespace {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn commands(&self) -> ChildMap {
        let mut map = ChildMap::new();
        for (name, entry) in &self.children {
            let package_dir = Arc::clone(&self.package_dir);
            map = match entry.clone() {
                Entry::Namespace {
                    description,
                    commands,
                } => {
                    let child_name = name.clone();
                    map.namespace(name.clone(), move || PluginNamespace {
                        name: child_name,
                        description,
                        children: commands,
                        package_dir,
                    })
                }
                Entry::Command(command) => {
                    let child_name = name.clone();
                    map.command(name.clone(), move || {
                        ExternalCommand::new(&child_name, command, &package_dir)
                    })
                }
                Entry::Alias { target } => map.alias(name.clone(), target),
            };
        }
        map
    }
}

/// Runs a program shipped with (or named by) a plugin package.
pub struct ExternalCommand {
    metadata: CommandMetadata,
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: &str, entry: CommandEntry, package_dir: &Path) -> Self {
        let metadata = entry.metadata(name);
        let candidate = package_dir.join(&entry.exec);
        let program = if candidate.exists() {
            candidate.display().to_string()
        } else {
            entry.exec
        };
        Self {
            metadata,
            program,
            args: entry.args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Command for ExternalCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        inputs: &[String],
        options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        let mut args = self.args.clone();
        args.extend(inputs.iter().cloned());
        args.extend(options.to_argv());

        let cwd = match &cx.env.project {
            Some(project) => project.dir().to_path_buf(),
            None => cx.env.cwd.clone(),
        };
        let shell_options = ShellOptions::default()
            .cwd(cwd)
            .env("IONIC_CLI_VERSION", cx.env.version.clone())
            .env("IONIC_LOGLEVEL", cx.env.log_level.clone());

        let status = cx.env.shell.run(&self.program, &args, &shell_options).await?;
        if status == 0 {
            return Ok(None);
        }
        tracing::debug!(command = %cx.qualified_name(), status, "plugin command exited");
        Ok(Some(u8::try_from(status).unwrap_or(1).max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_namespace_children() {
        let manifest = PluginManifest::parse(
            r#"{"name":"cordova","version":"1.0.0","description":"Cordova tooling","root":{
                "type":"namespace",
                "commands":{
                    "build":{"type":"command","exec":"cordova","args":["build"]},
                    "b":{"type":"alias","target":"build"},
                    "platform":{"type":"namespace","commands":{}}
                }
            }}"#,
            "cordova",
        )
        .unwrap();
        let namespace = PluginNamespace::from_manifest(manifest, PathBuf::from("/nowhere")).unwrap();
        assert_eq!(namespace.name(), "cordova");
        assert_eq!(namespace.description(), "Cordova tooling");

        let names: Vec<_> = namespace.commands().names().map(String::from).collect();
        assert_eq!(names, vec!["b", "build", "platform"]);
    }

    #[test]
    fn test_program_resolution() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/run"), "#!/bin/sh\n").unwrap();

        let entry: CommandEntry =
            serde_json::from_str(r#"{"exec":"bin/run"}"#).unwrap();
        let local = ExternalCommand::new("run", entry, dir.path());
        assert!(local.program().ends_with("bin/run"));
        assert!(local.program().starts_with(dir.path().to_str().unwrap()));

        let entry: CommandEntry = serde_json::from_str(r#"{"exec":"cordova"}"#).unwrap();
        let global = ExternalCommand::new("build", entry, dir.path());
        assert_eq!(global.program(), "cordova");
    }
}
