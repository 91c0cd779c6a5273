use async_trait::async_trait;

use crate::Result;
use crate::command::{Command, CommandContext, CommandMetadata, ParsedOptions};
use crate::plugins::{KNOWN_PLUGINS, PACKAGE_PREFIX, PluginLoader, install_command};

pub struct InfoCommand {
    metadata: CommandMetadata,
}

impl InfoCommand {
    pub fn new() -> Self {
        Self {
            metadata: CommandMetadata::new(
                "info",
                "Print system/environment info",
            ),
        }
    }
}

impl Default for InfoCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// One `(label, value)` line per known plugin.
async fn plugin_rows(plugins: &PluginLoader) -> Vec<(String, String)> {
    let mut rows = Vec::with_capacity(KNOWN_PLUGINS.len());
    for name in KNOWN_PLUGINS {
        let status = match plugins.is_installed(name).await {
            Ok(true) => "installed".to_string(),
            Ok(false) => format!("not installed ({})", install_command(name)),
            Err(e) => {
                tracing::debug!(plugin = name, error = %e, "plugin could not be loaded");
                format!("invalid ({})", e)
            }
        };
        rows.push((format!("{}{}", PACKAGE_PREFIX, name), status));
    }
    rows
}

#[async_trait]
impl Command for InfoCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        _inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        let env = cx.env;
        let mut rows = vec![
            ("Ionic CLI".to_string(), env.version.clone()),
            (
                "OS".to_string(),
                format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH),
            ),
        ];
        match &env.project {
            Some(project) => {
                rows.push(("Project".to_string(), project.name().to_string()));
                if let Some(kind) = project.project_type() {
                    rows.push(("Project type".to_string(), kind.to_string()));
                }
            }
            None => rows.push(("Project".to_string(), "none".to_string())),
        }
        rows.extend(plugin_rows(cx.plugins).await);

        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in rows {
            println!("{:width$} : {}", label, value, width = width);
        }
        Ok(None)
    }
}
