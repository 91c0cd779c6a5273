use async_trait::async_trait;

use crate::Result;
use crate::command::{Command, CommandContext, CommandMetadata, ParsedOptions};

pub struct VersionCommand {
    metadata: CommandMetadata,
}

impl VersionCommand {
    pub fn new() -> Self {
        Self {
            metadata: CommandMetadata::new("version", "Returns the current CLI version"),
        }
    }
}

impl Default for VersionCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for VersionCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        cx: &CommandContext<'_>,
        _inputs: &[String],
        _options: &ParsedOptions,
    ) -> Result<Option<u8>> {
        println!("{}", cx.env.version);
        Ok(None)
    }
}
