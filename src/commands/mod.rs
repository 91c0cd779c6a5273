//! Commands shipped in-process under the root `ionic` namespace.

mod help;
mod info;
mod login;
mod telemetry;
mod version;

pub use help::{HelpCommand, render_command, render_namespace};
pub use info::InfoCommand;
pub use login::LoginCommand;
pub use telemetry::TelemetryCommand;
pub use version::VersionCommand;

use crate::registry::{ChildMap, Namespace};

pub const ROOT_NAMESPACE: &str = "ionic";

#[derive(Debug, Default, Clone, Copy)]
pub struct IonicNamespace;

impl Namespace for IonicNamespace {
    fn name(&self) -> &str {
        ROOT_NAMESPACE
    }

    fn description(&self) -> &str {
        "Ionic command-line tool"
    }

    fn commands(&self) -> ChildMap {
        ChildMap::new()
            .command("help", HelpCommand::new)
            .alias("h", "help")
            .command("info", InfoCommand::new)
            .command("login", LoginCommand::new)
            .command("telemetry", TelemetryCommand::new)
            .command("version", VersionCommand::new)
    }
}
