//! Plugin packages that contribute namespaces to the command tree.
//!
//! A plugin is addressed by the left side of a `plugin:command` token. The
//! [`PluginLoader`] searches its [`PluginSource`]s, validates the package's
//! whole tree up front, and caches the resulting namespace.

mod error;
mod loader;
mod manifest;
mod namespace;
mod source;

pub use error::{PluginError, install_command};
pub use loader::{KNOWN_PLUGINS, PluginLoader};
pub use manifest::{CommandEntry, Entry, InputEntry, OptionEntry, PluginManifest, PromptEntry};
pub use namespace::{ExternalCommand, PluginNamespace};
pub use source::{DirectorySource, PluginSource, StaticSource};

/// Package name prefix; the package for plugin `cloud` is `@ionic/cli-plugin-cloud`.
pub const PACKAGE_PREFIX: &str = "@ionic/cli-plugin-";
