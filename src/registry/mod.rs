//! The command tree: namespaces, commands, aliases and argv resolution.
//!
//! Namespaces hand out a [`ChildMap`] of factories; the [`CommandTree`] calls
//! each factory lazily and at most once, so only the commands on the path of
//! an invocation are ever constructed.

pub mod address;
mod error;
mod namespace;
mod resolver;
mod tree;

pub use error::RegistryError;
pub use namespace::{Child, ChildFactory, ChildMap, Namespace};
pub use resolver::{ArgvResolver, Resolution};
pub use tree::{CommandTree, Entry, EntryKind, NodeId, NodeRef, ResolvedCommand};
