//! Namespace capability and lazily constructed child maps.

use std::fmt;
use std::sync::Arc;

use crate::command::Command;

/// A named group of commands and nested namespaces.
///
/// `commands` is called at most once per namespace per process; the returned
/// factories are only invoked when a child is actually looked up.
pub trait Namespace: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn commands(&self) -> ChildMap;
}

/// A constructed child of a namespace.
#[derive(Clone)]
pub enum Child {
    Namespace(Arc<dyn Namespace>),
    Command(Arc<dyn Command>),
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Namespace(ns) => write!(f, "Namespace({})", ns.name()),
            Child::Command(cmd) => write!(f, "Command({})", cmd.metadata().name),
        }
    }
}

pub type ChildFactory = Box<dyn FnOnce() -> Child + Send>;

pub(crate) enum ChildEntry {
    Factory(ChildFactory),
    Alias(String),
}

/// Ordered map from child name to a factory or an alias.
#[derive(Default)]
pub struct ChildMap {
    entries: Vec<(String, ChildEntry)>,
}

impl ChildMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command<C, F>(self, name: impl Into<String>, factory: F) -> Self
    where
        C: Command + 'static,
        F: FnOnce() -> C + Send + 'static,
    {
        self.child(name, move || Child::Command(Arc::new(factory())))
    }

    pub fn namespace<N, F>(self, name: impl Into<String>, factory: F) -> Self
    where
        N: Namespace + 'static,
        F: FnOnce() -> N + Send + 'static,
    {
        self.child(name, move || Child::Namespace(Arc::new(factory())))
    }

    pub fn child<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce() -> Child + Send + 'static,
    {
        self.entries
            .push((name.into(), ChildEntry::Factory(Box::new(factory))));
        self
    }

    /// `name` redirects to the sibling `target`.
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries
            .push((name.into(), ChildEntry::Alias(target.into())));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ChildEntry)> {
        self.entries
    }
}

impl fmt::Debug for ChildMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
