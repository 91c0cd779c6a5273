//! Arena of namespace and command nodes, built lazily on lookup.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::RegistryError;
use super::address;
use super::namespace::{Child, ChildEntry, ChildFactory, Namespace};
use crate::command::Command;

pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Debug)]
enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    /// Construction failed; every later lookup reports the same error.
    Failed(RegistryError),
}

enum Slot {
    Pending(ChildFactory),
    Building,
    Built(NodeId),
    Alias(String),
}

impl From<ChildEntry> for Slot {
    fn from(entry: ChildEntry) -> Self {
        match entry {
            ChildEntry::Factory(f) => Slot::Pending(f),
            ChildEntry::Alias(target) => Slot::Alias(target),
        }
    }
}

struct NamespaceNode {
    source: Arc<dyn Namespace>,
    state: InitState,
    children: BTreeMap<String, Slot>,
}

enum NodeKind {
    Namespace(NamespaceNode),
    Command(Arc<dyn Command>),
}

struct Node {
    path: Vec<String>,
    kind: NodeKind,
}

impl Node {
    fn display_path(&self) -> String {
        if self.path.is_empty() {
            match &self.kind {
                NodeKind::Namespace(ns) => ns.source.name().to_string(),
                NodeKind::Command(cmd) => cmd.metadata().name.clone(),
            }
        } else {
            address::qualified(&self.path)
        }
    }
}

struct Arena {
    nodes: Vec<Node>,
    /// Children registered from outside, merged when their parent initializes.
    registered: HashMap<Vec<String>, Vec<(String, ChildEntry)>>,
    frozen: bool,
}

impl Arena {
    fn namespace(&self, id: NodeId) -> Result<&NamespaceNode, RegistryError> {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Namespace(ns) => Ok(ns),
            NodeKind::Command(_) => Err(RegistryError::NotANamespace {
                path: node.display_path(),
            }),
        }
    }

    fn namespace_mut(&mut self, id: NodeId) -> Result<&mut NamespaceNode, RegistryError> {
        let node = &mut self.nodes[id];
        let path = node.display_path();
        match &mut node.kind {
            NodeKind::Namespace(ns) => Ok(ns),
            NodeKind::Command(_) => Err(RegistryError::NotANamespace { path }),
        }
    }
}

/// A command that has been located in the tree, with its canonical path.
#[derive(Clone)]
pub struct ResolvedCommand {
    pub command: Arc<dyn Command>,
    pub path: Vec<String>,
}

impl ResolvedCommand {
    pub fn name(&self) -> &str {
        &self.command.metadata().name
    }

    pub fn qualified_name(&self) -> String {
        address::qualified(&self.path)
    }

    /// Same instance at the same canonical path.
    pub fn same_as(&self, other: &ResolvedCommand) -> bool {
        Arc::ptr_eq(&self.command, &other.command) && self.path == other.path
    }
}

impl std::fmt::Debug for ResolvedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// What a looked-up node turned out to be.
#[derive(Clone)]
pub enum NodeRef {
    Namespace {
        path: Vec<String>,
        namespace: Arc<dyn Namespace>,
    },
    Command(ResolvedCommand),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Namespace,
    Command,
    Alias { target: String },
}

/// A child listed for help output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub description: String,
    pub kind: EntryKind,
}

/// The process-wide tree of namespaces and commands.
///
/// Registration is only allowed before the first lookup. Every namespace's
/// child map and every child factory runs at most once.
pub struct CommandTree {
    arena: Mutex<Arena>,
    default_command: String,
}

impl CommandTree {
    pub fn new(root: impl Namespace + 'static) -> Self {
        Self::from_arc(Arc::new(root))
    }

    pub fn from_arc(root: Arc<dyn Namespace>) -> Self {
        Self {
            arena: Mutex::new(Arena {
                nodes: vec![Node {
                    path: Vec::new(),
                    kind: NodeKind::Namespace(NamespaceNode {
                        source: root,
                        state: InitState::Uninitialized,
                        children: BTreeMap::new(),
                    }),
                }],
                registered: HashMap::new(),
                frozen: false,
            }),
            default_command: "help".to_string(),
        }
    }

    pub fn with_default_command(mut self, name: impl Into<String>) -> Self {
        self.default_command = name.into();
        self
    }

    pub fn default_command_name(&self) -> &str {
        &self.default_command
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn root_name(&self) -> String {
        self.lock().nodes[ROOT].display_path()
    }

    fn lock(&self) -> MutexGuard<'_, Arena> {
        self.arena.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a child at `path` (parent namespaces first, child name last).
    pub fn register<F>(&self, path: &[&str], factory: F) -> Result<(), RegistryError>
    where
        F: FnOnce() -> Child + Send + 'static,
    {
        self.register_entry(path, ChildEntry::Factory(Box::new(factory)))
    }

    pub fn register_alias(&self, path: &[&str], target: &str) -> Result<(), RegistryError> {
        self.register_entry(path, ChildEntry::Alias(target.to_string()))
    }

    fn register_entry(&self, path: &[&str], entry: ChildEntry) -> Result<(), RegistryError> {
        let Some((name, parent)) = path.split_last() else {
            return Err(RegistryError::EmptyPath);
        };

        let mut arena = self.lock();
        if arena.frozen {
            return Err(RegistryError::Frozen {
                path: path.join(&address::NAMESPACE_SEP.to_string()),
            });
        }

        let parent: Vec<String> = parent.iter().map(|s| s.to_string()).collect();
        arena
            .registered
            .entry(parent)
            .or_default()
            .push((name.to_string(), entry));
        Ok(())
    }

    fn ensure_initialized(&self, id: NodeId) -> Result<(), RegistryError> {
        let source = {
            let mut arena = self.lock();
            arena.frozen = true;
            let path = arena.nodes[id].display_path();
            let ns = arena.namespace_mut(id)?;
            match &ns.state {
                InitState::Ready => return Ok(()),
                InitState::Failed(err) => return Err(err.clone()),
                InitState::Initializing => return Err(RegistryError::Reentrant { path }),
                InitState::Uninitialized => {}
            }
            ns.state = InitState::Initializing;
            Arc::clone(&ns.source)
        };

        tracing::debug!(namespace = source.name(), "constructing namespace children");
        let declared = source.commands().into_entries();

        let mut arena = self.lock();
        let node_path = arena.nodes[id].path.clone();
        let display = arena.nodes[id].display_path();
        let registered = arena.registered.remove(&node_path).unwrap_or_default();

        let mut children = BTreeMap::new();
        for (name, entry) in declared.into_iter().chain(registered) {
            if children.contains_key(&name) {
                let err = RegistryError::DuplicateName {
                    namespace: display,
                    name,
                };
                arena.namespace_mut(id)?.state = InitState::Failed(err.clone());
                return Err(err);
            }
            children.insert(name, Slot::from(entry));
        }

        let ns = arena.namespace_mut(id)?;
        ns.children = children;
        ns.state = InitState::Ready;
        Ok(())
    }

    /// Looks up `name` among the children of `parent`, following aliases.
    pub fn lookup(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, RegistryError> {
        self.ensure_initialized(parent)?;

        let canonical = {
            let arena = self.lock();
            let ns = arena.namespace(parent)?;
            match ns.children.get(name) {
                None => return Ok(None),
                Some(Slot::Alias(target)) => match ns.children.get(target) {
                    None | Some(Slot::Alias(_)) => {
                        return Err(RegistryError::DanglingAlias {
                            namespace: arena.nodes[parent].display_path(),
                            alias: name.to_string(),
                            target: target.clone(),
                        });
                    }
                    Some(_) => target.clone(),
                },
                Some(_) => name.to_string(),
            }
        };

        self.build_child(parent, &canonical).map(Some)
    }

    fn build_child(&self, parent: NodeId, name: &str) -> Result<NodeId, RegistryError> {
        let factory = {
            let mut arena = self.lock();
            let display = arena.nodes[parent].display_path();
            let ns = arena.namespace_mut(parent)?;
            let Some(slot) = ns.children.get_mut(name) else {
                return Err(RegistryError::NotANamespace {
                    path: format!("{}{}{}", display, address::NAMESPACE_SEP, name),
                });
            };
            match slot {
                Slot::Built(id) => return Ok(*id),
                Slot::Building => {
                    return Err(RegistryError::Reentrant {
                        path: format!("{}{}{}", display, address::NAMESPACE_SEP, name),
                    });
                }
                Slot::Alias(target) => {
                    return Err(RegistryError::DanglingAlias {
                        namespace: display,
                        alias: name.to_string(),
                        target: target.clone(),
                    });
                }
                Slot::Pending(_) => {}
            }
            match std::mem::replace(slot, Slot::Building) {
                Slot::Pending(factory) => factory,
                _ => {
                    return Err(RegistryError::Reentrant {
                        path: format!("{}{}{}", display, address::NAMESPACE_SEP, name),
                    });
                }
            }
        };

        let child = factory();

        let mut arena = self.lock();
        let mut path = arena.nodes[parent].path.clone();
        path.push(name.to_string());
        let kind = match child {
            Child::Namespace(source) => NodeKind::Namespace(NamespaceNode {
                source,
                state: InitState::Uninitialized,
                children: BTreeMap::new(),
            }),
            Child::Command(command) => NodeKind::Command(command),
        };
        let id = arena.nodes.len();
        arena.nodes.push(Node { path, kind });
        if let Some(slot) = arena.namespace_mut(parent)?.children.get_mut(name) {
            *slot = Slot::Built(id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> NodeRef {
        let arena = self.lock();
        let node = &arena.nodes[id];
        match &node.kind {
            NodeKind::Namespace(ns) => NodeRef::Namespace {
                path: node.path.clone(),
                namespace: Arc::clone(&ns.source),
            },
            NodeKind::Command(command) => NodeRef::Command(ResolvedCommand {
                command: Arc::clone(command),
                path: node.path.clone(),
            }),
        }
    }

    pub fn is_namespace(&self, id: NodeId) -> bool {
        matches!(self.lock().nodes[id].kind, NodeKind::Namespace(_))
    }

    /// Walks `path` from the root. `Ok(None)` if any segment is missing.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Result<Option<NodeId>, RegistryError> {
        let mut current = ROOT;
        for segment in path {
            if !self.is_namespace(current) {
                return Ok(None);
            }
            match self.lookup(current, segment.as_ref())? {
                Some(id) => current = id,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn default_command(&self) -> Result<Option<ResolvedCommand>, RegistryError> {
        match self.lookup(ROOT, &self.default_command)? {
            Some(id) => match self.node(id) {
                NodeRef::Command(resolved) => Ok(Some(resolved)),
                NodeRef::Namespace { .. } => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// Attaches an already loaded namespace under the root, once.
    pub fn mount(&self, name: &str, namespace: Arc<dyn Namespace>) -> Result<NodeId, RegistryError> {
        self.ensure_initialized(ROOT)?;
        {
            let mut arena = self.lock();
            let ns = arena.namespace_mut(ROOT)?;
            if !ns.children.contains_key(name) {
                ns.children.insert(
                    name.to_string(),
                    Slot::Pending(Box::new(move || Child::Namespace(namespace))),
                );
            }
        }
        self.build_child(ROOT, name)
    }

    /// Lists the children of a namespace, constructing each of them.
    pub fn entries(&self, id: NodeId) -> Result<Vec<Entry>, RegistryError> {
        self.ensure_initialized(id)?;

        let listing: Vec<(String, Option<String>)> = {
            let arena = self.lock();
            arena
                .namespace(id)?
                .children
                .iter()
                .map(|(name, slot)| match slot {
                    Slot::Alias(target) => (name.clone(), Some(target.clone())),
                    _ => (name.clone(), None),
                })
                .collect()
        };

        let mut entries = Vec::with_capacity(listing.len());
        for (name, alias_of) in listing {
            if let Some(target) = alias_of {
                entries.push(Entry {
                    name,
                    description: String::new(),
                    kind: EntryKind::Alias { target },
                });
                continue;
            }
            let child = self.build_child(id, &name)?;
            let entry = match self.node(child) {
                NodeRef::Namespace { namespace, .. } => Entry {
                    name,
                    description: namespace.description().to_string(),
                    kind: EntryKind::Namespace,
                },
                NodeRef::Command(resolved) => Entry {
                    name,
                    description: resolved.command.metadata().description.clone(),
                    kind: EntryKind::Command,
                },
            };
            entries.push(entry);
        }

        Ok(entries)
    }
}
