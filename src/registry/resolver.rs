use super::address;
use super::tree::{CommandTree, NodeId, NodeRef, ResolvedCommand};
use crate::Result;
use crate::plugins::PluginLoader;

/// Outcome of matching argv against the command tree.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Number of leading positionals that named the namespace/command path.
    pub consumed: usize,
    /// Positionals left over for the command, in original order.
    pub residual: Vec<String>,
    pub command: Option<ResolvedCommand>,
}

impl Resolution {
    fn unresolved(argv: &[String]) -> Self {
        Self {
            consumed: 0,
            residual: argv.to_vec(),
            command: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.command.is_some()
    }
}

pub struct ArgvResolver<'a> {
    tree: &'a CommandTree,
    plugins: &'a PluginLoader,
}

impl<'a> ArgvResolver<'a> {
    pub fn new(tree: &'a CommandTree, plugins: &'a PluginLoader) -> Self {
        Self { tree, plugins }
    }

    /// Resolves untyped positionals to a command.
    ///
    /// A first token known at the root is walked as plain path segments. A
    /// first token of the form `plugin:command[:sub...]` loads the plugin if
    /// it is not already part of the tree. Anything that does not end on a
    /// command is left unresolved with every token as residual input.
    pub async fn resolve(&self, argv: &[String]) -> Result<Resolution> {
        let Some(first) = argv.first() else {
            return Ok(Resolution {
                consumed: 0,
                residual: Vec::new(),
                command: self.tree.default_command()?,
            });
        };

        let root = self.tree.root();

        if self.tree.lookup(root, first)?.is_some() {
            tracing::debug!(token = %first, "resolving from root namespace");
            return self.walk(root, argv, 0, argv);
        }

        let Some((plugin, rest)) = address::parse(first) else {
            tracing::debug!(token = %first, "no command matched");
            return Ok(Resolution::unresolved(argv));
        };

        let mut current = match self.tree.lookup(root, plugin)? {
            Some(id) if self.tree.is_namespace(id) => id,
            Some(_) => return Ok(Resolution::unresolved(argv)),
            None => {
                tracing::debug!(plugin, "loading plugin namespace");
                let namespace = self.plugins.load(plugin).await?;
                self.tree.mount(plugin, namespace)?
            }
        };

        for segment in address::segments(rest) {
            if !self.tree.is_namespace(current) {
                return Ok(Resolution::unresolved(argv));
            }
            match self.tree.lookup(current, segment)? {
                Some(id) => current = id,
                None => return Ok(Resolution::unresolved(argv)),
            }
        }

        self.walk(current, &argv[1..], 1, argv)
    }

    fn walk(
        &self,
        start: NodeId,
        tokens: &[String],
        already_consumed: usize,
        argv: &[String],
    ) -> Result<Resolution> {
        let mut current = start;
        let mut consumed = already_consumed;

        for token in tokens {
            if !self.tree.is_namespace(current) {
                break;
            }
            match self.tree.lookup(current, token)? {
                Some(id) => {
                    current = id;
                    consumed += 1;
                }
                None => break,
            }
        }

        match self.tree.node(current) {
            NodeRef::Command(resolved) => {
                tracing::debug!(command = %resolved.qualified_name(), consumed, "resolved command");
                Ok(Resolution {
                    consumed,
                    residual: argv[consumed..].to_vec(),
                    command: Some(resolved),
                })
            }
            NodeRef::Namespace { .. } => Ok(Resolution::unresolved(argv)),
        }
    }
}
