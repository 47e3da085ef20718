//! `AclNodeResolver` — reference → leaf-to-root ancestry chain.

use om_core::{NodeId, RecordId};

use crate::{AclResult, AclTree, BindNode, NodeBinding, NodeKind};

// ── Reference forms ───────────────────────────────────────────────────────────

/// The three ways a caller can identify a node.
pub enum NodeRef<'a> {
    /// Slash-delimited alias path, e.g. `"Controller1/action1/record1"`.
    /// Segments match case-insensitively; each resolves as a child of the
    /// previous one, the first among the roots.
    Path(&'a str),

    /// A `model` + `foreign_key` record binding.
    Bound {
        model: &'a str,
        foreign_key: RecordId,
    },

    /// A live application entity carrying its own [`BindNode`] contract.
    Entity(&'a dyn BindNode),
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Outcome of a resolution.  The two miss modes are deliberately distinct:
/// an empty reference is "no node asked for", an unmatched one is "asked,
/// not there".  Neither is an error, and neither ever yields a partial
/// chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The ancestry chain, leaf-first, root-last.
    Found(Vec<NodeId>),

    /// The reference was empty (empty path, contract returning nothing).
    Empty,

    /// Some segment or binding had no matching node.
    NoMatch,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The chain, or `None` for either miss mode.
    pub fn chain(&self) -> Option<&[NodeId]> {
        match self {
            Resolution::Found(chain) => Some(chain),
            _ => None,
        }
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Resolves [`NodeRef`]s against one [`AclTree`].
///
/// Stateless — it borrows the tree and performs no caching, so repeated
/// resolution of the same reference is idempotent by construction.
pub struct AclNodeResolver<'a> {
    tree: &'a AclTree,
}

impl<'a> AclNodeResolver<'a> {
    pub fn new(tree: &'a AclTree) -> Self {
        Self { tree }
    }

    /// Resolve `reference` to its leaf-to-root ancestry chain.
    ///
    /// Errors are reserved for data problems (ambiguous alias or binding);
    /// every expected miss comes back as a [`Resolution`] variant.
    pub fn node(&self, reference: NodeRef<'_>) -> AclResult<Resolution> {
        match reference {
            NodeRef::Path(path) => self.resolve_path(path),
            NodeRef::Bound { model, foreign_key } => self.resolve_bound(model, foreign_key),
            NodeRef::Entity(entity) => self.resolve_entity(entity),
        }
    }

    fn resolve_path(&self, path: &str) -> AclResult<Resolution> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Ok(Resolution::Empty);
        }

        let mut current: Option<NodeId> = None;
        for segment in segments {
            match self.tree.child_by_alias(current, segment)? {
                Some(child) => current = Some(child),
                None => {
                    tracing::trace!(path, segment, "acl path segment unmatched");
                    return Ok(Resolution::NoMatch);
                }
            }
        }

        match current {
            // Always Some here: segments was non-empty.
            Some(leaf) => Ok(Resolution::Found(self.tree.path_to_root(leaf)?)),
            None => Ok(Resolution::Empty),
        }
    }

    fn resolve_bound(&self, model: &str, foreign_key: RecordId) -> AclResult<Resolution> {
        match self.tree.find_bound(model, foreign_key)? {
            Some(id) => Ok(Resolution::Found(self.tree.path_to_root(id)?)),
            None => {
                tracing::trace!(model, %foreign_key, "acl binding unmatched");
                Ok(Resolution::NoMatch)
            }
        }
    }

    fn resolve_entity(&self, entity: &dyn BindNode) -> AclResult<Resolution> {
        let Some(binding) = entity.bind_node() else {
            return Ok(Resolution::NoMatch);
        };
        match binding {
            NodeBinding::Path(path) => self.resolve_path(&path),
            NodeBinding::Record { aro, aco } => {
                let side = match self.tree.kind() {
                    NodeKind::Aro => aro,
                    NodeKind::Aco => aco,
                };
                match side {
                    Some(b) => self.resolve_bound(&b.model, b.foreign_key),
                    None => Ok(Resolution::NoMatch),
                }
            }
        }
    }
}
