//! `AclTree` — parent-indexed arena of ACL nodes.
//!
//! # Data layout
//!
//! Nodes are stored densely in creation order; `NodeId` is the index into
//! the arena.  Each node records its optional parent, and the tree keeps an
//! explicit child list per node plus a root list, so child lookups are a
//! scan over the relevant list rather than a whole-arena search.
//!
//! # Nested-set bounds
//!
//! `lft`/`rght` bounds are derived, not authoritative: structural mutation
//! leaves them stale until [`AclTree::recompute_bounds`] runs a DFS in
//! creation order.  [`AclTree::descendants`] requires fresh bounds.

use om_core::{NodeId, RecordId};

use crate::{AclError, AclResult};

// ── NodeKind ──────────────────────────────────────────────────────────────────

/// Which side of the permission relation a tree holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Access *request* objects — who is asking (users, groups, roles).
    Aro,
    /// Access *control* objects — what is being protected (controllers,
    /// actions, records).
    Aco,
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// Ties a node to one application record: the `model` name plus that
/// record's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    pub model: String,
    pub foreign_key: RecordId,
}

impl Binding {
    pub fn new(model: impl Into<String>, foreign_key: RecordId) -> Self {
        Self {
            model: model.into(),
            foreign_key,
        }
    }

    fn matches(&self, model: &str, foreign_key: RecordId) -> bool {
        self.model == model && self.foreign_key == foreign_key
    }
}

// ── AclNode ───────────────────────────────────────────────────────────────────

/// One node in the arena.
///
/// A node is addressed either by `alias` (a named path segment) or by
/// `binding` (an application record); most nodes carry exactly one of the
/// two, but nothing forbids both.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub alias: Option<String>,
    pub binding: Option<Binding>,

    /// Nested-set bounds, valid after the last
    /// [`recompute_bounds`][AclTree::recompute_bounds].
    pub lft: u32,
    pub rght: u32,
}

// ── AclTree ───────────────────────────────────────────────────────────────────

/// A dense, parent-indexed tree of [`AclNode`]s.
pub struct AclTree {
    kind: NodeKind,
    nodes: Vec<AclNode>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    bounds_fresh: bool,
}

impl AclTree {
    /// Construct an empty tree of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            children: Vec::new(),
            roots: Vec::new(),
            bounds_fresh: true,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node with id `id`, or `None` if out of range.
    pub fn node(&self, id: NodeId) -> Option<&AclNode> {
        self.nodes.get(id.index())
    }

    /// Root-level node ids in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Child ids of `parent` in creation order (`None` = root level).
    pub fn children(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => self
                .children
                .get(id.index())
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &self.roots,
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Create a node under `parent` (root level for `None`) and return its
    /// id.  A dangling parent id is an error.
    ///
    /// Tree position is fixed at creation; nested-set bounds go stale until
    /// [`recompute_bounds`][Self::recompute_bounds].
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        alias: Option<String>,
        binding: Option<Binding>,
    ) -> AclResult<NodeId> {
        if let Some(p) = parent {
            if p.index() >= self.nodes.len() {
                return Err(AclError::NodeNotFound(p));
            }
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AclNode {
            id,
            parent,
            alias,
            binding,
            lft: 0,
            rght: 0,
        });
        self.children.push(Vec::new());
        match parent {
            Some(p) => self.children[p.index()].push(id),
            None => self.roots.push(id),
        }
        self.bounds_fresh = false;
        Ok(id)
    }

    /// Convenience: create an alias-addressed node.
    pub fn add_alias(&mut self, parent: Option<NodeId>, alias: impl Into<String>) -> AclResult<NodeId> {
        self.add_node(parent, Some(alias.into()), None)
    }

    /// Convenience: create a record-bound node.
    pub fn add_binding(
        &mut self,
        parent: Option<NodeId>,
        model: impl Into<String>,
        foreign_key: RecordId,
    ) -> AclResult<NodeId> {
        self.add_node(parent, None, Some(Binding::new(model, foreign_key)))
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// The child of `parent` whose alias matches `alias` (ASCII
    /// case-insensitive), or `None` when no child matches.
    ///
    /// Two matching children under one parent are a data error
    /// ([`AclError::AmbiguousAlias`]), not a pick-the-first situation.
    pub fn child_by_alias(
        &self,
        parent: Option<NodeId>,
        alias: &str,
    ) -> AclResult<Option<NodeId>> {
        let mut found = None;
        for &child in self.children(parent) {
            let matches = self.nodes[child.index()]
                .alias
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(alias));
            if !matches {
                continue;
            }
            if found.is_some() {
                return Err(AclError::AmbiguousAlias {
                    alias: alias.to_owned(),
                    parent,
                });
            }
            found = Some(child);
        }
        Ok(found)
    }

    /// The single node bound to `model` + `foreign_key`, or `None`.
    ///
    /// The binding invariant is "exactly one node per record"; duplicates
    /// are a data error ([`AclError::AmbiguousBinding`]).
    pub fn find_bound(&self, model: &str, foreign_key: RecordId) -> AclResult<Option<NodeId>> {
        let mut found = None;
        for node in &self.nodes {
            let matches = node
                .binding
                .as_ref()
                .is_some_and(|b| b.matches(model, foreign_key));
            if !matches {
                continue;
            }
            if found.is_some() {
                return Err(AclError::AmbiguousBinding {
                    model: model.to_owned(),
                    foreign_key,
                });
            }
            found = Some(node.id);
        }
        Ok(found)
    }

    /// Ancestry chain from `id` (inclusive) up to its root, leaf-first.
    pub fn path_to_root(&self, id: NodeId) -> AclResult<Vec<NodeId>> {
        if id.index() >= self.nodes.len() {
            return Err(AclError::NodeNotFound(id));
        }
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current.index()].parent {
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    // ── Nested-set bounds ─────────────────────────────────────────────────

    /// Recompute every node's `lft`/`rght` by DFS in creation order.
    ///
    /// O(n); run once after a batch of structural changes rather than per
    /// insert.
    pub fn recompute_bounds(&mut self) {
        let mut counter = 1u32;
        let roots = self.roots.clone();
        for root in roots {
            counter = self.assign_bounds(root, counter);
        }
        self.bounds_fresh = true;
    }

    fn assign_bounds(&mut self, id: NodeId, mut counter: u32) -> u32 {
        self.nodes[id.index()].lft = counter;
        counter += 1;
        let kids = self.children[id.index()].clone();
        for child in kids {
            counter = self.assign_bounds(child, counter);
        }
        self.nodes[id.index()].rght = counter;
        counter + 1
    }

    /// All descendants of `id` (excluding `id` itself), in creation order,
    /// via the nested-set bounds.
    ///
    /// Requires fresh bounds: structural changes since the last
    /// [`recompute_bounds`][Self::recompute_bounds] make this an error
    /// ([`AclError::StaleBounds`]) rather than a silently wrong subtree.
    pub fn descendants(&self, id: NodeId) -> AclResult<Vec<NodeId>> {
        let node = self.node(id).ok_or(AclError::NodeNotFound(id))?;
        if !self.bounds_fresh {
            return Err(AclError::StaleBounds);
        }
        let (lft, rght) = (node.lft, node.rght);
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.lft > lft && n.rght < rght)
            .map(|n| n.id)
            .collect())
    }
}
