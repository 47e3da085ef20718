//! Aro → Aco permission records and the deny-by-default check.
//!
//! A [`PermissionRecord`] carries one tri-state [`Grant`] per CRUD
//! [`Action`].  [`AclChecker::check`] resolves both references to ancestry
//! chains and walks them nearest-first; the closest explicit `Allow` or
//! `Deny` wins, and anything unresolved or fully inherited denies.

use om_core::NodeId;
use rustc_hash::FxHashMap;

use crate::{AclNodeResolver, AclResult, AclTree, NodeRef, Resolution};

// ── Action / Grant ────────────────────────────────────────────────────────────

/// The CRUD actions a permission record distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// All four actions, for "grant everything" style setup.
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];
}

/// Tri-state permission value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Grant {
    Allow,
    Deny,
    /// No explicit decision at this node pair; keep walking the ancestry.
    #[default]
    Inherit,
}

// ── PermissionRecord ──────────────────────────────────────────────────────────

/// One Aro→Aco permission row: a grant per action, `Inherit` by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionRecord {
    pub create: Grant,
    pub read: Grant,
    pub update: Grant,
    pub delete: Grant,
}

impl PermissionRecord {
    /// Every action allowed.
    pub fn allow_all() -> Self {
        Self {
            create: Grant::Allow,
            read: Grant::Allow,
            update: Grant::Allow,
            delete: Grant::Allow,
        }
    }

    /// Every action denied.
    pub fn deny_all() -> Self {
        Self {
            create: Grant::Deny,
            read: Grant::Deny,
            update: Grant::Deny,
            delete: Grant::Deny,
        }
    }

    /// Builder-style: set one action's grant.
    pub fn with(mut self, action: Action, grant: Grant) -> Self {
        self.set(action, grant);
        self
    }

    pub fn set(&mut self, action: Action, grant: Grant) {
        match action {
            Action::Create => self.create = grant,
            Action::Read => self.read = grant,
            Action::Update => self.update = grant,
            Action::Delete => self.delete = grant,
        }
    }

    pub fn grant(&self, action: Action) -> Grant {
        match action {
            Action::Create => self.create,
            Action::Read => self.read,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }
}

// ── PermissionStore ───────────────────────────────────────────────────────────

/// Permission rows keyed by `(aro node, aco node)`.
#[derive(Default)]
pub struct PermissionStore {
    entries: FxHashMap<(NodeId, NodeId), PermissionRecord>,
}

impl PermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `(aro, aco)`.
    pub fn put(&mut self, aro: NodeId, aco: NodeId, record: PermissionRecord) {
        self.entries.insert((aro, aco), record);
    }

    pub fn get(&self, aro: NodeId, aco: NodeId) -> Option<&PermissionRecord> {
        self.entries.get(&(aro, aco))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── AclChecker ────────────────────────────────────────────────────────────────

/// Permission check over a requester tree, a controlled tree, and a store.
pub struct AclChecker<'a> {
    aro: &'a AclTree,
    aco: &'a AclTree,
    store: &'a PermissionStore,
}

impl<'a> AclChecker<'a> {
    pub fn new(aro: &'a AclTree, aco: &'a AclTree, store: &'a PermissionStore) -> Self {
        Self { aro, aco, store }
    }

    /// `true` if `aro_ref` may perform `action` on `aco_ref`.
    ///
    /// Both references resolve to leaf-first ancestry chains; any miss is a
    /// deny.  The walk visits aco ancestry outermost, aro ancestry inner,
    /// so the decision nearest both leaves wins.  No explicit grant
    /// anywhere along either chain means deny.
    pub fn check(
        &self,
        aro_ref: NodeRef<'_>,
        aco_ref: NodeRef<'_>,
        action: Action,
    ) -> AclResult<bool> {
        let aro_chain = match AclNodeResolver::new(self.aro).node(aro_ref)? {
            Resolution::Found(chain) => chain,
            _ => {
                tracing::debug!("aro reference unresolved, denying");
                return Ok(false);
            }
        };
        let aco_chain = match AclNodeResolver::new(self.aco).node(aco_ref)? {
            Resolution::Found(chain) => chain,
            _ => {
                tracing::debug!("aco reference unresolved, denying");
                return Ok(false);
            }
        };

        for &aco_node in &aco_chain {
            for &aro_node in &aro_chain {
                if let Some(record) = self.store.get(aro_node, aco_node) {
                    match record.grant(action) {
                        Grant::Allow => return Ok(true),
                        Grant::Deny => return Ok(false),
                        Grant::Inherit => {}
                    }
                }
            }
        }
        Ok(false)
    }
}
