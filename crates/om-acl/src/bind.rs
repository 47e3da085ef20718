//! The `BindNode` contract — how application entities declare their ACL nodes.

use om_core::RecordId;

use crate::Binding;

/// How an entity corresponds to nodes in the ACL trees.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBinding {
    /// Resolve through the alias tree, exactly like a literal path
    /// reference (`"Users/admins/alice"`).
    Path(String),

    /// Bind one application record per tree kind.  A side left `None`
    /// simply has no representation in that tree.
    Record {
        aro: Option<Binding>,
        aco: Option<Binding>,
    },
}

impl NodeBinding {
    /// Convenience: the same `model` + key bound on both sides.
    pub fn record_both(model: impl Into<String>, foreign_key: RecordId) -> Self {
        let model = model.into();
        NodeBinding::Record {
            aro: Some(Binding::new(model.clone(), foreign_key)),
            aco: Some(Binding::new(model, foreign_key)),
        }
    }
}

/// Implemented by application entity types that participate in ACL checks.
///
/// Returning `None` means the entity declares no correspondence; resolving
/// it yields a non-match (deny-by-default downstream), not an error.
pub trait BindNode {
    fn bind_node(&self) -> Option<NodeBinding>;
}
