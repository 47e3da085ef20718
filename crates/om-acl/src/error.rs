use om_core::{NodeId, RecordId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AclError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("alias {alias:?} is ambiguous under parent {parent:?}")]
    AmbiguousAlias {
        alias: String,
        parent: Option<NodeId>,
    },

    #[error("binding {model}.{foreign_key} matches more than one node")]
    AmbiguousBinding { model: String, foreign_key: RecordId },

    #[error("nested-set bounds are stale; run recompute_bounds first")]
    StaleBounds,
}

pub type AclResult<T> = Result<T, AclError>;
