//! `om-acl` — hierarchical access-control trees and node resolution.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`tree`]       | `AclTree` — parent-indexed node arena, `NodeKind`, bounds  |
//! | [`resolver`]   | `AclNodeResolver` — path/binding/entity → ancestry chain   |
//! | [`bind`]       | `BindNode` contract for application entities               |
//! | [`permission`] | `PermissionStore`, `AclChecker` — deny-by-default checks   |
//! | [`error`]      | `AclError`, `AclResult<T>`                                 |
//!
//! # Design notes
//!
//! Nodes live in a dense arena indexed by `NodeId`; parents are stored as
//! optional ids and children as explicit per-node lists, so traversal never
//! builds an object graph with ownership cycles.  Two trees exist per
//! deployment — one of requesters ([`NodeKind::Aro`]) and one of controlled
//! things ([`NodeKind::Aco`]) — linked only through the permission store.
//!
//! Resolution misses are ordinary return values ([`Resolution::Empty`],
//! [`Resolution::NoMatch`]), never errors; the permission checker treats
//! both as deny.  Errors are reserved for data problems a caller cannot
//! recover from by checking a sentinel: a dangling parent id, two children
//! sharing an alias under one parent, or querying nested-set bounds that
//! have gone stale.

pub mod bind;
pub mod error;
pub mod permission;
pub mod resolver;
pub mod tree;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bind::{BindNode, NodeBinding};
pub use error::{AclError, AclResult};
pub use permission::{AclChecker, Action, Grant, PermissionRecord, PermissionStore};
pub use resolver::{AclNodeResolver, NodeRef, Resolution};
pub use tree::{AclNode, AclTree, Binding, NodeKind};
