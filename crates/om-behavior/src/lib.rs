//! `om-behavior` — pluggable model behaviors and callback dispatch.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`behavior`] | `Behavior` trait and the callback outcome enums                |
//! | [`methods`]  | `MethodMap` — compiled literal/pattern method dispatch table   |
//! | [`registry`] | `BehaviorSet` (shared definitions), `BehaviorRegistry` (per model) |
//! | [`query`]    | `FindQuery` and `Row` — the shapes callbacks rewrite           |
//! | [`context`]  | `ModelContext` — the model view handed to every callback       |
//! | [`model`]    | `Model` — find/save/delete pipeline wired to a registry        |
//! | [`noop`]     | `NoopBehavior` — placeholder with all-default hooks            |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Design notes
//!
//! Behavior definitions are stateless and shared process-wide behind an
//! immutable [`BehaviorSet`].  Everything that varies per model — settings,
//! enabled flags, attachment order, the compiled [`MethodMap`] — lives in
//! that model's own [`BehaviorRegistry`].  Two models attaching the same
//! behavior therefore cannot observe each other's configuration, by
//! construction rather than by keyed lookup.
//!
//! Lifecycle hooks are provided trait methods with no-op defaults, so
//! dispatch is a direct virtual call; there is no runtime "does this
//! behavior implement the callback?" probing.

pub mod behavior;
pub mod context;
pub mod error;
pub mod methods;
pub mod model;
pub mod noop;
pub mod query;
pub mod registry;

#[cfg(test)]
mod tests;

pub use behavior::{Behavior, FindDirective, Gate, Reply, ResultDirective};
pub use context::ModelContext;
pub use error::{BehaviorError, BehaviorResult};
pub use methods::{MethodMap, ResolvedMethod};
pub use model::Model;
pub use noop::NoopBehavior;
pub use query::{FindQuery, Row};
pub use registry::{
    BeforeFindOutcome, BehaviorRegistry, BehaviorSet, Dispatch, TriggerOptions, TriggerOutcome,
};
