//! `om-core` — foundational types for the `rust_om` model framework.
//!
//! This crate is a dependency of every other `om-*` crate.  It intentionally
//! has no `om-*` dependencies and minimal external ones (only optional
//! `serde`).  Nothing in here is fallible; error enums live in the sub-crates
//! that can actually fail.
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `RecordId`                                  |
//! | [`value`]    | `Value` — loosely typed field/config value            |
//! | [`settings`] | `Settings` — ordered key→value map with shallow merge |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod ids;
pub mod settings;
pub mod value;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ids::{NodeId, RecordId};
pub use settings::Settings;
pub use value::Value;
