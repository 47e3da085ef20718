//! A no-op behavior — attaches cleanly and intercepts nothing.

use crate::Behavior;

/// A [`Behavior`] with every hook left at its default.
///
/// Useful as a placeholder in tests or to reserve an attachment slot whose
/// configuration other code inspects.
pub struct NoopBehavior;

impl Behavior for NoopBehavior {
    fn name(&self) -> &'static str {
        "Noop"
    }
}
