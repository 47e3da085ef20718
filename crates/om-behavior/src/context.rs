//! The model view passed to every behavior callback.

use std::collections::BTreeMap;

use om_core::Value;

/// What a behavior sees of the model it is attached to.
///
/// `ModelContext` carries the model's alias, the data pending a save, and the
/// field-invalidation store that `before_validate` hooks write into.  It is
/// the only mutable surface callbacks get; the registry and row store are
/// never exposed to behaviors directly.
#[derive(Debug, Clone, Default)]
pub struct ModelContext {
    /// The model's alias, e.g. `"User"`.  Also the primary entity key in
    /// result [`Row`][crate::Row]s.
    pub alias: String,

    /// Data staged for the next save, `field → value`.
    pub data: BTreeMap<String, Value>,

    invalid: BTreeMap<String, String>,
}

impl ModelContext {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            data: BTreeMap::new(),
            invalid: BTreeMap::new(),
        }
    }

    /// Mark `field` invalid with a message.  Called from `before_validate`
    /// hooks; a model refuses to save while any field is marked.
    pub fn invalidate(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.invalid.insert(field.into(), message.into());
    }

    /// `true` when no field is currently marked invalid.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Invalidated fields and their messages, in field order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.invalid.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Clear all invalidation marks (done at the start of each save).
    pub fn clear_invalid(&mut self) {
        self.invalid.clear();
    }
}
