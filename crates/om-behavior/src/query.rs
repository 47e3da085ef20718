//! Query and result-row shapes rewritten by find callbacks.

use std::collections::BTreeMap;

use om_core::Value;

// ── FindQuery ─────────────────────────────────────────────────────────────────

/// Options for one find operation.
///
/// `before_find` hooks receive the current query and may replace it wholesale
/// via [`FindDirective::Rewrite`][crate::FindDirective::Rewrite]; each rewrite
/// is what the *next* behavior in attachment order sees, and the final query
/// is what the datasource executes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FindQuery {
    /// Field names to project.  Empty means "all fields".
    pub fields: Vec<String>,

    /// Equality conditions.  Keys are bare field names (matched against the
    /// primary entity) or dotted `Entity.field` pairs.
    pub conditions: BTreeMap<String, Value>,

    /// Association recursion depth.  Anything below 1 strips associated
    /// entity maps from fetched rows, leaving only the primary entity.
    pub recursive: i8,

    /// Maximum number of rows to return.  `None` means unbounded.
    pub limit: Option<usize>,
}

impl FindQuery {
    /// A query selecting all fields with one level of association recursion.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            conditions: BTreeMap::new(),
            recursive: 1,
            limit: None,
        }
    }

    /// Builder-style: add a projected field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Builder-style: add an equality condition.
    pub fn condition(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Builder-style: set the recursion depth.
    pub fn recursive(mut self, depth: i8) -> Self {
        self.recursive = depth;
        self
    }

    /// Builder-style: cap the number of returned rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

impl Default for FindQuery {
    fn default() -> Self {
        Self::new()
    }
}

// ── Row ───────────────────────────────────────────────────────────────────────

/// One result row: `entity name → field name → value`.
///
/// The primary entity is keyed by the model's alias; associated entities
/// (when `recursive >= 1`) appear under their own aliases.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    entities: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert: `Row::new().with("User", "id", 1)`.
    pub fn with(
        mut self,
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.set(entity, field, value);
        self
    }

    /// Insert or overwrite one field.
    pub fn set(
        &mut self,
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.entities
            .entry(entity.into())
            .or_default()
            .insert(field.into(), value.into());
    }

    /// Value of `entity.field`, or `None` if either level is absent.
    pub fn get(&self, entity: &str, field: &str) -> Option<&Value> {
        self.entities.get(entity).and_then(|f| f.get(field))
    }

    /// Field map of one entity.
    pub fn entity(&self, name: &str) -> Option<&BTreeMap<String, Value>> {
        self.entities.get(name)
    }

    /// Entity names present in this row, in key order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every entity except `keep` (association-recursion stripping).
    pub fn retain_entity(&mut self, keep: &str) {
        self.entities.retain(|name, _| name == keep);
    }

    /// Project `entity` down to the named fields, dropping the rest.
    pub fn retain_fields(&mut self, entity: &str, fields: &[String]) {
        if let Some(map) = self.entities.get_mut(entity) {
            map.retain(|f, _| fields.iter().any(|want| want == f));
        }
    }
}
