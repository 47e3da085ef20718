//! `Model` — the find/save/delete pipeline wired to a behavior registry.
//!
//! The datasource here is a plain in-memory `Vec<Row>`; a real driver layer
//! owns query execution, transactions, and associations.  What this module
//! fixes is the *ordering contract*: which callbacks run, in what order, and
//! which outcomes abort the operation before any mutation happens.

use std::collections::BTreeMap;
use std::sync::Arc;

use om_core::Value;

use crate::{
    BeforeFindOutcome, BehaviorRegistry, BehaviorResult, BehaviorSet, Dispatch, FindQuery,
    ModelContext, Row,
};

/// A data model owning its behavior registry and backing rows.
pub struct Model {
    ctx: ModelContext,
    pub behaviors: BehaviorRegistry,
    rows: Vec<Row>,
}

impl Model {
    /// Create an empty model with alias `alias`, resolving behavior names
    /// through `set`.
    pub fn new(alias: impl Into<String>, set: Arc<BehaviorSet>) -> Self {
        let alias = alias.into();
        Self {
            ctx: ModelContext::new(alias.clone()),
            behaviors: BehaviorRegistry::new(alias, set),
            rows: Vec::new(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.ctx.alias
    }

    /// Seed a backing row directly (fixture loading stands in for a real
    /// datasource).
    pub fn insert_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The callback-facing view of this model.
    pub fn context(&self) -> &ModelContext {
        &self.ctx
    }

    // ── find ──────────────────────────────────────────────────────────────

    /// Run a find through the full callback pipeline.
    ///
    /// `before_find` hooks may rewrite the query or halt it (halt →
    /// `None`, no fetch runs).  The fetch filters on conditions, strips
    /// associated entities when `recursive < 1`, projects `fields`, and
    /// applies `limit`.  `after_find` hooks then see (and may replace) the
    /// result set.
    pub fn find(&mut self, query: FindQuery) -> Option<Vec<Row>> {
        let query = match self.behaviors.trigger_before_find(&self.ctx, query) {
            BeforeFindOutcome::Halted => return None,
            BeforeFindOutcome::Proceed(q) => q,
        };
        let fetched = self.fetch(&query);
        Some(self.behaviors.trigger_after_find(&self.ctx, fetched))
    }

    fn fetch(&self, query: &FindQuery) -> Vec<Row> {
        let alias = &self.ctx.alias;
        let mut out = Vec::new();
        for row in &self.rows {
            if !row_matches(row, alias, &query.conditions) {
                continue;
            }
            let mut row = row.clone();
            if query.recursive < 1 {
                row.retain_entity(alias);
            }
            if !query.fields.is_empty() {
                row.retain_fields(alias, &query.fields);
            }
            out.push(row);
            if query.limit.is_some_and(|n| out.len() >= n) {
                break;
            }
        }
        out
    }

    // ── save ──────────────────────────────────────────────────────────────

    /// Validate and save `data` as a new row.
    ///
    /// Pipeline: `before_validate` gates (plus the field-invalidation store),
    /// then `before_save` gates, then the insert, then `after_save`.  Any
    /// abort returns `false` with the row store untouched.
    pub fn save(&mut self, data: BTreeMap<String, Value>) -> bool {
        self.ctx.data = data;
        self.ctx.clear_invalid();

        if !self.behaviors.trigger_before_validate(&mut self.ctx) {
            return false;
        }
        if !self.ctx.is_valid() {
            return false;
        }
        if !self.behaviors.trigger_before_save(&mut self.ctx) {
            return false;
        }

        let mut row = Row::new();
        for (field, value) in &self.ctx.data {
            row.set(self.ctx.alias.clone(), field.clone(), value.clone());
        }
        self.rows.push(row);

        self.behaviors.trigger_after_save(&mut self.ctx, true);
        true
    }

    // ── delete ────────────────────────────────────────────────────────────

    /// Delete every row matching `conditions`.
    ///
    /// `before_delete` gates run first; an abort returns `false` and removes
    /// nothing.  `after_delete` fires once after the removal.
    pub fn delete(&mut self, conditions: &BTreeMap<String, Value>, cascade: bool) -> bool {
        if !self.behaviors.trigger_before_delete(&mut self.ctx, cascade) {
            return false;
        }
        let alias = self.ctx.alias.clone();
        self.rows.retain(|row| !row_matches(row, &alias, conditions));
        self.behaviors.trigger_after_delete(&mut self.ctx);
        true
    }

    // ── dynamic methods ───────────────────────────────────────────────────

    /// Dispatch a dynamic method call through the behavior registry.
    ///
    /// [`Dispatch::Unhandled`] means no behavior claimed the name; the caller
    /// falls through to whatever ordinary methods the application model has.
    pub fn call(&mut self, method: &str, args: &[Value]) -> BehaviorResult<Dispatch> {
        self.behaviors.dispatch_method(&mut self.ctx, method, args)
    }
}

/// Equality-condition match against one row.
///
/// Bare keys test fields of the primary entity (`alias`); dotted
/// `Entity.field` keys test the named entity.
fn row_matches(row: &Row, alias: &str, conditions: &BTreeMap<String, Value>) -> bool {
    conditions.iter().all(|(key, want)| {
        let (entity, field) = match key.split_once('.') {
            Some((e, f)) => (e, f),
            None => (alias, key.as_str()),
        };
        row.get(entity, field) == Some(want)
    })
}
