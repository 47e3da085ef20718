//! Behavior registries: shared definitions and per-model attachment state.
//!
//! [`BehaviorSet`] is the process-wide, *immutable* name → definition map,
//! populated at startup and shared between models via `Arc`.  Definitions
//! are stateless, so the set needs no interior locking.
//!
//! [`BehaviorRegistry`] is owned by a single model.  It records which
//! behaviors are attached (in attachment order), each attachment's settings
//! and compiled [`MethodMap`], and an enabled flag.  Callback fan-out and
//! dynamic-method dispatch walk the attachment list in order, skipping
//! disabled entries.

use std::sync::Arc;

use om_core::{Settings, Value};
use rustc_hash::FxHashMap;

use crate::{
    Behavior, BehaviorError, BehaviorResult, FindDirective, FindQuery, Gate, MethodMap,
    ModelContext, Reply, ResultDirective, Row,
};

// ── BehaviorSet ───────────────────────────────────────────────────────────────

/// Immutable registry of behavior definitions, keyed by [`Behavior::name`].
///
/// Build one at startup, wrap it in `Arc`, and hand it to every model's
/// [`BehaviorRegistry`].  Registering two behaviors with the same name keeps
/// the later one.
#[derive(Default)]
pub struct BehaviorSet {
    map: FxHashMap<String, Arc<dyn Behavior>>,
}

impl BehaviorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration: `BehaviorSet::new().with(TreeBehavior)`.
    pub fn with(mut self, behavior: impl Behavior) -> Self {
        self.register(Arc::new(behavior));
        self
    }

    /// Register a definition under its own name.
    pub fn register(&mut self, behavior: Arc<dyn Behavior>) {
        self.map.insert(behavior.name().to_owned(), behavior);
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Behavior>> {
        self.map.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ── Attachment ────────────────────────────────────────────────────────────────

/// One attached behavior: the shared definition plus everything this model
/// owns about it.
struct Attachment {
    behavior: Arc<dyn Behavior>,
    settings: Settings,
    methods: MethodMap,
    enabled: bool,
}

impl Attachment {
    fn name(&self) -> &str {
        self.behavior.name()
    }
}

// ── Trigger plumbing ──────────────────────────────────────────────────────────

/// Options for [`BehaviorRegistry::trigger`].
#[derive(Debug, Clone, Default)]
pub struct TriggerOptions {
    break_on: Vec<String>,
}

impl TriggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the fan-out immediately *after* the first behavior whose name
    /// matches one of the registered markers.  May be called repeatedly to
    /// register several markers.
    pub fn break_on(mut self, name: impl Into<String>) -> Self {
        self.break_on.push(name.into());
        self
    }

    fn matches(&self, name: &str) -> bool {
        self.break_on.iter().any(|n| n == name)
    }
}

/// Aggregated result of a generic trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    /// Non-[`Reply::Skip`] replies in trigger (attachment) order.
    pub replies: Vec<Reply>,

    /// `true` if any behavior replied [`Reply::Halt`] — the surrounding
    /// operation must not proceed.
    pub halted: bool,
}

impl TriggerOutcome {
    /// The [`Reply::Value`] payloads, in trigger order.
    pub fn values(&self) -> Vec<&Value> {
        self.replies
            .iter()
            .filter_map(|r| match r {
                Reply::Value(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

/// Outcome of the `before_find` fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeFindOutcome {
    /// Run the (possibly rewritten) query.
    Proceed(FindQuery),

    /// A behavior halted the find; no query runs.
    Halted,
}

/// Outcome of a dynamic-method dispatch.
///
/// `Unhandled` is a sentinel, not an error: the caller is expected to fall
/// through to ordinary method resolution on the model itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled(Value),
    Unhandled,
}

// ── BehaviorRegistry ──────────────────────────────────────────────────────────

/// Per-model behavior attachment and dispatch state.
pub struct BehaviorRegistry {
    alias: String,
    set: Arc<BehaviorSet>,
    attached: Vec<Attachment>,
}

impl BehaviorRegistry {
    /// Create an empty registry for the model `alias`, resolving names
    /// through `set`.
    pub fn new(alias: impl Into<String>, set: Arc<BehaviorSet>) -> Self {
        Self {
            alias: alias.into(),
            set,
            attached: Vec::new(),
        }
    }

    /// The owning model's alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    // ── Attachment management ─────────────────────────────────────────────

    /// Attach `name` with `config`, or reconfigure it if already attached.
    ///
    /// First attach: settings start from the behavior's
    /// [`defaults`][Behavior::defaults], then `config` merges over them.
    /// Re-attach: `config` merges over the *existing* settings (unmentioned
    /// keys persist) and a disabled behavior is re-enabled.  Either way,
    /// [`setup`][Behavior::setup] runs with the merged settings and may
    /// reject, in which case prior state is left untouched.
    pub fn attach(&mut self, name: &str, config: Settings) -> BehaviorResult<()> {
        let behavior = self
            .set
            .get(name)
            .ok_or_else(|| BehaviorError::Unknown(name.to_owned()))?;

        if let Some(idx) = self.position(name) {
            let mut merged = self.attached[idx].settings.clone();
            merged.merge(&config);
            behavior.setup(&self.alias, &merged)?;
            let entry = &mut self.attached[idx];
            entry.settings = merged;
            entry.enabled = true;
            tracing::debug!(model = %self.alias, behavior = name, "behavior reconfigured");
            return Ok(());
        }

        let mut settings = behavior.defaults();
        settings.merge(&config);
        behavior.setup(&self.alias, &settings)?;
        let methods = behavior.methods()?;
        self.attached.push(Attachment {
            behavior,
            settings,
            methods,
            enabled: true,
        });
        tracing::debug!(model = %self.alias, behavior = name, "behavior attached");
        Ok(())
    }

    /// Detach `name`, discarding its settings.  No-op when not attached.
    pub fn detach(&mut self, name: &str) {
        if let Some(idx) = self.position(name) {
            self.attached.remove(idx);
            tracing::debug!(model = %self.alias, behavior = name, "behavior detached");
        }
    }

    /// Re-enable a disabled behavior.  Settings are untouched.
    pub fn enable(&mut self, name: &str) -> BehaviorResult<()> {
        self.set_enabled(name, true)
    }

    /// Disable a behavior without detaching it: it is skipped in every
    /// fan-out but keeps its settings and attachment position.
    pub fn disable(&mut self, name: &str) -> BehaviorResult<()> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> BehaviorResult<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| BehaviorError::NotAttached(name.to_owned()))?;
        self.attached[idx].enabled = enabled;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attached.iter().position(|a| a.name() == name)
    }

    // ── Observers ─────────────────────────────────────────────────────────

    /// All attached behavior names in attachment order, enabled or not.
    pub fn attached(&self) -> Vec<&str> {
        self.attached.iter().map(Attachment::name).collect()
    }

    /// Currently enabled behavior names in attachment order.
    pub fn enabled(&self) -> Vec<&str> {
        self.enabled_entries().map(Attachment::name).collect()
    }

    /// `true` if `name` is attached and enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.position(name)
            .is_some_and(|idx| self.attached[idx].enabled)
    }

    /// Settings of an attached behavior (present even while disabled).
    pub fn settings(&self, name: &str) -> Option<&Settings> {
        self.position(name).map(|idx| &self.attached[idx].settings)
    }

    fn enabled_entries(&self) -> impl Iterator<Item = &Attachment> {
        self.attached.iter().filter(|a| a.enabled)
    }

    // ── Lifecycle triggers ────────────────────────────────────────────────

    /// Fan out `before_find`.  Each [`FindDirective::Rewrite`] feeds the next
    /// behavior; a [`FindDirective::Halt`] stops immediately.
    pub fn trigger_before_find(
        &self,
        model: &ModelContext,
        mut query: FindQuery,
    ) -> BeforeFindOutcome {
        for a in self.enabled_entries() {
            match a.behavior.before_find(model, &query, &a.settings) {
                FindDirective::Continue => {}
                FindDirective::Rewrite(q) => query = q,
                FindDirective::Halt => {
                    tracing::debug!(
                        model = %self.alias,
                        behavior = a.name(),
                        "find halted by behavior"
                    );
                    return BeforeFindOutcome::Halted;
                }
            }
        }
        BeforeFindOutcome::Proceed(query)
    }

    /// Fan out `after_find`.  Each [`ResultDirective::Replace`] feeds the
    /// next behavior; the final rows go back to the caller.
    pub fn trigger_after_find(&self, model: &ModelContext, mut rows: Vec<Row>) -> Vec<Row> {
        for a in self.enabled_entries() {
            match a.behavior.after_find(model, &rows, &a.settings) {
                ResultDirective::Keep => {}
                ResultDirective::Replace(replacement) => rows = replacement,
            }
        }
        rows
    }

    /// Fan out `before_validate`.  Every enabled behavior runs; the result is
    /// `false` if any gate aborted.
    pub fn trigger_before_validate(&self, model: &mut ModelContext) -> bool {
        self.gate_all(model, |b, m, s| b.before_validate(m, s))
    }

    /// Fan out `before_save`.  Every enabled behavior runs.
    pub fn trigger_before_save(&self, model: &mut ModelContext) -> bool {
        self.gate_all(model, |b, m, s| b.before_save(m, s))
    }

    /// Fan out `before_delete`.  Every enabled behavior runs.
    pub fn trigger_before_delete(&self, model: &mut ModelContext, cascade: bool) -> bool {
        self.gate_all(model, |b, m, s| b.before_delete(m, cascade, s))
    }

    /// Notify all enabled behaviors of a completed save.
    pub fn trigger_after_save(&self, model: &mut ModelContext, created: bool) {
        for a in self.enabled_entries() {
            a.behavior.after_save(model, created, &a.settings);
        }
    }

    /// Notify all enabled behaviors of a completed delete.
    pub fn trigger_after_delete(&self, model: &mut ModelContext) {
        for a in self.enabled_entries() {
            a.behavior.after_delete(model, &a.settings);
        }
    }

    /// Shared gate fan-out: run every enabled behavior, AND the gates.
    fn gate_all(
        &self,
        model: &mut ModelContext,
        hook: impl Fn(&dyn Behavior, &mut ModelContext, &Settings) -> Gate,
    ) -> bool {
        let mut proceed = true;
        for a in self.enabled_entries() {
            if !hook(a.behavior.as_ref(), model, &a.settings).allows() {
                tracing::debug!(
                    model = %self.alias,
                    behavior = a.name(),
                    "operation aborted by behavior gate"
                );
                proceed = false;
            }
        }
        proceed
    }

    // ── Generic trigger ───────────────────────────────────────────────────

    /// Fan a custom event out to every enabled behavior in attachment order.
    ///
    /// Non-[`Reply::Skip`] replies are collected in order.  With
    /// [`TriggerOptions::break_on`], iteration stops immediately after the
    /// first behavior whose name matches a marker — its reply is still
    /// recorded, later behaviors never run.
    pub fn trigger(
        &self,
        model: &mut ModelContext,
        event: &str,
        options: &TriggerOptions,
    ) -> TriggerOutcome {
        let mut replies = Vec::new();
        let mut halted = false;

        for a in self.attached.iter().filter(|a| a.enabled) {
            let reply = a.behavior.on_event(model, event, &a.settings);
            match reply {
                Reply::Skip => {}
                Reply::Halt => {
                    halted = true;
                    replies.push(Reply::Halt);
                }
                other => replies.push(other),
            }
            if options.matches(a.name()) {
                break;
            }
        }

        TriggerOutcome { replies, halted }
    }

    // ── Dynamic-method dispatch ───────────────────────────────────────────

    /// Dispatch `method` through the attached+enabled behaviors'
    /// [`MethodMap`]s.
    ///
    /// Resolution is two-phase: a literal name exposed by *any* enabled
    /// behavior wins over every pattern mapping, regardless of attachment
    /// order; only when no literal claims the name are patterns consulted.
    /// Attachment order decides ties within each phase.  Pattern captures
    /// are prepended to `args`.  Returns [`Dispatch::Unhandled`] — never an
    /// error — when nothing matches, so the caller can fall through to the
    /// model's own methods.
    pub fn dispatch_method(
        &self,
        model: &mut ModelContext,
        method: &str,
        args: &[Value],
    ) -> BehaviorResult<Dispatch> {
        for a in self.attached.iter().filter(|a| a.enabled) {
            if a.methods.has_literal(method) {
                let out = a.behavior.call(model, method, args, &a.settings)?;
                return Ok(Dispatch::Handled(out));
            }
        }
        for a in self.attached.iter().filter(|a| a.enabled) {
            if let Some(resolved) = a.methods.resolve_pattern(method) {
                let mut full = resolved.captures;
                full.extend_from_slice(args);
                let out = a.behavior.call(model, &resolved.target, &full, &a.settings)?;
                return Ok(Dispatch::Handled(out));
            }
        }
        tracing::trace!(model = %self.alias, method, "no behavior handled method");
        Ok(Dispatch::Unhandled)
    }
}
