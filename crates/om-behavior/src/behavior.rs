//! The `Behavior` trait — the main extension point for user code.

use om_core::{Settings, Value};

use crate::{BehaviorError, BehaviorResult, FindQuery, MethodMap, ModelContext, Row};

// ── Callback outcomes ─────────────────────────────────────────────────────────

/// Outcome of a single `before_find` hook.
#[derive(Debug, Clone, PartialEq)]
pub enum FindDirective {
    /// Proceed with the query as currently written.
    Continue,

    /// Replace the query.  Subsequent behaviors and the final fetch see the
    /// rewritten version.
    Rewrite(FindQuery),

    /// Abort the find.  No query runs; the caller receives no rows and later
    /// behaviors are not consulted (the query is already dead).
    Halt,
}

/// Outcome of a single `after_find` hook.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDirective {
    /// Keep the result set as currently written.
    Keep,

    /// Replace the result set.  Subsequent behaviors and the caller see the
    /// replacement (which may be empty).
    Replace(Vec<Row>),
}

/// Outcome of a lifecycle gate (`before_validate`, `before_save`,
/// `before_delete`).
///
/// An `Abort` from any behavior means the surrounding operation must not
/// proceed, but the remaining behaviors still run — gates observe, they do
/// not short-circuit each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Proceed,
    Abort,
}

impl Gate {
    /// `true` for [`Gate::Proceed`].
    #[inline]
    pub fn allows(self) -> bool {
        self == Gate::Proceed
    }
}

/// Reply from a custom-event hook ([`Behavior::on_event`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The behavior opts out of this event; nothing is recorded.
    Skip,

    /// Acknowledge without payload.
    Proceed,

    /// Signal that the surrounding operation must not proceed.
    Halt,

    /// An event-specific payload, collected in trigger order.
    Value(Value),
}

// ── Behavior ──────────────────────────────────────────────────────────────────

/// Pluggable cross-cutting model logic.
///
/// Implement this trait to intercept a model's lifecycle.  All hooks are
/// provided methods with no-op defaults — only [`name`][Self::name] is
/// required — so an implementation states exactly the callbacks it cares
/// about and nothing else.
///
/// # Statelessness
///
/// One definition instance is shared by every model that attaches it (via
/// [`BehaviorSet`][crate::BehaviorSet]), so implementations must be
/// `Send + Sync` and must not cache per-model state internally.  Per-model
/// configuration arrives as the `settings` argument of every hook; it is
/// owned by the attaching model's registry.
///
/// # Example
///
/// ```rust,ignore
/// struct Timestamp;
///
/// impl Behavior for Timestamp {
///     fn name(&self) -> &'static str { "Timestamp" }
///
///     fn before_save(&self, model: &mut ModelContext, settings: &Settings) -> Gate {
///         let field = settings.get_str("field").unwrap_or("modified");
///         model.data.insert(field.to_owned(), Value::Int(now()));
///         Gate::Proceed
///     }
/// }
/// ```
pub trait Behavior: Send + Sync + 'static {
    /// Unique behavior name.  Keys the [`BehaviorSet`][crate::BehaviorSet]
    /// and serves as the marker matched by
    /// [`TriggerOptions::break_on`][crate::TriggerOptions].
    fn name(&self) -> &'static str;

    /// Baseline settings for a fresh attachment.  Attach-time configuration
    /// is merged *over* these (new keys win, unmentioned keys persist).
    fn defaults(&self) -> Settings {
        Settings::new()
    }

    /// Called once per (model, config) attachment, after the settings merge.
    ///
    /// Return an error (conventionally [`BehaviorError::Rejected`]) to refuse
    /// the attachment; the registry then leaves its previous state untouched.
    fn setup(&self, _model: &str, _settings: &Settings) -> BehaviorResult<()> {
        Ok(())
    }

    /// Inspect or rewrite a find before it runs.  Default: proceed unchanged.
    fn before_find(
        &self,
        _model: &ModelContext,
        _query: &FindQuery,
        _settings: &Settings,
    ) -> FindDirective {
        FindDirective::Continue
    }

    /// Inspect or replace a find's result set.  Default: keep it.
    fn after_find(
        &self,
        _model: &ModelContext,
        _rows: &[Row],
        _settings: &Settings,
    ) -> ResultDirective {
        ResultDirective::Keep
    }

    /// Gate validation.  Hooks may mark fields invalid via
    /// [`ModelContext::invalidate`].  Default: proceed.
    fn before_validate(&self, _model: &mut ModelContext, _settings: &Settings) -> Gate {
        Gate::Proceed
    }

    /// Gate a save.  Runs after validation passes.  Default: proceed.
    fn before_save(&self, _model: &mut ModelContext, _settings: &Settings) -> Gate {
        Gate::Proceed
    }

    /// Notification after a successful save.  `created` is `true` for an
    /// insert, `false` for an update.
    fn after_save(&self, _model: &mut ModelContext, _created: bool, _settings: &Settings) {}

    /// Gate a delete.  `cascade` indicates dependent records go too.
    /// Default: proceed.
    fn before_delete(&self, _model: &mut ModelContext, _cascade: bool, _settings: &Settings) -> Gate {
        Gate::Proceed
    }

    /// Notification after a successful delete.
    fn after_delete(&self, _model: &mut ModelContext, _settings: &Settings) {}

    /// Custom-event hook for [`BehaviorRegistry::trigger`][crate::BehaviorRegistry::trigger].
    /// Default: opt out.
    fn on_event(&self, _model: &mut ModelContext, _event: &str, _settings: &Settings) -> Reply {
        Reply::Skip
    }

    /// Dynamic-method dispatch table, compiled once per attachment.
    /// Default: empty (the behavior exposes no methods).
    fn methods(&self) -> BehaviorResult<MethodMap> {
        Ok(MethodMap::new())
    }

    /// Invoke a method resolved through [`methods`][Self::methods].
    ///
    /// `method` is the resolved target name; pattern captures arrive as the
    /// leading elements of `args`.  The default rejects everything, which is
    /// correct for behaviors with an empty table.
    fn call(
        &self,
        _model: &mut ModelContext,
        method: &str,
        _args: &[Value],
        _settings: &Settings,
    ) -> BehaviorResult<Value> {
        Err(BehaviorError::UnknownMethod(
            self.name().to_owned(),
            method.to_owned(),
        ))
    }
}
