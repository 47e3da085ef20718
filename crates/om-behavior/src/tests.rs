//! Unit tests for om-behavior.

use std::collections::BTreeMap;
use std::sync::Arc;

use om_core::{Settings, Value};

use crate::{
    Behavior, BehaviorError, BehaviorResult, BehaviorSet, FindDirective, FindQuery, Gate,
    MethodMap, Model, ModelContext, NoopBehavior, Reply, ResultDirective, Row, TriggerOptions,
};

// ── Test behaviors ────────────────────────────────────────────────────────────

/// Shared hook logic for the three ordered test behaviors.
///
/// - `before_find`: `before = "halt"` halts, `before = "modify"` rewrites the
///   query to three fields with recursion disabled, anything else proceeds.
/// - `after_find`: `after = "empty"` replaces the result set with nothing.
/// - `on_event("beforeTest")`: replies with the behavior's own name.
fn scripted_before_find(query: &FindQuery, settings: &Settings) -> FindDirective {
    match settings.get_str("before") {
        Some("halt") => FindDirective::Halt,
        Some("modify") => {
            let mut q = query.clone();
            q.fields = vec!["id".into(), "name".into(), "mobile".into()];
            q.recursive = -1;
            FindDirective::Rewrite(q)
        }
        _ => FindDirective::Continue,
    }
}

fn scripted_after_find(settings: &Settings) -> ResultDirective {
    match settings.get_str("after") {
        Some("empty") => ResultDirective::Replace(Vec::new()),
        _ => ResultDirective::Keep,
    }
}

macro_rules! scripted_behavior {
    ($ty:ident, $name:literal) => {
        struct $ty;

        impl Behavior for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn defaults(&self) -> Settings {
                Settings::new().with("before", "on").with("after", "off")
            }

            fn setup(&self, _model: &str, settings: &Settings) -> BehaviorResult<()> {
                if settings.contains("reject") {
                    return Err(BehaviorError::Rejected {
                        name: $name.to_owned(),
                        reason: "reject flag set".to_owned(),
                    });
                }
                Ok(())
            }

            fn before_find(
                &self,
                _model: &ModelContext,
                query: &FindQuery,
                settings: &Settings,
            ) -> FindDirective {
                scripted_before_find(query, settings)
            }

            fn after_find(
                &self,
                _model: &ModelContext,
                _rows: &[Row],
                settings: &Settings,
            ) -> ResultDirective {
                scripted_after_find(settings)
            }

            fn on_event(
                &self,
                _model: &mut ModelContext,
                event: &str,
                _settings: &Settings,
            ) -> Reply {
                match event {
                    "beforeTest" => Reply::Value(Value::from($name)),
                    _ => Reply::Skip,
                }
            }
        }
    };
}

scripted_behavior!(TestBehavior, "TestBehavior");
scripted_behavior!(Test2Behavior, "Test2Behavior");
scripted_behavior!(Test3Behavior, "Test3Behavior");

/// Gates each lifecycle phase off a settings key (`"abort"` denies).
struct GateKeeper;

impl Behavior for GateKeeper {
    fn name(&self) -> &'static str {
        "GateKeeper"
    }

    fn before_validate(&self, _model: &mut ModelContext, settings: &Settings) -> Gate {
        gate_of(settings, "validate")
    }

    fn before_save(&self, _model: &mut ModelContext, settings: &Settings) -> Gate {
        gate_of(settings, "save")
    }

    fn before_delete(&self, _model: &mut ModelContext, _cascade: bool, settings: &Settings) -> Gate {
        gate_of(settings, "delete")
    }

    fn on_event(&self, _model: &mut ModelContext, event: &str, _settings: &Settings) -> Reply {
        match event {
            "beforeTest" => Reply::Halt,
            _ => Reply::Skip,
        }
    }
}

fn gate_of(settings: &Settings, key: &str) -> Gate {
    match settings.get_str(key) {
        Some("abort") => Gate::Abort,
        _ => Gate::Proceed,
    }
}

/// Marks `name` invalid when the pending data lacks it.
struct RequireName;

impl Behavior for RequireName {
    fn name(&self) -> &'static str {
        "RequireName"
    }

    fn before_validate(&self, model: &mut ModelContext, _settings: &Settings) -> Gate {
        if !model.data.contains_key("name") {
            model.invalidate("name", "name is required");
        }
        Gate::Proceed
    }
}

/// Stamps pending save data with a marker field.
struct Stamp;

impl Behavior for Stamp {
    fn name(&self) -> &'static str {
        "Stamp"
    }

    fn before_save(&self, model: &mut ModelContext, _settings: &Settings) -> Gate {
        model.data.insert("stamped".into(), Value::Bool(true));
        Gate::Proceed
    }
}

/// Exposes a literal method and a pattern-mapped family of methods.
struct Calculator;

impl Behavior for Calculator {
    fn name(&self) -> &'static str {
        "Calculator"
    }

    fn methods(&self) -> BehaviorResult<MethodMap> {
        MethodMap::new().literal("reset").pattern(r"^add(\d+)$", "add_constant")
    }

    fn call(
        &self,
        _model: &mut ModelContext,
        method: &str,
        args: &[Value],
        _settings: &Settings,
    ) -> BehaviorResult<Value> {
        match method {
            "reset" => Ok(Value::Int(0)),
            "add_constant" => {
                let constant: i64 = args[0].as_str().unwrap_or("0").parse().unwrap_or(0);
                let operand = args.get(1).and_then(Value::as_int).unwrap_or(0);
                Ok(Value::Int(constant + operand))
            }
            other => Err(BehaviorError::UnknownMethod(
                self.name().to_owned(),
                other.to_owned(),
            )),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn full_set() -> Arc<BehaviorSet> {
    Arc::new(
        BehaviorSet::new()
            .with(TestBehavior)
            .with(Test2Behavior)
            .with(Test3Behavior)
            .with(GateKeeper)
            .with(RequireName)
            .with(Stamp)
            .with(Calculator)
            .with(NoopBehavior),
    )
}

fn apple_model() -> Model {
    let mut model = Model::new("Apple", full_set());
    model.insert_row(
        Row::new()
            .with("Apple", "id", 1)
            .with("Apple", "name", "Red Apple")
            .with("Apple", "mobile", "yes")
            .with("Apple", "color", "red")
            .with("Sample", "id", 10)
            .with("Sample", "apple_id", 1),
    );
    model.insert_row(
        Row::new()
            .with("Apple", "id", 2)
            .with("Apple", "name", "Green Apple")
            .with("Apple", "mobile", "no")
            .with("Apple", "color", "green")
            .with("Sample", "id", 11)
            .with("Sample", "apple_id", 2),
    );
    model
}

// ── Attachment & settings ─────────────────────────────────────────────────────

#[cfg(test)]
mod attachment_tests {
    use super::*;

    #[test]
    fn attach_unknown_name_errors() {
        let mut model = Model::new("Apple", full_set());
        let err = model.behaviors.attach("NoSuchBehavior", Settings::new());
        assert!(matches!(err, Err(BehaviorError::Unknown(_))));
        assert!(model.behaviors.attached().is_empty());
    }

    #[test]
    fn attach_seeds_defaults_and_merges_config() {
        let mut model = Model::new("Apple", full_set());
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("before", "off"))
            .unwrap();

        let s = model.behaviors.settings("TestBehavior").unwrap();
        assert_eq!(s.get_str("before"), Some("off")); // config wins
        assert_eq!(s.get_str("after"), Some("off")); // default retained
    }

    #[test]
    fn reattach_merges_not_replaces() {
        let mut model = Model::new("Apple", full_set());
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("k2", "v2"))
            .unwrap();
        model
            .behaviors
            .attach(
                "TestBehavior",
                Settings::new().with("k3", "v3").with("before", "off"),
            )
            .unwrap();

        let s = model.behaviors.settings("TestBehavior").unwrap();
        assert_eq!(s.get_str("k2"), Some("v2"));
        assert_eq!(s.get_str("k3"), Some("v3"));
        assert_eq!(s.get_str("before"), Some("off"));
        // Still a single attachment.
        assert_eq!(model.behaviors.attached(), ["TestBehavior"]);
    }

    #[test]
    fn settings_isolated_between_models() {
        let set = full_set();
        let mut m1 = Model::new("Apple", Arc::clone(&set));
        let mut m2 = Model::new("Banana", set);

        m1.behaviors
            .attach("TestBehavior", Settings::new().with("before", "off"))
            .unwrap();
        m2.behaviors.attach("TestBehavior", Settings::new()).unwrap();

        assert_eq!(
            m1.behaviors.settings("TestBehavior").unwrap().get_str("before"),
            Some("off")
        );
        assert_eq!(
            m2.behaviors.settings("TestBehavior").unwrap().get_str("before"),
            Some("on")
        );
    }

    #[test]
    fn setup_rejection_leaves_registry_untouched() {
        let mut model = Model::new("Apple", full_set());
        let err = model
            .behaviors
            .attach("TestBehavior", Settings::new().with("reject", true));
        assert!(matches!(err, Err(BehaviorError::Rejected { .. })));
        assert!(model.behaviors.attached().is_empty());
    }

    #[test]
    fn setup_rejection_on_reattach_keeps_old_settings() {
        let mut model = Model::new("Apple", full_set());
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("k", "v"))
            .unwrap();
        let err = model
            .behaviors
            .attach("TestBehavior", Settings::new().with("reject", true));
        assert!(err.is_err());

        let s = model.behaviors.settings("TestBehavior").unwrap();
        assert_eq!(s.get_str("k"), Some("v"));
        assert!(!s.contains("reject"));
    }

    #[test]
    fn detach_discards_settings() {
        let mut model = Model::new("Apple", full_set());
        model.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        model.behaviors.detach("TestBehavior");

        assert!(model.behaviors.attached().is_empty());
        assert!(model.behaviors.settings("TestBehavior").is_none());
        // Detaching again is a no-op.
        model.behaviors.detach("TestBehavior");
    }

    #[test]
    fn enable_disable_toggle_without_losing_settings() {
        let mut model = Model::new("Apple", full_set());
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("k", "v"))
            .unwrap();

        model.behaviors.disable("TestBehavior").unwrap();
        assert!(!model.behaviors.is_enabled("TestBehavior"));
        assert_eq!(model.behaviors.attached(), ["TestBehavior"]);
        assert!(model.behaviors.enabled().is_empty());
        assert_eq!(
            model.behaviors.settings("TestBehavior").unwrap().get_str("k"),
            Some("v")
        );

        model.behaviors.enable("TestBehavior").unwrap();
        assert_eq!(model.behaviors.enabled(), ["TestBehavior"]);
    }

    #[test]
    fn enable_on_never_attached_errors() {
        let mut model = Model::new("Apple", full_set());
        assert!(matches!(
            model.behaviors.enable("TestBehavior"),
            Err(BehaviorError::NotAttached(_))
        ));
        assert!(matches!(
            model.behaviors.disable("TestBehavior"),
            Err(BehaviorError::NotAttached(_))
        ));
    }

    #[test]
    fn reattach_reenables_disabled_behavior() {
        let mut model = Model::new("Apple", full_set());
        model.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        model.behaviors.disable("TestBehavior").unwrap();

        model.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        assert!(model.behaviors.is_enabled("TestBehavior"));
    }

    #[test]
    fn enabled_state_independent_across_models() {
        let set = full_set();
        let mut m1 = Model::new("Apple", Arc::clone(&set));
        let mut m2 = Model::new("Banana", set);
        m1.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        m2.behaviors.attach("TestBehavior", Settings::new()).unwrap();

        m1.behaviors.disable("TestBehavior").unwrap();

        assert!(!m1.behaviors.is_enabled("TestBehavior"));
        assert!(m2.behaviors.is_enabled("TestBehavior"));
    }

    #[test]
    fn attachment_order_preserved() {
        let mut model = Model::new("Apple", full_set());
        model.behaviors.attach("Test2Behavior", Settings::new()).unwrap();
        model.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        model.behaviors.attach("Test3Behavior", Settings::new()).unwrap();

        assert_eq!(
            model.behaviors.attached(),
            ["Test2Behavior", "TestBehavior", "Test3Behavior"]
        );
    }
}

// ── Generic trigger ───────────────────────────────────────────────────────────

#[cfg(test)]
mod trigger_tests {
    use super::*;

    fn model_with_three() -> Model {
        let mut model = Model::new("Apple", full_set());
        model.behaviors.attach("TestBehavior", Settings::new()).unwrap();
        model.behaviors.attach("Test2Behavior", Settings::new()).unwrap();
        model.behaviors.attach("Test3Behavior", Settings::new()).unwrap();
        model
    }

    fn collected(model: &mut Model, options: &TriggerOptions) -> Vec<String> {
        let mut ctx = model.context().clone();
        model
            .behaviors
            .trigger(&mut ctx, "beforeTest", options)
            .values()
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn fan_out_in_attachment_order() {
        let mut model = model_with_three();
        assert_eq!(
            collected(&mut model, &TriggerOptions::new()),
            ["TestBehavior", "Test2Behavior", "Test3Behavior"]
        );
    }

    #[test]
    fn break_on_stops_after_matching_behavior() {
        let mut model = model_with_three();
        let options = TriggerOptions::new().break_on("Test2Behavior");
        assert_eq!(
            collected(&mut model, &options),
            ["TestBehavior", "Test2Behavior"]
        );
    }

    #[test]
    fn break_on_first_behavior() {
        let mut model = model_with_three();
        let options = TriggerOptions::new().break_on("TestBehavior");
        assert_eq!(collected(&mut model, &options), ["TestBehavior"]);
    }

    #[test]
    fn disabled_behavior_skipped_in_fan_out() {
        let mut model = model_with_three();
        model.behaviors.disable("Test2Behavior").unwrap();
        assert_eq!(
            collected(&mut model, &TriggerOptions::new()),
            ["TestBehavior", "Test3Behavior"]
        );
    }

    #[test]
    fn halt_reply_sets_halted_but_runs_all() {
        let mut model = model_with_three();
        // GateKeeper replies Halt to beforeTest; attach it in the middle.
        model.behaviors.detach("Test3Behavior");
        model.behaviors.attach("GateKeeper", Settings::new()).unwrap();
        model.behaviors.attach("Test3Behavior", Settings::new()).unwrap();

        let mut ctx = model.context().clone();
        let outcome = model
            .behaviors
            .trigger(&mut ctx, "beforeTest", &TriggerOptions::new());

        assert!(outcome.halted);
        // Test3Behavior still ran after the halt.
        assert_eq!(outcome.replies.len(), 4);
        assert_eq!(
            outcome.values().last().map(|v| v.to_string()),
            Some("Test3Behavior".to_owned())
        );
    }

    #[test]
    fn unknown_event_collects_nothing() {
        let mut model = model_with_three();
        let mut ctx = model.context().clone();
        let outcome = model
            .behaviors
            .trigger(&mut ctx, "afterTest", &TriggerOptions::new());
        assert!(outcome.replies.is_empty());
        assert!(!outcome.halted);
    }
}

// ── Find pipeline ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod find_tests {
    use super::*;

    #[test]
    fn plain_find_returns_all_entities() {
        let mut model = apple_model();
        let rows = model.find(FindQuery::new()).unwrap();
        assert_eq!(rows.len(), 2);
        // recursive = 1 keeps the associated Sample entity.
        assert!(rows[0].entity("Sample").is_some());
    }

    #[test]
    fn modify_rewrites_fields_and_recursion() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("before", "modify"))
            .unwrap();

        let rows = model.find(FindQuery::new()).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            // Associated entities stripped (recursion disabled).
            assert_eq!(row.entity_count(), 1);
            let fields: Vec<&str> = row.entity("Apple").unwrap().keys().map(String::as_str).collect();
            assert_eq!(fields, ["id", "mobile", "name"]);
        }
    }

    #[test]
    fn halt_aborts_find() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("before", "halt"))
            .unwrap();
        assert!(model.find(FindQuery::new()).is_none());
    }

    #[test]
    fn halt_skips_later_behaviors() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("before", "halt"))
            .unwrap();
        // Would rewrite the query, but never runs.
        model
            .behaviors
            .attach("Test2Behavior", Settings::new().with("before", "modify"))
            .unwrap();
        assert!(model.find(FindQuery::new()).is_none());
    }

    #[test]
    fn after_find_can_empty_the_result_set() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("after", "empty"))
            .unwrap();
        let rows = model.find(FindQuery::new()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn conditions_limit_and_dotted_keys() {
        let mut model = apple_model();
        let rows = model
            .find(FindQuery::new().condition("color", "green"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Apple", "id"), Some(&Value::Int(2)));

        let rows = model
            .find(FindQuery::new().condition("Sample.apple_id", 1))
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = model.find(FindQuery::new().limit(1)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn find_is_idempotent() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("TestBehavior", Settings::new().with("before", "modify"))
            .unwrap();
        let first = model.find(FindQuery::new()).unwrap();
        let second = model.find(FindQuery::new()).unwrap();
        assert_eq!(first, second);
    }
}

// ── Save / delete gates ───────────────────────────────────────────────────────

#[cfg(test)]
mod gate_tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn save_appends_row() {
        let mut model = apple_model();
        assert!(model.save(data(&[("name", "Yellow Apple")])));
        assert_eq!(model.row_count(), 3);
    }

    #[test]
    fn validate_abort_blocks_save() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("GateKeeper", Settings::new().with("validate", "abort"))
            .unwrap();
        assert!(!model.save(data(&[("name", "Nope")])));
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn invalidated_field_blocks_save() {
        let mut model = apple_model();
        model.behaviors.attach("RequireName", Settings::new()).unwrap();

        assert!(!model.save(data(&[("color", "blue")])));
        assert_eq!(model.row_count(), 2);
        let invalid: Vec<(&str, &str)> = model.context().invalid_fields().collect();
        assert_eq!(invalid, [("name", "name is required")]);

        assert!(model.save(data(&[("name", "Blue Apple")])));
        assert!(model.context().is_valid());
    }

    #[test]
    fn save_abort_blocks_insert() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("GateKeeper", Settings::new().with("save", "abort"))
            .unwrap();
        assert!(!model.save(data(&[("name", "Nope")])));
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn before_save_can_rewrite_pending_data() {
        let mut model = apple_model();
        model.behaviors.attach("Stamp", Settings::new()).unwrap();
        assert!(model.save(data(&[("name", "Stamped Apple")])));

        let rows = model
            .find(FindQuery::new().condition("name", "Stamped Apple"))
            .unwrap();
        assert_eq!(rows[0].get("Apple", "stamped"), Some(&Value::Bool(true)));
    }

    #[test]
    fn delete_abort_removes_nothing() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("GateKeeper", Settings::new().with("delete", "abort"))
            .unwrap();
        let conditions: BTreeMap<String, Value> = [("color".to_owned(), Value::from("red"))].into();
        assert!(!model.delete(&conditions, false));
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn delete_removes_matching_rows() {
        let mut model = apple_model();
        let conditions: BTreeMap<String, Value> = [("color".to_owned(), Value::from("red"))].into();
        assert!(model.delete(&conditions, true));
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn all_gates_run_even_after_an_abort() {
        // RequireName must still mark its field when GateKeeper (attached
        // first) has already aborted validation.
        let mut model = apple_model();
        model
            .behaviors
            .attach("GateKeeper", Settings::new().with("validate", "abort"))
            .unwrap();
        model.behaviors.attach("RequireName", Settings::new()).unwrap();

        assert!(!model.save(BTreeMap::new()));
        let invalid: Vec<(&str, &str)> = model.context().invalid_fields().collect();
        assert_eq!(invalid, [("name", "name is required")]);
    }

    #[test]
    fn disabled_gate_is_skipped() {
        let mut model = apple_model();
        model
            .behaviors
            .attach("GateKeeper", Settings::new().with("save", "abort"))
            .unwrap();
        model.behaviors.disable("GateKeeper").unwrap();
        assert!(model.save(data(&[("name", "Fine")])));
    }
}

// ── Dynamic-method dispatch ───────────────────────────────────────────────────

#[cfg(test)]
mod dispatch_tests {
    use super::*;
    use crate::Dispatch;

    fn calculator_model() -> Model {
        let mut model = Model::new("Apple", full_set());
        model.behaviors.attach("Calculator", Settings::new()).unwrap();
        model
    }

    #[test]
    fn literal_method() {
        let mut model = calculator_model();
        let out = model.call("reset", &[]).unwrap();
        assert_eq!(out, Dispatch::Handled(Value::Int(0)));
    }

    #[test]
    fn pattern_method_forwards_captures() {
        let mut model = calculator_model();
        let out = model.call("add40", &[Value::Int(2)]).unwrap();
        assert_eq!(out, Dispatch::Handled(Value::Int(42)));
    }

    #[test]
    fn unrecognized_method_returns_unhandled() {
        let mut model = calculator_model();
        let out = model.call("multiply3", &[]).unwrap();
        assert_eq!(out, Dispatch::Unhandled);
    }

    #[test]
    fn no_behaviors_means_unhandled() {
        let mut model = Model::new("Apple", full_set());
        assert_eq!(model.call("reset", &[]).unwrap(), Dispatch::Unhandled);
    }

    #[test]
    fn disabled_behavior_does_not_dispatch() {
        let mut model = calculator_model();
        model.behaviors.disable("Calculator").unwrap();
        assert_eq!(model.call("reset", &[]).unwrap(), Dispatch::Unhandled);
    }

    #[test]
    fn literal_beats_earlier_pattern_across_behaviors() {
        struct Wildcard;
        impl Behavior for Wildcard {
            fn name(&self) -> &'static str {
                "Wildcard"
            }
            fn methods(&self) -> BehaviorResult<MethodMap> {
                MethodMap::new().pattern(r"^do(\w+)$", "catch_all")
            }
            fn call(
                &self,
                _model: &mut ModelContext,
                _method: &str,
                _args: &[Value],
                _settings: &Settings,
            ) -> BehaviorResult<Value> {
                Ok(Value::from("pattern"))
            }
        }

        struct Doer;
        impl Behavior for Doer {
            fn name(&self) -> &'static str {
                "Doer"
            }
            fn methods(&self) -> BehaviorResult<MethodMap> {
                Ok(MethodMap::new().literal("doIt"))
            }
            fn call(
                &self,
                _model: &mut ModelContext,
                _method: &str,
                _args: &[Value],
                _settings: &Settings,
            ) -> BehaviorResult<Value> {
                Ok(Value::from("literal"))
            }
        }

        let set = Arc::new(BehaviorSet::new().with(Wildcard).with(Doer));
        let mut model = Model::new("Apple", set);
        model.behaviors.attach("Wildcard", Settings::new()).unwrap();
        model.behaviors.attach("Doer", Settings::new()).unwrap();

        // Doer's literal owns the name even though Wildcard attached first
        // and its pattern also matches.
        assert_eq!(
            model.call("doIt", &[]).unwrap(),
            Dispatch::Handled(Value::from("literal"))
        );
        // Names no literal claims still reach the pattern.
        assert_eq!(
            model.call("doOther", &[]).unwrap(),
            Dispatch::Handled(Value::from("pattern"))
        );
    }

    #[test]
    fn malformed_pattern_fails_at_attach() {
        struct BadTable;
        impl Behavior for BadTable {
            fn name(&self) -> &'static str {
                "BadTable"
            }
            fn methods(&self) -> BehaviorResult<MethodMap> {
                MethodMap::new().pattern("([unclosed", "x")
            }
        }

        let set = Arc::new(BehaviorSet::new().with(BadTable));
        let mut model = Model::new("Apple", set);
        assert!(matches!(
            model.behaviors.attach("BadTable", Settings::new()),
            Err(BehaviorError::Pattern(_))
        ));
    }
}

// ── MethodMap ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod method_map_tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        let map = MethodMap::new().literal("flush");
        let r = map.resolve("flush").unwrap();
        assert_eq!(r.target, "flush");
        assert!(r.captures.is_empty());
    }

    #[test]
    fn literal_wins_over_pattern() {
        let map = MethodMap::new()
            .literal("add1")
            .pattern(r"^add(\d+)$", "add_constant")
            .unwrap();
        assert_eq!(map.resolve("add1").unwrap().target, "add1");
        assert_eq!(map.resolve("add2").unwrap().target, "add_constant");
    }

    #[test]
    fn first_matching_pattern_wins() {
        let map = MethodMap::new()
            .pattern(r"^do(\w+)$", "first")
            .unwrap()
            .pattern(r"^doThing$", "second")
            .unwrap();
        let r = map.resolve("doThing").unwrap();
        assert_eq!(r.target, "first");
        assert_eq!(r.captures, [Value::Str("Thing".into())]);
    }

    #[test]
    fn no_match_is_none() {
        let map = MethodMap::new().pattern(r"^add(\d+)$", "add").unwrap();
        assert!(map.resolve("subtract1").is_none());
        assert!(MethodMap::new().resolve("anything").is_none());
    }
}

// ── NoopBehavior ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod noop_tests {
    use super::*;

    #[test]
    fn noop_attaches_and_intercepts_nothing() {
        let mut model = apple_model();
        model.behaviors.attach("Noop", Settings::new()).unwrap();

        assert_eq!(model.find(FindQuery::new()).unwrap().len(), 2);
        assert!(model.save([("name".to_owned(), Value::from("x"))].into()));
        assert_eq!(model.call("whatever", &[]).unwrap(), crate::Dispatch::Unhandled);
    }
}
