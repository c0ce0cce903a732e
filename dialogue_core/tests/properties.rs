//! Behavior of values, variables, contexts and the compiler as seen by callers.

use std::collections::HashSet;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use dialogue_core::channel;
use dialogue_core::{
    clone_context, load_value, read_int_var, read_var_value, share_world, write_var_info,
    write_var_value, ActorHandle, Condition, Dialogue, DurationOrVar, IntOrVar, IntOrVarPart,
    LoadError, MissionGoalContext, Ranged, StrOrVar, TalkContext, ValueSource, VarInfo, VarScope,
};
use game_rules::{Calendar, Character, Item, TimeDuration, Tripoint, WorldState};
use serde_json::json;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` and return what it logged.
fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
    (result, text)
}

fn dialogue() -> Dialogue {
    let mut state = WorldState::new();
    let player = state.add_player(Character::new("Survivor"));
    let npc = state.add_character(Character::new_npc(
        "Trader",
        game_rules::NpcProfile::new("NC_TRADER"),
    ));
    Dialogue::new(
        share_world(state),
        Some(ActorHandle::Creature(player)),
        Some(ActorHandle::Creature(npc)),
    )
}

#[test]
fn test_literal_ignores_context() {
    let value: IntOrVarPart<Dialogue> = load_value(&json!(17), "value").unwrap();
    let text: StrOrVar<Dialogue> = load_value(&json!("swamp"), "value").unwrap();

    let busy = dialogue();
    write_var_info(&VarInfo::new(VarScope::Global, "npctalk_var_x"), &busy, "99");
    let empty = Dialogue::new(share_world(WorldState::new()), None, None);

    for d in [&busy, &empty] {
        assert_eq!(value.evaluate(d), 17);
        assert_eq!(text.evaluate(d), "swamp");
    }
}

#[test]
fn test_variable_value_and_default() {
    let d = dialogue();
    let value: IntOrVarPart<Dialogue> =
        load_value(&json!({ "npc_val": "favor", "default": 2 }), "value").unwrap();
    assert_eq!(value.evaluate(&d), 2);

    write_var_info(&VarInfo::new(VarScope::Npc, "npctalk_var_favor"), &d, "5");
    assert_eq!(value.evaluate(&d), 5);
}

#[test]
fn test_empty_variable_without_default_is_zero_and_logged() {
    let d = dialogue();
    let value: IntOrVarPart<Dialogue> = ValueSource::Var {
        var: VarInfo::new(VarScope::U, "npctalk_var_unset"),
        default: None,
    };
    let text: StrOrVar<Dialogue> = ValueSource::Var {
        var: VarInfo::new(VarScope::U, "npctalk_var_unset"),
        default: None,
    };

    let ((number, string), logs) = with_captured_logs(|| (value.evaluate(&d), text.evaluate(&d)));
    assert_eq!(number, 0);
    assert_eq!(string, "");
    assert!(logs.contains("npctalk_var_unset"), "missing diagnostic in {:?}", logs);
    assert!(logs.contains("no default"));
}

#[test]
fn test_unparsable_variable_is_zero_and_logged() {
    let d = dialogue();
    write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_wait"), &d, "-30");
    let duration: DurationOrVar<Dialogue> = Ranged::Single(ValueSource::Var {
        var: VarInfo::new(VarScope::U, "npctalk_var_wait"),
        default: Some(TimeDuration::from_turns(5)),
    });

    let (result, logs) = with_captured_logs(|| duration.evaluate(&d));
    assert_eq!(result, TimeDuration::ZERO);
    assert!(logs.contains("negative duration"));
}

#[test]
fn test_fixed_pair_always_yields_its_value() {
    let d = dialogue();
    let jo = json!({ "n": [5, 5] }).as_object().cloned().unwrap();
    let range: IntOrVar<Dialogue> = dialogue_core::get_int_or_var(&jo, "n", true, 0).unwrap();
    for _ in 0..1000 {
        assert_eq!(range.evaluate(&d), 5);
    }
}

#[test]
fn test_pair_covers_its_range() {
    let d = dialogue();
    let jo = json!({ "n": [1, 3] }).as_object().cloned().unwrap();
    let range: IntOrVar<Dialogue> = dialogue_core::get_int_or_var(&jo, "n", true, 0).unwrap();

    let seen: HashSet<i32> = (0..1000).map(|_| range.evaluate(&d)).collect();
    assert_eq!(seen, HashSet::from([1, 2, 3]));
}

#[test]
fn test_pair_resamples_variable_bounds() {
    let d = dialogue();
    let jo = json!({ "n": [{ "global_val": "low", "default": 0 }, { "global_val": "high", "default": 0 }] })
        .as_object()
        .cloned()
        .unwrap();
    let range: IntOrVar<Dialogue> = dialogue_core::get_int_or_var(&jo, "n", true, 0).unwrap();
    assert_eq!(range.evaluate(&d), 0);

    write_var_info(&VarInfo::new(VarScope::Global, "npctalk_var_low"), &d, "8");
    write_var_info(&VarInfo::new(VarScope::Global, "npctalk_var_high"), &d, "8");
    assert_eq!(range.evaluate(&d), 8);
}

#[test]
fn test_write_then_read_round_trip() {
    let d = dialogue();
    let npc = d.actor(true);
    write_var_value(d.world(), VarScope::Npc, "npctalk_var_bribe", npc, "7");

    let info = VarInfo::new(VarScope::Npc, "npctalk_var_bribe");
    assert_eq!(read_var_value(&info, &d), "7");

    let value: IntOrVarPart<Dialogue> = ValueSource::Var {
        var: info,
        default: Some(0),
    };
    assert_eq!(value.evaluate(&d), 7);
}

#[test]
fn test_clone_into_other_shape_keeps_missing_slots() {
    let mut state = WorldState::new();
    let player = state.add_player(Character::new("Survivor"));
    let goal = MissionGoalContext::new(share_world(state), Some(ActorHandle::Creature(player)), None);

    let d: Dialogue = clone_context(&goal);
    assert!(d.has_alpha());
    assert!(!d.has_beta());
    assert_eq!(d.actor(false).and_then(|t| t.get_creature()), Some(player));
}

#[test]
fn test_clone_same_shape_is_equivalent() {
    let mut state = WorldState::new();
    let mut player = Character::new("Survivor");
    player.stats.strength = 14;
    player.position = Tripoint::new(2, 2, 0);
    let player = state.add_player(player);
    let lamp = state.add_item(Item::new("oil_lamp").with_flag("LIGHT"), Tripoint::new(2, 3, 0));
    let d = Dialogue::new(
        share_world(state),
        Some(ActorHandle::Creature(player)),
        Some(ActorHandle::Item(dialogue_core::ItemLocation::Ground(lamp))),
    );
    let copy: Dialogue = clone_context(&d);

    for config in [
        json!({ "u_has_strength": 12 }),
        json!({ "u_has_strength": 15 }),
        json!({ "npc_has_flag": "LIGHT" }),
        json!("npc_male"),
        json!("u_is_outside"),
    ] {
        let condition = Condition::<Dialogue>::load(&config).unwrap();
        assert_eq!(condition.evaluate(&d), condition.evaluate(&copy), "{}", config);
    }
}

#[test]
fn test_unknown_key_fails_to_compile() {
    let result = Condition::<Dialogue>::load(&json!("unknown-key"));
    assert!(matches!(result, Err(LoadError::UnknownCondition(key)) if key == "unknown-key"));
}

#[test]
fn test_computed_value_reads_effect_result() {
    let d = dialogue();
    let answer: IntOrVarPart<Dialogue> = ValueSource::Computed {
        effect: Rc::new(|d: &Dialogue| write_var_info(&VarInfo::temp_var(), d, "42")),
        default: None,
    };
    assert_eq!(answer.evaluate(&d), 42);
    assert_eq!(channel::open_frames(), 0);
}

#[test]
fn test_computed_value_without_result_is_zero_and_logged() {
    let d = dialogue();
    let silent: IntOrVarPart<Dialogue> = ValueSource::Computed {
        effect: Rc::new(|_: &Dialogue| {}),
        default: None,
    };
    let (result, logs) = with_captured_logs(|| silent.evaluate(&d));
    assert_eq!(result, 0);
    assert!(logs.contains("computed value"), "missing diagnostic in {:?}", logs);

    let with_default: IntOrVarPart<Dialogue> = load_value(
        &json!({ "effect": { "set_string_var": "x", "target_var": { "global_val": "other" } }, "default": 9 }),
        "value",
    )
    .unwrap();
    assert_eq!(with_default.evaluate(&d), 9);
}

#[test]
fn test_nested_computed_values_do_not_clobber() {
    let d = dialogue();
    // The first step reports 42; the second assigns a variable from its own
    // computed value, which must not overwrite the outer result.
    let value: IntOrVarPart<Dialogue> = load_value(
        &json!({
            "effect": [
                { "arithmetic": [{ "const": 42 }] },
                { "arithmetic": [{ "global_val": "side" }, "=", { "arithmetic": [{ "const": 1 }] }] }
            ]
        }),
        "value",
    )
    .unwrap();

    assert_eq!(value.evaluate(&d), 42);
    assert_eq!(
        read_var_value(&VarInfo::new(VarScope::Global, "npctalk_var_side"), &d),
        "1"
    );
    assert_eq!(channel::open_frames(), 0);
}

#[test]
fn test_variable_predicates_are_idempotent() {
    let d = dialogue();
    write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_rep"), &d, "4");
    let condition = Condition::<Dialogue>::load(
        &json!({ "u_compare_var": "rep", "op": ">=", "value": { "global_val": "bar", "default": 3 } }),
    )
    .unwrap();

    let first = condition.evaluate(&d);
    let second = condition.evaluate(&d);
    assert!(first);
    assert_eq!(first, second);
}

#[test]
fn test_computed_predicates_may_mutate() {
    let d = dialogue();
    // Each evaluation bumps the counter before comparing it.
    let condition = Condition::<Dialogue>::load(&json!({
        "compare_int": [
            { "effect": [
                { "arithmetic": [{ "global_val": "count" }, "++"] },
                { "arithmetic": [{ "global_val": "count", "default": 0 }] }
            ] },
            { "const": 1 }
        ],
        "op": "=="
    }))
    .unwrap();

    assert!(condition.evaluate(&d));
    assert!(!condition.evaluate(&d));
}

#[test]
fn test_extreme_stored_turn_is_false_and_logged() {
    let mut state = WorldState::new();
    state.calendar = Calendar::new(1000, 0);
    let player = state.add_player(Character::new("Survivor"));
    let d = Dialogue::new(share_world(state), Some(ActorHandle::Creature(player)), None);
    write_var_info(
        &VarInfo::new(VarScope::U, "npctalk_var_met"),
        &d,
        "-9223372036854775807",
    );

    let since = Condition::<Dialogue>::load(
        &json!({ "u_compare_time_since_var": "met", "op": ">", "time": 5 }),
    )
    .unwrap();
    let getter = dialogue_core::get_get_int::<Dialogue>(
        &json!({ "u_val": "time_since_var", "var_name": "met" }),
        "value",
    )
    .unwrap();

    let ((matched, elapsed), logs) = with_captured_logs(|| (since.evaluate(&d), getter(&d)));
    assert!(!matched);
    assert_eq!(elapsed, -1);
    assert!(logs.contains("out of range"), "missing diagnostic in {:?}", logs);
}

#[test]
fn test_oversized_duration_literal_fails_to_load() {
    let result = Condition::<Dialogue>::load(&json!({
        "u_compare_time_since_var": "met",
        "op": ">",
        "time": "999999999999999 d"
    }));
    assert!(matches!(result, Err(LoadError::Duration { .. })));
}

#[test]
fn test_unparsable_default_is_zero_and_logged() {
    let d = dialogue();
    let var = VarInfo::new(VarScope::U, "npctalk_var_unset").with_default("abc");

    let (value, logs) = with_captured_logs(|| read_int_var(&var, &d));
    assert_eq!(value, 0);
    assert!(logs.contains("default of variable"), "missing diagnostic in {:?}", logs);

    let stepped = dialogue_core::load_effect::<Dialogue>(
        &json!({ "arithmetic": [{ "u_val": "x", "default": "abc" }, "++"] }),
    );
    assert!(stepped.is_err());
}

#[test]
fn test_integer_extremes_do_not_panic() {
    let d = dialogue();
    let wide = json!({ "n": [i32::MIN, i32::MAX] }).as_object().cloned().unwrap();
    let wide: IntOrVar<Dialogue> = dialogue_core::get_int_or_var(&wide, "n", true, 0).unwrap();
    for _ in 0..100 {
        wide.evaluate(&d);
    }
    let top = json!({ "n": [i32::MAX, i32::MAX] }).as_object().cloned().unwrap();
    let top: IntOrVar<Dialogue> = dialogue_core::get_int_or_var(&top, "n", true, 0).unwrap();
    assert_eq!(top.evaluate(&d), i32::MAX);

    let ordered = Condition::<Dialogue>::load(&json!({
        "compare_int": [{ "const": i32::MIN }, { "const": i32::MAX }],
        "op": "<"
    }))
    .unwrap();
    assert!(ordered.evaluate(&d));

    let overflow = Condition::<Dialogue>::load(&json!({
        "compare_int": [
            { "arithmetic": [{ "const": i32::MAX }, "+", { "const": 1 }] },
            { "const": 0 }
        ],
        "op": "=="
    }))
    .unwrap();
    let (matched, logs) = with_captured_logs(|| overflow.evaluate(&d));
    assert!(matched);
    assert!(logs.contains("undefined"), "missing diagnostic in {:?}", logs);
}
