//! Typed value expressions.
//!
//! Every string, integer and duration parameter in content is one of three
//! flavors, captured by [`ValueSource`]:
//!
//! - a literal baked in at load time
//! - a variable reference with a fallback for when the variable is empty
//! - a computed value: an effect is run and its result read back through
//!   the arithmetic channel
//!
//! Integers and durations may instead be a `[min, max]` pair, see [`Ranged`].
//!
//! Evaluation never fails. Empty text with no fallback, or text that does not
//! parse, is reported through `tracing` and yields the type's zero value.

use std::fmt;
use std::rc::Rc;

use game_rules::{BodyPart, Character, TimeDuration};
use serde_json::Value;

use crate::channel;
use crate::dialogue::TalkContext;
use crate::effect::{self, Effect};
use crate::error::{LoadError, LoadResult};
use crate::json::{as_int, to_i32, JsonObject, JsonObjectExt};
use crate::rng::RandomSource;
use crate::talker::query_character;
use crate::vars::{read_var_info, read_var_value, talk_var_basename, VarInfo, VarScope};

/// A scalar type that can be stored as variable text.
pub trait VarValue: Clone + fmt::Debug + 'static {
    /// Type name used in diagnostics.
    const KIND: &'static str;

    fn zero() -> Self;

    /// Parse variable text. Errors carry a human readable reason.
    fn parse_text(text: &str) -> Result<Self, String>;

    /// Read an authored literal.
    fn from_json(value: &Value, member: &str) -> LoadResult<Self>;
}

impl VarValue for String {
    const KIND: &'static str = "string";

    fn zero() -> Self {
        String::new()
    }

    fn parse_text(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn from_json(value: &Value, member: &str) -> LoadResult<Self> {
        crate::json::as_str(value, member).map(str::to_string)
    }
}

impl VarValue for i32 {
    const KIND: &'static str = "integer";

    fn zero() -> Self {
        0
    }

    fn parse_text(text: &str) -> Result<Self, String> {
        text.trim()
            .parse()
            .map_err(|e| format!("'{}' is not an integer: {}", text, e))
    }

    fn from_json(value: &Value, member: &str) -> LoadResult<Self> {
        to_i32(as_int(value, member)?, member)
    }
}

impl VarValue for TimeDuration {
    const KIND: &'static str = "duration";

    fn zero() -> Self {
        TimeDuration::ZERO
    }

    /// Stored durations are turn counts and must not be negative.
    fn parse_text(text: &str) -> Result<Self, String> {
        let turns: i64 = text
            .trim()
            .parse()
            .map_err(|e| format!("'{}' is not a turn count: {}", text, e))?;
        if turns < 0 {
            return Err(format!("negative duration of {} turns", turns));
        }
        Ok(TimeDuration::from_turns(turns))
    }

    /// Literals are either turn counts or strings like `"1 h 30 m"`, and
    /// must not be negative.
    fn from_json(value: &Value, member: &str) -> LoadResult<Self> {
        let duration = match value {
            Value::String(text) => {
                TimeDuration::parse(text).map_err(|source| LoadError::Duration {
                    member: member.to_string(),
                    source,
                })?
            }
            _ => TimeDuration::from_turns(as_int(value, member)?),
        };
        if duration < TimeDuration::ZERO {
            return Err(LoadError::invalid(
                member,
                format!("negative duration of {}", duration),
            ));
        }
        Ok(duration)
    }
}

/// One typed value: literal, variable-backed or computed.
pub enum ValueSource<V, T> {
    Literal(V),
    Var {
        var: VarInfo,
        default: Option<V>,
    },
    Computed {
        effect: Effect<T>,
        default: Option<V>,
    },
}

pub type StrOrVar<T> = ValueSource<String, T>;
pub type IntOrVarPart<T> = ValueSource<i32, T>;
pub type DurationOrVarPart<T> = ValueSource<TimeDuration, T>;

impl<V: Clone, T> Clone for ValueSource<V, T> {
    fn clone(&self) -> Self {
        match self {
            ValueSource::Literal(value) => ValueSource::Literal(value.clone()),
            ValueSource::Var { var, default } => ValueSource::Var {
                var: var.clone(),
                default: default.clone(),
            },
            ValueSource::Computed { effect, default } => ValueSource::Computed {
                effect: effect.clone(),
                default: default.clone(),
            },
        }
    }
}

impl<V: fmt::Debug, T> fmt::Debug for ValueSource<V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ValueSource::Var { var, default } => f
                .debug_struct("Var")
                .field("var", var)
                .field("default", default)
                .finish(),
            ValueSource::Computed { default, .. } => f
                .debug_struct("Computed")
                .field("default", default)
                .finish_non_exhaustive(),
        }
    }
}

impl<V: VarValue, T: TalkContext> ValueSource<V, T> {
    pub fn literal(value: V) -> Self {
        ValueSource::Literal(value)
    }

    pub fn evaluate(&self, d: &T) -> V {
        match self {
            ValueSource::Literal(value) => value.clone(),
            ValueSource::Var { var, default } => {
                let text = read_var_value(var, d);
                resolve_text(&text, default.as_ref(), || format!("variable '{}'", var.name))
            }
            ValueSource::Computed { effect, default } => {
                let text = channel::evaluate_computed(effect, d);
                resolve_text(&text, default.as_ref(), || "computed value".to_string())
            }
        }
    }
}

fn resolve_text<V: VarValue>(text: &str, default: Option<&V>, source: impl Fn() -> String) -> V {
    if text.is_empty() {
        return match default {
            Some(value) => value.clone(),
            None => {
                tracing::error!(
                    "No {} value for {}: it is empty and has no default",
                    V::KIND,
                    source()
                );
                V::zero()
            }
        };
    }
    V::parse_text(text).unwrap_or_else(|reason| {
        tracing::error!("Bad {} value for {}: {}", V::KIND, source(), reason);
        V::zero()
    })
}

/// Read an integer variable. Empty text falls back to its default, or 0.
pub fn read_int_var<T: TalkContext + ?Sized>(var: &VarInfo, d: &T) -> i32 {
    let text = read_var_value(var, d);
    if text.is_empty() {
        return match var.default.as_deref() {
            Some(default) => resolve_text(default, Some(&0), || {
                format!("default of variable '{}'", var.name)
            }),
            None => 0,
        };
    }
    resolve_text(&text, None, || format!("variable '{}'", var.name))
}

/// Values that can be drawn uniformly from an inclusive range.
pub trait RangeValue: VarValue {
    fn sample(rng: &dyn RandomSource, min: &Self, max: &Self) -> Self;
}

impl RangeValue for i32 {
    fn sample(rng: &dyn RandomSource, min: &Self, max: &Self) -> Self {
        clamp_i32(rng.rng(i64::from(*min), i64::from(*max)))
    }
}

impl RangeValue for TimeDuration {
    fn sample(rng: &dyn RandomSource, min: &Self, max: &Self) -> Self {
        TimeDuration::from_turns(rng.rng(min.to_turns(), max.to_turns()))
    }
}

/// A single value or a `[min, max]` pair sampled on every evaluation.
pub enum Ranged<V, T> {
    Single(ValueSource<V, T>),
    Pair {
        min: ValueSource<V, T>,
        max: ValueSource<V, T>,
    },
}

pub type IntOrVar<T> = Ranged<i32, T>;
pub type DurationOrVar<T> = Ranged<TimeDuration, T>;

impl<V: Clone, T> Clone for Ranged<V, T> {
    fn clone(&self) -> Self {
        match self {
            Ranged::Single(value) => Ranged::Single(value.clone()),
            Ranged::Pair { min, max } => Ranged::Pair {
                min: min.clone(),
                max: max.clone(),
            },
        }
    }
}

impl<V: fmt::Debug, T> fmt::Debug for Ranged<V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ranged::Single(value) => f.debug_tuple("Single").field(value).finish(),
            Ranged::Pair { min, max } => f
                .debug_struct("Pair")
                .field("min", min)
                .field("max", max)
                .finish(),
        }
    }
}

impl<V: RangeValue, T: TalkContext> Ranged<V, T> {
    pub fn literal(value: V) -> Self {
        Ranged::Single(ValueSource::Literal(value))
    }

    /// Both ends of a pair are resolved again on every call.
    pub fn evaluate(&self, d: &T) -> V {
        match self {
            Ranged::Single(value) => value.evaluate(d),
            Ranged::Pair { min, max } => {
                let min = min.evaluate(d);
                let max = max.evaluate(d);
                V::sample(d.rng().as_ref(), &min, &max)
            }
        }
    }
}

const COMPUTED_MEMBERS: [&str; 2] = ["arithmetic", "effect"];

/// Compile one value from its authored form.
pub fn load_value<V, T>(jv: &Value, member: &str) -> LoadResult<ValueSource<V, T>>
where
    V: VarValue,
    T: TalkContext + 'static,
{
    let Some(jo) = jv.as_object() else {
        return Ok(ValueSource::Literal(V::from_json(jv, member)?));
    };

    let flavors: Vec<&str> = COMPUTED_MEMBERS
        .into_iter()
        .chain(VarScope::MEMBERS.iter().map(|(key, _)| *key))
        .filter(|key| jo.contains_key(*key))
        .collect();
    if flavors.len() > 1 {
        return Err(LoadError::invalid(
            member,
            format!("conflicting value sources: {}", flavors.join(", ")),
        ));
    }

    let default = jo
        .get("default")
        .map(|value| V::from_json(value, "default"))
        .transpose()?;
    match flavors.first().copied() {
        Some("arithmetic") => Ok(ValueSource::Computed {
            effect: effect::arithmetic(jo.get_array("arithmetic")?)?,
            default,
        }),
        Some("effect") => Ok(ValueSource::Computed {
            effect: effect::load_effect(jo.member("effect")?)?,
            default,
        }),
        Some(_) => Ok(ValueSource::Var {
            var: read_var_info(jo, true)?,
            default,
        }),
        None => Err(LoadError::invalid(
            member,
            "expected a literal, a variable reference or a computed value",
        )),
    }
}

/// Compile a value or a `[min, max]` pair.
pub fn load_ranged<V, T>(jv: &Value, member: &str) -> LoadResult<Ranged<V, T>>
where
    V: RangeValue,
    T: TalkContext + 'static,
{
    match jv.as_array().map(Vec::as_slice) {
        Some([min, max]) => Ok(Ranged::Pair {
            min: load_value(min, member)?,
            max: load_value(max, member)?,
        }),
        Some(_) => Err(LoadError::invalid(member, "expected a [min, max] pair")),
        None => Ok(Ranged::Single(load_value(jv, member)?)),
    }
}

fn get_part<V, T>(jo: &JsonObject, member: &str, required: bool, default_val: V) -> LoadResult<ValueSource<V, T>>
where
    V: VarValue,
    T: TalkContext + 'static,
{
    match jo.get(member) {
        Some(jv) => load_value(jv, member),
        None if required => Err(LoadError::missing(member)),
        None => Ok(ValueSource::Literal(default_val)),
    }
}

fn get_ranged<V, T>(jo: &JsonObject, member: &str, required: bool, default_val: V) -> LoadResult<Ranged<V, T>>
where
    V: RangeValue,
    T: TalkContext + 'static,
{
    match jo.get(member) {
        Some(jv) => load_ranged(jv, member),
        None if required => Err(LoadError::missing(member)),
        None => Ok(Ranged::literal(default_val)),
    }
}

pub fn get_str_or_var<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    required: bool,
    default_val: &str,
) -> LoadResult<StrOrVar<T>> {
    get_part(jo, member, required, default_val.to_string())
}

pub fn get_int_or_var_part<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    required: bool,
    default_val: i32,
) -> LoadResult<IntOrVarPart<T>> {
    get_part(jo, member, required, default_val)
}

pub fn get_int_or_var<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    required: bool,
    default_val: i32,
) -> LoadResult<IntOrVar<T>> {
    get_ranged(jo, member, required, default_val)
}

pub fn get_duration_or_var_part<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    required: bool,
    default_val: TimeDuration,
) -> LoadResult<DurationOrVarPart<T>> {
    get_part(jo, member, required, default_val)
}

pub fn get_duration_or_var<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    required: bool,
    default_val: TimeDuration,
) -> LoadResult<DurationOrVar<T>> {
    get_ranged(jo, member, required, default_val)
}

/// Integer operand of `compare_int` and `arithmetic`.
pub type IntGetter<T> = Rc<dyn Fn(&T) -> i32>;

pub(crate) fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Compile an integer operand.
///
/// Besides any int-or-var form this accepts `{"const": n}`, `{"rand": n}`,
/// `{"time": "now"}`, `{"weather": "temperature"}` and actor readings such as
/// `{"u_val": "strength"}` or `{"npc_val": "var", "var_name": "trust"}`.
pub fn get_get_int<T: TalkContext + 'static>(jv: &Value, member: &str) -> LoadResult<IntGetter<T>> {
    if let Some(jo) = jv.as_object() {
        if let Some(value) = jo.get("const") {
            let value = to_i32(as_int(value, "const")?, "const")?;
            return Ok(Rc::new(move |_: &T| value));
        }
        if jo.contains_key("time") {
            return time_getter(jo.get_str("time")?);
        }
        if jo.contains_key("weather") {
            return weather_getter(jo.get_str("weather")?);
        }
        if jo.contains_key("rand") {
            let max = jo.get_int("rand")?;
            return Ok(Rc::new(move |d: &T| clamp_i32(d.rng().rng(0, max))));
        }
        for (key, is_npc) in [("u_val", false), ("npc_val", true)] {
            if let Some(keyword) = jo.get(key).and_then(Value::as_str) {
                if let Some(getter) = talker_getter(keyword, jo, is_npc)? {
                    return Ok(getter);
                }
            }
        }
    }
    let value: IntOrVar<T> = load_ranged(jv, member)?;
    Ok(Rc::new(move |d: &T| value.evaluate(d)))
}

fn time_getter<T: TalkContext + 'static>(what: &str) -> LoadResult<IntGetter<T>> {
    let read: fn(&game_rules::Calendar) -> i64 = match what {
        "now" => |calendar| calendar.turn,
        "cataclysm" => |calendar| calendar.time_since_cataclysm().to_turns(),
        "days_since_cataclysm" => |calendar| calendar.days_since_cataclysm(),
        "hour" => |calendar| calendar.hour(),
        _ => return Err(LoadError::invalid("time", format!("unknown time reading '{}'", what))),
    };
    Ok(Rc::new(move |d: &T| clamp_i32(read(&d.world().borrow().calendar))))
}

fn weather_getter<T: TalkContext + 'static>(what: &str) -> LoadResult<IntGetter<T>> {
    let read: fn(&game_rules::Environment) -> i32 = match what {
        "temperature" => |env| env.temperature,
        "windpower" => |env| env.windpower,
        "humidity" => |env| env.humidity,
        "pressure" => |env| env.pressure,
        _ => {
            return Err(LoadError::invalid(
                "weather",
                format!("unknown weather reading '{}'", what),
            ))
        }
    };
    Ok(Rc::new(move |d: &T| read(&d.world().borrow().environment)))
}

/// Optional body part member.
pub(crate) fn get_bodypart(jo: &JsonObject) -> LoadResult<Option<BodyPart>> {
    if jo.contains_key("bodypart") {
        Ok(Some(jo.get_enum("bodypart")?))
    } else {
        Ok(None)
    }
}

fn character_getter<T: TalkContext + 'static>(is_npc: bool, read: fn(&Character) -> i32) -> IntGetter<T> {
    Rc::new(move |d: &T| query_character(d.actor(is_npc), 0, read))
}

/// Readings of an actor selected by `u_val`/`npc_val` keyword.
fn talker_getter<T: TalkContext + 'static>(
    keyword: &str,
    jo: &JsonObject,
    is_npc: bool,
) -> LoadResult<Option<IntGetter<T>>> {
    let getter: IntGetter<T> = match keyword {
        "strength" => character_getter(is_npc, |c| c.stats.strength),
        "dexterity" => character_getter(is_npc, |c| c.stats.dexterity),
        "intelligence" => character_getter(is_npc, |c| c.stats.intelligence),
        "perception" => character_getter(is_npc, |c| c.stats.perception),
        "pain" => character_getter(is_npc, |c| c.vitals.pain),
        "power" => character_getter(is_npc, |c| c.vitals.power),
        "focus" => character_getter(is_npc, |c| c.vitals.focus),
        "morale" => character_getter(is_npc, |c| c.vitals.morale),
        "hunger" => character_getter(is_npc, |c| c.vitals.hunger),
        "thirst" => character_getter(is_npc, |c| c.vitals.thirst),
        "fatigue" => character_getter(is_npc, |c| c.vitals.fatigue),
        "height" => character_getter(is_npc, |c| c.height_cm),
        "cash" => character_getter(is_npc, |c| clamp_i32(c.cash)),
        "owed" => character_getter(is_npc, |c| {
            c.npc.as_ref().map_or(0, |profile| clamp_i32(profile.debt))
        }),
        "hp" => {
            let part = get_bodypart(jo)?;
            Rc::new(move |d: &T| query_character(d.actor(is_npc), 0, |c| c.vitals.hp(part)))
        }
        "skill_level" => {
            let skill = jo.get_str("skill")?.to_string();
            Rc::new(move |d: &T| query_character(d.actor(is_npc), 0, |c| c.skill_level(&skill)))
        }
        "effect_intensity" => {
            let effect_id = jo.get_str("effect")?.to_string();
            let part = get_bodypart(jo)?;
            Rc::new(move |d: &T| {
                query_character(d.actor(is_npc), -1, |c| {
                    c.status_effects
                        .get(&effect_id, part)
                        .map_or(-1, |effect| effect.intensity)
                })
            })
        }
        "pos_x" | "pos_y" | "pos_z" => {
            let read: fn(game_rules::Tripoint) -> i32 = match keyword {
                "pos_x" => |p| p.x,
                "pos_y" => |p| p.y,
                _ => |p| p.z,
            };
            Rc::new(move |d: &T| d.actor(is_npc).and_then(|t| t.pos()).map_or(0, read))
        }
        "var" => {
            let var = talker_var(jo, is_npc)?;
            Rc::new(move |d: &T| read_int_var(&var, d))
        }
        "time_since_var" => {
            let var = talker_var(jo, is_npc)?;
            Rc::new(move |d: &T| {
                let text = read_var_value(&var, d);
                if text.is_empty() {
                    return -1;
                }
                match text.trim().parse::<i64>() {
                    Ok(turn) => match d.world().borrow().calendar.turn.checked_sub(turn) {
                        Some(elapsed) => clamp_i32(elapsed),
                        None => {
                            tracing::error!(
                                "Turn '{}' in variable '{}' is out of range",
                                text,
                                var.name
                            );
                            -1
                        }
                    },
                    Err(e) => {
                        tracing::error!("Bad turn '{}' in variable '{}': {}", text, var.name, e);
                        -1
                    }
                }
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(getter))
}

fn talker_var(jo: &JsonObject, is_npc: bool) -> LoadResult<VarInfo> {
    let scope = if is_npc { VarScope::Npc } else { VarScope::U };
    let mut var = VarInfo::new(scope, talk_var_basename(jo, "var_name")?);
    if let Some(default) = jo.get("default") {
        var.default = Some(to_i32(as_int(default, "default")?, "default")?.to_string());
    }
    Ok(var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Dialogue;
    use crate::rng::FixedRandom;
    use crate::talker::{share_world, ActorHandle};
    use crate::vars::write_var_info;
    use game_rules::{ActiveEffect, WorldState};
    use serde_json::json;

    fn dialogue() -> Dialogue {
        let mut state = WorldState::new();
        let mut player = Character::new("Survivor");
        player.stats.strength = 12;
        player.status_effects.active_effects.push(ActiveEffect::new("bleed", 2));
        let player = state.add_player(player);
        state.calendar.turn = 1000;
        Dialogue::new(share_world(state), Some(ActorHandle::Creature(player)), None)
    }

    fn int_value(config: serde_json::Value) -> IntOrVarPart<Dialogue> {
        load_value(&config, "value").unwrap()
    }

    #[test]
    fn test_literals() {
        let d = dialogue();
        assert_eq!(int_value(json!(5)).evaluate(&d), 5);

        let text: StrOrVar<Dialogue> = load_value(&json!("hello"), "value").unwrap();
        assert_eq!(text.evaluate(&d), "hello");

        let duration: DurationOrVarPart<Dialogue> = load_value(&json!("2 h"), "value").unwrap();
        assert_eq!(duration.evaluate(&d), TimeDuration::from_hours(2));
    }

    #[test]
    fn test_var_uses_default_when_empty() {
        let d = dialogue();
        let value = int_value(json!({ "u_val": "count", "default": 3 }));
        assert_eq!(value.evaluate(&d), 3);

        write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_count"), &d, "11");
        assert_eq!(value.evaluate(&d), 11);
    }

    #[test]
    fn test_var_requires_default() {
        let err = load_value::<i32, Dialogue>(&json!({ "u_val": "count" }), "value");
        assert!(matches!(err, Err(LoadError::MissingMember(m)) if m == "default"));
    }

    #[test]
    fn test_bad_text_is_zero() {
        let d = dialogue();
        let value = int_value(json!({ "global_val": "count", "default": 3 }));
        write_var_info(&VarInfo::new(VarScope::Global, "npctalk_var_count"), &d, "lots");
        assert_eq!(value.evaluate(&d), 0);
    }

    #[test]
    fn test_negative_duration_is_zero() {
        assert!(TimeDuration::parse_text("-5").is_err());
        assert_eq!(TimeDuration::parse_text("90"), Ok(TimeDuration::from_turns(90)));
    }

    #[test]
    fn test_negative_duration_literals_rejected() {
        let turns = load_value::<TimeDuration, Dialogue>(&json!(-30), "time");
        assert!(matches!(turns, Err(LoadError::InvalidValue { .. })));
        let text = load_value::<TimeDuration, Dialogue>(&json!("-2 h"), "time");
        assert!(matches!(text, Err(LoadError::InvalidValue { .. })));
        let default = load_value::<TimeDuration, Dialogue>(
            &json!({ "u_val": "wait", "default": -1 }),
            "time",
        );
        assert!(default.is_err());

        let ok = load_value::<TimeDuration, Dialogue>(&json!("2 h"), "time").unwrap();
        assert_eq!(ok.evaluate(&dialogue()), TimeDuration::from_hours(2));
    }

    #[test]
    fn test_oversized_duration_literal_is_load_error() {
        let result = load_value::<TimeDuration, Dialogue>(&json!("999999999999999 d"), "time");
        assert!(matches!(result, Err(LoadError::Duration { .. })));
    }

    #[test]
    fn test_conflicting_flavors() {
        let err = load_value::<i32, Dialogue>(
            &json!({ "u_val": "a", "arithmetic": [{ "const": 1 }], "default": 0 }),
            "value",
        );
        assert!(matches!(err, Err(LoadError::InvalidValue { .. })));

        let empty = load_value::<i32, Dialogue>(&json!({ "default": 0 }), "value");
        assert!(empty.is_err());
    }

    #[test]
    fn test_computed_value() {
        let d = dialogue();
        let value = int_value(json!({ "arithmetic": [{ "const": 40 }, "+", { "const": 2 }] }));
        assert_eq!(value.evaluate(&d), 42);
        assert_eq!(channel::open_frames(), 0);
    }

    #[test]
    fn test_optional_members() {
        let jo = json!({ "present": 9 }).as_object().cloned().unwrap();
        let d = dialogue();

        let absent: IntOrVar<Dialogue> = get_int_or_var(&jo, "absent", false, 4).unwrap();
        assert_eq!(absent.evaluate(&d), 4);
        let present: IntOrVar<Dialogue> = get_int_or_var(&jo, "present", true, 4).unwrap();
        assert_eq!(present.evaluate(&d), 9);
        assert!(get_int_or_var::<Dialogue>(&jo, "absent", true, 4).is_err());

        let text: StrOrVar<Dialogue> = get_str_or_var(&jo, "absent", false, "fallback").unwrap();
        assert_eq!(text.evaluate(&d), "fallback");

        let part: IntOrVarPart<Dialogue> = get_int_or_var_part(&jo, "present", true, 0).unwrap();
        assert_eq!(part.evaluate(&d), 9);
        let wait: DurationOrVarPart<Dialogue> =
            get_duration_or_var_part(&jo, "absent", false, TimeDuration::from_turns(30)).unwrap();
        assert_eq!(wait.evaluate(&d), TimeDuration::from_turns(30));
    }

    #[test]
    fn test_pair_uses_rng() {
        let d = dialogue().with_rng(Rc::new(FixedRandom::new(vec![2, 100])));
        let jo = json!({ "range": [1, 3] }).as_object().cloned().unwrap();
        let range: IntOrVar<Dialogue> = get_int_or_var(&jo, "range", true, 0).unwrap();
        assert_eq!(range.evaluate(&d), 2);
        assert_eq!(range.evaluate(&d), 3);

        let bad = json!({ "range": [1, 2, 3] }).as_object().cloned().unwrap();
        assert!(get_int_or_var::<Dialogue>(&bad, "range", true, 0).is_err());
    }

    #[test]
    fn test_int_getters() {
        let d = dialogue();
        let get = |config: serde_json::Value| get_get_int::<Dialogue>(&config, "value").unwrap()(&d);

        assert_eq!(get(json!({ "const": 7 })), 7);
        assert_eq!(get(json!({ "u_val": "strength" })), 12);
        assert_eq!(get(json!({ "npc_val": "strength" })), 0);
        assert_eq!(get(json!({ "time": "now" })), 1000);
        assert_eq!(get(json!({ "weather": "temperature" })), 65);
        assert_eq!(get(json!({ "u_val": "effect_intensity", "effect": "bleed" })), 2);
        assert_eq!(get(json!({ "u_val": "var", "var_name": "trust", "default": 4 })), 4);
        assert_eq!(get(json!(3)), 3);
    }

    #[test]
    fn test_time_since_var() {
        let d = dialogue();
        let since = get_get_int::<Dialogue>(
            &json!({ "u_val": "time_since_var", "var_name": "met" }),
            "value",
        )
        .unwrap();
        assert_eq!(since(&d), -1);

        write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_met"), &d, "400");
        assert_eq!(since(&d), 600);

        write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_met"), &d, &i64::MIN.to_string());
        assert_eq!(since(&d), -1);
    }
}
