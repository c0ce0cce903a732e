//! Effects: side-effecting operations run against a context.
//!
//! Only the slice of the effect language needed to compute values lives here:
//! `arithmetic`, `set_string_var`, and sequences of those.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::dialogue::TalkContext;
use crate::error::{LoadError, LoadResult};
use crate::json::{as_object, JsonObjectExt};
use crate::values::{get_get_int, get_str_or_var, read_int_var, IntGetter, StrOrVar, VarValue};
use crate::vars::{read_var_info, write_var_info, VarInfo};

/// A compiled effect.
pub type Effect<T> = Rc<dyn Fn(&T)>;

/// Binary integer operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn parse(op: &str) -> LoadResult<Self> {
        match op {
            "+" => Ok(ArithmeticOp::Add),
            "-" => Ok(ArithmeticOp::Subtract),
            "*" => Ok(ArithmeticOp::Multiply),
            "/" => Ok(ArithmeticOp::Divide),
            "%" => Ok(ArithmeticOp::Modulo),
            _ => Err(LoadError::UnknownOperator(op.to_string())),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
        }
    }

    /// Apply the operator. Undefined results (zero divisor, overflow) are
    /// reported and yield 0.
    pub fn apply(self, lhs: i32, rhs: i32) -> i32 {
        let result = match self {
            ArithmeticOp::Add => lhs.checked_add(rhs),
            ArithmeticOp::Subtract => lhs.checked_sub(rhs),
            ArithmeticOp::Multiply => lhs.checked_mul(rhs),
            ArithmeticOp::Divide => lhs.checked_div(rhs),
            ArithmeticOp::Modulo => lhs.checked_rem(rhs),
        };
        result.unwrap_or_else(|| {
            tracing::error!("Arithmetic '{} {} {}' is undefined, using 0", lhs, self, rhs);
            0
        })
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn binary<T: 'static>(lhs: IntGetter<T>, op: ArithmeticOp, rhs: IntGetter<T>) -> IntGetter<T> {
    Rc::new(move |d: &T| op.apply(lhs(d), rhs(d)))
}

fn operand<T: TalkContext + 'static>(value: &Value) -> LoadResult<IntGetter<T>> {
    get_get_int(value, "arithmetic")
}

fn operator(value: &Value) -> LoadResult<&str> {
    value
        .as_str()
        .ok_or_else(|| LoadError::invalid("arithmetic", "expected an operator string"))
}

/// An integer variable written by arithmetic. Its default must be an integer.
fn target(value: &Value) -> LoadResult<VarInfo> {
    let var = read_var_info(as_object(value, "arithmetic")?, false)?;
    if let Some(default) = var.default.as_deref() {
        i32::parse_text(default).map_err(|reason| LoadError::invalid("default", reason))?;
    }
    Ok(var)
}

fn assign<T: TalkContext + 'static>(target: VarInfo, value: IntGetter<T>) -> Effect<T> {
    Rc::new(move |d: &T| {
        let result = value(d);
        write_var_info(&target, d, &result.to_string());
    })
}

/// Compile an `arithmetic` array.
///
/// Accepted shapes:
/// - `[a]` and `[a, op, b]` write the result to the reserved scratch variable
/// - `[var, "=", a]` and `[var, "=", a, op, b]` write it to `var`
/// - `[var, "++"]` and `[var, "--"]` step `var` by one
pub fn arithmetic<T: TalkContext + 'static>(values: &[Value]) -> LoadResult<Effect<T>> {
    let is_assignment = values.get(1).and_then(Value::as_str) == Some("=");
    match (values, is_assignment) {
        ([value], false) => Ok(assign(VarInfo::temp_var(), operand(value)?)),
        ([var, step], false) => {
            let var = target(var)?;
            let delta = match operator(step)? {
                "++" => 1,
                "--" => -1,
                other => return Err(LoadError::UnknownOperator(other.to_string())),
            };
            let current = var.clone();
            let stepped: IntGetter<T> = Rc::new(move |d: &T| {
                ArithmeticOp::Add.apply(read_int_var(&current, d), delta)
            });
            Ok(assign(var, stepped))
        }
        ([lhs, op, rhs], false) => {
            let op = ArithmeticOp::parse(operator(op)?)?;
            Ok(assign(
                VarInfo::temp_var(),
                binary(operand(lhs)?, op, operand(rhs)?),
            ))
        }
        ([var, _, value], true) => Ok(assign(target(var)?, operand(value)?)),
        ([var, _, lhs, op, rhs], true) => {
            let op = ArithmeticOp::parse(operator(op)?)?;
            Ok(assign(target(var)?, binary(operand(lhs)?, op, operand(rhs)?)))
        }
        _ => Err(LoadError::invalid(
            "arithmetic",
            "expected [a, op, b], [var, \"=\", a, op, b], [var, \"=\", a] or [var, \"++\"]",
        )),
    }
}

/// Write a string value into a variable.
pub fn set_var<T: TalkContext + 'static>(target: VarInfo, value: StrOrVar<T>) -> Effect<T> {
    Rc::new(move |d: &T| {
        let text = value.evaluate(d);
        write_var_info(&target, d, &text);
    })
}

/// Compile an effect object, or an array of them run in order.
pub fn load_effect<T: TalkContext + 'static>(jv: &Value) -> LoadResult<Effect<T>> {
    match jv {
        Value::Array(effects) => {
            let effects = effects
                .iter()
                .map(load_effect::<T>)
                .collect::<LoadResult<Vec<Effect<T>>>>()?;
            Ok(Rc::new(move |d: &T| {
                for effect in &effects {
                    effect(d);
                }
            }))
        }
        Value::Object(jo) if jo.contains_key("arithmetic") => arithmetic(jo.get_array("arithmetic")?),
        Value::Object(jo) if jo.contains_key("set_string_var") => {
            let target = read_var_info(jo.get_object("target_var")?, false)?;
            let value = get_str_or_var(jo, "set_string_var", true, "")?;
            Ok(set_var(target, value))
        }
        Value::Object(jo) => Err(LoadError::invalid(
            "effect",
            format!(
                "unknown effect with members [{}]",
                jo.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
            ),
        )),
        _ => Err(LoadError::invalid("effect", "expected an object or an array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Dialogue;
    use crate::talker::{share_world, ActorHandle};
    use crate::vars::{read_var_value, VarScope, TEMP_VAR};
    use game_rules::{Character, WorldState};
    use serde_json::json;

    fn dialogue() -> Dialogue {
        let mut state = WorldState::new();
        let player = state.add_player(Character::new("Survivor"));
        Dialogue::new(share_world(state), Some(ActorHandle::Creature(player)), None)
    }

    fn run(effect: serde_json::Value, d: &Dialogue) {
        let effect: Effect<Dialogue> = load_effect(&effect).unwrap();
        effect(d);
    }

    #[test]
    fn test_operators() {
        assert_eq!(ArithmeticOp::parse("+").unwrap().apply(2, 3), 5);
        assert_eq!(ArithmeticOp::parse("-").unwrap().apply(2, 3), -1);
        assert_eq!(ArithmeticOp::parse("*").unwrap().apply(4, 3), 12);
        assert_eq!(ArithmeticOp::parse("/").unwrap().apply(7, 2), 3);
        assert_eq!(ArithmeticOp::parse("%").unwrap().apply(7, 2), 1);
        assert!(matches!(ArithmeticOp::parse("^"), Err(LoadError::UnknownOperator(_))));
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(ArithmeticOp::Divide.apply(7, 0), 0);
        assert_eq!(ArithmeticOp::Modulo.apply(7, 0), 0);
        assert_eq!(ArithmeticOp::Add.apply(i32::MAX, 1), 0);
    }

    #[test]
    fn test_value_form_writes_scratch() {
        let d = dialogue();
        run(json!({ "arithmetic": [{ "const": 6 }, "*", { "const": 7 }] }), &d);
        assert_eq!(d.world().borrow().globals.get_value(TEMP_VAR), "42");
    }

    #[test]
    fn test_assignment_form() {
        let d = dialogue();
        run(
            json!({ "arithmetic": [{ "u_val": "kills" }, "=", { "const": 10 }, "-", { "const": 4 }] }),
            &d,
        );
        let kills = VarInfo::new(VarScope::U, "npctalk_var_kills");
        assert_eq!(read_var_value(&kills, &d), "6");

        run(json!({ "arithmetic": [{ "u_val": "kills" }, "++"] }), &d);
        run(json!({ "arithmetic": [{ "u_val": "kills" }, "++"] }), &d);
        run(json!({ "arithmetic": [{ "u_val": "kills" }, "--"] }), &d);
        assert_eq!(read_var_value(&kills, &d), "7");
    }

    #[test]
    fn test_set_string_var_sequence() {
        let d = dialogue();
        run(
            json!([
                { "set_string_var": "hello", "target_var": { "global_val": "greeting" } },
                { "arithmetic": [{ "global_val": "count" }, "=", { "const": 1 }] }
            ]),
            &d,
        );
        let world = d.world().borrow();
        assert_eq!(world.globals.get_value("npctalk_var_greeting"), "hello");
        assert_eq!(world.globals.get_value("npctalk_var_count"), "1");
    }

    #[test]
    fn test_malformed_effects() {
        let bad: [serde_json::Value; 5] = [
            json!({ "arithmetic": [] }),
            json!({ "arithmetic": [{ "u_val": "x", "default": "abc" }, "++"] }),
            json!({ "arithmetic": [{ "const": 1 }, "^", { "const": 2 }] }),
            json!({ "arithmetic": [{ "u_val": "x" }, "**"] }),
            json!({ "teleport": true }),
        ];
        for effect in bad {
            assert!(load_effect::<Dialogue>(&effect).is_err(), "{} should not load", effect);
        }
    }
}
