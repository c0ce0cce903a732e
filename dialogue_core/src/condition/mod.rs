//! Condition compiler.
//!
//! Content names a condition either with a bare key (`"is_day"`) or with an
//! object holding exactly one condition key plus that key's arguments
//! (`{ "u_has_trait": "PSYCHOPATH" }`). [`ConditionCompiler`] owns the catalog
//! mapping every recognized key to the builder that turns it into a
//! [`Condition`].
//!
//! Keys prefixed `u_` query the primary actor and keys prefixed `npc_` the
//! secondary one. A query that needs a creature evaluates to false when the
//! slot is empty or holds an item.

mod complex;
mod query;
mod simple;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::dialogue::TalkContext;
use crate::error::{LoadError, LoadResult};
use crate::json::{JsonObject, JsonObjectExt};

/// Keys that need nothing but their name.
pub const SIMPLE_CONDITIONS: &[&str] = &[
    "u_male",
    "u_female",
    "npc_male",
    "npc_female",
    "has_no_assigned_mission",
    "has_assigned_mission",
    "has_many_assigned_missions",
    "has_no_available_mission",
    "has_available_mission",
    "has_many_available_missions",
    "mission_complete",
    "mission_incomplete",
    "mission_has_generic_rewards",
    "npc_available",
    "npc_following",
    "npc_friend",
    "npc_hostile",
    "npc_train_skills",
    "npc_train_styles",
    "npc_train_spells",
    "at_safe_space",
    "is_day",
    "npc_has_activity",
    "is_outside",
    "u_is_outside",
    "npc_is_outside",
    "u_has_camp",
    "u_can_stow_weapon",
    "npc_can_stow_weapon",
    "u_has_weapon",
    "npc_has_weapon",
    "u_driving",
    "npc_driving",
    "has_pickup_list",
    "is_by_radio",
    "has_reason",
    "u_is_riding",
    "npc_is_riding",
    "u_is_deaf",
    "npc_is_deaf",
    "u_can_see",
    "npc_can_see",
    "u_is_underwater",
    "npc_is_underwater",
    "u_has_stolen_item",
];

/// Keys that take arguments.
pub const COMPLEX_CONDITIONS: &[&str] = &[
    "u_has_any_trait",
    "npc_has_any_trait",
    "u_has_trait",
    "npc_has_trait",
    "u_has_flag",
    "npc_has_flag",
    "npc_has_class",
    "u_has_mission",
    "u_monsters_in_direction",
    "u_safe_mode_trigger",
    "u_has_strength",
    "npc_has_strength",
    "u_has_dexterity",
    "npc_has_dexterity",
    "u_has_intelligence",
    "npc_has_intelligence",
    "u_has_perception",
    "npc_has_perception",
    "u_is_wearing",
    "npc_is_wearing",
    "u_has_item",
    "npc_has_item",
    "u_has_move_mode",
    "npc_has_move_mode",
    "u_has_items",
    "npc_has_items",
    "u_has_item_category",
    "npc_has_item_category",
    "u_has_bionics",
    "npc_has_bionics",
    "u_has_effect",
    "npc_has_effect",
    "u_need",
    "npc_need",
    "u_at_om_location",
    "u_near_om_location",
    "npc_at_om_location",
    "npc_near_om_location",
    "npc_role_nearby",
    "npc_allies",
    "npc_allies_global",
    "npc_service",
    "u_has_cash",
    "u_are_owed",
    "u_query",
    "npc_query",
    "u_has_item_with_flag",
    "npc_has_item_with_flag",
    "npc_aim_rule",
    "npc_engagement_rule",
    "npc_rule",
    "npc_override",
    "u_has_hp",
    "npc_has_hp",
    "npc_cbm_reserve_rule",
    "npc_cbm_recharge_rule",
    "u_has_faction_trust",
    "days_since_cataclysm",
    "is_season",
    "mission_goal",
    "u_has_var",
    "npc_has_var",
    "u_has_skill",
    "npc_has_skill",
    "u_know_recipe",
    "u_compare_var",
    "npc_compare_var",
    "u_compare_time_since_var",
    "npc_compare_time_since_var",
    "is_weather",
    "one_in_chance",
    "x_in_y_chance",
    "is_temperature",
    "is_windpower",
    "is_humidity",
    "is_pressure",
    "u_is_height",
    "npc_is_height",
    "u_has_worn_with_flag",
    "npc_has_worn_with_flag",
    "u_has_wielded_with_flag",
    "npc_has_wielded_with_flag",
    "u_has_pain",
    "npc_has_pain",
    "u_has_power",
    "npc_has_power",
    "u_has_focus",
    "npc_has_focus",
    "u_has_morale",
    "npc_has_morale",
    "u_is_on_terrain",
    "npc_is_on_terrain",
    "u_is_in_field",
    "npc_is_in_field",
    "compare_int",
    "compare_string",
];

/// Keys combining other conditions.
pub const COMBINATORS: &[&str] = &["and", "or", "not"];

/// A compiled predicate.
pub type Predicate<T> = Rc<dyn Fn(&T) -> bool>;

/// A compiled condition. Evaluating one never fails.
pub struct Condition<T> {
    predicate: Predicate<T>,
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}

impl<T: TalkContext + 'static> Condition<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            predicate: Rc::new(predicate),
        }
    }

    pub fn constant(value: bool) -> Self {
        Self::new(move |_| value)
    }

    /// Compile one condition with a freshly built compiler.
    ///
    /// Loading many conditions should go through one [`ConditionCompiler`].
    pub fn load(config: &Value) -> LoadResult<Self> {
        ConditionCompiler::new().compile(config)
    }

    pub fn evaluate(&self, d: &T) -> bool {
        (self.predicate)(d)
    }

    /// The negated condition.
    pub fn negate(self) -> Self {
        Self::new(move |d| !self.evaluate(d))
    }
}

/// Operator of `compare_int` and the `compare_var` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl ComparisonOp {
    pub fn parse(op: &str) -> LoadResult<Self> {
        match op {
            "==" => Ok(ComparisonOp::Equal),
            "!=" => Ok(ComparisonOp::NotEqual),
            "<" => Ok(ComparisonOp::Less),
            ">" => Ok(ComparisonOp::Greater),
            "<=" => Ok(ComparisonOp::LessOrEqual),
            ">=" => Ok(ComparisonOp::GreaterOrEqual),
            _ => Err(LoadError::UnknownOperator(op.to_string())),
        }
    }

    pub fn compare<V: PartialOrd>(self, lhs: V, rhs: V) -> bool {
        match self {
            ComparisonOp::Equal => lhs == rhs,
            ComparisonOp::NotEqual => lhs != rhs,
            ComparisonOp::Less => lhs < rhs,
            ComparisonOp::Greater => lhs > rhs,
            ComparisonOp::LessOrEqual => lhs <= rhs,
            ComparisonOp::GreaterOrEqual => lhs >= rhs,
        }
    }

    pub(crate) fn from_member(jo: &JsonObject) -> LoadResult<Self> {
        Self::parse(jo.get_str("op")?)
    }
}

/// Builds a condition needing no arguments. The flag selects the secondary actor.
pub type SimpleBuilder<T> = fn(bool) -> Condition<T>;

/// Builds a condition from its object, the key found in it, and the actor flag.
pub type ComplexBuilder<T> =
    fn(&ConditionCompiler<T>, &JsonObject, &str, bool) -> LoadResult<Condition<T>>;

/// The catalog of condition keys and their builders.
pub struct ConditionCompiler<T> {
    simple: HashMap<&'static str, (SimpleBuilder<T>, bool)>,
    complex: HashMap<&'static str, (ComplexBuilder<T>, bool)>,
}

impl<T: TalkContext + 'static> Default for ConditionCompiler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TalkContext + 'static> ConditionCompiler<T> {
    pub fn new() -> Self {
        let mut compiler = Self {
            simple: HashMap::new(),
            complex: HashMap::new(),
        };
        simple::register(&mut compiler);
        complex::register(&mut compiler);
        compiler.register_complex("and", combine_and, false);
        compiler.register_complex("or", combine_or, false);
        compiler.register_complex("not", combine_not, false);
        compiler
    }

    pub(crate) fn register_simple(
        &mut self,
        key: &'static str,
        builder: SimpleBuilder<T>,
        is_npc: bool,
    ) {
        self.simple.insert(key, (builder, is_npc));
    }

    pub(crate) fn register_complex(
        &mut self,
        key: &'static str,
        builder: ComplexBuilder<T>,
        is_npc: bool,
    ) {
        self.complex.insert(key, (builder, is_npc));
    }

    /// Register the `u_` and `npc_` spellings of one builder.
    pub(crate) fn register_both(
        &mut self,
        u_key: &'static str,
        npc_key: &'static str,
        builder: ComplexBuilder<T>,
    ) {
        self.register_complex(u_key, builder, false);
        self.register_complex(npc_key, builder, true);
    }

    pub fn is_simple(&self, key: &str) -> bool {
        self.simple.contains_key(key)
    }

    pub fn is_complex(&self, key: &str) -> bool {
        self.complex.contains_key(key)
    }

    fn is_condition_key(&self, key: &str) -> bool {
        self.is_simple(key) || self.is_complex(key)
    }

    /// Compile a bare key, an object or a boolean literal.
    pub fn compile(&self, config: &Value) -> LoadResult<Condition<T>> {
        match config {
            Value::Bool(value) => Ok(Condition::constant(*value)),
            Value::String(key) => self.compile_key(key),
            Value::Object(jo) => self.compile_object(jo),
            other => Err(LoadError::invalid(
                "condition",
                format!("expected a key, an object or a boolean, got {}", other),
            )),
        }
    }

    /// Compile a bare key.
    pub fn compile_key(&self, key: &str) -> LoadResult<Condition<T>> {
        match key {
            "true" => return Ok(Condition::constant(true)),
            "false" => return Ok(Condition::constant(false)),
            _ => {}
        }
        if let Some((builder, is_npc)) = self.simple.get(key) {
            return Ok(builder(*is_npc));
        }
        if self.is_complex(key) {
            return Err(LoadError::MissingArguments(key.to_string()));
        }
        Err(LoadError::UnknownCondition(key.to_string()))
    }

    /// Compile an object holding exactly one condition key.
    pub fn compile_object(&self, jo: &JsonObject) -> LoadResult<Condition<T>> {
        let keys: Vec<&str> = jo
            .keys()
            .map(String::as_str)
            .filter(|key| self.is_condition_key(key))
            .collect();
        match keys.as_slice() {
            [] => Err(LoadError::UnknownCondition(
                jo.keys().map(String::as_str).collect::<Vec<_>>().join(", "),
            )),
            [key] => match self.complex.get(key) {
                Some((builder, is_npc)) => builder(self, jo, key, *is_npc),
                None => self.compile_key(key),
            },
            _ => Err(LoadError::ConflictingConditions(keys.join(", "))),
        }
    }

    /// Compile the optional condition stored under `member`.
    pub fn read_condition(
        &self,
        jo: &JsonObject,
        member: &str,
        default: bool,
    ) -> LoadResult<Condition<T>> {
        match jo.get(member) {
            Some(config) => self.compile(config),
            None => Ok(Condition::constant(default)),
        }
    }

    fn compile_list(&self, jo: &JsonObject, member: &str) -> LoadResult<Vec<Condition<T>>> {
        jo.get_array(member)?
            .iter()
            .map(|config| self.compile(config))
            .collect()
    }
}

/// Compile the optional condition stored under `member`.
pub fn read_condition<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    default: bool,
) -> LoadResult<Condition<T>> {
    ConditionCompiler::new().read_condition(jo, member, default)
}

fn combine_and<T: TalkContext + 'static>(
    compiler: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> LoadResult<Condition<T>> {
    let conditions = compiler.compile_list(jo, member)?;
    Ok(Condition::new(move |d| conditions.iter().all(|c| c.evaluate(d))))
}

fn combine_or<T: TalkContext + 'static>(
    compiler: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> LoadResult<Condition<T>> {
    let conditions = compiler.compile_list(jo, member)?;
    Ok(Condition::new(move |d| conditions.iter().any(|c| c.evaluate(d))))
}

fn combine_not<T: TalkContext + 'static>(
    compiler: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> LoadResult<Condition<T>> {
    Ok(compiler.compile(jo.member(member)?)?.negate())
}
