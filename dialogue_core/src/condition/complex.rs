//! Builders for conditions that take arguments.
//!
//! Every builder resolves its value expressions before borrowing actor data,
//! since resolving may run effects that write to the world.

use game_rules::{
    AimRule, CbmRechargeRule, CbmReserveRule, Character, Direction, EngagementRule, Environment,
    FatigueLevel, MapData, MissionGoal, NeedKind, OmtPoint, Season, StatType, TimeDuration,
};

use super::query::{
    actor_faction, actor_pos, character_check, npc_check, selected_mission, CURRENTLY_BUSY,
};
use super::{ComparisonOp, Condition, ConditionCompiler};
use crate::dialogue::TalkContext;
use crate::error::{LoadError, LoadResult};
use crate::json::{JsonObject, JsonObjectExt};
use crate::values::{
    clamp_i32, get_bodypart, get_duration_or_var, get_get_int, get_int_or_var, get_str_or_var,
    load_value, read_int_var, Ranged, StrOrVar,
};
use crate::vars::{read_var_value, talk_var_basename, VarInfo, VarScope};

/// Squares searched by `u_monsters_in_direction`.
const MONSTER_SEARCH_RANGE: i32 = 60;
/// Squares counted as "near" by `npc_allies`.
const ALLY_RANGE: i32 = 60;
/// Squares searched by `npc_role_nearby`.
const ROLE_RANGE: i32 = 48;
/// Bionic id that `u_has_bionics` treats as "any bionic at all".
const ANY_BIONIC: &str = "ANY";
/// Overmap location matching any faction camp.
const ANY_CAMP: &str = "FACTION_CAMP_ANY";

pub(super) fn register<T: TalkContext + 'static>(compiler: &mut ConditionCompiler<T>) {
    compiler.register_both("u_has_any_trait", "npc_has_any_trait", has_any_trait);
    compiler.register_both("u_has_trait", "npc_has_trait", has_trait);
    compiler.register_both("u_has_flag", "npc_has_flag", has_flag);
    compiler.register_complex("npc_has_class", has_class, true);
    compiler.register_complex("u_has_mission", has_mission, false);
    compiler.register_complex("u_monsters_in_direction", monsters_in_direction, false);
    compiler.register_complex("u_safe_mode_trigger", safe_mode_trigger, false);
    compiler.register_both("u_has_strength", "npc_has_strength", has_strength);
    compiler.register_both("u_has_dexterity", "npc_has_dexterity", has_dexterity);
    compiler.register_both("u_has_intelligence", "npc_has_intelligence", has_intelligence);
    compiler.register_both("u_has_perception", "npc_has_perception", has_perception);
    compiler.register_both("u_is_wearing", "npc_is_wearing", is_wearing);
    compiler.register_both("u_has_item", "npc_has_item", has_item);
    compiler.register_both("u_has_move_mode", "npc_has_move_mode", has_move_mode);
    compiler.register_both("u_has_items", "npc_has_items", has_items);
    compiler.register_both("u_has_item_category", "npc_has_item_category", has_item_category);
    compiler.register_both("u_has_bionics", "npc_has_bionics", has_bionics);
    compiler.register_both("u_has_effect", "npc_has_effect", has_effect);
    compiler.register_both("u_need", "npc_need", need);
    compiler.register_both("u_at_om_location", "npc_at_om_location", at_om_location);
    compiler.register_both("u_near_om_location", "npc_near_om_location", near_om_location);
    compiler.register_complex("npc_role_nearby", role_nearby, true);
    compiler.register_complex("npc_allies", allies, false);
    compiler.register_complex("npc_allies_global", allies_global, false);
    compiler.register_complex("npc_service", service, true);
    compiler.register_complex("u_has_cash", has_cash, false);
    compiler.register_complex("u_are_owed", are_owed, true);
    compiler.register_both("u_query", "npc_query", query);
    compiler.register_both("u_has_item_with_flag", "npc_has_item_with_flag", has_item_with_flag);
    compiler.register_complex("npc_aim_rule", aim_rule, true);
    compiler.register_complex("npc_engagement_rule", engagement_rule, true);
    compiler.register_complex("npc_cbm_reserve_rule", cbm_reserve_rule, true);
    compiler.register_complex("npc_cbm_recharge_rule", cbm_recharge_rule, true);
    compiler.register_complex("npc_rule", rule, true);
    compiler.register_complex("npc_override", rule_override, true);
    compiler.register_both("u_has_hp", "npc_has_hp", has_hp);
    compiler.register_complex("u_has_faction_trust", faction_trust, true);
    compiler.register_complex("days_since_cataclysm", days_since_cataclysm, false);
    compiler.register_complex("is_season", is_season, false);
    compiler.register_complex("mission_goal", mission_goal, true);
    compiler.register_both("u_has_var", "npc_has_var", has_var);
    compiler.register_both("u_has_skill", "npc_has_skill", has_skill);
    compiler.register_complex("u_know_recipe", know_recipe, false);
    compiler.register_both("u_compare_var", "npc_compare_var", compare_var);
    compiler.register_both(
        "u_compare_time_since_var",
        "npc_compare_time_since_var",
        compare_time_since_var,
    );
    compiler.register_complex("is_weather", is_weather, false);
    compiler.register_complex("one_in_chance", one_in_chance, false);
    compiler.register_complex("x_in_y_chance", x_in_y_chance, false);
    compiler.register_complex("is_temperature", is_temperature, false);
    compiler.register_complex("is_windpower", is_windpower, false);
    compiler.register_complex("is_humidity", is_humidity, false);
    compiler.register_complex("is_pressure", is_pressure, false);
    compiler.register_both("u_is_height", "npc_is_height", is_height);
    compiler.register_both("u_has_worn_with_flag", "npc_has_worn_with_flag", has_worn_with_flag);
    compiler.register_both(
        "u_has_wielded_with_flag",
        "npc_has_wielded_with_flag",
        has_wielded_with_flag,
    );
    compiler.register_both("u_has_pain", "npc_has_pain", has_pain);
    compiler.register_both("u_has_power", "npc_has_power", has_power);
    compiler.register_both("u_has_focus", "npc_has_focus", has_focus);
    compiler.register_both("u_has_morale", "npc_has_morale", has_morale);
    compiler.register_both("u_is_on_terrain", "npc_is_on_terrain", is_on_terrain);
    compiler.register_both("u_is_in_field", "npc_is_in_field", is_in_field);
    compiler.register_complex("compare_int", compare_int, false);
    compiler.register_complex("compare_string", compare_string, false);
}

type Built<T> = LoadResult<Condition<T>>;

/// `{member: str_or_var}` checked against the actor's character.
fn string_check<T, F>(jo: &JsonObject, member: &str, is_npc: bool, check: F) -> Built<T>
where
    T: TalkContext + 'static,
    F: Fn(&Character, &str) -> bool + 'static,
{
    let value = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let value = value.evaluate(d);
        character_check(d, is_npc, |c| check(c, &value))
    }))
}

/// `{member: int_or_var}` true when the actor's reading is at least the value.
fn at_least<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
    read: fn(&Character) -> i32,
) -> Built<T> {
    let threshold = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let threshold = threshold.evaluate(d);
        character_check(d, is_npc, |c| read(c) >= threshold)
    }))
}

fn stat_at_least<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
    stat: StatType,
) -> Built<T> {
    let threshold = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let threshold = threshold.evaluate(d);
        character_check(d, is_npc, |c| c.stats.get(stat) >= threshold)
    }))
}

/// `{member: int_or_var}` true when the weather reading is at least the value.
fn weather_at_least<T: TalkContext + 'static>(
    jo: &JsonObject,
    member: &str,
    read: fn(&Environment) -> i32,
) -> Built<T> {
    let threshold = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let threshold = threshold.evaluate(d);
        read(&d.world().borrow().environment) >= threshold
    }))
}

fn talker_scope(is_npc: bool) -> VarScope {
    if is_npc {
        VarScope::Npc
    } else {
        VarScope::U
    }
}

fn has_any_trait<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let traits = jo
        .get_array(member)?
        .iter()
        .map(|value| load_value(value, member))
        .collect::<LoadResult<Vec<StrOrVar<T>>>>()?;
    Ok(Condition::new(move |d: &T| {
        let traits: Vec<String> = traits.iter().map(|t| t.evaluate(d)).collect();
        character_check(d, is_npc, |c| traits.iter().any(|t| c.has_trait(t)))
    }))
}

fn has_trait<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, id| c.has_trait(id))
}

/// Works for items as well as creatures.
fn has_flag<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let flag = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let flag = flag.evaluate(d);
        d.actor(is_npc).is_some_and(|t| t.has_flag(&flag))
    }))
}

fn has_class<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let class = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let class = class.evaluate(d);
        npc_check(d, is_npc, |_, p| p.class == class)
    }))
}

fn has_mission<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let mission_type = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let mission_type = mission_type.evaluate(d);
        let world = d.world().borrow();
        character_check(d, is_npc, |c| {
            c.active_missions.iter().any(|id| {
                world
                    .get_mission(*id)
                    .is_some_and(|m| m.type_id == mission_type)
            })
        })
    }))
}

fn monsters_in_direction<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let direction: Direction = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| {
        actor_pos(d, is_npc).is_some_and(|pos| {
            d.world()
                .borrow()
                .monsters_in_direction(pos, direction, MONSTER_SEARCH_RANGE, false)
                > 0
        })
    }))
}

/// True when a hostile monster is within the given number of squares.
fn safe_mode_trigger<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let range = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let range = range.evaluate(d);
        let Some(pos) = actor_pos(d, is_npc) else {
            return false;
        };
        d.world()
            .borrow()
            .monsters
            .iter()
            .any(|m| m.hostile && m.position.z == pos.z && m.position.square_dist(pos) <= range)
    }))
}

fn has_strength<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    stat_at_least(jo, member, is_npc, StatType::Strength)
}

fn has_dexterity<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    stat_at_least(jo, member, is_npc, StatType::Dexterity)
}

fn has_intelligence<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    stat_at_least(jo, member, is_npc, StatType::Intelligence)
}

fn has_perception<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    stat_at_least(jo, member, is_npc, StatType::Perception)
}

fn is_wearing<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, item| c.is_wearing(item))
}

fn has_item<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, item| c.amount_of(item) > 0)
}

fn has_move_mode<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, mode| c.move_mode == mode)
}

/// `{"item": id, "count": n}` counts items, `{"item": id, "charges": n}` charges.
fn has_items<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let params = jo.get_object(member)?;
    let item = get_str_or_var(params, "item", true, "")?;
    let by_count = params.contains_key("count");
    if !by_count && !params.contains_key("charges") {
        return Err(LoadError::invalid(member, "expected \"count\" or \"charges\""));
    }
    let amount = get_int_or_var(params, if by_count { "count" } else { "charges" }, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let item = item.evaluate(d);
        let amount = i64::from(amount.evaluate(d));
        character_check(d, is_npc, |c| {
            let held = if by_count {
                c.inventory.all_items().filter(|i| i.type_id == item).count() as i64
            } else {
                i64::from(c.amount_of(&item))
            };
            held >= amount
        })
    }))
}

fn has_item_category<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let category = get_str_or_var(jo, member, true, "")?;
    let count = get_int_or_var(jo, "count", false, 1)?;
    Ok(Condition::new(move |d: &T| {
        let category = category.evaluate(d);
        let count = count.evaluate(d);
        character_check(d, is_npc, |c| {
            i64::try_from(c.items_in_category(&category)).unwrap_or(i64::MAX) >= i64::from(count)
        })
    }))
}

fn has_bionics<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, bionic| {
        if bionic == ANY_BIONIC {
            !c.bionics.is_empty()
        } else {
            c.has_bionic(bionic)
        }
    })
}

fn has_effect<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let effect_id = get_str_or_var(jo, member, true, "")?;
    let intensity = get_int_or_var(jo, "intensity", false, -1)?;
    let part = get_bodypart(jo)?;
    Ok(Condition::new(move |d: &T| {
        let effect_id = effect_id.evaluate(d);
        let intensity = intensity.evaluate(d);
        character_check(d, is_npc, |c| {
            c.status_effects
                .get(&effect_id, part)
                .is_some_and(|effect| intensity == -1 || effect.intensity >= intensity)
        })
    }))
}

/// `{"u_need": "thirst", "amount": n}` or `{"u_need": "fatigue", "level": "TIRED"}`.
fn need<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let kind: NeedKind = jo.get_enum(member)?;
    let amount = if jo.contains_key("level") {
        let level: FatigueLevel = jo.get_enum("level")?;
        Ranged::literal(level.threshold())
    } else {
        get_int_or_var(jo, "amount", true, 0)?
    };
    Ok(Condition::new(move |d: &T| {
        let amount = amount.evaluate(d);
        character_check(d, is_npc, |c| c.vitals.need(kind) > amount)
    }))
}

fn at_om_location<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let location = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let location = location.evaluate(d);
        let Some(pos) = actor_pos(d, is_npc) else {
            return false;
        };
        om_location_matches(&d.world().borrow().map, pos.to_omt(), &location)
    }))
}

fn near_om_location<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let location = get_str_or_var(jo, member, true, "")?;
    let range = get_int_or_var(jo, "range", false, 1)?;
    Ok(Condition::new(move |d: &T| {
        let location = location.evaluate(d);
        let range = range.evaluate(d);
        let Some(pos) = actor_pos(d, is_npc) else {
            return false;
        };
        let world = d.world().borrow();
        world
            .map
            .omts_within(pos.to_omt(), range)
            .any(|omt| om_location_matches(&world.map, omt, &location))
    }))
}

fn om_location_matches(map: &MapData, omt: OmtPoint, location: &str) -> bool {
    if location == ANY_CAMP {
        map.has_camp(omt)
    } else {
        map.omt_ter(omt) == location
    }
}

fn role_nearby<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let role = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let role = role.evaluate(d);
        actor_pos(d, is_npc).is_some_and(|pos| {
            d.world().borrow().npcs_with_role_near(&role, pos, ROLE_RANGE) > 0
        })
    }))
}

fn allies<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let count = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let count = count.evaluate(d);
        let near = d.world().borrow().followers_near_player(ALLY_RANGE);
        i64::try_from(near).unwrap_or(i64::MAX) >= i64::from(count)
    }))
}

fn allies_global<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let count = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let count = count.evaluate(d);
        let total = d.world().borrow().followers().count();
        i64::try_from(total).unwrap_or(i64::MAX) >= i64::from(count)
    }))
}

/// The NPC is free and the other actor can pay.
fn service<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let price = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let price = i64::from(price.evaluate(d));
        npc_check(d, is_npc, |c, _| !c.has_effect(CURRENTLY_BUSY, None))
            && character_check(d, !is_npc, |c| c.cash >= price)
    }))
}

fn has_cash<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| clamp_i32(c.cash))
}

fn are_owed<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let amount = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let amount = i64::from(amount.evaluate(d));
        npc_check(d, is_npc, |_, p| p.debt >= amount)
    }))
}

/// Ask the player a yes/no question. Anyone else gives the default answer.
fn query<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let message = get_str_or_var(jo, member, true, "")?;
    let default = match jo.get("default") {
        Some(value) => value
            .as_bool()
            .ok_or_else(|| LoadError::invalid("default", "expected a boolean"))?,
        None => return Err(LoadError::missing("default")),
    };
    Ok(Condition::new(move |d: &T| {
        let message = message.evaluate(d);
        let is_player = character_check(d, is_npc, |c| !c.is_npc());
        if !is_player {
            return default;
        }
        let answer = d.world().borrow().query_answers.get(&message).copied();
        tracing::debug!(message = %message, ?answer, "query");
        answer.unwrap_or(default)
    }))
}

fn has_item_with_flag<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, flag| c.has_item_with_flag(flag))
}

fn aim_rule<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let rule: AimRule = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| npc_check(d, is_npc, |_, p| p.rules.aim == rule)))
}

fn engagement_rule<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let rule: EngagementRule = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| npc_check(d, is_npc, |_, p| p.rules.engagement == rule)))
}

fn cbm_reserve_rule<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let rule: CbmReserveRule = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| npc_check(d, is_npc, |_, p| p.rules.cbm_reserve == rule)))
}

fn cbm_recharge_rule<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let rule: CbmRechargeRule = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| npc_check(d, is_npc, |_, p| p.rules.cbm_recharge == rule)))
}

fn rule<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let flag = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let flag = flag.evaluate(d);
        npc_check(d, is_npc, |_, p| p.rules.flags.contains(&flag))
    }))
}

fn rule_override<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let flag = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let flag = flag.evaluate(d);
        npc_check(d, is_npc, |_, p| p.rules.overrides.contains(&flag))
    }))
}

fn has_hp<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let threshold = get_int_or_var(jo, member, true, 0)?;
    let part = get_bodypart(jo)?;
    Ok(Condition::new(move |d: &T| {
        let threshold = threshold.evaluate(d);
        character_check(d, is_npc, |c| c.vitals.hp(part) >= threshold)
    }))
}

/// Trust the NPC's faction has in the player.
fn faction_trust<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let threshold = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let threshold = threshold.evaluate(d);
        let Some(faction) = actor_faction(d, is_npc) else {
            return false;
        };
        d.world()
            .borrow()
            .factions
            .get(&faction)
            .is_some_and(|f| f.trust >= threshold)
    }))
}

fn days_since_cataclysm<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let days = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let days = i64::from(days.evaluate(d));
        d.world().borrow().calendar.days_since_cataclysm() >= days
    }))
}

fn is_season<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let season: Season = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| d.world().borrow().calendar.season() == season))
}

fn mission_goal<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let goal: MissionGoal = jo.get_enum(member)?;
    Ok(Condition::new(move |d: &T| {
        selected_mission(d, is_npc).is_some_and(|m| m.goal == goal)
    }))
}

/// `{"u_has_var": name, "type": .., "context": .., "value": text}`.
fn has_var<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let var = VarInfo::new(talker_scope(is_npc), talk_var_basename(jo, member)?);
    let value = jo.get_str_or("value", "")?.to_string();
    Ok(Condition::new(move |d: &T| read_var_value(&var, d) == value))
}

/// `{"u_has_skill": {"skill": id, "level": n}}`.
fn has_skill<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let params = jo.get_object(member)?;
    let skill = get_str_or_var(params, "skill", true, "")?;
    let level = get_int_or_var(params, "level", true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let skill = skill.evaluate(d);
        let level = level.evaluate(d);
        character_check(d, is_npc, |c| c.skill_level(&skill) >= level)
    }))
}

fn know_recipe<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, recipe| c.known_recipes.contains(recipe))
}

/// `{"u_compare_var": name, "op": "<", "value": n}`. An unset variable reads as 0.
fn compare_var<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let var = VarInfo::new(talker_scope(is_npc), talk_var_basename(jo, member)?);
    let op = ComparisonOp::from_member(jo)?;
    let value = get_int_or_var(jo, "value", true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let value = value.evaluate(d);
        op.compare(read_int_var(&var, d), value)
    }))
}

/// Compare the time elapsed since the turn stored in a variable. Unset is false.
fn compare_time_since_var<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let var = VarInfo::new(talker_scope(is_npc), talk_var_basename(jo, member)?);
    let op = ComparisonOp::from_member(jo)?;
    let time = get_duration_or_var(jo, "time", true, TimeDuration::ZERO)?;
    Ok(Condition::new(move |d: &T| {
        let time = time.evaluate(d);
        let stored = read_var_value(&var, d);
        if stored.is_empty() {
            return false;
        }
        match stored.trim().parse::<i64>() {
            Ok(turn) => match d.world().borrow().calendar.turn.checked_sub(turn) {
                Some(elapsed) => op.compare(TimeDuration::from_turns(elapsed), time),
                None => {
                    tracing::error!("Turn '{}' in variable '{}' is out of range", stored, var.name);
                    false
                }
            },
            Err(e) => {
                tracing::error!("Bad turn '{}' in variable '{}': {}", stored, var.name, e);
                false
            }
        }
    }))
}

fn is_weather<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let weather = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let weather = weather.evaluate(d);
        d.world().borrow().environment.weather == weather
    }))
}

fn one_in_chance<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let n = get_int_or_var(jo, member, true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let n = n.evaluate(d);
        d.rng().one_in(i64::from(n))
    }))
}

/// `{"x_in_y_chance": {"x": n, "y": m}}`.
fn x_in_y_chance<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let params = jo.get_object(member)?;
    let x = get_int_or_var(params, "x", true, 0)?;
    let y = get_int_or_var(params, "y", true, 0)?;
    Ok(Condition::new(move |d: &T| {
        let x = x.evaluate(d);
        let y = y.evaluate(d);
        d.rng().x_in_y(i64::from(x), i64::from(y))
    }))
}

fn is_temperature<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    weather_at_least(jo, member, |env| env.temperature)
}

fn is_windpower<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    weather_at_least(jo, member, |env| env.windpower)
}

fn is_humidity<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    weather_at_least(jo, member, |env| env.humidity)
}

fn is_pressure<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    weather_at_least(jo, member, |env| env.pressure)
}

fn is_height<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| c.height_cm)
}

fn has_worn_with_flag<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, flag| c.worn_with_flag(flag))
}

fn has_wielded_with_flag<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    string_check(jo, member, is_npc, |c, flag| c.wielded_with_flag(flag))
}

fn has_pain<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| c.vitals.pain)
}

fn has_power<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| c.vitals.power)
}

fn has_focus<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| c.vitals.focus)
}

fn has_morale<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    at_least(jo, member, is_npc, |c| c.vitals.morale)
}

fn is_on_terrain<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let terrain = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let terrain = terrain.evaluate(d);
        actor_pos(d, is_npc).is_some_and(|pos| d.world().borrow().map.ter(pos) == terrain)
    }))
}

fn is_in_field<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    is_npc: bool,
) -> Built<T> {
    let field = get_str_or_var(jo, member, true, "")?;
    Ok(Condition::new(move |d: &T| {
        let field = field.evaluate(d);
        actor_pos(d, is_npc).is_some_and(|pos| d.world().borrow().map.has_field(pos, &field))
    }))
}

/// `{"compare_int": [a, b], "op": ">="}` over any two integer operands.
fn compare_int<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let [lhs, rhs] = jo.get_array(member)?.as_slice() else {
        return Err(LoadError::invalid(member, "expected exactly two values"));
    };
    let lhs = get_get_int(lhs, member)?;
    let rhs = get_get_int(rhs, member)?;
    let op = ComparisonOp::from_member(jo)?;
    Ok(Condition::new(move |d: &T| op.compare(lhs(d), rhs(d))))
}

/// `{"compare_string": [a, b]}` true when both strings are equal.
fn compare_string<T: TalkContext + 'static>(
    _: &ConditionCompiler<T>,
    jo: &JsonObject,
    member: &str,
    _: bool,
) -> Built<T> {
    let [lhs, rhs] = jo.get_array(member)?.as_slice() else {
        return Err(LoadError::invalid(member, "expected exactly two values"));
    };
    let lhs: StrOrVar<T> = load_value(lhs, member)?;
    let rhs: StrOrVar<T> = load_value(rhs, member)?;
    Ok(Condition::new(move |d: &T| lhs.evaluate(d) == rhs.evaluate(d)))
}
