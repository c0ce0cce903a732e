//! Scoped variable references and the read/write entry points.

use game_rules::{Faction, PLAYER_FACTION};

use crate::channel;
use crate::dialogue::TalkContext;
use crate::error::{LoadError, LoadResult};
use crate::json::{JsonObject, JsonObjectExt};
use crate::talker::{SharedWorld, Talker};

/// Prefix applied to every content-authored variable name.
pub const VAR_PREFIX: &str = "npctalk_var";

/// Reserved global variable effects write their results to.
pub const TEMP_VAR: &str = "temp_var";

/// Where a variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarScope {
    Global,
    /// The primary actor.
    U,
    /// The secondary actor.
    Npc,
    /// The secondary actor's faction.
    Faction,
    /// The player's faction.
    Party,
}

impl VarScope {
    /// Content member naming each scope.
    pub const MEMBERS: [(&'static str, VarScope); 5] = [
        ("u_val", VarScope::U),
        ("npc_val", VarScope::Npc),
        ("global_val", VarScope::Global),
        ("faction_val", VarScope::Faction),
        ("party_val", VarScope::Party),
    ];

    /// The scope member present in `jo`, with its name.
    pub fn find_member(jo: &JsonObject) -> Option<(&'static str, VarScope)> {
        Self::MEMBERS
            .iter()
            .copied()
            .find(|(member, _)| jo.contains_key(*member))
    }
}

/// A reference to a stored variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub scope: VarScope,
    /// Full storage name, prefix included.
    pub name: String,
    /// Raw default text, if the author supplied one.
    pub default: Option<String>,
}

impl VarInfo {
    pub fn new(scope: VarScope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
            default: None,
        }
    }

    /// The reserved scratch variable.
    pub fn temp_var() -> Self {
        Self::new(VarScope::Global, TEMP_VAR)
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

fn prefixed(name: &str) -> String {
    format!("{}_{}", VAR_PREFIX, name)
}

/// Read `{"u_val": "name", "default": ...}` style references.
pub fn read_var_info(jo: &JsonObject, require_default: bool) -> LoadResult<VarInfo> {
    let (member, scope) = VarScope::find_member(jo).ok_or_else(|| {
        LoadError::invalid(
            "variable",
            "expected one of u_val, npc_val, global_val, faction_val or party_val",
        )
    })?;
    let mut info = VarInfo::new(scope, prefixed(jo.get_str(member)?));

    match jo.get("default") {
        Some(serde_json::Value::String(text)) => info.default = Some(text.clone()),
        Some(serde_json::Value::Number(number)) => info.default = Some(number.to_string()),
        Some(_) => return Err(LoadError::invalid("default", "expected a string or number")),
        None if require_default => return Err(LoadError::missing("default")),
        None => {}
    }
    Ok(info)
}

/// Build a talker variable name from `{member, "type", "context"}`.
///
/// Yields `npctalk_var_<type>_<context>_<name>`, skipping empty parts.
pub fn talk_var_basename(jo: &JsonObject, member: &str) -> LoadResult<String> {
    let name = jo.get_str(member)?;
    let type_var = jo.get_str_or("type", "")?;
    let var_context = jo.get_str_or("context", "")?;

    let mut full = VAR_PREFIX.to_string();
    for part in [type_var, var_context, name] {
        if !part.is_empty() {
            full.push('_');
            full.push_str(part);
        }
    }
    Ok(full)
}

/// Read a variable's text through the context, empty when absent.
pub fn read_var_value<T: TalkContext + ?Sized>(info: &VarInfo, d: &T) -> String {
    match info.scope {
        VarScope::Global => {
            if info.name == TEMP_VAR {
                if let Some(result) = channel::read_scratch() {
                    return result;
                }
            }
            d.world().borrow().globals.get_value(&info.name)
        }
        VarScope::U | VarScope::Npc => d
            .actor(info.scope == VarScope::Npc)
            .map(|talker| talker.get_value(&info.name))
            .unwrap_or_default(),
        VarScope::Faction => {
            let Some(faction) = d.actor(true).and_then(|talker| talker.faction()) else {
                return String::new();
            };
            faction_value(d.world(), &faction, &info.name)
        }
        VarScope::Party => faction_value(d.world(), PLAYER_FACTION, &info.name),
    }
}

fn faction_value(world: &SharedWorld, faction: &str, name: &str) -> String {
    world
        .borrow()
        .factions
        .get(faction)
        .map(|f| f.vars.get_value(name))
        .unwrap_or_default()
}

/// Write a variable. Actor and faction scopes resolve against `talker`.
pub fn write_var_value(
    world: &SharedWorld,
    scope: VarScope,
    name: &str,
    talker: Option<&dyn Talker>,
    value: &str,
) {
    match scope {
        VarScope::Global => {
            if name == TEMP_VAR && channel::write_scratch(value) {
                return;
            }
            world.borrow_mut().globals.set_value(name, value);
        }
        VarScope::U | VarScope::Npc => match talker {
            Some(talker) => talker.set_value(name, value),
            None => tracing::warn!("Cannot write '{}': no actor in {:?} scope", name, scope),
        },
        VarScope::Faction => match talker.and_then(|t| t.faction()) {
            Some(faction) => set_faction_value(world, &faction, name, value),
            None => tracing::warn!("Cannot write '{}': actor has no faction", name),
        },
        VarScope::Party => set_faction_value(world, PLAYER_FACTION, name, value),
    }
}

fn set_faction_value(world: &SharedWorld, faction: &str, name: &str, value: &str) {
    world
        .borrow_mut()
        .factions
        .entry(faction.to_string())
        .or_insert_with(|| Faction::new(faction))
        .vars
        .set_value(name, value);
}

/// Write through a reference, picking the talker its scope names.
pub fn write_var_info<T: TalkContext + ?Sized>(info: &VarInfo, d: &T, value: &str) {
    let talker = match info.scope {
        VarScope::U => d.actor(false),
        VarScope::Npc | VarScope::Faction => d.actor(true),
        VarScope::Global | VarScope::Party => None,
    };
    write_var_value(d.world(), info.scope, &info.name, talker, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Dialogue;
    use crate::talker::{share_world, ActorHandle};
    use game_rules::{Character, NpcProfile, WorldState};
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn dialogue() -> Dialogue {
        let mut state = WorldState::new();
        let player = state.add_player(Character::new("Survivor"));
        let npc = state.add_character(Character::new_npc(
            "Trader",
            NpcProfile::new("NC_TRADER").with_faction("free_merchants"),
        ));
        Dialogue::new(
            share_world(state),
            Some(ActorHandle::Creature(player)),
            Some(ActorHandle::Creature(npc)),
        )
    }

    #[test]
    fn test_read_var_info() {
        let info = read_var_info(&object(json!({ "npc_val": "mood", "default": 3 })), false).unwrap();
        assert_eq!(info.scope, VarScope::Npc);
        assert_eq!(info.name, "npctalk_var_mood");
        assert_eq!(info.default.as_deref(), Some("3"));

        let err = read_var_info(&object(json!({ "u_val": "mood" })), true);
        assert!(matches!(err, Err(LoadError::MissingMember(m)) if m == "default"));

        assert!(read_var_info(&object(json!({ "name": "mood" })), false).is_err());
    }

    #[test]
    fn test_talk_var_basename() {
        let jo = object(json!({ "u_has_var": "met", "type": "dialogue", "context": "trader" }));
        assert_eq!(
            talk_var_basename(&jo, "u_has_var").unwrap(),
            "npctalk_var_dialogue_trader_met"
        );

        let bare = object(json!({ "u_has_var": "met" }));
        assert_eq!(talk_var_basename(&bare, "u_has_var").unwrap(), "npctalk_var_met");
    }

    #[test]
    fn test_scoped_round_trip() {
        let d = dialogue();
        for scope in [
            VarScope::Global,
            VarScope::U,
            VarScope::Npc,
            VarScope::Faction,
            VarScope::Party,
        ] {
            let info = VarInfo::new(scope, "npctalk_var_count");
            assert_eq!(read_var_value(&info, &d), "", "{:?} starts empty", scope);
            write_var_info(&info, &d, "7");
            assert_eq!(read_var_value(&info, &d), "7", "{:?} round trips", scope);
        }

        let world = d.world().borrow();
        assert_eq!(
            world.factions["free_merchants"].vars.get_value("npctalk_var_count"),
            "7"
        );
        assert_eq!(world.globals.get_value("npctalk_var_count"), "7");
    }

    #[test]
    fn test_scopes_are_independent() {
        let d = dialogue();
        write_var_info(&VarInfo::new(VarScope::U, "npctalk_var_x"), &d, "u");
        write_var_info(&VarInfo::new(VarScope::Npc, "npctalk_var_x"), &d, "npc");

        assert_eq!(read_var_value(&VarInfo::new(VarScope::U, "npctalk_var_x"), &d), "u");
        assert_eq!(read_var_value(&VarInfo::new(VarScope::Npc, "npctalk_var_x"), &d), "npc");
        assert_eq!(read_var_value(&VarInfo::new(VarScope::Global, "npctalk_var_x"), &d), "");
    }

    #[test]
    fn test_missing_actor_reads_empty() {
        let d = Dialogue::new(share_world(WorldState::new()), None, None);
        let info = VarInfo::new(VarScope::Npc, "npctalk_var_x");
        write_var_info(&info, &d, "ignored");
        assert_eq!(read_var_value(&info, &d), "");
    }

    #[test]
    fn test_temp_var_without_frame_is_global() {
        let d = dialogue();
        write_var_info(&VarInfo::temp_var(), &d, "5");
        assert_eq!(d.world().borrow().globals.get_value(TEMP_VAR), "5");
        assert_eq!(read_var_value(&VarInfo::temp_var(), &d), "5");
    }
}
