//! World state management - the central structure holding all game data.

mod calendar;
mod map;
mod vars;

pub use calendar::*;
pub use map::*;
pub use vars::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{Character, EntityId, Item};

/// Faction id of the player's own followers.
pub const PLAYER_FACTION: &str = "your_followers";

/// Unique identifier for missions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub Uuid);

impl MissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a mission asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionGoal {
    #[serde(rename = "MGOAL_NULL")]
    Null,
    #[serde(rename = "MGOAL_GO_TO")]
    GoTo,
    #[serde(rename = "MGOAL_GO_TO_TYPE")]
    GoToType,
    #[serde(rename = "MGOAL_FIND_ITEM")]
    FindItem,
    #[serde(rename = "MGOAL_FIND_ANY_ITEM")]
    FindAnyItem,
    #[serde(rename = "MGOAL_FIND_MONSTER")]
    FindMonster,
    #[serde(rename = "MGOAL_FIND_NPC")]
    FindNpc,
    #[serde(rename = "MGOAL_ASSASSINATE")]
    Assassinate,
    #[serde(rename = "MGOAL_KILL_MONSTER")]
    KillMonster,
    #[serde(rename = "MGOAL_RECRUIT_NPC")]
    RecruitNpc,
    #[serde(rename = "MGOAL_COMPUTER_TOGGLE")]
    ComputerToggle,
    #[serde(rename = "MGOAL_CONDITION")]
    Condition,
}

/// A mission instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    /// Mission type id, e.g. `"MISSION_GET_ANTIBIOTICS"`.
    pub type_id: String,
    pub goal: MissionGoal,
    pub complete: bool,
    pub has_generic_rewards: bool,
    /// NPC that gave the mission.
    pub giver: Option<EntityId>,
}

impl Mission {
    pub fn new(type_id: impl Into<String>, goal: MissionGoal) -> Self {
        Self {
            id: MissionId::new(),
            type_id: type_id.into(),
            goal,
            complete: false,
            has_generic_rewards: true,
            giver: None,
        }
    }
}

/// A faction and its standing with the player.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Faction {
    pub id: String,
    pub name: String,
    /// How much the faction trusts the player.
    pub trust: i32,
    #[serde(default)]
    pub vars: VarStore,
}

impl Faction {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }
}

/// Weather and atmosphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Weather type id, e.g. `"clear"` or `"acid_rain"`.
    pub weather: String,
    /// Temperature in Fahrenheit.
    pub temperature: i32,
    /// Wind speed in mph.
    pub windpower: i32,
    /// Relative humidity in percent.
    pub humidity: i32,
    /// Air pressure in millibars.
    pub pressure: i32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            weather: "clear".to_string(),
            temperature: 65,
            windpower: 5,
            humidity: 50,
            pressure: 1015,
        }
    }
}

/// A monster on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub type_id: String,
    pub position: Tripoint,
    pub hostile: bool,
}

impl Monster {
    pub fn new(type_id: impl Into<String>, position: Tripoint, hostile: bool) -> Self {
        Self {
            id: EntityId::new(),
            type_id: type_id.into(),
            position,
            hostile,
        }
    }
}

/// An item lying on the ground.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LooseItem {
    pub item: Item,
    pub position: Tripoint,
}

/// The complete state of the game world at any point in time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldState {
    pub calendar: Calendar,

    /// Current weather and environmental conditions.
    pub environment: Environment,

    pub map: MapData,

    /// All characters in the world (including player).
    pub characters: HashMap<EntityId, Character>,

    pub player_id: Option<EntityId>,

    /// Items lying around, keyed by item id.
    pub items: HashMap<EntityId, LooseItem>,

    pub monsters: Vec<Monster>,

    pub missions: HashMap<MissionId, Mission>,

    pub factions: HashMap<String, Faction>,

    /// Global variables.
    pub globals: VarStore,

    /// Answers the player gives to yes/no prompts, keyed by prompt text.
    pub query_answers: HashMap<String, bool>,
}

impl WorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get character by ID.
    pub fn get_character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Get mutable character by ID.
    pub fn get_character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    pub fn player(&self) -> Option<&Character> {
        self.player_id.and_then(|id| self.characters.get(&id))
    }

    /// Add a character to the world.
    pub fn add_character(&mut self, character: Character) -> EntityId {
        let id = character.id;
        self.characters.insert(id, character);
        id
    }

    /// Add the player character and remember its id.
    pub fn add_player(&mut self, character: Character) -> EntityId {
        let id = self.add_character(character);
        self.player_id = Some(id);
        id
    }

    pub fn add_item(&mut self, item: Item, position: Tripoint) -> EntityId {
        let id = item.id;
        self.items.insert(id, LooseItem { item, position });
        id
    }

    pub fn add_mission(&mut self, mission: Mission) -> MissionId {
        let id = mission.id;
        self.missions.insert(id, mission);
        id
    }

    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.insert(faction.id.clone(), faction);
    }

    pub fn get_mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.get(&id)
    }

    /// NPCs travelling with the player.
    pub fn followers(&self) -> impl Iterator<Item = &Character> {
        self.characters.values().filter(|c| {
            c.npc
                .as_ref()
                .is_some_and(|profile| profile.attitude.is_following())
        })
    }

    /// Followers within `range` squares of the player.
    pub fn followers_near_player(&self, range: i32) -> usize {
        let Some(player) = self.player() else {
            return 0;
        };
        self.followers()
            .filter(|c| c.position.z == player.position.z)
            .filter(|c| c.position.square_dist(player.position) <= range)
            .count()
    }

    /// NPCs with the given companion role within `range` of `pos`.
    pub fn npcs_with_role_near(&self, role: &str, pos: Tripoint, range: i32) -> usize {
        self.characters
            .values()
            .filter(|c| c.npc.as_ref().and_then(|n| n.role.as_deref()) == Some(role))
            .filter(|c| c.position.z == pos.z && c.position.square_dist(pos) <= range)
            .count()
    }

    /// Monsters within `range` of `pos` lying in `direction`.
    pub fn monsters_in_direction(
        &self,
        pos: Tripoint,
        direction: Direction,
        range: i32,
        hostile_only: bool,
    ) -> usize {
        self.monsters
            .iter()
            .filter(|m| !hostile_only || m.hostile)
            .filter(|m| m.position.z == pos.z && m.position.square_dist(pos) <= range)
            .filter(|m| Direction::between(pos, m.position) == Some(direction))
            .count()
    }

    /// Advance time by the given duration.
    pub fn advance_time(&mut self, duration: TimeDuration) {
        self.calendar.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NpcProfile;
    use crate::mechanics::NpcAttitude;

    #[test]
    fn test_add_player() {
        let mut state = WorldState::new();
        let id = state.add_player(Character::new("Survivor"));

        assert_eq!(state.player_id, Some(id));
        assert_eq!(state.player().map(|p| p.name.as_str()), Some("Survivor"));
    }

    #[test]
    fn test_followers_near_player() {
        let mut state = WorldState::new();
        state.add_player(Character::new("Survivor"));

        let mut near = Character::new_npc(
            "Near",
            NpcProfile::new("NC_NONE").with_attitude(NpcAttitude::Follow),
        );
        near.position = Tripoint::new(5, 5, 0);
        let mut far = Character::new_npc(
            "Far",
            NpcProfile::new("NC_NONE").with_attitude(NpcAttitude::Follow),
        );
        far.position = Tripoint::new(500, 0, 0);
        let stranger = Character::new_npc("Stranger", NpcProfile::new("NC_NONE"));

        state.add_character(near);
        state.add_character(far);
        state.add_character(stranger);

        assert_eq!(state.followers().count(), 2);
        assert_eq!(state.followers_near_player(60), 1);
    }

    #[test]
    fn test_monsters_in_direction() {
        let mut state = WorldState::new();
        let origin = Tripoint::new(0, 0, 0);
        state
            .monsters
            .push(Monster::new("mon_zombie", Tripoint::new(0, -10, 0), true));
        state
            .monsters
            .push(Monster::new("mon_dog", Tripoint::new(0, -3, 0), false));

        assert_eq!(state.monsters_in_direction(origin, Direction::North, 20, false), 2);
        assert_eq!(state.monsters_in_direction(origin, Direction::North, 20, true), 1);
        assert_eq!(state.monsters_in_direction(origin, Direction::North, 5, true), 0);
        assert_eq!(state.monsters_in_direction(origin, Direction::South, 20, false), 0);
    }

    #[test]
    fn test_advance_time() {
        let mut state = WorldState::new();
        state.advance_time(TimeDuration::from_days(2));
        assert_eq!(state.calendar.day(), 2);
    }
}
