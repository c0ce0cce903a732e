//! Character definitions.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{
    EntityId, InventoryComponent, Item, NpcProfile, StatsComponent, StatusEffectComponent,
    VitalsComponent,
};
use crate::mechanics::BodyPart;
use crate::world_state::{MissionId, Tripoint, VarStore};

/// A living creature that can take part in a dialogue: the player or an NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub male: bool,
    pub height_cm: i32,

    // Core components stored directly for frequent access
    pub stats: StatsComponent,
    pub vitals: VitalsComponent,
    pub inventory: InventoryComponent,
    pub status_effects: StatusEffectComponent,

    pub traits: HashSet<String>,
    pub flags: HashSet<String>,
    pub skills: HashMap<String, i32>,
    pub martial_arts: HashSet<String>,
    pub spells: HashSet<String>,
    pub known_recipes: HashSet<String>,
    pub bionics: Vec<String>,

    pub position: Tripoint,
    pub move_mode: String,
    pub driving: bool,
    pub riding: bool,
    pub underwater: bool,
    pub deaf: bool,
    pub blind: bool,

    pub cash: i64,
    /// Missions the character is working on.
    pub active_missions: Vec<MissionId>,
    #[serde(default)]
    pub vars: VarStore,

    /// Present only for non-player characters.
    pub npc: Option<NpcProfile>,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            male: true,
            height_cm: 175,
            stats: StatsComponent::default(),
            vitals: VitalsComponent::default(),
            inventory: InventoryComponent::default(),
            status_effects: StatusEffectComponent::default(),
            traits: HashSet::new(),
            flags: HashSet::new(),
            skills: HashMap::new(),
            martial_arts: HashSet::new(),
            spells: HashSet::new(),
            known_recipes: HashSet::new(),
            bionics: Vec::new(),
            position: Tripoint::default(),
            move_mode: "walk".to_string(),
            driving: false,
            riding: false,
            underwater: false,
            deaf: false,
            blind: false,
            cash: 0,
            active_missions: Vec::new(),
            vars: VarStore::new(),
            npc: None,
        }
    }

    /// Create a non-player character.
    pub fn new_npc(name: impl Into<String>, profile: NpcProfile) -> Self {
        Self {
            npc: Some(profile),
            ..Self::new(name)
        }
    }

    pub fn is_npc(&self) -> bool {
        self.npc.is_some()
    }

    /// Check if the character is alive.
    pub fn is_alive(&self) -> bool {
        self.vitals.hp(Some(BodyPart::Torso)) > 0 && self.vitals.hp(Some(BodyPart::Head)) > 0
    }

    pub fn has_trait(&self, trait_id: &str) -> bool {
        self.traits.contains(trait_id)
    }

    /// Flags come from the character itself, or any trait or bionic of the same name.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag) || self.has_trait(flag) || self.has_bionic(flag)
    }

    pub fn has_bionic(&self, bionic_id: &str) -> bool {
        self.bionics.iter().any(|b| b == bionic_id)
    }

    pub fn skill_level(&self, skill: &str) -> i32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    pub fn has_effect(&self, effect_id: &str, part: Option<BodyPart>) -> bool {
        self.status_effects.get(effect_id, part).is_some()
    }

    /// Total count of an item type, counting charges.
    pub fn amount_of(&self, type_id: &str) -> u32 {
        self.inventory
            .all_items()
            .filter(|item| item.type_id == type_id)
            .map(|item| item.charges)
            .sum()
    }

    pub fn has_item_with_flag(&self, flag: &str) -> bool {
        self.inventory.all_items().any(|item| item.has_flag(flag))
    }

    /// Number of items (not charges) in a category.
    pub fn items_in_category(&self, category: &str) -> usize {
        self.inventory
            .all_items()
            .filter(|item| item.category == category)
            .count()
    }

    pub fn is_wearing(&self, type_id: &str) -> bool {
        self.inventory.worn.iter().any(|item| item.type_id == type_id)
    }

    pub fn worn_with_flag(&self, flag: &str) -> bool {
        self.inventory.worn.iter().any(|item| item.has_flag(flag))
    }

    pub fn wielded_with_flag(&self, flag: &str) -> bool {
        self.inventory
            .wielded
            .as_ref()
            .is_some_and(|item| item.has_flag(flag))
    }

    pub fn has_weapon(&self) -> bool {
        self.inventory.wielded.is_some()
    }

    /// A weapon can be stowed when something worn has room for it.
    pub fn can_stow_weapon(&self) -> bool {
        self.inventory
            .wielded
            .as_ref()
            .is_some_and(|weapon| !weapon.has_flag("NO_UNWIELD"))
            && self.worn_with_flag("CONTAINER")
    }

    /// Whether any carried item is owned by the given faction.
    pub fn has_item_owned_by(&self, faction: &str) -> bool {
        self.inventory
            .all_items()
            .any(|item| item.owner.as_deref() == Some(faction))
    }

    pub fn find_item(&self, id: EntityId) -> Option<&Item> {
        self.inventory.all_items().find(|item| item.id == id)
    }

    pub fn find_item_mut(&mut self, id: EntityId) -> Option<&mut Item> {
        self.inventory.all_items_mut().find(|item| item.id == id)
    }
}
