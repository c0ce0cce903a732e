//! NPC-specific data: attitude, missions, training offers and follower rules.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::mechanics::{AimRule, CbmRechargeRule, CbmReserveRule, EngagementRule, NpcAttitude};
use crate::world_state::MissionId;

/// Rules the player has set for a follower.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowerRules {
    pub aim: AimRule,
    pub engagement: EngagementRule,
    pub cbm_reserve: CbmReserveRule,
    pub cbm_recharge: CbmRechargeRule,
    /// Enabled boolean rules, e.g. `"use_guns"`.
    pub flags: HashSet<String>,
    /// Rules temporarily overridden by the player.
    pub overrides: HashSet<String>,
}

/// Data carried only by non-player characters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcProfile {
    pub class: String,
    pub attitude: NpcAttitude,
    pub faction: Option<String>,
    /// Missions this NPC gave that the player accepted.
    pub missions_assigned: Vec<MissionId>,
    /// Missions this NPC still offers.
    pub missions_available: Vec<MissionId>,
    /// Mission currently under discussion.
    pub chosen_mission: Option<MissionId>,
    /// Skill levels the NPC is willing to teach.
    pub trainable_skills: HashMap<String, i32>,
    pub trainable_styles: HashSet<String>,
    pub trainable_spells: HashSet<String>,
    pub rules: FollowerRules,
    pub activity: Option<String>,
    /// Cash the NPC owes the player.
    pub debt: i64,
    /// Companion mission role, e.g. `"NPC_ROLE_MEDIC"`.
    pub role: Option<String>,
    pub pickup_whitelist: Vec<String>,
}

impl NpcProfile {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }

    pub fn with_attitude(mut self, attitude: NpcAttitude) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Selected mission, falling back to the single assigned one.
    pub fn selected_mission(&self) -> Option<MissionId> {
        self.chosen_mission.or_else(|| match self.missions_assigned.as_slice() {
            [only] => Some(*only),
            _ => None,
        })
    }
}
