//! Component definitions for characters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Item;
use crate::mechanics::{BodyPart, NeedKind};
use crate::world_state::TimeDuration;

/// Primary attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsComponent {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub perception: i32,
}

impl Default for StatsComponent {
    fn default() -> Self {
        Self {
            strength: 8,
            dexterity: 8,
            intelligence: 8,
            perception: 8,
        }
    }
}

/// Stat types readable by dialogue conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatType {
    Strength,
    Dexterity,
    Intelligence,
    Perception,
}

impl StatsComponent {
    pub fn get(&self, stat: StatType) -> i32 {
        match stat {
            StatType::Strength => self.strength,
            StatType::Dexterity => self.dexterity,
            StatType::Intelligence => self.intelligence,
            StatType::Perception => self.perception,
        }
    }
}

/// Health, pain, morale and bionic power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsComponent {
    pub hp: HashMap<BodyPart, i32>,
    pub pain: i32,
    /// Stored bionic power in kJ.
    pub power: i32,
    pub max_power: i32,
    pub focus: i32,
    pub morale: i32,
    pub hunger: i32,
    pub thirst: i32,
    pub fatigue: i32,
}

impl Default for VitalsComponent {
    fn default() -> Self {
        Self {
            hp: BodyPart::ALL.iter().map(|bp| (*bp, 60)).collect(),
            pain: 0,
            power: 0,
            max_power: 0,
            focus: 100,
            morale: 0,
            hunger: 0,
            thirst: 0,
            fatigue: 0,
        }
    }
}

impl VitalsComponent {
    /// Hit points of one body part, or the sum over all parts.
    pub fn hp(&self, part: Option<BodyPart>) -> i32 {
        match part {
            Some(bp) => self.hp.get(&bp).copied().unwrap_or(0),
            None => self.hp.values().sum(),
        }
    }

    pub fn need(&self, need: NeedKind) -> i32 {
        match need {
            NeedKind::Hunger => self.hunger,
            NeedKind::Thirst => self.thirst,
            NeedKind::Fatigue => self.fatigue,
        }
    }
}

/// Items carried, worn and wielded.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventoryComponent {
    pub carried: Vec<Item>,
    pub worn: Vec<Item>,
    pub wielded: Option<Item>,
}

impl InventoryComponent {
    /// Every item the character has on them.
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.carried
            .iter()
            .chain(self.worn.iter())
            .chain(self.wielded.iter())
    }

    pub fn all_items_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.carried
            .iter_mut()
            .chain(self.worn.iter_mut())
            .chain(self.wielded.iter_mut())
    }
}

/// Status effects currently active on a character.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusEffectComponent {
    pub active_effects: Vec<ActiveEffect>,
}

/// An active effect with intensity and optional body part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect_id: String,
    pub intensity: i32,
    pub body_part: Option<BodyPart>,
    /// None = permanent effect.
    pub remaining_duration: Option<TimeDuration>,
}

impl ActiveEffect {
    pub fn new(effect_id: impl Into<String>, intensity: i32) -> Self {
        Self {
            effect_id: effect_id.into(),
            intensity,
            body_part: None,
            remaining_duration: None,
        }
    }

    pub fn on_body_part(mut self, part: BodyPart) -> Self {
        self.body_part = Some(part);
        self
    }
}

impl StatusEffectComponent {
    /// Find an effect, optionally restricted to one body part.
    pub fn get(&self, effect_id: &str, part: Option<BodyPart>) -> Option<&ActiveEffect> {
        self.active_effects
            .iter()
            .find(|e| e.effect_id == effect_id && (part.is_none() || e.body_part == part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_lookup() {
        let stats = StatsComponent {
            strength: 12,
            perception: 6,
            ..Default::default()
        };

        assert_eq!(stats.get(StatType::Strength), 12);
        assert_eq!(stats.get(StatType::Dexterity), 8);
        assert_eq!(stats.get(StatType::Perception), 6);
    }

    #[test]
    fn test_hp_per_part_and_total() {
        let mut vitals = VitalsComponent::default();
        vitals.hp.insert(BodyPart::Head, 20);

        assert_eq!(vitals.hp(Some(BodyPart::Head)), 20);
        assert_eq!(vitals.hp(None), 20 + 5 * 60);
    }

    #[test]
    fn test_effect_lookup_by_body_part() {
        let effects = StatusEffectComponent {
            active_effects: vec![ActiveEffect::new("bleed", 2).on_body_part(BodyPart::ArmL)],
        };

        assert!(effects.get("bleed", None).is_some());
        assert!(effects.get("bleed", Some(BodyPart::ArmL)).is_some());
        assert!(effects.get("bleed", Some(BodyPart::Head)).is_none());
        assert!(effects.get("downed", None).is_none());
    }
}
