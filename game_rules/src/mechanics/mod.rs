//! Game mechanics: body parts, NPC attitudes and follower rules, needs.

use serde::{Deserialize, Serialize};

/// Body parts that track hit points and localized effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Torso,
    Head,
    ArmL,
    ArmR,
    LegL,
    LegR,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::ArmL,
        BodyPart::ArmR,
        BodyPart::LegL,
        BodyPart::LegR,
    ];
}

/// How an NPC currently regards the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NpcAttitude {
    #[default]
    Null,
    Talk,
    Follow,
    Lead,
    Wait,
    Guard,
    Activity,
    Heal,
    Flee,
    Mug,
    Waylay,
    Kill,
}

impl NpcAttitude {
    /// Attitudes of an NPC travelling with the player.
    pub fn is_following(self) -> bool {
        matches!(
            self,
            NpcAttitude::Follow | NpcAttitude::Wait | NpcAttitude::Guard | NpcAttitude::Activity
        )
    }

    /// Allies and anyone willing to help.
    pub fn is_friendly(self) -> bool {
        self.is_following() || matches!(self, NpcAttitude::Lead | NpcAttitude::Heal)
    }

    pub fn is_hostile(self) -> bool {
        matches!(
            self,
            NpcAttitude::Mug | NpcAttitude::Waylay | NpcAttitude::Kill
        )
    }
}

/// When a follower takes aimed shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AimRule {
    #[serde(rename = "AIM_WHEN_CONVENIENT")]
    #[default]
    WhenConvenient,
    #[serde(rename = "AIM_SPRAY")]
    Spray,
    #[serde(rename = "AIM_PRUDENT")]
    Prudent,
    #[serde(rename = "AIM_STRICTLY_PRECISE")]
    StrictlyPrecise,
}

/// Which targets a follower engages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EngagementRule {
    #[serde(rename = "ENGAGE_NONE")]
    None,
    #[serde(rename = "ENGAGE_CLOSE")]
    Close,
    #[serde(rename = "ENGAGE_WEAK")]
    Weak,
    #[serde(rename = "ENGAGE_HIT")]
    Hit,
    #[serde(rename = "ENGAGE_ALL")]
    #[default]
    All,
    #[serde(rename = "ENGAGE_FREE_FIRE")]
    FreeFire,
    #[serde(rename = "ENGAGE_NO_MOVE")]
    NoMove,
}

/// How much bionic power a follower keeps in reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CbmReserveRule {
    #[serde(rename = "CBM_RESERVE_ALL")]
    All,
    #[serde(rename = "CBM_RESERVE_MOST")]
    Most,
    #[serde(rename = "CBM_RESERVE_SOME")]
    #[default]
    Some,
    #[serde(rename = "CBM_RESERVE_LITTLE")]
    Little,
    #[serde(rename = "CBM_RESERVE_NONE")]
    None,
}

/// When a follower recharges bionic power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CbmRechargeRule {
    #[serde(rename = "CBM_RECHARGE_ALL")]
    All,
    #[serde(rename = "CBM_RECHARGE_MOST")]
    Most,
    #[serde(rename = "CBM_RECHARGE_SOME")]
    #[default]
    Some,
    #[serde(rename = "CBM_RECHARGE_LITTLE")]
    Little,
    #[serde(rename = "CBM_RECHARGE_NONE")]
    None,
}

/// Named fatigue thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatigueLevel {
    Tired,
    DeadTired,
    Exhausted,
    MassiveFatigue,
}

impl FatigueLevel {
    /// Fatigue value at which this level begins.
    pub fn threshold(self) -> i32 {
        match self {
            FatigueLevel::Tired => 191,
            FatigueLevel::DeadTired => 383,
            FatigueLevel::Exhausted => 575,
            FatigueLevel::MassiveFatigue => 1000,
        }
    }
}

/// Survival needs tracked per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Hunger,
    Thirst,
    Fatigue,
}
