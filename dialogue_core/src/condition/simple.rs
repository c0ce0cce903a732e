//! Builders for conditions that take no arguments.

use super::query::{
    actor_faction, actor_pos, character_check, npc_check, pair_check, selected_mission,
    CURRENTLY_BUSY,
};
use super::{Condition, ConditionCompiler};
use crate::dialogue::TalkContext;

pub(super) fn register<T: TalkContext + 'static>(compiler: &mut ConditionCompiler<T>) {
    compiler.register_simple("u_male", is_male, false);
    compiler.register_simple("npc_male", is_male, true);
    compiler.register_simple("u_female", is_female, false);
    compiler.register_simple("npc_female", is_female, true);
    compiler.register_simple("has_no_assigned_mission", no_assigned_mission, true);
    compiler.register_simple("has_assigned_mission", has_assigned_mission, true);
    compiler.register_simple("has_many_assigned_missions", has_many_assigned_missions, true);
    compiler.register_simple("has_no_available_mission", no_available_mission, true);
    compiler.register_simple("has_available_mission", has_available_mission, true);
    compiler.register_simple("has_many_available_missions", has_many_available_missions, true);
    compiler.register_simple("mission_complete", mission_complete, true);
    compiler.register_simple("mission_incomplete", mission_incomplete, true);
    compiler.register_simple("mission_has_generic_rewards", mission_has_generic_rewards, true);
    compiler.register_simple("npc_available", npc_available, true);
    compiler.register_simple("npc_following", npc_following, true);
    compiler.register_simple("npc_friend", npc_friend, true);
    compiler.register_simple("npc_hostile", npc_hostile, true);
    compiler.register_simple("npc_train_skills", npc_train_skills, true);
    compiler.register_simple("npc_train_styles", npc_train_styles, true);
    compiler.register_simple("npc_train_spells", npc_train_spells, true);
    compiler.register_simple("at_safe_space", at_safe_space, true);
    compiler.register_simple("is_day", is_day, false);
    compiler.register_simple("npc_has_activity", has_activity, true);
    compiler.register_simple("is_outside", is_outside, false);
    compiler.register_simple("u_is_outside", is_outside, false);
    compiler.register_simple("npc_is_outside", is_outside, true);
    compiler.register_simple("u_has_camp", has_camp, false);
    compiler.register_simple("u_can_stow_weapon", can_stow_weapon, false);
    compiler.register_simple("npc_can_stow_weapon", can_stow_weapon, true);
    compiler.register_simple("u_has_weapon", has_weapon, false);
    compiler.register_simple("npc_has_weapon", has_weapon, true);
    compiler.register_simple("u_driving", is_driving, false);
    compiler.register_simple("npc_driving", is_driving, true);
    compiler.register_simple("has_pickup_list", has_pickup_list, true);
    compiler.register_simple("is_by_radio", is_by_radio, false);
    compiler.register_simple("has_reason", has_reason, false);
    compiler.register_simple("u_is_riding", is_riding, false);
    compiler.register_simple("npc_is_riding", is_riding, true);
    compiler.register_simple("u_is_deaf", is_deaf, false);
    compiler.register_simple("npc_is_deaf", is_deaf, true);
    compiler.register_simple("u_can_see", can_see, false);
    compiler.register_simple("npc_can_see", can_see, true);
    compiler.register_simple("u_is_underwater", is_underwater, false);
    compiler.register_simple("npc_is_underwater", is_underwater, true);
    compiler.register_simple("u_has_stolen_item", has_stolen_item, false);
}

fn is_male<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.male))
}

fn is_female<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| !c.male))
}

fn no_assigned_mission<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_assigned.is_empty()))
}

fn has_assigned_mission<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_assigned.len() == 1))
}

fn has_many_assigned_missions<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_assigned.len() >= 2))
}

fn no_available_mission<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_available.is_empty()))
}

fn has_available_mission<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_available.len() == 1))
}

fn has_many_available_missions<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.missions_available.len() >= 2))
}

fn mission_complete<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| selected_mission(d, is_npc).is_some_and(|m| m.complete))
}

fn mission_incomplete<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| selected_mission(d, is_npc).is_some_and(|m| !m.complete))
}

fn mission_has_generic_rewards<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| selected_mission(d, is_npc).is_some_and(|m| m.has_generic_rewards))
}

fn npc_available<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |c, _| !c.has_effect(CURRENTLY_BUSY, None)))
}

fn npc_following<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.attitude.is_following()))
}

fn npc_friend<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.attitude.is_friendly()))
}

fn npc_hostile<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.attitude.is_hostile()))
}

fn npc_train_skills<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| {
        pair_check(d, is_npc, |trainer, trainee| {
            trainer.npc.as_ref().is_some_and(|p| {
                p.trainable_skills
                    .iter()
                    .any(|(skill, level)| *level > trainee.skill_level(skill))
            })
        })
    })
}

fn npc_train_styles<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| {
        pair_check(d, is_npc, |trainer, trainee| {
            trainer.npc.as_ref().is_some_and(|p| {
                p.trainable_styles
                    .iter()
                    .any(|style| !trainee.martial_arts.contains(style))
            })
        })
    })
}

fn npc_train_spells<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| {
        pair_check(d, is_npc, |trainer, trainee| {
            trainer.npc.as_ref().is_some_and(|p| {
                p.trainable_spells
                    .iter()
                    .any(|spell| !trainee.spells.contains(spell))
            })
        })
    })
}

fn at_safe_space<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d: &T| {
        actor_pos(d, is_npc).is_some_and(|pos| d.world().borrow().map.is_safe(pos.to_omt()))
    })
}

fn is_day<T: TalkContext + 'static>(_: bool) -> Condition<T> {
    Condition::new(|d: &T| d.world().borrow().calendar.is_day())
}

fn has_activity<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| p.activity.is_some()))
}

fn is_outside<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d: &T| {
        actor_pos(d, is_npc).is_some_and(|pos| d.world().borrow().map.is_outside(pos))
    })
}

fn has_camp<T: TalkContext + 'static>(_: bool) -> Condition<T> {
    Condition::new(|d: &T| !d.world().borrow().map.camps.is_empty())
}

fn can_stow_weapon<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.can_stow_weapon()))
}

fn has_weapon<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.has_weapon()))
}

fn is_driving<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.driving))
}

fn has_pickup_list<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| npc_check(d, is_npc, |_, p| !p.pickup_whitelist.is_empty()))
}

fn is_by_radio<T: TalkContext + 'static>(_: bool) -> Condition<T> {
    Condition::new(|d: &T| d.by_radio())
}

fn has_reason<T: TalkContext + 'static>(_: bool) -> Condition<T> {
    Condition::new(|d: &T| !d.reason().is_empty())
}

fn is_riding<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.riding))
}

fn is_deaf<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.deaf))
}

fn can_see<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| !c.blind))
}

fn is_underwater<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d| character_check(d, is_npc, |c| c.underwater))
}

/// Whether the actor carries something belonging to the NPC's faction.
fn has_stolen_item<T: TalkContext + 'static>(is_npc: bool) -> Condition<T> {
    Condition::new(move |d: &T| {
        let Some(faction) = actor_faction(d, true) else {
            return false;
        };
        character_check(d, is_npc, |c| c.has_item_owned_by(&faction))
    })
}

#[cfg(test)]
mod tests {
    use crate::condition::Condition;
    use crate::dialogue::{Dialogue, TalkContext};
    use crate::talker::{share_world, ActorHandle, ItemLocation};
    use game_rules::{
        ActiveEffect, Character, Item, Mission, MissionGoal, NpcAttitude, NpcProfile, Tripoint,
        WorldState,
    };
    use serde_json::json;

    struct Scene {
        state: WorldState,
        player: Character,
        npc: Character,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                state: WorldState::new(),
                player: Character::new("Survivor"),
                npc: Character::new_npc("Trader", NpcProfile::new("NC_TRADER")),
            }
        }

        fn dialogue(self) -> Dialogue {
            let mut state = self.state;
            let player = state.add_player(self.player);
            let npc = state.add_character(self.npc);
            Dialogue::new(
                share_world(state),
                Some(ActorHandle::Creature(player)),
                Some(ActorHandle::Creature(npc)),
            )
        }
    }

    fn check(key: &str, d: &Dialogue) -> bool {
        Condition::<Dialogue>::load(&json!(key)).unwrap().evaluate(d)
    }

    #[test]
    fn test_gender() {
        let mut scene = Scene::new();
        scene.npc.male = false;
        let d = scene.dialogue();

        assert!(check("u_male", &d));
        assert!(!check("u_female", &d));
        assert!(check("npc_female", &d));
        assert!(!check("npc_male", &d));
    }

    #[test]
    fn test_mission_counts() {
        let mut scene = Scene::new();
        let first = scene.state.add_mission(Mission::new("MISSION_GET_BOOK", MissionGoal::FindItem));
        if let Some(profile) = scene.npc.npc.as_mut() {
            profile.missions_assigned.push(first);
        }
        let d = scene.dialogue();

        assert!(!check("has_no_assigned_mission", &d));
        assert!(check("has_assigned_mission", &d));
        assert!(!check("has_many_assigned_missions", &d));
        assert!(check("has_no_available_mission", &d));
        assert!(check("mission_incomplete", &d));
        assert!(!check("mission_complete", &d));
    }

    #[test]
    fn test_mission_complete() {
        let mut scene = Scene::new();
        let mut mission = Mission::new("MISSION_KILL_ZOMBIE", MissionGoal::KillMonster);
        mission.complete = true;
        mission.has_generic_rewards = true;
        let id = scene.state.add_mission(mission);
        if let Some(profile) = scene.npc.npc.as_mut() {
            profile.chosen_mission = Some(id);
        }
        let d = scene.dialogue();

        assert!(check("mission_complete", &d));
        assert!(!check("mission_incomplete", &d));
        assert!(check("mission_has_generic_rewards", &d));
    }

    #[test]
    fn test_attitudes() {
        let mut scene = Scene::new();
        if let Some(profile) = scene.npc.npc.as_mut() {
            profile.attitude = NpcAttitude::Follow;
        }
        scene
            .npc
            .status_effects
            .active_effects
            .push(ActiveEffect::new("currently_busy", 1));
        let d = scene.dialogue();

        assert!(check("npc_following", &d));
        assert!(check("npc_friend", &d));
        assert!(!check("npc_hostile", &d));
        assert!(!check("npc_available", &d));
    }

    #[test]
    fn test_training() {
        let mut scene = Scene::new();
        scene.player.skills.insert("gun".to_string(), 3);
        scene.player.martial_arts.insert("style_karate".to_string());
        if let Some(profile) = scene.npc.npc.as_mut() {
            profile.trainable_skills.insert("gun".to_string(), 3);
            profile.trainable_styles.insert("style_karate".to_string());
            profile.trainable_spells.insert("magic_missile".to_string());
        }
        let d = scene.dialogue();

        assert!(!check("npc_train_skills", &d));
        assert!(!check("npc_train_styles", &d));
        assert!(check("npc_train_spells", &d));
    }

    #[test]
    fn test_world_queries() {
        let mut scene = Scene::new();
        scene.state.calendar.turn = 12 * 3600;
        scene.player.position = Tripoint::new(3, 3, 0);
        scene.state.map.indoors.insert(Tripoint::new(3, 3, 0));
        scene.state.map.safe_tiles.insert(Tripoint::new(0, 0, 0).to_omt());
        let d = scene.dialogue();

        assert!(check("is_day", &d));
        assert!(!check("u_is_outside", &d));
        assert!(check("npc_is_outside", &d));
        assert!(check("at_safe_space", &d));
        assert!(!check("u_has_camp", &d));
    }

    #[test]
    fn test_weapons_and_status() {
        let mut scene = Scene::new();
        scene.player.inventory.wielded = Some(Item::new("knife"));
        scene.player.inventory.worn.push(Item::new("backpack").with_flag("CONTAINER"));
        scene.player.driving = true;
        scene.npc.blind = true;
        let d = scene.dialogue();

        assert!(check("u_has_weapon", &d));
        assert!(check("u_can_stow_weapon", &d));
        assert!(!check("npc_has_weapon", &d));
        assert!(check("u_driving", &d));
        assert!(check("u_can_see", &d));
        assert!(!check("npc_can_see", &d));
    }

    #[test]
    fn test_stolen_item() {
        let mut scene = Scene::new();
        if let Some(profile) = scene.npc.npc.as_mut() {
            profile.faction = Some("free_merchants".to_string());
        }
        scene
            .player
            .inventory
            .carried
            .push(Item::new("merch").with_owner("free_merchants"));
        let d = scene.dialogue();

        assert!(check("u_has_stolen_item", &d));
    }

    #[test]
    fn test_dialogue_details() {
        let d = Scene::new().dialogue().with_radio(true).with_reason("Help!");
        assert!(check("is_by_radio", &d));
        assert!(check("has_reason", &d));
        assert!(!check("is_by_radio", &Scene::new().dialogue()));
    }

    #[test]
    fn test_creature_queries_are_false_for_items() {
        let mut state = WorldState::new();
        let rock = state.add_item(Item::new("rock"), Tripoint::new(0, 0, 0));
        let d = Dialogue::new(
            share_world(state),
            Some(ActorHandle::Item(ItemLocation::Ground(rock))),
            None,
        );

        assert!(d.has_alpha());
        for key in ["u_male", "u_female", "u_has_weapon", "u_can_see", "npc_friend", "npc_available"] {
            assert!(!check(key, &d), "'{}' should be false", key);
        }
    }
}
