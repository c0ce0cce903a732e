//! Context readers shared by the condition builders.

use game_rules::{Character, Mission, NpcProfile, Tripoint};

use crate::dialogue::TalkContext;
use crate::talker::query_character;

/// Effect marking an NPC as unavailable for requests.
pub(super) const CURRENTLY_BUSY: &str = "currently_busy";

/// Check the creature in a slot. False for empty or item slots.
pub(super) fn character_check<T: TalkContext>(
    d: &T,
    is_npc: bool,
    check: impl FnOnce(&Character) -> bool,
) -> bool {
    query_character(d.actor(is_npc), false, check)
}

/// Check an NPC's profile. False for anything that is not an NPC.
pub(super) fn npc_check<T: TalkContext>(
    d: &T,
    is_npc: bool,
    check: impl FnOnce(&Character, &NpcProfile) -> bool,
) -> bool {
    character_check(d, is_npc, |c| c.npc.as_ref().is_some_and(|profile| check(c, profile)))
}

/// Check the creatures in both slots, `is_npc` naming the first argument.
pub(super) fn pair_check<T: TalkContext>(
    d: &T,
    is_npc: bool,
    check: impl FnOnce(&Character, &Character) -> bool,
) -> bool {
    let first = d.actor(is_npc).and_then(|t| t.character());
    let second = d.actor(!is_npc).and_then(|t| t.character());
    match (first, second) {
        (Some(first), Some(second)) => check(&first, &second),
        _ => false,
    }
}

pub(super) fn actor_pos<T: TalkContext>(d: &T, is_npc: bool) -> Option<Tripoint> {
    d.actor(is_npc).and_then(|t| t.pos())
}

/// The mission an NPC is currently talking about.
pub(super) fn selected_mission<T: TalkContext>(d: &T, is_npc: bool) -> Option<Mission> {
    let id = query_character(d.actor(is_npc), None, |c| c.npc.as_ref()?.selected_mission())?;
    d.world().borrow().get_mission(id).cloned()
}

/// Faction of the actor in a slot.
pub(super) fn actor_faction<T: TalkContext>(d: &T, is_npc: bool) -> Option<String> {
    d.actor(is_npc).and_then(|t| t.faction())
}
