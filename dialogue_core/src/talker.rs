//! Actor capability: one interface over creatures and items.
//!
//! A dialogue slot is filled by either a living creature or an item. Both are
//! reached through [`Talker`], which offers the capabilities every actor kind
//! shares (name, position, variables, flags). Creature-only and item-only data
//! are reached explicitly through [`Talker::character`] and [`Talker::item`],
//! which yield `None` for the other kind.
//!
//! Borrows returned by `character()`/`item()` hold the world open for reading.
//! Resolve any value expressions before taking them, because evaluation may
//! write variables.

use game_rules::{Character, EntityId, Item, Tripoint, WorldState, PLAYER_FACTION};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// The world shared between talkers, contexts and effects.
pub type SharedWorld = Rc<RefCell<WorldState>>;

/// Wrap a world for use by the engine.
pub fn share_world(world: WorldState) -> SharedWorld {
    Rc::new(RefCell::new(world))
}

/// Where an item lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemLocation {
    Ground(EntityId),
    Carried { owner: EntityId, item: EntityId },
}

/// The thing filling an actor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorHandle {
    Creature(EntityId),
    Item(ItemLocation),
}

/// Uniform capability over whatever fills an actor slot.
pub trait Talker {
    fn handle(&self) -> ActorHandle;

    fn get_creature(&self) -> Option<EntityId> {
        match self.handle() {
            ActorHandle::Creature(id) => Some(id),
            ActorHandle::Item(_) => None,
        }
    }

    fn get_item(&self) -> Option<ItemLocation> {
        match self.handle() {
            ActorHandle::Item(location) => Some(location),
            ActorHandle::Creature(_) => None,
        }
    }

    fn disp_name(&self) -> String;

    fn pos(&self) -> Option<Tripoint>;

    /// Read a talker variable, empty when absent.
    fn get_value(&self, name: &str) -> String;

    fn set_value(&self, name: &str, value: &str);

    fn remove_value(&self, name: &str);

    fn has_flag(&self, flag: &str) -> bool;

    /// Faction whose variables back the `faction` scope.
    fn faction(&self) -> Option<String> {
        None
    }

    /// Creature data, `None` for items.
    fn character(&self) -> Option<Ref<'_, Character>> {
        None
    }

    /// Item data, `None` for creatures.
    fn item(&self) -> Option<Ref<'_, Item>> {
        None
    }
}

/// Resolve a handle into the talker for its kind.
pub fn talker_for(world: &SharedWorld, handle: ActorHandle) -> Box<dyn Talker> {
    match handle {
        ActorHandle::Creature(id) => Box::new(CharacterTalker::new(world.clone(), id)),
        ActorHandle::Item(location) => Box::new(ItemTalker::new(world.clone(), location)),
    }
}

/// Run `f` on the creature behind `talker`, or return `default` when the slot
/// is empty or holds an item.
pub fn query_character<R>(
    talker: Option<&dyn Talker>,
    default: R,
    f: impl FnOnce(&Character) -> R,
) -> R {
    talker
        .and_then(|t| t.character())
        .map(|character| f(&character))
        .unwrap_or(default)
}

/// Talker backed by a character in the world.
pub struct CharacterTalker {
    world: SharedWorld,
    id: EntityId,
}

impl CharacterTalker {
    pub fn new(world: SharedWorld, id: EntityId) -> Self {
        Self { world, id }
    }

    fn with_character<R>(&self, default: R, f: impl FnOnce(&Character) -> R) -> R {
        self.world
            .borrow()
            .get_character(self.id)
            .map(f)
            .unwrap_or(default)
    }
}

impl Talker for CharacterTalker {
    fn handle(&self) -> ActorHandle {
        ActorHandle::Creature(self.id)
    }

    fn disp_name(&self) -> String {
        self.with_character(String::new(), |c| c.name.clone())
    }

    fn pos(&self) -> Option<Tripoint> {
        self.with_character(None, |c| Some(c.position))
    }

    fn get_value(&self, name: &str) -> String {
        self.with_character(String::new(), |c| c.vars.get_value(name))
    }

    fn set_value(&self, name: &str, value: &str) {
        match self.world.borrow_mut().get_character_mut(self.id) {
            Some(character) => character.vars.set_value(name, value),
            None => tracing::warn!("Cannot set '{}' on missing character {}", name, self.id),
        }
    }

    fn remove_value(&self, name: &str) {
        if let Some(character) = self.world.borrow_mut().get_character_mut(self.id) {
            character.vars.remove_value(name);
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.with_character(false, |c| c.has_flag(flag))
    }

    fn faction(&self) -> Option<String> {
        self.with_character(None, |c| match &c.npc {
            Some(profile) => profile.faction.clone(),
            None => Some(PLAYER_FACTION.to_string()),
        })
    }

    fn character(&self) -> Option<Ref<'_, Character>> {
        let id = self.id;
        Ref::filter_map(self.world.borrow(), |w| w.get_character(id)).ok()
    }
}

/// Talker backed by an item, on the ground or carried.
pub struct ItemTalker {
    world: SharedWorld,
    location: ItemLocation,
}

fn locate_item(world: &WorldState, location: ItemLocation) -> Option<&Item> {
    match location {
        ItemLocation::Ground(id) => world.items.get(&id).map(|loose| &loose.item),
        ItemLocation::Carried { owner, item } => world.get_character(owner)?.find_item(item),
    }
}

fn locate_item_mut(world: &mut WorldState, location: ItemLocation) -> Option<&mut Item> {
    match location {
        ItemLocation::Ground(id) => world.items.get_mut(&id).map(|loose| &mut loose.item),
        ItemLocation::Carried { owner, item } => world.get_character_mut(owner)?.find_item_mut(item),
    }
}

impl ItemTalker {
    pub fn new(world: SharedWorld, location: ItemLocation) -> Self {
        Self { world, location }
    }

    fn with_item<R>(&self, default: R, f: impl FnOnce(&Item) -> R) -> R {
        locate_item(&self.world.borrow(), self.location)
            .map(f)
            .unwrap_or(default)
    }
}

impl Talker for ItemTalker {
    fn handle(&self) -> ActorHandle {
        ActorHandle::Item(self.location)
    }

    fn disp_name(&self) -> String {
        self.with_item(String::new(), |item| item.name.clone())
    }

    fn pos(&self) -> Option<Tripoint> {
        let world = self.world.borrow();
        match self.location {
            ItemLocation::Ground(id) => world.items.get(&id).map(|loose| loose.position),
            ItemLocation::Carried { owner, .. } => world.get_character(owner).map(|c| c.position),
        }
    }

    fn get_value(&self, name: &str) -> String {
        self.with_item(String::new(), |item| item.vars.get_value(name))
    }

    fn set_value(&self, name: &str, value: &str) {
        match locate_item_mut(&mut self.world.borrow_mut(), self.location) {
            Some(item) => item.vars.set_value(name, value),
            None => tracing::warn!("Cannot set '{}' on missing item {:?}", name, self.location),
        }
    }

    fn remove_value(&self, name: &str) {
        if let Some(item) = locate_item_mut(&mut self.world.borrow_mut(), self.location) {
            item.vars.remove_value(name);
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.with_item(false, |item| item.has_flag(flag))
    }

    fn faction(&self) -> Option<String> {
        self.with_item(None, |item| item.owner.clone())
    }

    fn item(&self) -> Option<Ref<'_, Item>> {
        let location = self.location;
        Ref::filter_map(self.world.borrow(), |w| locate_item(w, location)).ok()
    }
}
