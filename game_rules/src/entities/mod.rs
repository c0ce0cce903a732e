//! Entity definitions: characters (creatures) and items.

mod character;
mod components;
mod item;
mod npc;

pub use character::*;
pub use components::*;
pub use item::*;
pub use npc::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for characters and items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
