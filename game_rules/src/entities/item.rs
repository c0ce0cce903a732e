//! Item definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::EntityId;
use crate::world_state::VarStore;

/// A single item (or a stack of charges of one item type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    /// Item type id, e.g. `"water_clean"`.
    pub type_id: String,
    pub name: String,
    pub category: String,
    pub flags: HashSet<String>,
    /// Charges for count-by-charges items, 1 otherwise.
    pub charges: u32,
    /// Faction that owns this item, if any.
    pub owner: Option<String>,
    #[serde(default)]
    pub vars: VarStore,
}

impl Item {
    pub fn new(type_id: impl Into<String>) -> Self {
        let type_id = type_id.into();
        Self {
            id: EntityId::new(),
            name: type_id.replace('_', " "),
            type_id,
            category: "other".to_string(),
            flags: HashSet::new(),
            charges: 1,
            owner: None,
            vars: VarStore::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn with_charges(mut self, charges: u32) -> Self {
        self.charges = charges;
        self
    }

    pub fn with_owner(mut self, faction: impl Into<String>) -> Self {
        self.owner = Some(faction.into());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}
