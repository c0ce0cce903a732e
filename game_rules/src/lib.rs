//! # Game Rules
//!
//! The world model queried by dialogue conditions: characters, items, the
//! calendar, weather, map data, missions and factions.
//! This crate is the single source of truth for game state and knows nothing
//! about how content expresses conditions over it.

pub mod entities;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use world_state::*;
