//! Positions, terrain and overmap data.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Local map squares per overmap tile along each axis.
pub const OMT_SIZE: i32 = 24;

/// Absolute position of a single map square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tripoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Tripoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The overmap tile containing this square.
    pub fn to_omt(self) -> OmtPoint {
        OmtPoint::new(
            self.x.div_euclid(OMT_SIZE),
            self.y.div_euclid(OMT_SIZE),
            self.z,
        )
    }

    /// Chebyshev distance on the horizontal plane.
    pub fn square_dist(self, other: Tripoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Absolute position of an overmap tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OmtPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl OmtPoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn square_dist(self, other: OmtPoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Compass directions, north being negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Direction of `to` as seen from `from`, `None` when on the same square.
    pub fn between(from: Tripoint, to: Tripoint) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }

        // Split the circle into eight 45 degree sectors centred on each direction
        let angle = (dy as f64).atan2(dx as f64).to_degrees();
        let sector = ((angle + 360.0 + 22.5) % 360.0 / 45.0) as u8;
        Some(match sector {
            0 => Direction::East,
            1 => Direction::SouthEast,
            2 => Direction::South,
            3 => Direction::SouthWest,
            4 => Direction::West,
            5 => Direction::NorthWest,
            6 => Direction::North,
            _ => Direction::NorthEast,
        })
    }
}

/// Terrain, fields and overmap layout of the known world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapData {
    /// Terrain id per square. Squares without an entry are `t_dirt`.
    pub terrain: HashMap<Tripoint, String>,
    /// Active field ids per square.
    pub fields: HashMap<Tripoint, Vec<String>>,
    /// Squares under a roof.
    pub indoors: HashSet<Tripoint>,
    /// Overmap terrain id per tile.
    pub overmap: HashMap<OmtPoint, String>,
    /// Tiles considered safe from hostiles.
    pub safe_tiles: HashSet<OmtPoint>,
    /// Tiles with a faction camp.
    pub camps: HashSet<OmtPoint>,
}

impl MapData {
    pub const DEFAULT_TERRAIN: &'static str = "t_dirt";
    pub const DEFAULT_OVERMAP_TERRAIN: &'static str = "field";

    pub fn ter(&self, pos: Tripoint) -> &str {
        self.terrain
            .get(&pos)
            .map(String::as_str)
            .unwrap_or(Self::DEFAULT_TERRAIN)
    }

    pub fn has_field(&self, pos: Tripoint, field: &str) -> bool {
        self.fields
            .get(&pos)
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    pub fn is_outside(&self, pos: Tripoint) -> bool {
        !self.indoors.contains(&pos)
    }

    pub fn omt_ter(&self, omt: OmtPoint) -> &str {
        self.overmap
            .get(&omt)
            .map(String::as_str)
            .unwrap_or(Self::DEFAULT_OVERMAP_TERRAIN)
    }

    pub fn is_safe(&self, omt: OmtPoint) -> bool {
        self.safe_tiles.contains(&omt)
    }

    pub fn has_camp(&self, omt: OmtPoint) -> bool {
        self.camps.contains(&omt)
    }

    /// Overmap tiles within `range` of `center` on the same z-level.
    pub fn omts_within(&self, center: OmtPoint, range: i32) -> impl Iterator<Item = OmtPoint> {
        let range = range.max(0);
        (-range..=range).flat_map(move |dx| {
            (-range..=range).map(move |dy| OmtPoint::new(center.x + dx, center.y + dy, center.z))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_omt_handles_negative_coordinates() {
        assert_eq!(Tripoint::new(25, 3, 0).to_omt(), OmtPoint::new(1, 0, 0));
        assert_eq!(Tripoint::new(-1, -24, 1).to_omt(), OmtPoint::new(-1, -1, 1));
    }

    #[test]
    fn test_direction_between() {
        let origin = Tripoint::new(0, 0, 0);
        assert_eq!(
            Direction::between(origin, Tripoint::new(0, -5, 0)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(origin, Tripoint::new(4, 4, 0)),
            Some(Direction::SouthEast)
        );
        assert_eq!(
            Direction::between(origin, Tripoint::new(-6, 1, 0)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn test_map_defaults() {
        let mut map = MapData::default();
        let pos = Tripoint::new(3, 3, 0);
        assert_eq!(map.ter(pos), "t_dirt");
        assert!(map.is_outside(pos));

        map.indoors.insert(pos);
        map.fields.insert(pos, vec!["fd_smoke".to_string()]);
        assert!(!map.is_outside(pos));
        assert!(map.has_field(pos, "fd_smoke"));
        assert!(!map.has_field(pos, "fd_fire"));
    }

    #[test]
    fn test_omts_within() {
        let map = MapData::default();
        let tiles: Vec<_> = map.omts_within(OmtPoint::new(0, 0, 0), 1).collect();
        assert_eq!(tiles.len(), 9);
    }
}
