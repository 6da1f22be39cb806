//! Game map structure with tiles and spatial queries.

use crate::hex::HexCoord;
use crate::terrain::TerrainKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The game map containing all tiles of a `size x size` square grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    /// Map side length in tiles.
    pub size: u32,
    /// All tiles indexed by coordinate.
    #[serde(with = "tile_seq")]
    pub tiles: HashMap<HexCoord, Tile>,
}

impl Map {
    /// Create a new empty map with the given side length.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            tiles: HashMap::new(),
        }
    }

    /// Create a map filled with a single terrain type (useful for testing).
    pub fn filled(size: u32, terrain: TerrainKind) -> Self {
        let mut map = Self::new(size);
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                let coord = HexCoord::new(x, y);
                map.tiles.insert(coord, Tile::new(coord, terrain));
            }
        }
        map
    }

    /// Get a tile at the given coordinate.
    pub fn get(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// Get a mutable reference to a tile.
    pub fn get_mut(&mut self, coord: &HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(coord)
    }

    /// Insert or replace a tile.
    pub fn set(&mut self, tile: Tile) {
        self.tiles.insert(tile.coord, tile);
    }

    /// Get the terrain at a coordinate, if in bounds.
    pub fn terrain_at(&self, coord: &HexCoord) -> Option<TerrainKind> {
        self.get(coord).map(|t| t.terrain)
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &HexCoord) -> bool {
        coord.in_bounds(self.size)
    }

    /// Get valid neighbors of a hex (respecting map boundaries).
    pub fn neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// Count total tiles in the map.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over all tiles.
    pub fn iter(&self) -> impl Iterator<Item = (&HexCoord, &Tile)> {
        self.tiles.iter()
    }
}

/// Serialization module for the tile table.
///
/// JSON map keys must be strings, so the table is flattened into a sequence
/// of tiles (each tile already carries its coordinate) sorted row-major for
/// stable output, and rebuilt on deserialization.
mod tile_seq {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(tiles: &HashMap<HexCoord, Tile>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut ordered: Vec<&Tile> = tiles.values().collect();
        ordered.sort_by_key(|t| t.coord);
        let mut seq = serializer.serialize_seq(Some(ordered.len()))?;
        for tile in ordered {
            seq.serialize_element(tile)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<HexCoord, Tile>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tiles: Vec<Tile> = Deserialize::deserialize(deserializer)?;
        Ok(tiles.into_iter().map(|t| (t.coord, t)).collect())
    }
}

/// A single tile on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the map.
    pub coord: HexCoord,
    /// Base terrain type.
    pub terrain: TerrainKind,
}

impl Tile {
    /// Create a new tile.
    pub const fn new(coord: HexCoord, terrain: TerrainKind) -> Self {
        Self { coord, terrain }
    }
}
