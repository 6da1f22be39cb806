//! Terrain kinds and their movement costs.

use serde::{Deserialize, Serialize};

/// Sentinel movement cost for tiles that can never be entered.
pub const IMPASSABLE: u32 = u32::MAX;

/// Base terrain type for a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    #[default]
    Grass,
    Forest,
    Hills,
    Water,
}

impl TerrainKind {
    /// Get the movement cost to enter a tile of this terrain.
    ///
    /// Hills block movement just like water while still rendering as land;
    /// clients rely on that distinction.
    pub const fn movement_cost(&self) -> u32 {
        match self {
            TerrainKind::Grass => 1,
            TerrainKind::Forest => 2,
            TerrainKind::Hills | TerrainKind::Water => IMPASSABLE,
        }
    }

    /// Check if units may enter, spawn on, or path through this terrain.
    pub const fn is_passable(&self) -> bool {
        self.movement_cost() != IMPASSABLE
    }

    /// Check if this is a water terrain type.
    pub const fn is_water(&self) -> bool {
        matches!(self, TerrainKind::Water)
    }

    /// Check if a city can be founded on this terrain.
    pub const fn can_settle(&self) -> bool {
        !self.is_water()
    }

    /// The token used in externally generated layouts.
    pub const fn as_token(&self) -> &'static str {
        match self {
            TerrainKind::Grass => "grass",
            TerrainKind::Forest => "forest",
            TerrainKind::Hills => "hills",
            TerrainKind::Water => "water",
        }
    }

    /// Parse a layout token, tolerating surrounding whitespace and case.
    pub fn from_token(token: &str) -> Option<TerrainKind> {
        match token.trim().to_ascii_lowercase().as_str() {
            "grass" => Some(TerrainKind::Grass),
            "forest" => Some(TerrainKind::Forest),
            "hills" => Some(TerrainKind::Hills),
            "water" => Some(TerrainKind::Water),
            _ => None,
        }
    }

    /// Get all terrain variants.
    pub const fn all() -> &'static [TerrainKind] {
        &[
            TerrainKind::Grass,
            TerrainKind::Forest,
            TerrainKind::Hills,
            TerrainKind::Water,
        ]
    }
}

impl std::fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}
