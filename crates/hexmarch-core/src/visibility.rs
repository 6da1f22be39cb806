//! Fog of war: per-player visibility over tiles and units.
//!
//! Vision ignores terrain passability entirely — a unit sees over water and
//! hills alike — and is clipped only by the map bounds. Each player's view
//! is the union of flood fills around their own units.

use crate::hex::HexCoord;
use crate::history::HistoryEntry;
use crate::map::{Map, Tile};
use crate::types::{PlayerId, UnitId};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Compute the set of tiles visible to a player.
///
/// The union, over every unit owned by the player, of a breadth-first
/// flood fill out to that unit's vision range, plus the tiles the units
/// themselves occupy.
pub fn visible_tiles(map: &Map, units: &HashMap<UnitId, Unit>, player: &str) -> HashSet<HexCoord> {
    let mut visible = HashSet::new();
    for unit in units.values().filter(|u| u.owner == player) {
        vision_fill(map, unit.position, unit.vision, &mut visible);
    }
    visible
}

/// Collect the units a player can see.
///
/// A unit is visible if the player owns it, or if it stands on a tile the
/// player can see; own units are never hidden by fog.
pub fn visible_units<'a>(
    units: &'a HashMap<UnitId, Unit>,
    visible: &HashSet<HexCoord>,
    player: &str,
) -> Vec<&'a Unit> {
    units
        .values()
        .filter(|u| u.owner == player || visible.contains(&u.position))
        .collect()
}

/// Breadth-first flood fill out to `range` steps, ignoring terrain and
/// clipped only by map bounds.
fn vision_fill(map: &Map, center: HexCoord, range: u32, out: &mut HashSet<HexCoord>) {
    let mut seen: HashSet<HexCoord> = HashSet::from([center]);
    let mut queue: VecDeque<(HexCoord, u32)> = VecDeque::from([(center, 0)]);
    out.insert(center);

    while let Some((current, depth)) = queue.pop_front() {
        if depth == range {
            continue;
        }
        for neighbor in current.neighbors() {
            if map.in_bounds(&neighbor) && seen.insert(neighbor) {
                out.insert(neighbor);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }
}

/// A per-player, fog-filtered, read-only snapshot of the game.
///
/// Assembled on demand by the engine; tiles and units are sorted so the
/// same state always yields the same snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// The player this snapshot was built for.
    pub viewer: PlayerId,
    /// Whose turn it currently is.
    pub current_player: PlayerId,
    /// Full ordered player roster.
    pub players: Vec<PlayerId>,
    /// Tiles the viewer can currently see, row-major order.
    pub visible_tiles: Vec<Tile>,
    /// Units the viewer can currently see, ordered by id.
    pub visible_units: Vec<Unit>,
    /// Map side length.
    pub map_size: u32,
    /// Current turn number.
    pub turn: u32,
    /// The full move history.
    pub history: Vec<HistoryEntry>,
    /// Maximum number of players for this game.
    pub max_players: usize,
}
