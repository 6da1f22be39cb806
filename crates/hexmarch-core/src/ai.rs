//! Heuristic controller for automated players.
//!
//! The agent keeps no state of its own: it is rebuilt from the player's
//! automation tag whenever a turn needs driving, which is what lets a
//! restored game resume without persisting anything agent-specific.

use crate::combat;
use crate::engine::GameEngine;
use crate::error::ActionError;
use crate::hex::HexCoord;
use crate::pathfinding::find_path;
use crate::types::{PlayerId, UnitId};
use crate::visibility;
use tracing::debug;

/// Drives one player's units for one turn.
///
/// Per unit with movement remaining: attack the nearest visible enemy if
/// it is in range, otherwise advance toward it step by step until a step
/// is rejected. The caller performs the end-of-turn advance.
#[derive(Clone, Debug)]
pub struct AiAgent {
    player: PlayerId,
}

impl AiAgent {
    /// Create an agent for the given player.
    pub fn new(player: impl Into<PlayerId>) -> Self {
        Self {
            player: player.into(),
        }
    }

    /// The player this agent drives.
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Process every unit the player owns, in id order.
    ///
    /// Rejected movement steps are expected and simply stop that unit;
    /// any other action failure aborts the turn and bubbles up to the
    /// turn controller, which treats it as a pass.
    pub fn take_turn(&self, game: &mut GameEngine) -> Result<(), ActionError> {
        let mut unit_ids: Vec<UnitId> = game
            .units
            .values()
            .filter(|u| u.owner == self.player)
            .map(|u| u.id)
            .collect();
        unit_ids.sort_unstable();

        for unit_id in unit_ids {
            // The unit may have fallen in an earlier exchange this turn
            let Some(unit) = game.units.get(&unit_id) else {
                continue;
            };
            if !unit.can_act() {
                continue;
            }
            let position = unit.position;

            let Some((enemy_id, enemy_position)) = self.nearest_visible_enemy(game, position)
            else {
                debug!(player = %self.player, unit = unit_id, "no visible enemies");
                continue;
            };

            if let Some(unit) = game.units.get(&unit_id) {
                if combat::in_attack_range(unit, &enemy_position) {
                    game.attack_unit(unit_id, enemy_id)?;
                    continue;
                }
            }

            // A budget large enough to cross the entire grid; the per-step
            // moves below run out of actual movement points first.
            let search_budget = game.map.size * game.map.size * 2;
            let Some(path) = find_path(&game.map, position, enemy_position, search_budget) else {
                continue;
            };
            for step in path {
                if game.move_unit(unit_id, step).is_err() {
                    break;
                }
            }
        }

        Ok(())
    }

    /// The closest enemy standing on a tile this player can see.
    ///
    /// Ties break on unit id so the choice is deterministic.
    fn nearest_visible_enemy(
        &self,
        game: &GameEngine,
        from: HexCoord,
    ) -> Option<(UnitId, HexCoord)> {
        let visible = visibility::visible_tiles(&game.map, &game.units, &self.player);
        game.units
            .values()
            .filter(|u| u.owner != self.player && visible.contains(&u.position))
            .map(|u| (from.distance(&u.position), u.id, u.position))
            .min()
            .map(|(_, id, position)| (id, position))
    }
}
