//! Game engine: owns the map, the unit roster, and turn sequencing, and
//! exposes the action surface consumed by the transport layer.
//!
//! The engine is synchronous and assumes one logical caller per game
//! instance; the surrounding session layer serializes concurrent requests.
//! Ending a turn drives any run of automated players inline, so a call to
//! [`GameEngine::end_turn`] always returns with a human player (or the
//! caller's own next turn) in control.

use crate::ai::AiAgent;
use crate::combat::{self, AttackOutcome};
use crate::error::{ActionError, RestoreError, SetupError};
use crate::hex::HexCoord;
use crate::history::{HistoryEntry, HistoryEvent};
use crate::map::{Map, Tile};
use crate::mapgen::{LayoutProvider, MapGenConfig, MapGenerator};
use crate::pathfinding::{find_path, path_cost};
use crate::player::Player;
use crate::types::UnitId;
use crate::unit::{CombatKind, Unit, UnitKind, ATTACK_XP, KILL_XP};
use crate::visibility::{self, GameView};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Maximum number of players per game.
pub const MAX_PLAYERS: usize = 2;

/// Units spawned for every joining player, in spawn order.
const STARTING_ROSTER: [UnitKind; 3] = [UnitKind::Warrior, UnitKind::Archer, UnitKind::Settler];

/// The authoritative state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEngine {
    /// The terrain grid.
    pub map: Map,
    /// Live units indexed by id.
    pub units: HashMap<UnitId, Unit>,
    /// Ordered player roster.
    pub players: Vec<Player>,
    /// Index into `players` of the player whose turn it is.
    pub current_index: usize,
    /// Turn counter; increments only when the index wraps back to 0.
    pub turn: u32,
    /// Append-only move history.
    pub history: Vec<HistoryEntry>,
    /// Next unit id to allocate.
    pub next_unit_id: UnitId,
    /// Player cap for this game.
    pub max_players: usize,
}

impl GameEngine {
    /// Create a new game with a scripted map of the given side length.
    pub fn new(map_size: u32, seed: [u8; 32]) -> Self {
        let mut generator = MapGenerator::new(seed, MapGenConfig::new(map_size));
        Self::with_map(generator.generate())
    }

    /// Create a new game, asking an external layout collaborator for the
    /// map and falling back to the scripted generator on failure.
    pub fn with_layout(map_size: u32, seed: [u8; 32], provider: &mut dyn LayoutProvider) -> Self {
        let mut generator = MapGenerator::new(seed, MapGenConfig::new(map_size));
        Self::with_map(generator.generate_with(provider))
    }

    /// Create a new game over a prebuilt map.
    pub fn with_map(map: Map) -> Self {
        Self {
            map,
            units: HashMap::new(),
            players: Vec::new(),
            current_index: 0,
            turn: 1,
            history: Vec::new(),
            next_unit_id: 1,
            max_players: MAX_PLAYERS,
        }
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Check if the game still has room for another player.
    pub fn can_add_player(&self) -> bool {
        self.players.len() < self.max_players
    }

    /// Add a player and spawn their starting roster.
    ///
    /// The roster must always contain a human, so an automated player may
    /// only join a game that already has one.
    pub fn add_player(&mut self, id: &str, is_automated: bool) -> Result<(), SetupError> {
        if !self.can_add_player() {
            return Err(SetupError::GameFull);
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(SetupError::DuplicatePlayer);
        }
        if is_automated && !self.players.iter().any(Player::is_human) {
            return Err(SetupError::NoHumanPlayer);
        }

        let corner = self.spawn_corner(self.players.len());
        self.players.push(Player::new(id, is_automated));
        self.spawn_starting_units(id, corner);
        debug!(player = id, is_automated, "player joined");
        Ok(())
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_index)
    }

    /// The id of the player whose turn it is.
    pub fn current_player_id(&self) -> Option<&str> {
        self.current_player().map(|p| p.id.as_str())
    }

    /// Base corner for a player's starting roster.
    fn spawn_corner(&self, player_index: usize) -> HexCoord {
        if player_index == 0 {
            HexCoord::new(0, 0)
        } else {
            let edge = self.map.size as i32 - 1;
            HexCoord::new(edge, edge)
        }
    }

    /// Spawn the starting roster on the nearest valid tiles to a corner.
    fn spawn_starting_units(&mut self, owner: &str, corner: HexCoord) {
        let spots = self.find_spawn_positions(corner, STARTING_ROSTER.len());
        for (kind, position) in STARTING_ROSTER.iter().zip(spots) {
            let id = self.allocate_unit_id();
            self.units
                .insert(id, Unit::new(id, owner.to_string(), *kind, position));
        }
    }

    /// Breadth-first "nearest valid spawn" search from a corner.
    ///
    /// The search walks the whole grid if it must; a tile qualifies when
    /// its terrain is passable and no unit stands on it.
    fn find_spawn_positions(&self, corner: HexCoord, count: usize) -> Vec<HexCoord> {
        let mut found = Vec::new();
        let mut seen: HashSet<HexCoord> = HashSet::from([corner]);
        let mut queue: VecDeque<HexCoord> = VecDeque::from([corner]);

        while let Some(current) = queue.pop_front() {
            if found.len() == count {
                break;
            }
            let passable = self
                .map
                .terrain_at(&current)
                .is_some_and(|t| t.is_passable());
            if passable && !self.is_occupied(&current) {
                found.push(current);
            }
            for neighbor in self.map.neighbors(&current) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        found
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Move a unit to a destination within its remaining movement budget.
    pub fn move_unit(&mut self, unit_id: UnitId, destination: HexCoord) -> Result<(), ActionError> {
        let unit = self.units.get(&unit_id).ok_or(ActionError::UnitNotFound)?;
        if !self.map.in_bounds(&destination) {
            return Err(ActionError::OutOfBounds);
        }
        if !self.is_current_player(&unit.owner) {
            return Err(ActionError::NotYourTurn);
        }
        if unit.movement == 0 {
            return Err(ActionError::NoMovementPoints);
        }
        let terrain = self
            .map
            .terrain_at(&destination)
            .ok_or(ActionError::OutOfBounds)?;
        if !terrain.is_passable() {
            return Err(ActionError::ImpassableTerrain);
        }
        if self.is_occupied(&destination) {
            return Err(ActionError::DestinationOccupied);
        }

        let (from, budget, owner) = (unit.position, unit.movement, unit.owner.clone());
        let path = find_path(&self.map, from, destination, budget).ok_or(ActionError::NoPath)?;
        let cost = path_cost(&self.map, &path);
        if cost > budget {
            return Err(ActionError::NoMovementPoints);
        }

        if let Some(unit) = self.units.get_mut(&unit_id) {
            unit.position = destination;
            unit.spend_movement(cost);
        }
        self.history.push(HistoryEntry::new(
            owner,
            self.turn,
            HistoryEvent::Move {
                unit: unit_id,
                from,
                to: destination,
                cost,
            },
        ));
        Ok(())
    }

    /// Attack another unit.
    ///
    /// Attacking always zeroes the attacker's movement. A melee attacker
    /// that survives killing its target captures the target's tile. Dead
    /// units are removed from the roster, each with its own history entry.
    pub fn attack_unit(
        &mut self,
        attacker_id: UnitId,
        target_id: UnitId,
    ) -> Result<AttackOutcome, ActionError> {
        let attacker = self
            .units
            .get(&attacker_id)
            .ok_or(ActionError::UnitNotFound)?;
        let target = self
            .units
            .get(&target_id)
            .ok_or(ActionError::TargetNotFound)?;
        if !self.is_current_player(&attacker.owner) {
            return Err(ActionError::NotYourTurn);
        }
        if attacker.movement == 0 {
            return Err(ActionError::NoMovementPoints);
        }
        if attacker.owner == target.owner {
            return Err(ActionError::CannotAttackOwnUnit);
        }
        if !combat::in_attack_range(attacker, &target.position) {
            return Err(ActionError::OutOfRange);
        }

        let outcome = combat::resolve_attack(attacker, target);
        let is_melee = attacker.combat == CombatKind::Melee;
        let acting_player = attacker.owner.clone();
        let attacker_position = attacker.position;
        let target_position = target.position;
        let target_owner = target.owner.clone();

        self.history.push(HistoryEntry::new(
            acting_player.clone(),
            self.turn,
            HistoryEvent::Attack {
                attacker: attacker_id,
                target: target_id,
                damage_to_target: outcome.damage_to_target,
                damage_to_attacker: outcome.damage_to_attacker,
            },
        ));

        if let Some(target) = self.units.get_mut(&target_id) {
            target.take_damage(outcome.damage_to_target);
        }
        if let Some(attacker) = self.units.get_mut(&attacker_id) {
            attacker.take_damage(outcome.damage_to_attacker);
            attacker.movement = 0;
            let xp = if outcome.target_killed {
                ATTACK_XP + KILL_XP
            } else {
                ATTACK_XP
            };
            attacker.gain_experience(xp);
        }

        if outcome.target_killed {
            self.units.remove(&target_id);
            self.history.push(HistoryEntry::new(
                acting_player.clone(),
                self.turn,
                HistoryEvent::UnitDied {
                    unit: target_id,
                    owner: target_owner,
                    position: target_position,
                },
            ));
            if is_melee && !outcome.attacker_killed {
                if let Some(attacker) = self.units.get_mut(&attacker_id) {
                    attacker.position = target_position;
                }
            }
        }
        if outcome.attacker_killed {
            self.units.remove(&attacker_id);
            self.history.push(HistoryEntry::new(
                acting_player.clone(),
                self.turn,
                HistoryEvent::UnitDied {
                    unit: attacker_id,
                    owner: acting_player.clone(),
                    position: attacker_position,
                },
            ));
        }

        Ok(outcome)
    }

    /// Zero a unit's movement as a voluntary defensive stance.
    pub fn fortify_unit(&mut self, unit_id: UnitId) -> Result<(), ActionError> {
        let unit = self.units.get(&unit_id).ok_or(ActionError::UnitNotFound)?;
        if !self.is_current_player(&unit.owner) {
            return Err(ActionError::NotYourTurn);
        }
        if let Some(unit) = self.units.get_mut(&unit_id) {
            unit.movement = 0;
        }
        Ok(())
    }

    /// Found a city: removes the settler and records the event.
    ///
    /// City simulation itself lives outside this engine; the roster change
    /// and the history entry are the whole effect here.
    pub fn settle_city(&mut self, unit_id: UnitId) -> Result<(), ActionError> {
        let unit = self.units.get(&unit_id).ok_or(ActionError::UnitNotFound)?;
        if !self.is_current_player(&unit.owner) {
            return Err(ActionError::NotYourTurn);
        }
        if unit.kind != UnitKind::Settler {
            return Err(ActionError::NotASettler);
        }
        if unit.movement == 0 {
            return Err(ActionError::NoMovementPoints);
        }
        let terrain = self
            .map
            .terrain_at(&unit.position)
            .ok_or(ActionError::OutOfBounds)?;
        if !terrain.can_settle() {
            return Err(ActionError::CannotSettleOnWater);
        }

        let (owner, position) = (unit.owner.clone(), unit.position);
        self.units.remove(&unit_id);
        self.history.push(HistoryEntry::new(
            owner,
            self.turn,
            HistoryEvent::SettleCity {
                unit: unit_id,
                position,
            },
        ));
        Ok(())
    }

    // =========================================================================
    // Turn sequencing
    // =========================================================================

    /// End the current player's turn.
    ///
    /// After the hand-off, any run of consecutive automated players acts
    /// inline: each automated turn runs the agent once and then advances
    /// exactly once, so control always returns with a human in charge.
    pub fn end_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.advance_turn();

        while self.current_player().is_some_and(|p| p.is_automated) {
            let player_id = match self.current_player() {
                Some(p) => p.id.clone(),
                None => break,
            };
            if let Err(err) = AiAgent::new(player_id.clone()).take_turn(self) {
                warn!(player = %player_id, %err, "automated turn failed, passing");
            }
            self.advance_turn();
        }
    }

    /// Hand the turn to the next player in roster order.
    ///
    /// Records the end-turn entry, advances the index, bumps the turn
    /// counter on wrap-around, and restores movement for the player whose
    /// turn just closed.
    fn advance_turn(&mut self) {
        let finished = match self.current_player() {
            Some(p) => p.id.clone(),
            None => return,
        };
        self.history.push(HistoryEntry::new(
            finished.clone(),
            self.turn,
            HistoryEvent::EndTurn,
        ));
        self.current_index = (self.current_index + 1) % self.players.len();
        if self.current_index == 0 {
            self.turn += 1;
        }
        for unit in self.units.values_mut().filter(|u| u.owner == finished) {
            unit.reset_movement();
        }
    }

    // =========================================================================
    // Snapshots & persistence
    // =========================================================================

    /// Build the fog-of-war-filtered snapshot for a player.
    pub fn visible_state(&self, player_id: &str) -> Result<GameView, SetupError> {
        if !self.players.iter().any(|p| p.id == player_id) {
            return Err(SetupError::UnknownPlayer(player_id.to_string()));
        }

        let visible = visibility::visible_tiles(&self.map, &self.units, player_id);

        let mut tiles: Vec<Tile> = visible
            .iter()
            .filter_map(|coord| self.map.get(coord))
            .copied()
            .collect();
        tiles.sort_by_key(|t| t.coord);

        let mut units: Vec<Unit> = visibility::visible_units(&self.units, &visible, player_id)
            .into_iter()
            .cloned()
            .collect();
        units.sort_by_key(|u| u.id);

        Ok(GameView {
            viewer: player_id.to_string(),
            current_player: self
                .current_player_id()
                .unwrap_or_default()
                .to_string(),
            players: self.players.iter().map(|p| p.id.clone()).collect(),
            visible_tiles: tiles,
            visible_units: units,
            map_size: self.map.size,
            turn: self.turn,
            history: self.history.clone(),
            max_players: self.max_players,
        })
    }

    /// Serialize the full game state.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a game from a serialized document.
    ///
    /// Automated-player behavior is re-derived from the restored
    /// automation tags; a roster with no human player is rejected.
    pub fn from_json(doc: &str) -> Result<Self, RestoreError> {
        let engine: GameEngine = serde_json::from_str(doc)?;
        if !engine.players.is_empty() && !engine.players.iter().any(Player::is_human) {
            return Err(SetupError::NoHumanPlayer.into());
        }
        Ok(engine)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Allocate a new unit id.
    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    /// Check if a position is occupied by any live unit.
    pub fn is_occupied(&self, coord: &HexCoord) -> bool {
        self.units.values().any(|u| u.position == *coord)
    }

    fn is_current_player(&self, player_id: &str) -> bool {
        self.current_player_id() == Some(player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainKind;

    fn grass_game() -> GameEngine {
        GameEngine::with_map(Map::filled(10, TerrainKind::Grass))
    }

    fn two_player_game() -> GameEngine {
        let mut game = grass_game();
        game.add_player("alice", false).unwrap();
        game.add_player("bob", false).unwrap();
        game
    }

    fn unit_of(game: &GameEngine, owner: &str, kind: UnitKind) -> Unit {
        game.units
            .values()
            .find(|u| u.owner == owner && u.kind == kind)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_new_game_state() {
        let game = grass_game();
        assert_eq!(game.turn, 1);
        assert!(game.players.is_empty());
        assert!(game.can_add_player());
        assert!(game.history.is_empty());
    }

    #[test]
    fn test_add_players_spawns_starting_roster() {
        let game = two_player_game();
        assert_eq!(game.units.len(), 6);

        for owner in ["alice", "bob"] {
            for kind in [UnitKind::Warrior, UnitKind::Archer, UnitKind::Settler] {
                assert!(
                    game.units
                        .values()
                        .any(|u| u.owner == owner && u.kind == kind),
                    "{owner} is missing a {kind}"
                );
            }
        }

        // All spawn positions are passable, in bounds, and distinct
        let mut positions: Vec<HexCoord> = game.units.values().map(|u| u.position).collect();
        positions.sort();
        positions.dedup();
        assert_eq!(positions.len(), 6);
        for pos in &positions {
            assert!(game.map.in_bounds(pos));
            assert!(game.map.terrain_at(pos).unwrap().is_passable());
        }
    }

    #[test]
    fn test_player_cap() {
        let mut game = two_player_game();
        assert!(!game.can_add_player());
        assert_eq!(game.add_player("carol", false), Err(SetupError::GameFull));
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut game = grass_game();
        game.add_player("alice", false).unwrap();
        assert_eq!(
            game.add_player("alice", false),
            Err(SetupError::DuplicatePlayer)
        );
    }

    #[test]
    fn test_automated_player_requires_a_human() {
        let mut game = grass_game();
        assert_eq!(game.add_player("bot", true), Err(SetupError::NoHumanPlayer));

        game.add_player("alice", false).unwrap();
        assert!(game.add_player("bot", true).is_ok());
    }

    #[test]
    fn test_move_deducts_path_cost() {
        let mut game = two_player_game();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);
        let destination = warrior
            .position
            .neighbors()
            .into_iter()
            .find(|c| game.map.in_bounds(c) && !game.is_occupied(c))
            .unwrap();

        game.move_unit(warrior.id, destination).unwrap();
        let moved = game.units.get(&warrior.id).unwrap();
        assert_eq!(moved.position, destination);
        assert_eq!(moved.movement, warrior.movement - 1);

        assert!(matches!(
            game.history.last().map(|e| &e.event),
            Some(HistoryEvent::Move { cost: 1, .. })
        ));
    }

    #[test]
    fn test_move_rejections() {
        let mut game = two_player_game();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);
        let bob_warrior = unit_of(&game, "bob", UnitKind::Warrior);

        assert_eq!(
            game.move_unit(999, HexCoord::new(1, 1)),
            Err(ActionError::UnitNotFound)
        );
        assert_eq!(
            game.move_unit(warrior.id, HexCoord::new(42, 0)),
            Err(ActionError::OutOfBounds)
        );
        assert_eq!(
            game.move_unit(bob_warrior.id, HexCoord::new(5, 5)),
            Err(ActionError::NotYourTurn)
        );
        assert_eq!(
            game.move_unit(warrior.id, bob_warrior.position),
            Err(ActionError::DestinationOccupied)
        );
    }

    #[test]
    fn test_move_rejects_impassable_destination() {
        let mut game = grass_game();
        game.add_player("alice", false).unwrap();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);

        let wall = HexCoord::new(5, 5);
        game.map.set(Tile::new(wall, TerrainKind::Hills));
        assert_eq!(
            game.move_unit(warrior.id, wall),
            Err(ActionError::ImpassableTerrain)
        );
    }

    #[test]
    fn test_turn_rotation_and_counter() {
        let mut game = two_player_game();
        assert_eq!(game.current_player_id(), Some("alice"));
        assert_eq!(game.turn, 1);

        game.end_turn();
        assert_eq!(game.current_player_id(), Some("bob"));
        assert_eq!(game.turn, 1);

        game.end_turn();
        assert_eq!(game.current_player_id(), Some("alice"));
        assert_eq!(game.turn, 2);
    }

    #[test]
    fn test_movement_resets_when_own_turn_ends() {
        let mut game = two_player_game();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);
        game.fortify_unit(warrior.id).unwrap();
        assert_eq!(game.units.get(&warrior.id).unwrap().movement, 0);

        // Alice's movement is restored as her own turn closes
        game.end_turn();
        assert_eq!(
            game.units.get(&warrior.id).unwrap().movement,
            warrior.max_movement
        );
    }

    #[test]
    fn test_fortify_requires_ownership() {
        let mut game = two_player_game();
        let bob_warrior = unit_of(&game, "bob", UnitKind::Warrior);
        assert_eq!(
            game.fortify_unit(bob_warrior.id),
            Err(ActionError::NotYourTurn)
        );
    }

    #[test]
    fn test_settle_city_removes_settler() {
        let mut game = two_player_game();
        let settler = unit_of(&game, "alice", UnitKind::Settler);

        game.settle_city(settler.id).unwrap();
        assert!(game.units.get(&settler.id).is_none());
        assert!(matches!(
            game.history.last().map(|e| &e.event),
            Some(HistoryEvent::SettleCity { .. })
        ));
    }

    #[test]
    fn test_settle_rejections() {
        let mut game = two_player_game();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);
        let settler = unit_of(&game, "alice", UnitKind::Settler);

        assert_eq!(game.settle_city(warrior.id), Err(ActionError::NotASettler));

        game.fortify_unit(settler.id).unwrap();
        assert_eq!(
            game.settle_city(settler.id),
            Err(ActionError::NoMovementPoints)
        );
    }

    #[test]
    fn test_settle_rejected_on_water() {
        let mut game = two_player_game();
        let settler = unit_of(&game, "alice", UnitKind::Settler);
        game.map
            .set(Tile::new(settler.position, TerrainKind::Water));

        assert_eq!(
            game.settle_city(settler.id),
            Err(ActionError::CannotSettleOnWater)
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut game = two_player_game();
        let warrior = unit_of(&game, "alice", UnitKind::Warrior);
        let destination = warrior
            .position
            .neighbors()
            .into_iter()
            .find(|c| game.map.in_bounds(c) && !game.is_occupied(c))
            .unwrap();
        game.move_unit(warrior.id, destination).unwrap();
        game.end_turn();

        let json = game.to_json().unwrap();
        let restored = GameEngine::from_json(&json).unwrap();

        assert_eq!(restored.turn, game.turn);
        assert_eq!(restored.current_player_id(), game.current_player_id());
        assert_eq!(restored.players, game.players);
        assert_eq!(restored.units, game.units);
        assert_eq!(restored.history, game.history);
        assert_eq!(restored.next_unit_id, game.next_unit_id);
        assert_eq!(restored.max_players, game.max_players);
    }

    #[test]
    fn test_restore_rejects_all_automated_roster() {
        let game = two_player_game();
        let json = game.to_json().unwrap();
        // Forge a save where both players are automated
        let forged = json.replace("\"is_automated\":false", "\"is_automated\":true");

        assert!(matches!(
            GameEngine::from_json(&forged),
            Err(RestoreError::Setup(SetupError::NoHumanPlayer))
        ));
    }
}
