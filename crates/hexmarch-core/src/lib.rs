//! Hexmarch Core Library
//!
//! This crate is the authoritative simulation core for Hexmarch, a
//! two-player turn-based hex strategy game. It owns the map, the units,
//! combat resolution, fog-of-war visibility, movement legality, and turn
//! sequencing, including inline play for automated participants.
//!
//! # Design Principles
//!
//! - **No UI or transport dependencies**: this crate is purely game logic;
//!   rendering, networking, and storage live in the surrounding layers
//! - **Returned errors**: player-action failures are values from a closed
//!   reason set, never panics
//! - **Serializable**: the full engine state round-trips through serde
//! - **Single caller**: one logical caller mutates a game at a time; the
//!   session layer serializes concurrent requests

// Core modules
pub mod hex;
pub mod map;
pub mod terrain;
pub mod types;

// Game state
pub mod engine;
pub mod history;
pub mod player;

// Map generation
pub mod mapgen;

// Units and combat
pub mod combat;
pub mod pathfinding;
pub mod unit;

// Automated players
pub mod ai;

// Visibility and fog of war
pub mod visibility;

// Errors
pub mod error;

// Re-exports for convenience
pub use ai::AiAgent;
pub use combat::{in_attack_range, resolve_attack, AttackOutcome};
pub use engine::{GameEngine, MAX_PLAYERS};
pub use error::{ActionError, RestoreError, SetupError};
pub use hex::HexCoord;
pub use history::{HistoryEntry, HistoryEvent};
pub use map::{Map, Tile};
pub use mapgen::{
    layout_prompt, parse_layout, LayoutError, LayoutProvider, MapGenConfig, MapGenerator,
    SeededRng,
};
pub use pathfinding::{find_path, path_cost, reachable_tiles};
pub use player::Player;
pub use terrain::{TerrainKind, IMPASSABLE};
pub use types::{PlayerId, UnitId};
pub use unit::{CombatKind, Unit, UnitKind, UnitStats};
pub use visibility::{visible_tiles, visible_units, GameView};
