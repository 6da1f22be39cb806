//! Core type aliases used throughout the crate.

/// Identifier of a player (opaque string chosen by the caller).
pub type PlayerId = String;

/// Unique identifier for a unit, allocated by the engine.
pub type UnitId = u64;
