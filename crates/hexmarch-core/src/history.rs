//! Append-only move history.
//!
//! Every committed action is recorded as a [`HistoryEntry`]; the log is
//! never mutated or reordered and serves as the audit/replay record that
//! clients display.

use crate::hex::HexCoord;
use crate::types::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single committed action in the history log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The player whose action produced this entry.
    pub player: PlayerId,
    /// Turn number when the action was committed.
    pub turn: u32,
    /// Unix timestamp (seconds) when the action was committed.
    pub timestamp: u64,
    /// The action payload.
    pub event: HistoryEvent,
}

impl HistoryEntry {
    /// Create an entry stamped with the current wall-clock time.
    pub fn new(player: PlayerId, turn: u32, event: HistoryEvent) -> Self {
        Self {
            player,
            turn,
            timestamp: unix_timestamp(),
            event,
        }
    }
}

/// The payload of a history entry, discriminated by action kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    Move {
        unit: UnitId,
        from: HexCoord,
        to: HexCoord,
        cost: u32,
    },
    Attack {
        attacker: UnitId,
        target: UnitId,
        damage_to_target: u32,
        damage_to_attacker: u32,
    },
    EndTurn,
    UnitDied {
        unit: UnitId,
        owner: PlayerId,
        position: HexCoord,
    },
    SettleCity {
        unit: UnitId,
        position: HexCoord,
    },
}

/// Current wall-clock time as unix seconds.
fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
