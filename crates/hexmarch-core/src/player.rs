//! Player roster entries.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// A player in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier chosen by the caller.
    pub id: PlayerId,
    /// Whether this player is driven by the built-in agent.
    ///
    /// Restoring a saved game re-derives agent behavior from this tag
    /// alone; no agent state is persisted.
    pub is_automated: bool,
}

impl Player {
    /// Create a new player entry.
    pub fn new(id: impl Into<PlayerId>, is_automated: bool) -> Self {
        Self {
            id: id.into(),
            is_automated,
        }
    }

    /// Check if this player is human-controlled.
    pub fn is_human(&self) -> bool {
        !self.is_automated
    }
}
