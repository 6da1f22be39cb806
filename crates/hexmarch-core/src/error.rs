//! Error types.
//!
//! Player-action failures are returned, never panicked: every action method
//! yields `Result<_, ActionError>` with a reason from a closed set that the
//! transport layer forwards verbatim. Configuration problems are a separate
//! fatal category and abort the operation instead of producing a soft
//! failure.

use serde::Serialize;
use thiserror::Error;

/// Why a player action was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionError {
    #[error("unit not found")]
    UnitNotFound,
    #[error("destination out of bounds")]
    OutOfBounds,
    #[error("not your turn")]
    NotYourTurn,
    #[error("insufficient movement points")]
    NoMovementPoints,
    #[error("impassable terrain")]
    ImpassableTerrain,
    #[error("destination occupied")]
    DestinationOccupied,
    #[error("no valid path")]
    NoPath,
    #[error("target out of range")]
    OutOfRange,
    #[error("cannot attack own unit")]
    CannotAttackOwnUnit,
    #[error("target not found")]
    TargetNotFound,
    #[error("only settlers may found cities")]
    NotASettler,
    #[error("cannot settle on water")]
    CannotSettleOnWater,
}

/// Fatal configuration errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("maximum players reached")]
    GameFull,
    #[error("player already joined")]
    DuplicatePlayer,
    #[error("game requires at least one human player")]
    NoHumanPlayer,
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
}

/// Why a saved game could not be restored.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("malformed save document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Setup(#[from] SetupError),
}
