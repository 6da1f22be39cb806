//! Combat resolution between units.
//!
//! The damage model is exact and deterministic: attack minus defense,
//! floored at zero. Melee exchanges are mutual and simultaneous; ranged
//! attacks are one-sided. Roster mutation, capture, and history logging
//! happen in the engine — this module only computes outcomes.

use crate::hex::HexCoord;
use crate::unit::{CombatKind, Unit};
use serde::{Deserialize, Serialize};

/// Default attack range for ranged units without an explicit range.
const DEFAULT_RANGE: u32 = 1;

/// The computed result of one attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Damage applied to the target.
    pub damage_to_target: u32,
    /// Damage applied back to the attacker (melee only).
    pub damage_to_attacker: u32,
    /// Whether the target's hit points reach zero.
    pub target_killed: bool,
    /// Whether the attacker's hit points reach zero.
    pub attacker_killed: bool,
}

/// Check whether a target position is within the attacker's reach.
///
/// Melee requires distance exactly 1; ranged requires distance at most the
/// unit's range (defaulting to 1). Non-combatants are never in range.
pub fn in_attack_range(attacker: &Unit, target_position: &HexCoord) -> bool {
    let distance = attacker.position.distance(target_position);
    match attacker.combat {
        CombatKind::Melee => distance == 1,
        CombatKind::Ranged => distance <= attacker.range.unwrap_or(DEFAULT_RANGE),
        CombatKind::None => false,
    }
}

/// Compute the outcome of an attack without mutating either unit.
///
/// Both sides' damage is determined from the pre-combat stats, so a melee
/// exchange is simultaneous: a dying defender still lands its counter-blow.
pub fn resolve_attack(attacker: &Unit, target: &Unit) -> AttackOutcome {
    let damage_to_target = attacker.attack.saturating_sub(target.defense);
    let damage_to_attacker = match attacker.combat {
        CombatKind::Melee => target.attack.saturating_sub(attacker.defense),
        CombatKind::Ranged | CombatKind::None => 0,
    };

    AttackOutcome {
        damage_to_target,
        damage_to_attacker,
        target_killed: target.hp <= damage_to_target,
        attacker_killed: attacker.hp <= damage_to_attacker,
    }
}
