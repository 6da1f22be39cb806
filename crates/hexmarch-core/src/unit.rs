//! Unit system - the three unit kinds and their live entities.

use crate::hex::HexCoord;
use crate::types::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};

/// Experience awarded for launching an attack.
pub const ATTACK_XP: u32 = 2;

/// Additional experience awarded for destroying a unit.
pub const KILL_XP: u32 = 5;

/// Experience needed to advance past the given level.
pub const fn xp_for_level(level: u32) -> u32 {
    level * 10
}

/// Types of units available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Warrior,
    Archer,
    Settler,
}

impl UnitKind {
    /// Get the immutable template for this unit kind.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitKind::Warrior => UnitStats::melee(2, 2, 100, 25, 10),
            UnitKind::Archer => UnitStats::ranged(2, 3, 75, 20, 5, 2),
            UnitKind::Settler => UnitStats::civilian(2, 2, 50, 5),
        }
    }

    /// Get all unit kinds.
    pub const fn all() -> &'static [UnitKind] {
        &[UnitKind::Warrior, UnitKind::Archer, UnitKind::Settler]
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Warrior => write!(f, "warrior"),
            UnitKind::Archer => write!(f, "archer"),
            UnitKind::Settler => write!(f, "settler"),
        }
    }
}

/// How a unit fights, if at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatKind {
    /// Adjacent attacks with mutual damage.
    Melee,
    /// Distance-limited attacks with no return damage.
    Ranged,
    /// Cannot attack.
    None,
}

/// Immutable per-kind template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// How the unit fights.
    pub combat: CombatKind,
    /// Movement points per turn.
    pub movement: u32,
    /// Vision range in hexes.
    pub vision: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Attack range in hexes (ranged units only).
    pub range: Option<u32>,
}

impl UnitStats {
    /// Create melee unit stats.
    pub const fn melee(movement: u32, vision: u32, max_hp: u32, attack: u32, defense: u32) -> Self {
        Self {
            combat: CombatKind::Melee,
            movement,
            vision,
            max_hp,
            attack,
            defense,
            range: None,
        }
    }

    /// Create ranged unit stats.
    pub const fn ranged(
        movement: u32,
        vision: u32,
        max_hp: u32,
        attack: u32,
        defense: u32,
        range: u32,
    ) -> Self {
        Self {
            combat: CombatKind::Ranged,
            movement,
            vision,
            max_hp,
            attack,
            defense,
            range: Some(range),
        }
    }

    /// Create non-combatant unit stats.
    pub const fn civilian(movement: u32, vision: u32, max_hp: u32, defense: u32) -> Self {
        Self {
            combat: CombatKind::None,
            movement,
            vision,
            max_hp,
            attack: 0,
            defense,
            range: None,
        }
    }
}

/// A unit on the game map.
///
/// Template values are stamped onto the entity at creation so that a saved
/// game document is self-describing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier, allocated by the engine.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Type of unit.
    pub kind: UnitKind,
    /// How the unit fights.
    pub combat: CombatKind,
    /// Current position on the map.
    pub position: HexCoord,
    /// Remaining movement points this turn.
    pub movement: u32,
    /// Movement points restored at the end of the owner's turn.
    pub max_movement: u32,
    /// Vision range in hexes.
    pub vision: u32,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Current level (starts at 1).
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u32,
    /// Experience needed to reach the next level.
    pub next_level_xp: u32,
    /// Attack range in hexes (ranged units only).
    pub range: Option<u32>,
}

impl Unit {
    /// Create a new unit from its kind's template.
    pub fn new(id: UnitId, owner: PlayerId, kind: UnitKind, position: HexCoord) -> Self {
        let stats = kind.stats();
        Self {
            id,
            owner,
            kind,
            combat: stats.combat,
            position,
            movement: stats.movement,
            max_movement: stats.movement,
            vision: stats.vision,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            level: 1,
            experience: 0,
            next_level_xp: xp_for_level(1),
            range: stats.range,
        }
    }

    /// Restore movement points to the template maximum.
    pub fn reset_movement(&mut self) {
        self.movement = self.max_movement;
    }

    /// Check if the unit has movement points left to act with.
    pub fn can_act(&self) -> bool {
        self.movement > 0
    }

    /// Spend movement points.
    pub fn spend_movement(&mut self, cost: u32) {
        self.movement = self.movement.saturating_sub(cost);
    }

    /// Take damage.
    pub fn take_damage(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }

    /// Check if the unit is dead.
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Gain experience, leveling up whenever the threshold is crossed.
    pub fn gain_experience(&mut self, xp: u32) {
        self.experience += xp;
        while self.experience >= self.next_level_xp {
            self.experience -= self.next_level_xp;
            self.level += 1;
            self.next_level_xp = xp_for_level(self.level);
        }
    }

    /// Check if this unit can ever attack.
    pub fn is_combatant(&self) -> bool {
        self.combat != CombatKind::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_creation() {
        let unit = Unit::new(1, "alice".to_string(), UnitKind::Warrior, HexCoord::new(5, 5));
        assert_eq!(unit.id, 1);
        assert_eq!(unit.owner, "alice");
        assert_eq!(unit.hp, 100);
        assert_eq!(unit.movement, 2);
        assert_eq!(unit.level, 1);
        assert_eq!(unit.experience, 0);
    }

    #[test]
    fn test_unit_templates() {
        let warrior = UnitKind::Warrior.stats();
        assert_eq!(warrior.combat, CombatKind::Melee);
        assert_eq!(warrior.attack, 25);
        assert_eq!(warrior.defense, 10);
        assert_eq!(warrior.range, None);

        let archer = UnitKind::Archer.stats();
        assert_eq!(archer.combat, CombatKind::Ranged);
        assert_eq!(archer.range, Some(2));
        assert_eq!(archer.vision, 3);

        let settler = UnitKind::Settler.stats();
        assert_eq!(settler.combat, CombatKind::None);
        assert_eq!(settler.attack, 0);
    }

    #[test]
    fn test_movement_spend_and_reset() {
        let mut unit = Unit::new(1, "p".to_string(), UnitKind::Warrior, HexCoord::new(0, 0));
        assert!(unit.can_act());

        unit.spend_movement(1);
        assert_eq!(unit.movement, 1);

        unit.spend_movement(5);
        assert_eq!(unit.movement, 0);
        assert!(!unit.can_act());

        unit.reset_movement();
        assert_eq!(unit.movement, 2);
    }

    #[test]
    fn test_damage_and_death() {
        let mut unit = Unit::new(1, "p".to_string(), UnitKind::Archer, HexCoord::new(0, 0));
        unit.take_damage(30);
        assert_eq!(unit.hp, 45);
        assert!(!unit.is_dead());

        unit.take_damage(100);
        assert_eq!(unit.hp, 0);
        assert!(unit.is_dead());
    }

    #[test]
    fn test_experience_level_up() {
        let mut unit = Unit::new(1, "p".to_string(), UnitKind::Warrior, HexCoord::new(0, 0));
        assert_eq!(unit.next_level_xp, 10);

        unit.gain_experience(7);
        assert_eq!(unit.level, 1);

        unit.gain_experience(3);
        assert_eq!(unit.level, 2);
        assert_eq!(unit.experience, 0);
        assert_eq!(unit.next_level_xp, 20);

        // Crossing several thresholds at once levels repeatedly
        unit.gain_experience(55);
        assert_eq!(unit.level, 4);
        assert_eq!(unit.experience, 5);
    }

    #[test]
    fn test_settler_is_not_a_combatant() {
        let settler = Unit::new(1, "p".to_string(), UnitKind::Settler, HexCoord::new(0, 0));
        assert!(!settler.is_combatant());
    }

    #[test]
    fn test_unit_serialization() {
        let unit = Unit::new(9, "bob".to_string(), UnitKind::Archer, HexCoord::new(3, 7));
        let json = serde_json::to_string(&unit).unwrap();
        let restored: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, unit);
    }
}
