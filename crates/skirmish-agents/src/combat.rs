//! Combat rules: the kind matchup matrix and dice resolution.
//!
//! ## Matchup matrix
//!
//! | attacker \ defender | Orc | Druid | Squirrel |
//! |---------------------|-----|-------|----------|
//! | Orc                 |  -  | kill  |    -     |
//! | Druid               |  -  |   -   |   kill   |
//! | Squirrel            |  -  |   -   |    -     |
//!
//! The relation is not symmetric. `(A, B)` and `(B, A)` are evaluated
//! independently.
//!
//! ## Dice
//!
//! A queued battle only kills when the matchup allows it *and* the
//! attacker's d6 beats the defender's d6. Ties go to the defender, so the
//! attacker wins 15 of the 36 outcomes.

use rand::Rng;
use skirmish_types::{DiceRolls, Kind};

/// Number of faces on each die.
pub const DIE_FACES: u8 = 6;

/// Kill narrative for `attacker` striking `defender`, or `None` if this
/// kind of attacker cannot kill this kind of defender.
pub const fn matchup(attacker: Kind, defender: Kind) -> Option<&'static str> {
    match (attacker, defender) {
        (Kind::Orc, Kind::Druid) => Some("Orc tore the poor Druid apart!"),
        (Kind::Druid, Kind::Squirrel) => Some("Druid destroyed the Squirrel!"),
        _ => None,
    }
}

/// Throw one fair die.
pub fn roll_die<R: Rng>(rng: &mut R) -> u8 {
    rng.random_range(1..=DIE_FACES)
}

/// Throw the attack and defense dice.
pub fn roll_dice<R: Rng>(rng: &mut R) -> DiceRolls {
    DiceRolls {
        attack: roll_die(rng),
        defense: roll_die(rng),
    }
}

/// Outcome of a dice battle between two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The attacker's kind cannot kill the defender's kind; nothing happens.
    NoMatchup,
    /// The attacker out-rolled the defender and the defender dies.
    Kill {
        /// Matchup narrative.
        narrative: &'static str,
    },
    /// The defender held.
    Defended,
}

/// Decide a battle from the kinds involved and the dice thrown.
///
/// Pure: the caller applies any kill under the registry write lock.
pub const fn resolve(attacker: Kind, defender: Kind, rolls: DiceRolls) -> Resolution {
    match matchup(attacker, defender) {
        None => Resolution::NoMatchup,
        Some(narrative) if rolls.attacker_prevails() => Resolution::Kill { narrative },
        Some(_) => Resolution::Defended,
    }
}
