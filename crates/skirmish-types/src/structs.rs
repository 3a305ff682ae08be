//! Plain data structs that cross crate boundaries.
//!
//! None of these hold references into the live agent registry. They are
//! copies taken under a lock and handed to reporting, persistence, and
//! narration code that runs outside of it.

use serde::{Deserialize, Serialize};

use crate::enums::Kind;
use crate::geometry::Point;
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Persistence shape
// ---------------------------------------------------------------------------

/// One agent in the external roster format: `name kind x y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique display name.
    pub name: String,
    /// Agent kind.
    pub kind: Kind,
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl AgentRecord {
    /// The record's position as a [`Point`].
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl core::fmt::Display for AgentRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} {} {}", self.name, self.kind, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Snapshot shape
// ---------------------------------------------------------------------------

/// A read-locked copy of one agent, used for reporting and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    /// Registry identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Agent kind.
    pub kind: Kind,
    /// Position when the snapshot was taken.
    pub position: Point,
    /// Liveness when the snapshot was taken.
    pub alive: bool,
}

impl AgentView {
    /// `name (Kind)`, the form used in the survivors report.
    pub fn survivor_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Battle narration
// ---------------------------------------------------------------------------

/// The two six-sided dice thrown when a queued battle is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRolls {
    /// The attacker's roll, 1 through 6.
    pub attack: u8,
    /// The defender's roll, 1 through 6.
    pub defense: u8,
}

impl DiceRolls {
    /// Whether the attacker out-rolled the defender. Ties go to the defender.
    pub const fn attacker_prevails(self) -> bool {
        self.attack > self.defense
    }
}

/// Something that happened in a fight, published to battle observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// The target died.
    Kill {
        /// Name of the agent that struck.
        attacker: String,
        /// Name of the agent that died.
        target: String,
        /// Matchup narrative, e.g. "Orc tore the poor Druid apart!".
        narrative: String,
        /// Dice thrown, absent for the editor's diceless battle round.
        rolls: Option<DiceRolls>,
    },
    /// The target survived because the attack roll did not beat the defense.
    Defended {
        /// Name of the agent that struck.
        attacker: String,
        /// Name of the agent that held.
        target: String,
        /// Dice thrown.
        rolls: DiceRolls,
    },
}

impl core::fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Kill {
                attacker,
                target,
                narrative,
                rolls: Some(rolls),
            } => write!(
                f,
                "{narrative} ({attacker} kills {target}) [attack: {} > defense: {}]",
                rolls.attack, rolls.defense
            ),
            Self::Kill {
                attacker,
                target,
                narrative,
                rolls: None,
            } => write!(f, "{narrative} ({attacker} kills {target})"),
            Self::Defended {
                attacker,
                target,
                rolls,
            } => write!(
                f,
                "{attacker} attacked {target} but the defense held! [attack: {} <= defense: {}]",
                rolls.attack, rolls.defense
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn record_display_is_roster_line() {
        let record = AgentRecord {
            name: String::from("Grom"),
            kind: Kind::Orc,
            x: 3,
            y: 14,
        };
        assert_eq!(record.to_string(), "Grom Orc 3 14");
        assert_eq!(record.position(), Point::new(3, 14));
    }

    #[test]
    fn survivor_label_includes_kind() {
        let view = AgentView {
            id: AgentId::new(),
            name: String::from("Nutkin"),
            kind: Kind::Squirrel,
            position: Point::new(1, 1),
            alive: true,
        };
        assert_eq!(view.survivor_label(), "Nutkin (Squirrel)");
    }

    #[test]
    fn ties_go_to_the_defender() {
        assert!(!DiceRolls { attack: 4, defense: 4 }.attacker_prevails());
        assert!(DiceRolls { attack: 5, defense: 4 }.attacker_prevails());
        assert!(!DiceRolls { attack: 1, defense: 6 }.attacker_prevails());
    }

    #[test]
    fn kill_line_shows_rolls() {
        let event = BattleEvent::Kill {
            attacker: String::from("Grom"),
            target: String::from("Elda"),
            narrative: String::from("Orc tore the poor Druid apart!"),
            rolls: Some(DiceRolls { attack: 6, defense: 2 }),
        };
        assert_eq!(
            event.to_string(),
            "Orc tore the poor Druid apart! (Grom kills Elda) [attack: 6 > defense: 2]"
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = BattleEvent::Defended {
            attacker: String::from("Grom"),
            target: String::from("Elda"),
            rolls: DiceRolls { attack: 2, defense: 2 },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(*json.get("type").unwrap(), "defended");
        assert_eq!(*json.pointer("/rolls/attack").unwrap(), 2);
        let back: BattleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
