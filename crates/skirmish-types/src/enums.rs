//! Enumeration types for the Skirmish simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Agent kinds
// ---------------------------------------------------------------------------

/// The fixed category of an agent.
///
/// The kind determines how far the agent moves per tick, how close a
/// target must be before it can attack, and which kinds it can kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Moves far, kills druids.
    Orc,
    /// Kills squirrels.
    Druid,
    /// Moves little and never kills anything.
    Squirrel,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::Orc, Self::Druid, Self::Squirrel];

    /// Maximum cells moved per tick.
    pub const fn move_range(self) -> u32 {
        match self {
            Self::Orc => 20,
            Self::Druid => 10,
            Self::Squirrel => 5,
        }
    }

    /// Maximum distance (inclusive) at which this kind can attack.
    pub const fn kill_range(self) -> u32 {
        match self {
            Self::Orc | Self::Druid => 10,
            Self::Squirrel => 5,
        }
    }

    /// Single-character map symbol.
    pub const fn symbol(self) -> char {
        match self {
            Self::Orc => 'O',
            Self::Druid => 'D',
            Self::Squirrel => 'S',
        }
    }

    /// Display name, also used in the roster file format.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Orc => "Orc",
            Self::Druid => "Druid",
            Self::Squirrel => "Squirrel",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.label())
    }
}

/// A kind name that does not match any [`Kind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent kind: {0}")]
pub struct ParseKindError(pub String);

impl core::str::FromStr for Kind {
    type Err = ParseKindError;

    /// Parse a kind name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseKindError(trimmed.to_owned()))
    }
}
