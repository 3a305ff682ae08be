//! Error types for the skirmish-agents crate.
//!
//! Agent construction is the only fallible operation in this crate. Combat
//! rules and movement are total functions.

use skirmish_types::{MapBounds, ParseKindError, Point};

/// Errors that can occur while creating agents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The requested kind name does not match any known kind.
    #[error(transparent)]
    UnknownKind(#[from] ParseKindError),

    /// Agent name already exists in the factory.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// Agent names must contain at least one non-whitespace character.
    #[error("agent name must not be empty")]
    EmptyName,

    /// Agent names are single roster tokens and may not contain whitespace.
    #[error("agent name must not contain whitespace: {0:?}")]
    InvalidName(String),

    /// A leading `#` would make the saved roster line read back as a comment.
    #[error("agent name must not start with '#': {0:?}")]
    CommentName(String),

    /// The requested starting position is not on the map.
    #[error("position {position} is outside the {width}x{height} map")]
    OutOfBounds {
        /// The rejected position.
        position: Point,
        /// Map width in cells.
        width: u32,
        /// Map height in cells.
        height: u32,
    },

    /// Random name generation ran out of unused names.
    #[error("no unused name left for {requested} more agents")]
    NamesExhausted {
        /// How many agents were still to be named.
        requested: usize,
    },
}

impl AgentError {
    pub(crate) const fn out_of_bounds(position: Point, bounds: MapBounds) -> Self {
        Self::OutOfBounds {
            position,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}
