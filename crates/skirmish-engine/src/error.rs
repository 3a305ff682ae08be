//! Error types for the Skirmish binary.
//!
//! [`EngineError`] wraps every failure mode of a run or an editor session
//! so the entry points can propagate with `?`.

use crate::roster::RosterError;

/// Top-level error for the Skirmish binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skirmish_core::ConfigError,
    },

    /// The run could not be started or a worker failed.
    #[error("coordinator error: {source}")]
    Coordinator {
        /// The underlying coordinator error.
        #[from]
        source: skirmish_core::CoordinatorError,
    },

    /// Reading or writing a roster file failed.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// Creating the initial population failed.
    #[error("spawner error: {source}")]
    Spawner {
        /// The underlying agent error.
        #[from]
        source: skirmish_agents::AgentError,
    },

    /// Terminal or narration file I/O failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
