//! Agent state, combat rules, and creation for the Skirmish simulation.
//!
//! This crate is the logic layer for agents: everything that operates on
//! agent state without touching locks, tasks, or I/O. It sits between
//! `skirmish-types` (plain data) and `skirmish-core` (the concurrent
//! registry and workers).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] value and the name-checking [`AgentFactory`]
//! - [`battle_round`] -- The editor's diceless, mutual battle round
//! - [`combat`] -- Kind matchup matrix and d6 battle resolution
//! - [`error`] -- Error types for agent creation ([`AgentError`])

pub mod agent;
pub mod battle_round;
pub mod combat;
pub mod error;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentFactory};
pub use battle_round::{RoundSummary, run_battle_round};
pub use combat::{Resolution, matchup, resolve, roll_dice};
pub use error::AgentError;
