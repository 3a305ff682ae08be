//! Shared type definitions for the Skirmish simulation.
//!
//! This crate is the single source of truth for the values passed between
//! the agent logic, the concurrent core, and the binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for agent identifiers
//! - [`geometry`] -- Grid points, map bounds, and Euclidean distance
//! - [`enums`] -- Agent kinds and their per-kind constants
//! - [`structs`] -- Roster records, snapshot views, dice, and battle events

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Kind, ParseKindError};
pub use geometry::{MapBounds, Point};
pub use ids::AgentId;
pub use structs::{AgentRecord, AgentView, BattleEvent, DiceRolls};
