//! The concurrent simulation core for Skirmish.
//!
//! A run is three long-lived tasks sharing one agent registry:
//! the movement worker (move everyone, scan for fights), the battle worker
//! (drain the battle queue, roll dice, apply kills), and the coordinator
//! (render snapshots, stop the run, report survivors). A narrator task
//! forwards battle events to observers outside every lock.
//!
//! # Modules
//!
//! - [`battle`] -- [`BattleWorker`]: queue consumer and dice resolution
//! - [`battle_queue`] -- [`BattleQueue`] and [`BattleTask`]
//! - [`config`] -- Configuration loading from `skirmish-config.yaml`
//! - [`coordinator`] -- [`Coordinator`] state machine and run results
//! - [`movement`] -- [`MovementWorker`] and the pairwise battle scan
//! - [`narration`] -- Battle observers, [`EventHub`], and the narrator task
//! - [`registry`] -- [`AgentRegistry`]: scoped read/write access to agents
//! - [`render`] -- ASCII map rendering and snapshot sinks
//! - [`shutdown`] -- [`ShutdownSignal`] shared by every worker

pub mod battle;
pub mod battle_queue;
pub mod config;
pub mod coordinator;
pub mod movement;
pub mod narration;
pub mod registry;
pub mod render;
pub mod shutdown;

pub use battle::{BattleReport, BattleWorker, TaskOutcome};
pub use battle_queue::{BattleQueue, BattleTask};
pub use config::{ConfigError, SimulationConfig};
pub use coordinator::{
    Coordinator, CoordinatorError, Phase, SimulationEndReason, SimulationResult,
    log_simulation_end,
};
pub use movement::{MovementReport, MovementWorker, scan_for_battles};
pub use narration::{BattleObserver, ConsoleObserver, EventHub, FileObserver, narrate};
pub use registry::{AgentRegistry, Roster};
pub use render::{ConsoleSnapshotSink, NoOpSnapshotSink, Snapshot, SnapshotSink, render_map};
pub use shutdown::ShutdownSignal;
