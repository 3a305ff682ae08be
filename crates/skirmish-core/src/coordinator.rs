//! Timed run coordination.
//!
//! The [`Coordinator`] owns one run from start to survivors report:
//!
//! - **Idle -> Running**: spawn the narrator, the movement worker and the
//!   battle worker as independent tasks, then render a snapshot on every
//!   snapshot interval until the duration elapses or shutdown is triggered.
//! - **Running -> Draining**: trigger shutdown, join the movement worker
//!   (which makes its final pass), close the battle queue, join the battle
//!   worker (which drains every queued task), then join the narrator.
//! - **Draining -> Stopped**: render a final snapshot and collect the
//!   survivors.
//!
//! The queue is closed only after the movement worker has returned, so no
//! task can be pushed after the battle worker has decided to exit.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skirmish_agents::Agent;
use skirmish_types::MapBounds;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::battle::{BattleReport, BattleWorker};
use crate::battle_queue::BattleQueue;
use crate::config::RunConfig;
use crate::movement::{MovementReport, MovementWorker};
use crate::narration::{EventHub, narrate};
use crate::registry::AgentRegistry;
use crate::render::{Snapshot, SnapshotSink};
use crate::shutdown::ShutdownSignal;

/// Errors that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// `start` was called on a coordinator that has already run.
    #[error("coordinator already started")]
    AlreadyStarted,

    /// A worker task panicked or was cancelled.
    #[error("{worker} task failed: {source}")]
    Worker {
        /// Which task failed.
        worker: &'static str,
        /// The join error.
        source: JoinError,
    },
}

/// Lifecycle of a [`Coordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created, not yet started.
    Idle,
    /// Workers running, snapshots being rendered.
    Running,
    /// Shutdown triggered, waiting for workers to finish.
    Draining,
    /// All workers joined. Terminal.
    Stopped,
}

/// Reason why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// The configured duration elapsed.
    DurationElapsed,
    /// The shutdown handle was triggered before the duration elapsed.
    ShutdownRequested,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// The reason the run ended.
    pub end_reason: SimulationEndReason,
    /// `name (Kind)` for every living agent after the drain.
    pub survivors: Vec<String>,
    /// Living agents when the run started.
    pub initial_population: usize,
    /// Living agents when the run stopped.
    pub final_population: usize,
    /// Movement worker totals.
    pub movement: MovementReport,
    /// Tasks pushed onto the battle queue.
    pub battles_enqueued: u64,
    /// Battle worker totals.
    pub battles: BattleReport,
    /// Battle events delivered to observers.
    pub events_narrated: u64,
    /// Snapshots handed to the sink, including the final one.
    pub snapshots_rendered: u64,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Wall-clock run length, drain included.
    pub elapsed: Duration,
}

/// Drives one timed run.
#[derive(Debug)]
pub struct Coordinator {
    registry: Arc<AgentRegistry>,
    queue: Arc<BattleQueue>,
    shutdown: ShutdownSignal,
    bounds: MapBounds,
    run: RunConfig,
    hub: Option<EventHub>,
    seed: Option<u64>,
    phase: Phase,
}

impl Coordinator {
    /// Prepare a run over `agents` on a map of `bounds`.
    pub fn new(agents: Vec<Agent>, bounds: MapBounds, run: RunConfig) -> Self {
        Self {
            registry: Arc::new(AgentRegistry::new(agents)),
            queue: Arc::new(BattleQueue::new()),
            shutdown: ShutdownSignal::new(),
            bounds,
            run,
            hub: None,
            seed: None,
            phase: Phase::Idle,
        }
    }

    /// Deliver battle events to the observers in `hub`.
    #[must_use]
    pub fn with_hub(mut self, hub: EventHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Seed both workers instead of drawing from the operating system.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A handle that ends the run early when triggered.
    pub fn shutdown_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// The registry, for reading or exporting agents after the run.
    pub fn registry(&self) -> Arc<AgentRegistry> {
        Arc::clone(&self.registry)
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    fn transition(&mut self, next: Phase) {
        info!(from = ?self.phase, to = ?next, "Coordinator phase change");
        self.phase = next;
    }

    /// Run the simulation to completion.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::AlreadyStarted`] if this coordinator has
    /// run before, or [`CoordinatorError::Worker`] if a worker task failed.
    pub async fn start(
        &mut self,
        sink: &mut dyn SnapshotSink,
    ) -> Result<SimulationResult, CoordinatorError> {
        if self.phase != Phase::Idle {
            return Err(CoordinatorError::AlreadyStarted);
        }
        self.transition(Phase::Running);

        let started_at = Utc::now();
        let clock = Instant::now();
        let initial_population = self.registry.alive_count().await;
        info!(
            agents = initial_population,
            width = self.bounds.width(),
            height = self.bounds.height(),
            duration_seconds = self.run.duration_seconds,
            "Simulation starting"
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let narrator = tokio::spawn(narrate(events_rx, self.hub.take().unwrap_or_default()));

        let mut movement = MovementWorker::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.queue),
            self.shutdown.clone(),
            self.bounds,
            self.run.tick_interval(),
        );
        let mut battle = BattleWorker::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.queue),
            events_tx,
            self.run.battle_poll_interval(),
        );
        if let Some(seed) = self.seed {
            movement = movement.with_seed(seed);
            battle = battle.with_seed(seed.wrapping_add(1));
        }
        let movement = tokio::spawn(movement.run());
        let battle = tokio::spawn(battle.run());

        // A duration past the clock's range never elapses; only shutdown ends the run.
        let deadline = clock.checked_add(self.run.duration());
        let period = self.run.snapshot_interval().max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(clock.checked_add(period).unwrap_or(clock), period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut snapshots: u64 = 0;
        let end_reason = loop {
            tokio::select! {
                () = tokio::time::sleep_until(deadline.unwrap_or(clock)), if deadline.is_some() => {
                    break SimulationEndReason::DurationElapsed;
                }
                () = self.shutdown.triggered() => {
                    break SimulationEndReason::ShutdownRequested;
                }
                _ = ticker.tick() => {
                    snapshots = snapshots.saturating_add(1);
                    let views = self.registry.snapshot().await;
                    sink.on_snapshot(&Snapshot::capture(snapshots, &views, self.bounds, false));
                }
            }
        };
        info!(reason = ?end_reason, "Run ending, draining workers");

        self.transition(Phase::Draining);
        self.shutdown.trigger();

        // Every handle is joined before any error is returned so a failed
        // worker cannot leave another one running.
        let movement = movement.await;
        self.queue.close();
        debug!(backlog = self.queue.len().await, "Battle queue closed");
        let battle = battle.await;
        let narrated = narrator.await;

        snapshots = snapshots.saturating_add(1);
        let views = self.registry.snapshot().await;
        sink.on_snapshot(&Snapshot::capture(snapshots, &views, self.bounds, true));
        let survivors = self.registry.surviving_names().await;
        self.transition(Phase::Stopped);

        let movement = movement.map_err(|source| worker_failed("movement worker", source))?;
        let battles = battle.map_err(|source| worker_failed("battle worker", source))?;
        let events_narrated = narrated.map_err(|source| worker_failed("narrator", source))?;

        Ok(SimulationResult {
            end_reason,
            final_population: survivors.len(),
            survivors,
            initial_population,
            movement,
            battles_enqueued: self.queue.total_enqueued(),
            battles,
            events_narrated,
            snapshots_rendered: snapshots,
            started_at,
            elapsed: clock.elapsed(),
        })
    }
}

fn worker_failed(worker: &'static str, source: JoinError) -> CoordinatorError {
    warn!(worker, error = %source, "Worker task failed");
    CoordinatorError::Worker { worker, source }
}

/// Log the end-of-run summary.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
        initial_population = result.initial_population,
        final_population = result.final_population,
        movement_ticks = result.movement.ticks,
        battles_enqueued = result.battles_enqueued,
        battles_processed = result.battles.processed,
        kills = result.battles.kills,
        defended = result.battles.defended,
        stale = result.battles.stale,
        snapshots = result.snapshots_rendered,
        "Simulation ended"
    );
    if result.final_population == 0 {
        warn!("No survivors");
    }
}
