//! The battle worker: drain the queue, roll dice, apply kills.
//!
//! For each task the worker:
//!
//! 1. Looks both agents up under the registry **read** lock. A missing or
//!    dead participant makes the task stale; it is counted and dropped.
//! 2. Re-derives the matchup and throws the dice with no lock held.
//! 3. On a win, takes the **write** lock, re-checks that the target is
//!    still alive, and kills it.
//! 4. Sends the resulting [`BattleEvent`] to the narration channel after
//!    every lock has been released.
//!
//! When the queue is empty the worker sleeps for the poll interval. It
//! exits only once the queue has been closed and is empty, so every task
//! pushed before the close is processed.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_agents::{Agent, Resolution, resolve, roll_dice};
use skirmish_types::{BattleEvent, Kind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::battle_queue::{BattleQueue, BattleTask};
use crate::registry::AgentRegistry;

/// Totals reported by the battle worker when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleReport {
    /// Tasks popped from the queue.
    pub processed: u64,
    /// Tasks dropped because a participant was dead or unknown.
    pub stale: u64,
    /// Tasks whose matchup no longer allowed a kill.
    pub no_matchup: u64,
    /// Kills applied.
    pub kills: u64,
    /// Battles the defender survived.
    pub defended: u64,
}

/// What happened to a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// A participant was dead (or unknown) by the time the task ran.
    Stale,
    /// The attacker's kind cannot kill the target's kind.
    NoMatchup,
    /// The target died.
    Kill,
    /// The target survived.
    Defended,
}

struct Combatants {
    attacker_name: String,
    attacker_kind: Kind,
    target_name: String,
    target_kind: Kind,
}

enum Lookup {
    Missing,
    Dead,
    NoMatchup,
    Ready(Combatants),
}

/// Consumer loop for the battle queue.
#[derive(Debug)]
pub struct BattleWorker {
    registry: Arc<AgentRegistry>,
    queue: Arc<BattleQueue>,
    events: UnboundedSender<BattleEvent>,
    poll_interval: Duration,
    rng: StdRng,
    report: BattleReport,
}

impl BattleWorker {
    /// Create a worker seeded from the operating system.
    pub fn new(
        registry: Arc<AgentRegistry>,
        queue: Arc<BattleQueue>,
        events: UnboundedSender<BattleEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry,
            queue,
            events,
            poll_interval,
            rng: StdRng::from_os_rng(),
            report: BattleReport::default(),
        }
    }

    /// Replace the random source with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Totals so far.
    pub const fn report(&self) -> BattleReport {
        self.report
    }

    /// Resolve one task against the current registry state.
    pub async fn process(&mut self, task: BattleTask) -> TaskOutcome {
        self.report.processed = self.report.processed.saturating_add(1);

        let lookup = self
            .registry
            .with_read(|roster| {
                let (Some(attacker), Some(target)) = (roster.get(task.attacker), roster.get(task.target))
                else {
                    return Lookup::Missing;
                };
                if !attacker.is_alive() || !target.is_alive() {
                    return Lookup::Dead;
                }
                if attacker.vs(target).is_none() {
                    return Lookup::NoMatchup;
                }
                Lookup::Ready(Combatants {
                    attacker_name: attacker.name().to_owned(),
                    attacker_kind: attacker.kind(),
                    target_name: target.name().to_owned(),
                    target_kind: target.kind(),
                })
            })
            .await;

        let combatants = match lookup {
            Lookup::Missing => {
                warn!(
                    attacker = %task.attacker,
                    target = %task.target,
                    "Battle task references an unknown agent"
                );
                return self.stale();
            }
            Lookup::Dead => return self.stale(),
            Lookup::NoMatchup => {
                self.report.no_matchup = self.report.no_matchup.saturating_add(1);
                return TaskOutcome::NoMatchup;
            }
            Lookup::Ready(combatants) => combatants,
        };

        let rolls = roll_dice(&mut self.rng);
        match resolve(combatants.attacker_kind, combatants.target_kind, rolls) {
            Resolution::NoMatchup => {
                self.report.no_matchup = self.report.no_matchup.saturating_add(1);
                TaskOutcome::NoMatchup
            }
            Resolution::Defended => {
                self.report.defended = self.report.defended.saturating_add(1);
                self.publish(BattleEvent::Defended {
                    attacker: combatants.attacker_name,
                    target: combatants.target_name,
                    rolls,
                });
                TaskOutcome::Defended
            }
            Resolution::Kill { narrative } => {
                let killed = self
                    .registry
                    .with_write(|roster| roster.get_mut(task.target).is_some_and(Agent::kill))
                    .await;
                if !killed {
                    return self.stale();
                }
                self.report.kills = self.report.kills.saturating_add(1);
                self.publish(BattleEvent::Kill {
                    attacker: combatants.attacker_name,
                    target: combatants.target_name,
                    narrative: narrative.to_owned(),
                    rolls: Some(rolls),
                });
                TaskOutcome::Kill
            }
        }
    }

    /// Pop and process tasks until the queue is closed and empty.
    pub async fn run(mut self) -> BattleReport {
        info!(
            poll_interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "Battle worker started"
        );

        loop {
            if let Some(task) = self.queue.pop().await {
                let outcome = self.process(task).await;
                debug!(?outcome, "Battle task processed");
                continue;
            }
            // Closed is checked after an empty pop so a push that raced the
            // close is still seen on the next iteration.
            if self.queue.is_closed() && self.queue.is_empty().await {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!(
            processed = self.report.processed,
            stale = self.report.stale,
            kills = self.report.kills,
            defended = self.report.defended,
            "Battle worker drained and stopped"
        );
        self.report
    }

    const fn stale(&mut self) -> TaskOutcome {
        self.report.stale = self.report.stale.saturating_add(1);
        TaskOutcome::Stale
    }

    fn publish(&self, event: BattleEvent) {
        if self.events.send(event).is_err() {
            debug!("Narration channel closed, battle event dropped");
        }
    }
}
