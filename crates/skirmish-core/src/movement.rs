//! The movement worker: move everyone, then look for fights.
//!
//! One tick is two short critical sections on the registry:
//!
//! 1. **Move** (write lock): every living agent wanders by a random angle
//!    scaled to its move range, clamped to the map. Dead agents stay put.
//! 2. **Scan** (read lock): every ordered pair `(a, b)` of distinct living
//!    agents with `b` inside `a`'s kill range and a valid `a.vs(b)` matchup
//!    becomes a [`BattleTask`].
//!
//! The tasks are pushed onto the battle queue after the read lock is
//! released. Ticks run on a fixed interval until shutdown, followed by
//! one final pass.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_types::MapBounds;
use tracing::{debug, info};

use crate::battle_queue::{BattleQueue, BattleTask};
use crate::registry::{AgentRegistry, Roster};
use crate::shutdown::ShutdownSignal;

/// Totals reported by the movement worker when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementReport {
    /// Completed ticks, including the final pass.
    pub ticks: u64,
    /// Battle tasks discovered across all ticks.
    pub tasks_discovered: u64,
}

/// Every ordered pair of living agents that can fight right now.
///
/// Both directions are checked independently, so mutual combat yields two
/// tasks. Same-position pairs are in range.
pub fn scan_for_battles(roster: &Roster) -> Vec<BattleTask> {
    let mut tasks = Vec::new();
    for attacker in roster.iter().filter(|a| a.is_alive()) {
        for target in roster.iter().filter(|t| t.is_alive()) {
            if attacker.id() == target.id() {
                continue;
            }
            if attacker.in_kill_range(target) && attacker.vs(target).is_some() {
                tasks.push(BattleTask {
                    attacker: attacker.id(),
                    target: target.id(),
                });
            }
        }
    }
    tasks
}

/// Periodic move-then-scan loop.
#[derive(Debug)]
pub struct MovementWorker {
    registry: Arc<AgentRegistry>,
    queue: Arc<BattleQueue>,
    shutdown: ShutdownSignal,
    bounds: MapBounds,
    tick_interval: Duration,
    rng: StdRng,
    report: MovementReport,
}

impl MovementWorker {
    /// Create a worker seeded from the operating system.
    pub fn new(
        registry: Arc<AgentRegistry>,
        queue: Arc<BattleQueue>,
        shutdown: ShutdownSignal,
        bounds: MapBounds,
        tick_interval: Duration,
    ) -> Self {
        Self {
            registry,
            queue,
            shutdown,
            bounds,
            tick_interval,
            rng: StdRng::from_os_rng(),
            report: MovementReport::default(),
        }
    }

    /// Replace the random source with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Totals so far.
    pub const fn report(&self) -> MovementReport {
        self.report
    }

    /// Run one move-then-scan cycle. Returns the number of tasks queued.
    pub async fn tick(&mut self) -> usize {
        let bounds = self.bounds;
        let rng = &mut self.rng;
        let moved = self
            .registry
            .with_write(|roster| {
                roster
                    .iter_mut()
                    .map(|agent| agent.wander(rng, bounds))
                    .filter(|&moved| moved)
                    .count()
            })
            .await;

        let tasks = self.registry.with_read(scan_for_battles).await;
        let discovered = tasks.len();
        self.queue.push_batch(tasks).await;

        self.report.ticks = self.report.ticks.saturating_add(1);
        self.report.tasks_discovered = self
            .report
            .tasks_discovered
            .saturating_add(u64::try_from(discovered).unwrap_or(u64::MAX));

        debug!(
            tick = self.report.ticks,
            moved,
            discovered,
            "Movement tick complete"
        );
        discovered
    }

    /// Tick on the configured interval until shutdown, then make one final
    /// pass and return the totals.
    pub async fn run(mut self) -> MovementReport {
        info!(
            tick_interval_ms = u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX),
            "Movement worker started"
        );

        while !self.shutdown.is_triggered() {
            self.tick().await;
            tokio::select! {
                () = tokio::time::sleep(self.tick_interval) => {}
                () = self.shutdown.triggered() => {}
            }
        }

        info!("Movement worker making final pass");
        self.tick().await;

        info!(
            ticks = self.report.ticks,
            tasks_discovered = self.report.tasks_discovered,
            "Movement worker stopped"
        );
        self.report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_agents::Agent;
    use skirmish_types::{Kind, Point};

    use super::*;

    fn worker(agents: Vec<Agent>, bounds: MapBounds) -> (MovementWorker, Arc<AgentRegistry>, Arc<BattleQueue>) {
        let registry = Arc::new(AgentRegistry::new(agents));
        let queue = Arc::new(BattleQueue::new());
        let worker = MovementWorker::new(
            Arc::clone(&registry),
            Arc::clone(&queue),
            ShutdownSignal::new(),
            bounds,
            Duration::from_millis(5),
        )
        .with_seed(11);
        (worker, registry, queue)
    }

    #[tokio::test]
    async fn scan_finds_both_directions_only_where_matchups_allow() {
        let orc = Agent::new("Grom", Kind::Orc, Point::new(0, 0));
        let druid = Agent::new("Elda", Kind::Druid, Point::new(1, 1));
        let squirrel = Agent::new("Nutkin", Kind::Squirrel, Point::new(2, 2));
        let (orc_id, druid_id, squirrel_id) = (orc.id(), druid.id(), squirrel.id());
        let registry = AgentRegistry::new(vec![orc, druid, squirrel]);

        let tasks = registry.with_read(scan_for_battles).await;
        assert_eq!(tasks.len(), 2);
        assert!(tasks.contains(&BattleTask {
            attacker: orc_id,
            target: druid_id
        }));
        assert!(tasks.contains(&BattleTask {
            attacker: druid_id,
            target: squirrel_id
        }));
    }

    #[tokio::test]
    async fn scan_range_is_inclusive_and_uses_attacker_range() {
        // Orc kill range is 10: (6, 8) is exactly 10 away.
        let orc = Agent::new("Grom", Kind::Orc, Point::new(0, 0));
        let druid = Agent::new("Elda", Kind::Druid, Point::new(6, 8));
        let registry = AgentRegistry::new(vec![orc, druid]);
        assert_eq!(registry.with_read(scan_for_battles).await.len(), 1);

        // 11 cells is past the druid's range.
        let druid = Agent::new("Elda", Kind::Druid, Point::new(0, 0));
        let squirrel = Agent::new("Nutkin", Kind::Squirrel, Point::new(11, 0));
        let registry = AgentRegistry::new(vec![druid, squirrel]);
        assert!(registry.with_read(scan_for_battles).await.is_empty());
    }

    #[tokio::test]
    async fn scan_ignores_the_dead() {
        let orc = Agent::new("Grom", Kind::Orc, Point::new(0, 0));
        let mut druid = Agent::new("Elda", Kind::Druid, Point::new(0, 0));
        druid.kill();
        let registry = AgentRegistry::new(vec![orc, druid]);
        assert!(registry.with_read(scan_for_battles).await.is_empty());
    }

    #[tokio::test]
    async fn ticks_keep_everyone_on_the_map() {
        let bounds = MapBounds::new(8, 5);
        let agents = vec![
            Agent::new("Grom", Kind::Orc, Point::new(0, 0)),
            Agent::new("Urg", Kind::Orc, Point::new(7, 4)),
            Agent::new("Elda", Kind::Druid, Point::new(3, 2)),
            Agent::new("Nutkin", Kind::Squirrel, Point::new(7, 0)),
        ];
        let (mut worker, registry, _queue) = worker(agents, bounds);
        for _ in 0..200 {
            worker.tick().await;
            let views = registry.snapshot().await;
            assert!(views.iter().all(|v| bounds.contains(v.position)));
        }
        assert_eq!(worker.report().ticks, 200);
    }

    #[tokio::test]
    async fn dead_agents_never_move() {
        let mut corpse = Agent::new("Elda", Kind::Druid, Point::new(25, 25));
        corpse.kill();
        let agents = vec![corpse, Agent::new("Grom", Kind::Orc, Point::new(10, 10))];
        let (mut worker, registry, _queue) = worker(agents, MapBounds::new(50, 50));
        for _ in 0..50 {
            worker.tick().await;
        }
        let views = registry.snapshot().await;
        assert_eq!(views.first().unwrap().position, Point::new(25, 25));
    }

    #[tokio::test]
    async fn squirrels_never_enqueue() {
        let agents = (0..20)
            .map(|i| Agent::new(format!("Squirrel_{i}"), Kind::Squirrel, Point::new(i % 3, 0)))
            .collect();
        let (mut worker, _registry, queue) = worker(agents, MapBounds::new(5, 5));
        for _ in 0..20 {
            assert_eq!(worker.tick().await, 0);
        }
        assert_eq!(queue.total_enqueued(), 0);
    }

    #[tokio::test]
    async fn empty_registry_tick_is_a_no_op() {
        let (mut worker, _registry, queue) = worker(Vec::new(), MapBounds::new(5, 5));
        assert_eq!(worker.tick().await, 0);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn run_makes_a_final_pass_after_shutdown() {
        let (worker, _registry, _queue) = worker(Vec::new(), MapBounds::new(5, 5));
        let shutdown = worker.shutdown.clone();
        shutdown.trigger();
        let report = worker.run().await;
        assert_eq!(report.ticks, 1);
    }
}
