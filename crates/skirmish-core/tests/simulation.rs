//! End-to-end tests for the concurrent simulation core.
//!
//! These run the real workers on the multi-thread runtime with short
//! intervals and check the properties that must hold regardless of how
//! the dice fall or how the tasks interleave.

#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::indexing_slicing,
    clippy::unreachable
)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use skirmish_agents::Agent;
use skirmish_core::config::RunConfig;
use skirmish_core::{
    AgentRegistry, BattleObserver, BattleQueue, BattleTask, BattleWorker, Coordinator, EventHub,
    NoOpSnapshotSink, SimulationEndReason, TaskOutcome, scan_for_battles,
};
use skirmish_types::{BattleEvent, Kind, MapBounds, Point};
use tokio::sync::mpsc;

fn quick_run() -> RunConfig {
    RunConfig {
        duration_seconds: 60,
        snapshot_interval_ms: 20,
        tick_interval_ms: 5,
        battle_poll_interval_ms: 1,
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<BattleEvent>>,
}

impl BattleObserver for Recorder {
    fn notify(&self, event: &BattleEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Run a coordinator until `after` has passed, then trigger shutdown.
async fn run_for(coordinator: &mut Coordinator, after: Duration) -> skirmish_core::SimulationResult {
    let handle = coordinator.shutdown_handle();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        handle.trigger();
    });
    coordinator.start(&mut NoOpSnapshotSink).await.unwrap()
}

#[tokio::test]
async fn orc_next_to_druid_one_cycle() {
    for seed in 0..20 {
        let orc = Agent::new("Grom", Kind::Orc, Point::new(0, 0));
        let druid = Agent::new("Elda", Kind::Druid, Point::new(1, 1));
        let druid_id = druid.id();
        let registry = Arc::new(AgentRegistry::new(vec![orc, druid]));
        let queue = Arc::new(BattleQueue::new());

        let tasks = registry.with_read(scan_for_battles).await;
        assert_eq!(tasks.len(), 1, "only the orc can attack");
        queue.push_batch(tasks).await;
        queue.close();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = BattleWorker::new(
            Arc::clone(&registry),
            Arc::clone(&queue),
            tx,
            Duration::from_millis(1),
        )
        .with_seed(seed);
        let report = worker.run().await;
        assert_eq!(report.processed, 1);

        let druid_alive = registry
            .with_read(|r| r.get(druid_id).unwrap().is_alive())
            .await;
        match rx.recv().await.unwrap() {
            BattleEvent::Kill { rolls: Some(rolls), .. } => {
                assert!(rolls.attack > rolls.defense);
                assert!(!druid_alive);
            }
            BattleEvent::Defended { rolls, .. } => {
                assert!(rolls.attack <= rolls.defense);
                assert!(druid_alive);
            }
            BattleEvent::Kill { rolls: None, .. } => {
                unreachable!("queued battles always roll dice")
            }
        }
        assert!(rx.recv().await.is_none());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn squirrels_only_never_fight() {
    let agents = (0..30)
        .map(|i| Agent::new(format!("Squirrel_{i}"), Kind::Squirrel, Point::new(i % 4, i % 3)))
        .collect();
    let mut coordinator = Coordinator::new(agents, MapBounds::new(4, 3), quick_run());
    let result = run_for(&mut coordinator, Duration::from_millis(120)).await;

    assert_eq!(result.end_reason, SimulationEndReason::ShutdownRequested);
    assert_eq!(result.battles_enqueued, 0);
    assert_eq!(result.battles.processed, 0);
    assert_eq!(result.initial_population, 30);
    assert_eq!(result.final_population, 30);
    assert_eq!(result.survivors.len(), 30);
    assert!(result.movement.ticks >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crowded_run_loses_no_tasks() {
    // Everyone starts inside everyone else's kill range.
    let mut agents = Vec::new();
    for i in 0..10 {
        agents.push(Agent::new(format!("Orc_{i}"), Kind::Orc, Point::new(i % 3, 0)));
        agents.push(Agent::new(format!("Druid_{i}"), Kind::Druid, Point::new(0, i % 3)));
        agents.push(Agent::new(format!("Squirrel_{i}"), Kind::Squirrel, Point::new(1, 1)));
    }
    let recorder = Arc::new(Recorder::default());
    let mut hub = EventHub::new();
    hub.subscribe(recorder.clone());

    let mut coordinator = Coordinator::new(agents, MapBounds::new(6, 6), quick_run())
        .with_hub(hub)
        .with_seed(2024);
    let result = run_for(&mut coordinator, Duration::from_millis(150)).await;

    // Drain: every queued task was popped before the battle worker exited.
    assert_eq!(result.battles.processed, result.battles_enqueued);
    assert_eq!(result.battles_enqueued, result.movement.tasks_discovered);
    assert_eq!(
        result.battles.processed,
        result.battles.kills + result.battles.defended + result.battles.stale + result.battles.no_matchup
    );

    // Each kill removes exactly one living agent.
    let deaths = (result.initial_population - result.final_population) as u64;
    assert_eq!(deaths, result.battles.kills);

    // Every kill and defence reached the observers.
    let events = recorder.events.lock().unwrap();
    assert_eq!(events.len() as u64, result.events_narrated);
    assert_eq!(result.events_narrated, result.battles.kills + result.battles.defended);

    // Orcs are never killed: nothing can kill an orc.
    let orcs_alive = result.survivors.iter().filter(|s| s.ends_with("(Orc)")).count();
    assert_eq!(orcs_alive, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_keeps_agents_on_the_map() {
    let bounds = MapBounds::new(7, 4);
    let agents = (0..12)
        .map(|i| {
            let kind = Kind::ALL[(i % 3) as usize];
            Agent::new(format!("{kind}_{i}"), kind, Point::new(i % 7, i % 4))
        })
        .collect();
    let mut coordinator = Coordinator::new(agents, bounds, quick_run()).with_seed(5);
    run_for(&mut coordinator, Duration::from_millis(80)).await;

    let views = coordinator.registry().snapshot().await;
    assert_eq!(views.len(), 12);
    assert!(views.iter().all(|v| bounds.contains(v.position)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stale_tasks_never_kill_twice() {
    let orc = Agent::new("Grom", Kind::Orc, Point::new(0, 0));
    let druid = Agent::new("Elda", Kind::Druid, Point::new(0, 0));
    let task = BattleTask {
        attacker: orc.id(),
        target: druid.id(),
    };
    let registry = Arc::new(AgentRegistry::new(vec![orc, druid]));
    let queue = Arc::new(BattleQueue::new());
    queue.push_batch(vec![task; 500]).await;
    queue.close();

    let (tx, _rx) = mpsc::unbounded_channel();
    let mut worker = BattleWorker::new(Arc::clone(&registry), Arc::clone(&queue), tx, Duration::from_millis(1))
        .with_seed(77);
    let mut kills = 0;
    while let Some(task) = queue.pop().await {
        if worker.process(task).await == TaskOutcome::Kill {
            kills += 1;
        }
    }
    // 500 rolls at 15/36 make a miss on all of them vanishingly unlikely.
    assert_eq!(kills, 1);
    assert_eq!(registry.alive_count().await, 1);
    assert_eq!(worker.report().processed, 500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exported_records_are_the_survivors() {
    let agents = vec![
        Agent::new("Grom", Kind::Orc, Point::new(0, 0)),
        Agent::new("Elda", Kind::Druid, Point::new(0, 0)),
        Agent::new("Nutkin", Kind::Squirrel, Point::new(0, 0)),
    ];
    let mut coordinator = Coordinator::new(agents, MapBounds::new(3, 3), quick_run()).with_seed(1);
    let result = run_for(&mut coordinator, Duration::from_millis(60)).await;

    let records = coordinator.registry().records().await;
    let labels: Vec<String> = records
        .iter()
        .map(|r| format!("{} ({})", r.name, r.kind))
        .collect();
    assert_eq!(labels, result.survivors);
}
