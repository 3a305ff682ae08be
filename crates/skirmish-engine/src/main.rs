//! Skirmish binary.
//!
//! Two modes share one configuration file:
//!
//! - `skirmish run` spawns a population (random, or from a roster file) and
//!   runs the concurrent simulation for the configured duration, printing
//!   map snapshots and battle lines, then the survivors.
//! - `skirmish editor` opens the single-threaded roster editor on the
//!   terminal.
//!
//! With no subcommand, `run` is used with its defaults.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `skirmish-config.yaml` (or `--config`)
//! 3. Initialize structured logging (tracing)
//! 4. Dispatch to the selected mode

mod editor;
mod error;
mod interactive;
mod roster;
mod spawner;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use skirmish_agents::AgentFactory;
use skirmish_core::{
    ConsoleObserver, ConsoleSnapshotSink, Coordinator, EventHub, FileObserver, SimulationConfig,
    log_simulation_end,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::editor::Editor;
use crate::error::EngineError;
use crate::interactive::InteractiveEditor;

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Orcs, druids and squirrels fighting it out on a grid")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "skirmish-config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run the concurrent simulation
    Run {
        /// Start from a roster file instead of a random population
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Run length in seconds
        #[arg(short, long)]
        duration: Option<u64>,

        /// Size of the random population
        #[arg(short, long)]
        agents: Option<u32>,

        /// Save the survivors to this roster file afterwards
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
    /// Edit a roster interactively
    Editor {
        /// Roster file to open
        #[arg(short, long)]
        roster: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, found) = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    if found {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command.unwrap_or(Command::Run {
        roster: None,
        duration: None,
        agents: None,
        save: None,
    }) {
        Command::Run {
            roster,
            duration,
            agents,
            save,
        } => {
            let mut config = config;
            if let Some(seconds) = duration {
                config.run.duration_seconds = seconds;
            }
            if let Some(count) = agents {
                config.population.initial_agents = count;
            }
            config.validate()?;
            run(&config, roster.as_deref(), save.as_deref()).await
        }
        Command::Editor { roster } => edit(&config, roster.as_deref()),
    }
}

/// Load configuration, falling back to defaults when the file is absent.
/// The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Subscribe the observers the configuration asks for.
fn build_hub(config: &SimulationConfig) -> anyhow::Result<EventHub> {
    let mut hub = EventHub::new();
    if config.narration.console {
        hub.subscribe(Arc::new(ConsoleObserver));
    }
    if let Some(path) = &config.narration.log_file {
        let observer = FileObserver::create(path)
            .with_context(|| format!("opening battle log {}", path.display()))?;
        info!(path = %path.display(), "Battle log enabled");
        hub.subscribe(Arc::new(observer));
    }
    Ok(hub)
}

async fn run(
    config: &SimulationConfig,
    roster_path: Option<&Path>,
    save_path: Option<&Path>,
) -> anyhow::Result<()> {
    let bounds = config.bounds();
    info!(
        width = bounds.width(),
        height = bounds.height(),
        duration_seconds = config.run.duration_seconds,
        tick_interval_ms = config.run.tick_interval_ms,
        "Simulation configured"
    );

    let spawned = if let Some(path) = roster_path {
        let parsed = roster::load_roster(path).map_err(EngineError::from)?;
        let mut factory = AgentFactory::new(bounds);
        spawner::spawn_from_records(&mut factory, &parsed.records)
    } else {
        let mut rng = rand::rng();
        spawner::spawn_random(&mut rng, bounds, config.population.initial_agents)
            .map_err(EngineError::from)?
    };
    if spawned.agents.is_empty() {
        warn!("Starting with an empty population");
    }

    let hub = build_hub(config)?;
    let mut coordinator = Coordinator::new(spawned.agents, bounds, config.run.clone()).with_hub(hub);

    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping the run");
                shutdown.trigger();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let result = coordinator
        .start(&mut ConsoleSnapshotSink)
        .await
        .map_err(EngineError::from)?;
    log_simulation_end(&result);

    println!("\nSurvivors ({}):", result.survivors.len());
    for survivor in &result.survivors {
        println!("  {survivor}");
    }

    if let Some(path) = save_path {
        let records = coordinator.registry().records().await;
        roster::save_roster(path, &records).map_err(EngineError::from)?;
        println!("Saved {} survivors to {}", records.len(), path.display());
    }
    Ok(())
}

fn edit(config: &SimulationConfig, roster_path: Option<&Path>) -> anyhow::Result<()> {
    let mut editor = Editor::new(config.bounds(), build_hub(config)?);
    if let Some(path) = roster_path {
        let summary = editor
            .load(path)
            .with_context(|| format!("opening roster {}", path.display()))?;
        info!(
            loaded = summary.loaded,
            malformed = summary.malformed,
            rejected = summary.rejected,
            "Roster opened"
        );
    }

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    InteractiveEditor::new(editor, stdin, stdout)
        .run()
        .map_err(EngineError::from)
        .context("editor session failed")?;
    Ok(())
}
