//! The single-threaded roster editor.
//!
//! The editor owns its agents directly. It never touches the concurrent
//! core: no registry, no workers, no locks. Its battle round is the
//! diceless mutual variant from `skirmish_agents::battle_round`.

use std::path::Path;

use skirmish_agents::{Agent, AgentError, AgentFactory, RoundSummary, run_battle_round};
use skirmish_core::EventHub;
use skirmish_types::{MapBounds, Point};
use tracing::info;

use crate::roster::{self, RosterError};
use crate::spawner;

/// Errors reported back to the editor user.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The agent could not be created.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// The roster file could not be read or written.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Battle radius must be a positive number.
    #[error("battle radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// Outcome of loading a roster into the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Agents now in the editor.
    pub loaded: usize,
    /// Malformed lines skipped.
    pub malformed: usize,
    /// Well-formed records rejected for a duplicate name or an off-map position.
    pub rejected: usize,
}

/// In-memory roster being edited.
#[derive(Debug)]
pub struct Editor {
    factory: AgentFactory,
    agents: Vec<Agent>,
    hub: EventHub,
}

impl Editor {
    /// Create an empty editor for a map of `bounds`. Battle events are
    /// published to `hub`.
    pub fn new(bounds: MapBounds, hub: EventHub) -> Self {
        Self {
            factory: AgentFactory::new(bounds),
            agents: Vec::new(),
            hub,
        }
    }

    /// Map bounds new agents must fit in.
    pub const fn bounds(&self) -> MapBounds {
        self.factory.bounds()
    }

    /// Agents currently in the editor.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Add an agent.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Agent`] for an unknown kind, a bad or
    /// duplicate name, or an off-map position.
    pub fn add(&mut self, kind: &str, name: &str, x: i32, y: i32) -> Result<(), EditorError> {
        let agent = self.factory.create_by_name(kind, name, Point::new(x, y))?;
        info!(name = agent.name(), kind = %agent.kind(), "Agent added");
        self.agents.push(agent);
        Ok(())
    }

    /// Remove the agent called `name`. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.agents.iter().position(|a| a.name() == name) else {
            return false;
        };
        self.agents.remove(index);
        self.factory.release_name(name);
        info!(name, "Agent removed");
        true
    }

    /// Save living agents to `path`. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Roster`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<usize, EditorError> {
        let records: Vec<_> = self
            .agents
            .iter()
            .filter(|a| a.is_alive())
            .map(Agent::to_record)
            .collect();
        roster::save_roster(path, &records)?;
        Ok(records.len())
    }

    /// Replace the current agents with the roster at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Roster`] if the file cannot be read; the
    /// current agents are kept in that case.
    pub fn load(&mut self, path: &Path) -> Result<LoadSummary, EditorError> {
        let parsed = roster::load_roster(path)?;
        let mut factory = AgentFactory::new(self.bounds());
        let spawned = spawner::spawn_from_records(&mut factory, &parsed.records);
        self.factory = factory;
        self.agents = spawned.agents;

        Ok(LoadSummary {
            loaded: self.agents.len(),
            malformed: parsed.skipped.len(),
            rejected: spawned.rejected,
        })
    }

    /// Fight one diceless round among agents within `radius` of each other,
    /// then drop the dead.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidRadius`] unless `radius` is a positive
    /// finite number.
    pub fn battle_round(&mut self, radius: f64) -> Result<RoundSummary, EditorError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(EditorError::InvalidRadius(radius));
        }
        let hub = &self.hub;
        let summary = run_battle_round(&mut self.agents, radius, |event| hub.publish(&event));

        let factory = &mut self.factory;
        self.agents.retain(|agent| {
            if agent.is_alive() {
                return true;
            }
            factory.release_name(agent.name());
            false
        });
        info!(
            radius,
            kills = summary.kills,
            remaining = self.agents.len(),
            "Editor battle round complete"
        );
        Ok(summary)
    }

    /// Number of living agents.
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }
}
