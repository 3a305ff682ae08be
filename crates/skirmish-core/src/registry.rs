//! The shared agent registry and its locking discipline.
//!
//! [`AgentRegistry`] owns every agent for the lifetime of a run behind a
//! single readers-writer lock. The lock itself is never exposed: callers
//! pass a synchronous closure to [`AgentRegistry::with_read`] or
//! [`AgentRegistry::with_write`], and [`Roster`] (the guarded collection)
//! is only reachable through those closures. Because the closures are
//! not `async`, no caller can hold the lock across an `.await`, a dice
//! roll in another task, or a channel send.
//!
//! Agents are never removed during a run. Death flips the alive flag and
//! the agent stays in place, so ids in the battle queue always resolve.

use std::collections::BTreeMap;

use skirmish_agents::Agent;
use skirmish_types::{AgentId, AgentRecord, AgentView};
use tokio::sync::RwLock;
use tracing::warn;

/// The agent collection guarded by the registry lock.
#[derive(Debug, Default)]
pub struct Roster {
    agents: Vec<Agent>,
    index: BTreeMap<AgentId, usize>,
}

impl Roster {
    fn from_agents(agents: Vec<Agent>) -> Self {
        let mut roster = Self::default();
        for agent in agents {
            let id = agent.id();
            if !roster.insert(agent) {
                warn!(agent_id = %id, "Duplicate agent id ignored");
            }
        }
        roster
    }

    fn insert(&mut self, agent: Agent) -> bool {
        let id = agent.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.agents.len());
        self.agents.push(agent);
        true
    }

    /// Total agents, living and dead.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster holds no agents at all.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of living agents.
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Look an agent up by id.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).and_then(|&slot| self.agents.get(slot))
    }

    /// Look an agent up by id for mutation.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let slot = *self.index.get(&id)?;
        self.agents.get_mut(slot)
    }

    /// Every agent in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    /// Every agent in insertion order, mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent> {
        self.agents.iter_mut()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Agent;
    type IntoIter = std::slice::Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The authoritative, concurrently shared agent collection for one run.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    roster: RwLock<Roster>,
}

impl AgentRegistry {
    /// Take ownership of the initial agents. Insertion order is kept.
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            roster: RwLock::new(Roster::from_agents(agents)),
        }
    }

    /// Run `f` with shared access to the roster.
    pub async fn with_read<R>(&self, f: impl FnOnce(&Roster) -> R) -> R {
        let guard = self.roster.read().await;
        f(&guard)
    }

    /// Run `f` with exclusive access to the roster.
    pub async fn with_write<R>(&self, f: impl FnOnce(&mut Roster) -> R) -> R {
        let mut guard = self.roster.write().await;
        f(&mut guard)
    }

    /// Copy every agent with its current position and liveness.
    pub async fn snapshot(&self) -> Vec<AgentView> {
        self.with_read(|roster| roster.iter().map(Agent::to_view).collect())
            .await
    }

    /// `name (Kind)` for every living agent, in insertion order.
    pub async fn surviving_names(&self) -> Vec<String> {
        self.with_read(|roster| {
            roster
                .iter()
                .filter(|a| a.is_alive())
                .map(|a| a.to_view().survivor_label())
                .collect()
        })
        .await
    }

    /// Number of living agents.
    pub async fn alive_count(&self) -> usize {
        self.with_read(Roster::alive_count).await
    }

    /// Total agents, living and dead.
    pub async fn len(&self) -> usize {
        self.with_read(Roster::len).await
    }

    /// Whether the registry holds no agents at all.
    pub async fn is_empty(&self) -> bool {
        self.with_read(Roster::is_empty).await
    }

    /// Living agents in roster shape, for external saving.
    pub async fn records(&self) -> Vec<AgentRecord> {
        self.with_read(|roster| {
            roster
                .iter()
                .filter(|a| a.is_alive())
                .map(Agent::to_record)
                .collect()
        })
        .await
    }
}
