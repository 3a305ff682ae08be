//! Agent state and creation.
//!
//! An [`Agent`] is a plain value: it has no interior locking. The live
//! simulation keeps agents inside the core's registry, which is the only
//! place that hands out `&mut Agent`, and only inside a write-lock scope.
//! The editor owns its agents directly and mutates them single-threaded.
//!
//! The [`AgentFactory`] enforces name uniqueness and map bounds for both
//! hand-placed agents and randomly spawned populations.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use rand::Rng;
use skirmish_types::{AgentId, AgentRecord, AgentView, Kind, MapBounds, Point};

use crate::combat;
use crate::error::AgentError;

/// Upper bound of the numeric suffix in generated names (`Orc_1` ..= `Orc_9999`).
const NAME_SUFFIX_MAX: u32 = 9_999;

/// Attempts per agent to draw an unused generated name before giving up.
const NAME_ATTEMPTS: u32 = 64;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A simulated entity with identity, position, and liveness.
///
/// Death is one-way: once [`kill`](Self::kill) has been called the agent
/// never moves again and is never a valid attacker or defender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: AgentId,
    name: String,
    kind: Kind,
    position: Point,
    alive: bool,
}

impl Agent {
    /// Create a living agent. Name uniqueness is the caller's concern; use
    /// [`AgentFactory`] to have it checked.
    pub fn new(name: impl Into<String>, kind: Kind, position: Point) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            kind,
            position,
            alive: true,
        }
    }

    /// Registry identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Agent kind.
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Current position.
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Whether the agent is still alive.
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Cells moved per tick.
    pub const fn move_range(&self) -> u32 {
        self.kind.move_range()
    }

    /// Inclusive attack radius.
    pub const fn kill_range(&self) -> u32 {
        self.kind.kill_range()
    }

    /// Mark the agent dead. Returns `false` if it was already dead.
    pub const fn kill(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    /// Move by `(dx, dy)`, clamped to the map. Dead agents stay put.
    ///
    /// Returns whether the agent was alive to move.
    pub fn step(&mut self, dx: i32, dy: i32, bounds: MapBounds) -> bool {
        if !self.alive {
            return false;
        }
        self.position = self.position.offset_clamped(dx, dy, bounds);
        true
    }

    /// Move in a uniformly random direction, scaled to the move range.
    #[allow(clippy::cast_possible_truncation)]
    pub fn wander<R: Rng>(&mut self, rng: &mut R, bounds: MapBounds) -> bool {
        if !self.alive {
            return false;
        }
        let angle: f64 = rng.random_range(0.0..TAU);
        let reach = f64::from(self.move_range());
        // |cos * reach| <= 20, always representable.
        let dx = (angle.cos() * reach).round() as i32;
        let dy = (angle.sin() * reach).round() as i32;
        self.step(dx, dy, bounds)
    }

    /// Distance to `other`.
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.position.distance_to(other.position)
    }

    /// Whether `target` is within this agent's kill range (inclusive).
    pub fn in_kill_range(&self, target: &Self) -> bool {
        self.distance_to(target) <= f64::from(self.kill_range())
    }

    /// Kill narrative if this agent can kill `target`.
    ///
    /// Always `None` when either side is already dead.
    pub fn vs(&self, target: &Self) -> Option<&'static str> {
        if !self.alive || !target.alive {
            return None;
        }
        combat::matchup(self.kind, target.kind)
    }

    /// Copy into the roster shape.
    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            name: self.name.clone(),
            kind: self.kind,
            x: self.position.x(),
            y: self.position.y(),
        }
    }

    /// Copy into the snapshot shape.
    pub fn to_view(&self) -> AgentView {
        AgentView {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            position: self.position,
            alive: self.alive,
        }
    }
}

// ---------------------------------------------------------------------------
// AgentFactory
// ---------------------------------------------------------------------------

/// Creates agents for one map, keeping names unique.
#[derive(Debug, Clone)]
pub struct AgentFactory {
    bounds: MapBounds,
    names_in_use: BTreeSet<String>,
}

impl AgentFactory {
    /// Create a factory for a map with the given bounds.
    pub const fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            names_in_use: BTreeSet::new(),
        }
    }

    /// The map bounds new agents must fall inside.
    pub const fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Create a living agent of `kind` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyName`], [`AgentError::InvalidName`],
    /// [`AgentError::CommentName`], [`AgentError::DuplicateName`], or
    /// [`AgentError::OutOfBounds`].
    pub fn create(&mut self, kind: Kind, name: &str, position: Point) -> Result<Agent, AgentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AgentError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(AgentError::InvalidName(name.to_owned()));
        }
        if name.starts_with('#') {
            return Err(AgentError::CommentName(name.to_owned()));
        }
        if self.names_in_use.contains(name) {
            return Err(AgentError::DuplicateName(name.to_owned()));
        }
        if !self.bounds.contains(position) {
            return Err(AgentError::out_of_bounds(position, self.bounds));
        }
        self.names_in_use.insert(name.to_owned());
        Ok(Agent::new(name, kind, position))
    }

    /// Create an agent from a kind name such as `"Orc"`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownKind`] naming the rejected kind, or any
    /// error from [`create`](Self::create).
    pub fn create_by_name(
        &mut self,
        kind_name: &str,
        name: &str,
        position: Point,
    ) -> Result<Agent, AgentError> {
        let kind: Kind = kind_name.parse()?;
        self.create(kind, name, position)
    }

    /// Create an agent from a roster record.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub fn create_from_record(&mut self, record: &AgentRecord) -> Result<Agent, AgentError> {
        self.create(record.kind, &record.name, record.position())
    }

    /// Spawn `count` agents with random kinds, generated names, and random
    /// in-bounds positions.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NamesExhausted`] if no unused name can be found.
    pub fn spawn_random<R: Rng>(&mut self, rng: &mut R, count: usize) -> Result<Vec<Agent>, AgentError> {
        let mut agents = Vec::with_capacity(count);
        for spawned in 0..count {
            let kind = Kind::ALL
                .get(rng.random_range(0..Kind::ALL.len()))
                .copied()
                .unwrap_or(Kind::Squirrel);
            let name = self
                .unused_name(rng, kind)
                .ok_or(AgentError::NamesExhausted {
                    requested: count.saturating_sub(spawned),
                })?;
            let position = Point::new(
                rng.random_range(0..=self.bounds.max_x()),
                rng.random_range(0..=self.bounds.max_y()),
            );
            agents.push(self.create(kind, &name, position)?);
        }
        Ok(agents)
    }

    /// Whether `name` is already taken.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name.trim())
    }

    /// Release a name back to the pool (after the editor removes an agent).
    ///
    /// Returns `true` if the name was in use and is now released.
    pub fn release_name(&mut self, name: &str) -> bool {
        self.names_in_use.remove(name)
    }

    /// Number of names currently reserved.
    pub fn name_count(&self) -> usize {
        self.names_in_use.len()
    }

    fn unused_name<R: Rng>(&self, rng: &mut R, kind: Kind) -> Option<String> {
        (0..NAME_ATTEMPTS)
            .map(|_| format!("{kind}_{}", rng.random_range(1..=NAME_SUFFIX_MAX)))
            .find(|candidate| !self.names_in_use.contains(candidate))
    }
}
