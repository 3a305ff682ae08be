//! Initial population for a run: random or from a roster.
//!
//! Either way every agent goes through an [`AgentFactory`], so names are
//! unique and positions are on the map before the registry ever sees them.

use rand::Rng;
use skirmish_agents::{Agent, AgentError, AgentFactory};
use skirmish_types::{AgentRecord, MapBounds};
use tracing::{info, warn};

/// Agents ready for the registry, plus how many roster records were
/// turned away.
#[derive(Debug)]
pub struct SpawnResult {
    /// The population, in creation order.
    pub agents: Vec<Agent>,
    /// Roster records rejected for a duplicate name or an off-map position.
    pub rejected: usize,
}

/// Spawn `count` agents with random kinds, generated names, and random
/// positions.
///
/// # Errors
///
/// Returns [`AgentError::NamesExhausted`] if unique names run out.
pub fn spawn_random<R: Rng>(
    rng: &mut R,
    bounds: MapBounds,
    count: u32,
) -> Result<SpawnResult, AgentError> {
    let mut factory = AgentFactory::new(bounds);
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let agents = factory.spawn_random(rng, count)?;
    info!(agents = agents.len(), "Random population spawned");
    Ok(SpawnResult {
        agents,
        rejected: 0,
    })
}

/// Build the population from roster records through `factory`, skipping
/// the ones it rejects.
pub fn spawn_from_records(factory: &mut AgentFactory, records: &[AgentRecord]) -> SpawnResult {
    let mut agents = Vec::with_capacity(records.len());
    let mut rejected: usize = 0;
    for record in records {
        match factory.create_from_record(record) {
            Ok(agent) => agents.push(agent),
            Err(err) => {
                warn!(record = %record, error = %err, "Skipping roster agent");
                rejected = rejected.saturating_add(1);
            }
        }
    }
    info!(agents = agents.len(), rejected, "Roster population spawned");
    SpawnResult { agents, rejected }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use skirmish_types::Kind;

    use super::*;

    #[test]
    fn random_population_has_requested_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = MapBounds::new(50, 50);
        let spawned = spawn_random(&mut rng, bounds, 50).unwrap();
        assert_eq!(spawned.agents.len(), 50);
        assert!(spawned.agents.iter().all(|a| bounds.contains(a.position())));
    }

    #[test]
    fn roster_rejects_duplicates_and_off_map_records() {
        let records = vec![
            AgentRecord {
                name: "Grom".to_owned(),
                kind: Kind::Orc,
                x: 1,
                y: 1,
            },
            AgentRecord {
                name: "Grom".to_owned(),
                kind: Kind::Druid,
                x: 2,
                y: 2,
            },
            AgentRecord {
                name: "Far".to_owned(),
                kind: Kind::Squirrel,
                x: 10,
                y: 0,
            },
            AgentRecord {
                name: "Elda".to_owned(),
                kind: Kind::Druid,
                x: 9,
                y: 9,
            },
        ];
        let mut factory = AgentFactory::new(MapBounds::new(10, 10));
        let spawned = spawn_from_records(&mut factory, &records);
        let names: Vec<&str> = spawned.agents.iter().map(Agent::name).collect();
        assert_eq!(names, vec!["Grom", "Elda"]);
        assert_eq!(spawned.rejected, 2);
        assert!(factory.is_name_taken("Elda"));
    }
}
