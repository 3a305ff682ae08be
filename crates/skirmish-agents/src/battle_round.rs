//! The editor's synchronous battle round.
//!
//! This is the single-threaded, diceless variant of combat used when
//! editing a roster: every unordered pair of living agents within the
//! given radius fights once, both `vs` directions are evaluated, and kills
//! apply immediately, so two agents can kill each other in the same
//! exchange. The concurrent simulation never calls this.

use skirmish_types::BattleEvent;
use tracing::debug;

use crate::agent::Agent;

/// Totals for one battle round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Pairs that were within the radius.
    pub engagements: u32,
    /// Agents killed.
    pub kills: u32,
}

/// Run one battle round over `agents`, reporting every kill to `sink`.
///
/// Dead agents are left in place; removing them is the caller's concern.
/// A non-positive or non-finite radius engages nobody.
pub fn run_battle_round<F>(agents: &mut [Agent], radius: f64, mut sink: F) -> RoundSummary
where
    F: FnMut(BattleEvent),
{
    let mut summary = RoundSummary::default();
    if !radius.is_finite() || radius <= 0.0 {
        return summary;
    }

    let len = agents.len();
    for i in 0..len {
        for j in i.saturating_add(1)..len {
            let (head, tail) = agents.split_at_mut(j);
            let (Some(first), Some(second)) = (head.get_mut(i), tail.first_mut()) else {
                continue;
            };
            if !first.is_alive() || !second.is_alive() {
                continue;
            }
            if first.distance_to(second) > radius {
                continue;
            }
            summary.engagements = summary.engagements.saturating_add(1);

            // Both directions are decided before either kill lands.
            let forward = first.vs(second);
            let backward = second.vs(first);

            if let Some(narrative) = forward {
                second.kill();
                summary.kills = summary.kills.saturating_add(1);
                sink(kill_event(first, second, narrative));
            }
            if let Some(narrative) = backward {
                first.kill();
                summary.kills = summary.kills.saturating_add(1);
                sink(kill_event(second, first, narrative));
            }
        }
    }

    debug!(
        radius,
        engagements = summary.engagements,
        kills = summary.kills,
        "Battle round finished"
    );
    summary
}

fn kill_event(killer: &Agent, victim: &Agent, narrative: &str) -> BattleEvent {
    BattleEvent::Kill {
        attacker: killer.name().to_owned(),
        target: victim.name().to_owned(),
        narrative: narrative.to_owned(),
        rolls: None,
    }
}
