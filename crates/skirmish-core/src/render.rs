//! ASCII map rendering and snapshot sinks.

use std::io::{self, Write};

use skirmish_types::{AgentView, MapBounds};
use tracing::warn;

/// Character drawn on cells with no living agent.
pub const EMPTY_CELL: char = '.';

/// Draw living agents onto a `width` x `height` grid, one text row per
/// map row. When several agents share a cell the last one wins.
pub fn render_map(views: &[AgentView], bounds: MapBounds) -> String {
    let width = usize::try_from(bounds.width()).unwrap_or(0);
    let height = usize::try_from(bounds.height()).unwrap_or(0);
    let mut grid = vec![vec![EMPTY_CELL; width]; height];

    for view in views.iter().filter(|v| v.alive) {
        let (Ok(x), Ok(y)) = (
            usize::try_from(view.position.x()),
            usize::try_from(view.position.y()),
        ) else {
            continue;
        };
        if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = view.kind.symbol();
        }
    }

    let mut out = String::with_capacity(height.saturating_mul(width.saturating_add(1)));
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

/// One rendered snapshot: the living count and the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Snapshot sequence number, starting at 1.
    pub sequence: u64,
    /// Living agents at the time of the snapshot.
    pub alive: usize,
    /// Output of [`render_map`].
    pub map: String,
    /// Whether this is the snapshot taken after the workers stopped.
    pub is_final: bool,
}

impl Snapshot {
    /// Build a snapshot from a registry copy.
    pub fn capture(sequence: u64, views: &[AgentView], bounds: MapBounds, is_final: bool) -> Self {
        Self {
            sequence,
            alive: views.iter().filter(|v| v.alive).count(),
            map: render_map(views, bounds),
            is_final,
        }
    }
}

/// Receives each snapshot the coordinator renders.
pub trait SnapshotSink: Send {
    /// Called once per snapshot, outside every registry lock.
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

/// A sink that discards snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSnapshotSink;

impl SnapshotSink for NoOpSnapshotSink {
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}
}

/// Prints the living count and the map to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSnapshotSink;

impl SnapshotSink for ConsoleSnapshotSink {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let title = if snapshot.is_final { "Final map" } else { "Map" };
        let mut out = io::stdout().lock();
        let written = writeln!(out, "\n{title} (alive: {})", snapshot.alive)
            .and_then(|()| out.write_all(snapshot.map.as_bytes()))
            .and_then(|()| out.flush());
        if let Err(err) = written {
            warn!(error = %err, "Failed to write snapshot to stdout");
        }
    }
}
