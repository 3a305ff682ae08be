//! Battle narration: observers, the event hub, and the narrator task.
//!
//! Combat code never prints. The battle worker sends each [`BattleEvent`]
//! down an unbounded channel and [`narrate`] (running as its own task)
//! forwards it to every subscribed [`BattleObserver`]. Slow output
//! therefore never extends a registry critical section, and lines from
//! different observers never interleave mid-line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use skirmish_types::BattleEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

/// Receives every published battle event.
pub trait BattleObserver: Send + Sync {
    /// Called once per event, in publication order.
    fn notify(&self, event: &BattleEvent);
}

/// Fan-out list of observers.
#[derive(Default)]
pub struct EventHub {
    observers: Vec<Arc<dyn BattleObserver>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EventHub {
    /// Create a hub with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. The same observer may be added more than once.
    pub fn subscribe(&mut self, observer: Arc<dyn BattleObserver>) {
        self.observers.push(observer);
    }

    /// Remove every registration of `observer`. Returns whether any was found.
    pub fn unsubscribe(&mut self, observer: &Arc<dyn BattleObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
        self.observers.len() != before
    }

    /// Deliver `event` to every observer.
    pub fn publish(&self, event: &BattleEvent) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Forward every event from `events` to `hub` until all senders are gone.
///
/// Returns the number of events published.
pub async fn narrate(mut events: UnboundedReceiver<BattleEvent>, hub: EventHub) -> u64 {
    let mut published: u64 = 0;
    while let Some(event) = events.recv().await {
        hub.publish(&event);
        published = published.saturating_add(1);
    }
    debug!(published, "Narrator finished");
    published
}

// ---------------------------------------------------------------------------
// Built-in observers
// ---------------------------------------------------------------------------

/// Writes `[battle] <line>` to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl BattleObserver for ConsoleObserver {
    fn notify(&self, event: &BattleEvent) {
        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "[battle] {event}") {
            warn!(error = %err, "Failed to write battle line to stdout");
        }
    }
}

#[derive(Serialize)]
struct LoggedEvent<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a BattleEvent,
}

/// Appends one JSON object per event to a file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileObserver {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// The file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &BattleEvent) -> io::Result<()> {
        let line = serde_json::to_string(&LoggedEvent {
            timestamp: Utc::now(),
            event,
        })
        .map_err(io::Error::other)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|poisoned| io::Error::other(poisoned.to_string()))?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

impl BattleObserver for FileObserver {
    fn notify(&self, event: &BattleEvent) {
        if let Err(err) = self.append(event) {
            warn!(path = %self.path.display(), error = %err, "Failed to append battle event");
        }
    }
}
