//! Roster files: one agent per line as `name kind x y`.
//!
//! Blank lines and lines starting with `#` are ignored. A malformed line is
//! skipped with a warning and reported back in [`ParsedRoster::skipped`];
//! the well-formed lines around it still load. Saving writes whatever
//! records it is given, which callers restrict to living agents.

use std::path::{Path, PathBuf};

use skirmish_types::{AgentRecord, Kind};
use tracing::{info, warn};

/// Errors that abort a whole roster load or save.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The file could not be read.
    #[error("failed to read roster {}: {source}", path.display())]
    Read {
        /// The roster path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("failed to write roster {}: {source}", path.display())]
    Write {
        /// The roster path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A line that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Why it was rejected.
    pub reason: String,
}

/// Result of parsing a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    /// Well-formed records, in file order.
    pub records: Vec<AgentRecord>,
    /// Lines that were rejected.
    pub skipped: Vec<SkippedLine>,
}

fn parse_line(line: &str) -> Result<AgentRecord, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [name, kind, x, y] = fields.as_slice() else {
        return Err(format!(
            "expected 4 fields (name kind x y), found {}",
            fields.len()
        ));
    };
    let kind: Kind = kind.parse().map_err(|e| format!("{e}"))?;
    let x: i32 = x
        .parse()
        .map_err(|e| format!("invalid x coordinate {x:?}: {e}"))?;
    let y: i32 = y
        .parse()
        .map_err(|e| format!("invalid y coordinate {y:?}: {e}"))?;
    Ok(AgentRecord {
        name: (*name).to_owned(),
        kind,
        x,
        y,
    })
}

/// Parse roster text, skipping malformed lines.
pub fn parse_roster(text: &str) -> ParsedRoster {
    let mut parsed = ParsedRoster::default();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let number = index.saturating_add(1);
        match parse_line(line) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(line = number, reason = %reason, "Skipping malformed roster line");
                parsed.skipped.push(SkippedLine {
                    line: number,
                    reason,
                });
            }
        }
    }
    parsed
}

/// Render records in roster format, one per line.
pub fn format_roster(records: &[AgentRecord]) -> String {
    records
        .iter()
        .map(|record| format!("{record}\n"))
        .collect::<Vec<_>>()
        .concat()
}

/// Read and parse a roster file.
///
/// # Errors
///
/// Returns [`RosterError::Read`] if the file cannot be read. Malformed
/// lines are not errors.
pub fn load_roster(path: &Path) -> Result<ParsedRoster, RosterError> {
    let text = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_roster(&text);
    info!(
        path = %path.display(),
        loaded = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "Roster loaded"
    );
    Ok(parsed)
}

/// Write `records` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`RosterError::Write`] if the file cannot be written.
pub fn save_roster(path: &Path, records: &[AgentRecord]) -> Result<(), RosterError> {
    std::fs::write(path, format_roster(records)).map_err(|source| RosterError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), saved = records.len(), "Roster saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(name: &str, kind: Kind, x: i32, y: i32) -> AgentRecord {
        AgentRecord {
            name: name.to_owned(),
            kind,
            x,
            y,
        }
    }

    #[test]
    fn parses_well_formed_lines() {
        let parsed = parse_roster("Grom Orc 3 4\nElda druid 0 0\n");
        assert!(parsed.skipped.is_empty());
        assert_eq!(
            parsed.records,
            vec![record("Grom", Kind::Orc, 3, 4), record("Elda", Kind::Druid, 0, 0)]
        );
    }

    #[test]
    fn ignores_blank_and_comment_lines() {
        let parsed = parse_roster("# saved roster\n\n   \nNutkin Squirrel 1 2\n");
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn skips_malformed_lines_and_keeps_the_rest() {
        let text = "Grom Orc 3 4\nBad Dragon 1 1\nShort Orc 1\nElda Druid x 2\nNutkin Squirrel 1 2\n";
        let parsed = parse_roster(text);
        assert_eq!(parsed.records.len(), 2);
        let lines: Vec<usize> = parsed.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(parsed.skipped.first().unwrap().reason.contains("Dragon"));
        assert!(parsed.skipped.get(1).unwrap().reason.contains("4 fields"));
        assert!(parsed.skipped.get(2).unwrap().reason.contains("x coordinate"));
    }

    #[test]
    fn saved_roster_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.txt");
        let records = vec![record("Grom", Kind::Orc, 3, 4), record("Nutkin", Kind::Squirrel, 0, 9)];

        save_roster(&path, &records).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Grom Orc 3 4\nNutkin Squirrel 0 9\n"
        );
        assert_eq!(load_roster(&path).unwrap().records, records);
        assert!(format_roster(&[]).is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_roster(&dir.path().join("absent.txt"));
        assert!(matches!(result, Err(RosterError::Read { .. })));
    }

    #[test]
    fn unwritable_path_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_roster(&dir.path().join("no/such/dir/roster.txt"), &[]);
        assert!(matches!(result, Err(RosterError::Write { .. })));
    }
}
