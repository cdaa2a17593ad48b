//! Chart persistence: save/load of assignments plus the roster.
//!
//! A save file is a versioned, human-readable JSON envelope holding the
//! pyramid's row structure, the position-to-name mapping, and the roster it
//! was built against. Loading is all-or-nothing: a file either validates
//! completely into a fresh `(Chart, Roster)` pair or the caller's state is
//! untouched.

use crate::chart::Chart;
use crate::layout::{Position, PyramidLayout};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid save format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid save file: {0}")]
    Invalid(String),

    #[error("unsupported save version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Quick-access facts about a save, readable without the full file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    /// When the save was created, RFC 3339.
    pub saved_at: String,

    /// Number of pyramid rows.
    pub rows: usize,

    /// Filled positions.
    pub assigned: usize,

    /// People in the embedded roster.
    pub people: usize,
}

/// A saved chart: everything needed to restore a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedChart {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// Slot count per pyramid row, top to bottom.
    pub rows: Vec<usize>,

    /// Position index to occupant name.
    pub assignments: BTreeMap<usize, String>,

    /// The roster the chart was built against.
    pub roster: Roster,

    /// Metadata for listings and peeking.
    pub metadata: ChartMetadata,
}

impl SavedChart {
    /// Capture the current chart and roster.
    pub fn new(chart: &Chart, roster: &Roster) -> Self {
        let metadata = ChartMetadata {
            saved_at: chrono::Utc::now().to_rfc3339(),
            rows: chart.layout().rows(),
            assigned: chart.assigned_count(),
            people: roster.len(),
        };
        Self {
            version: SAVE_VERSION,
            rows: chart.layout().row_widths().to_vec(),
            assignments: chart
                .assignments()
                .map(|(position, name)| (position.0, name.to_string()))
                .collect(),
            roster: roster.clone(),
            metadata,
        }
    }

    /// Write to `path` as pretty JSON, atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), &content)?;
        Ok(())
    }

    /// Read a save file without validating the assignments.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = std::fs::read_to_string(path)?;
        let saved: Self = serde_json::from_str(&content)?;
        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }
        Ok(saved)
    }

    /// Validate the save and turn it into a live chart and roster.
    ///
    /// Rejects row structures the layout constructors could not have
    /// produced, out-of-range positions, and one person in two positions.
    pub fn into_parts(self) -> Result<(Chart, Roster), PersistError> {
        let layout = PyramidLayout::from_row_widths(self.rows)
            .map_err(|e| PersistError::Invalid(e.to_string()))?;
        let mut chart = Chart::new(layout);
        for (index, name) in self.assignments {
            let position = Position(index);
            if !chart.layout().contains(position) {
                return Err(PersistError::Invalid(format!(
                    "position {position} is out of range for a {} chart",
                    chart.layout()
                )));
            }
            // assign() vacating another slot means the file listed the same
            // person twice
            let vacated = chart
                .assign(position, name.clone())
                .map_err(|e| PersistError::Invalid(e.to_string()))?;
            if vacated.is_some() {
                return Err(PersistError::Invalid(format!(
                    "{name} appears at more than one position"
                )));
            }
        }
        Ok((chart, self.roster))
    }

    /// Read just the metadata of a save file.
    pub fn peek_metadata(path: impl AsRef<Path>) -> Result<ChartMetadata, PersistError> {
        let content = std::fs::read_to_string(path)?;

        // Parse just enough to get metadata
        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: ChartMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }
        Ok(partial.metadata)
    }
}

/// Information about one save file in a directory.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    /// Path to the save file.
    pub path: PathBuf,

    /// Save metadata.
    pub metadata: ChartMetadata,
}

/// List all chart save files in a directory, most recent first.
///
/// A missing directory is created and yields an empty list. Files that are
/// not valid saves are skipped rather than failing the listing.
pub fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let mut saves = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedChart::peek_metadata(&path) {
                saves.push(SaveInfo { path, metadata });
            }
        }
    }

    saves.sort_by(|a, b| {
        b.metadata
            .saved_at
            .cmp(&a.metadata.saved_at)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(saves)
}

/// Write `content` to `path` via a temporary file and rename, so a crash
/// mid-write never leaves a truncated file behind. Creates parent
/// directories.
pub(crate) fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
