//! The roster: the persistent registry of known people and their photos.
//!
//! Independent of any particular chart. Loaded at startup, mutated through
//! add/remove, written back atomically whenever it changes. The on-disk
//! format is a small versioned JSON file mapping name to photo path.

use crate::persist::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current roster file version.
const ROSTER_VERSION: u32 = 1;

/// Errors from roster persistence.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid roster format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported roster version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// One person in the roster. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    /// Path to the photo file, if one has been chosen.
    pub photo: Option<PathBuf>,
}

/// The set of known people, keyed and iterated by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    people: BTreeMap<String, Option<PathBuf>>,
}

/// On-disk envelope for the roster file.
#[derive(Serialize, Deserialize)]
struct RosterFile {
    version: u32,
    people: Roster,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a person, or replace the photo of an existing one.
    ///
    /// Names are the identity, so a duplicate name is a replacement, not a
    /// second record. Returns `true` when an existing record was replaced.
    pub fn add(&mut self, name: impl Into<String>, photo: Option<PathBuf>) -> bool {
        self.people.insert(name.into(), photo).is_some()
    }

    /// Remove a person. Returns `false` if the name was unknown.
    pub fn remove(&mut self, name: &str) -> bool {
        self.people.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Person> {
        self.people.get(name).map(|photo| Person {
            name: name.to_string(),
            photo: photo.clone(),
        })
    }

    /// Photo path for a person, if they are known and have one.
    pub fn photo(&self, name: &str) -> Option<&Path> {
        self.people.get(name).and_then(|photo| photo.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.people.contains_key(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.people.keys().map(String::as_str)
    }

    /// People in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Path>)> {
        self.people
            .iter()
            .map(|(name, photo)| (name.as_str(), photo.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Load the roster from `path`.
    ///
    /// An absent file is not an error: a fresh installation starts with an
    /// empty roster. Unreadable files are `Io`, malformed content `Format`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let file: RosterFile = serde_json::from_str(&content)?;
        if file.version != ROSTER_VERSION {
            return Err(RosterError::VersionMismatch {
                expected: ROSTER_VERSION,
                found: file.version,
            });
        }
        Ok(file.people)
    }

    /// Write the roster to `path` atomically, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RosterError> {
        let file = RosterFile {
            version: ROSTER_VERSION,
            people: self.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        write_atomic(path.as_ref(), &content)?;
        Ok(())
    }

    /// Default roster location: `<data_dir>/pyramid-chart/roster.json`.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("pyramid-chart");
        path.push("roster.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_and_lookup() {
        let mut roster = Roster::new();
        assert!(!roster.add("Alice", Some("alice.png".into())));
        assert!(!roster.add("Bob", None));

        assert_eq!(roster.len(), 2);
        assert!(roster.contains("Alice"));
        assert_eq!(roster.photo("Alice"), Some(Path::new("alice.png")));
        assert_eq!(roster.photo("Bob"), None);
        assert_eq!(roster.get("Carol"), None);
    }

    #[test]
    fn duplicate_names_replace() {
        let mut roster = Roster::new();
        roster.add("Alice", Some("old.png".into()));
        assert!(roster.add("Alice", Some("new.png".into())));

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.photo("Alice"), Some(Path::new("new.png")));
    }

    #[test]
    fn remove_unknown_name() {
        let mut roster = Roster::new();
        roster.add("Alice", None);
        assert!(roster.remove("Alice"));
        assert!(!roster.remove("Alice"));
        assert!(roster.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let mut roster = Roster::new();
        roster.add("Carol", None);
        roster.add("Alice", None);
        roster.add("Bob", None);
        let names: Vec<_> = roster.names().collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("roster.json");

        let mut roster = Roster::new();
        roster.add("Alice", Some("photos/alice.png".into()));
        roster.add("Bob", None);
        roster.save(&path).expect("save");

        let loaded = Roster::load(&path).expect("load");
        assert_eq!(loaded, roster);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().expect("temp dir");
        let roster = Roster::load(dir.path().join("nope.json")).expect("load");
        assert!(roster.is_empty());
    }

    #[test]
    fn load_malformed_file_is_format_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "{\"people\": 12}").unwrap();

        match Roster::load(&path) {
            Err(RosterError::Format(_)) => {}
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn load_future_version_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "{\"version\": 99, \"people\": {}}").unwrap();

        match Roster::load(&path) {
            Err(RosterError::VersionMismatch {
                expected: 1,
                found: 99,
            }) => {}
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested/dir/roster.json");

        let mut roster = Roster::new();
        roster.add("Alice", None);
        roster.save(&path).expect("save");

        assert!(path.exists());
        assert_eq!(Roster::load(&path).expect("load").len(), 1);
    }
}
