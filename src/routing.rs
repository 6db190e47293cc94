//! The static routing table and destination lookup.
//!
//! The table is an ordered list of `(monitor_type, daytype) -> destination`
//! rules, loaded once at startup from a JSON array or a CSV file. Lookups scan
//! the list in order and the first matching rule wins, so duplicate keys are
//! resolved by their position in the source file.

use crate::core::{DayType, Destination};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// A single routing rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub monitor_type: String,
    pub daytype: DayType,
    pub destination: Destination,
}

impl ReferenceEntry {
    pub fn new(monitor_type: &str, daytype: DayType, destination: &str) -> Self {
        Self {
            monitor_type: monitor_type.to_string(),
            daytype,
            destination: Destination::from(destination.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Reference table not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read reference table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed reference table {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Malformed reference table {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// The ordered, immutable routing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    /// Loads the table from a file. Files ending in `.csv` are read as CSV
    /// with a header row; anything else is parsed as a JSON array.
    ///
    /// # Arguments
    /// * `path` - The path to the reference table file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        info!("Loading reference table from {:?}", path);
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }

        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let table = if is_csv {
            Self::from_csv(path)?
        } else {
            Self::from_json(path)?
        };

        info!("Loaded {} routing entries.", table.len());
        Ok(table)
    }

    fn from_json(path: &Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<ReferenceEntry> =
            serde_json::from_str(&text).map_err(|source| TableError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(entries))
    }

    fn from_csv(path: &Path) -> Result<Self, TableError> {
        let csv_err = |source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_err)?;

        let mut entries = Vec::new();
        for result in reader.deserialize() {
            let entry: ReferenceEntry = result.map_err(csv_err)?;
            entries.push(entry);
        }
        Ok(Self::new(entries))
    }

    /// Returns the destination of the first entry matching the query.
    pub fn resolve(&self, monitor_type: &str, daytype: DayType) -> Option<&Destination> {
        let found = self
            .entries
            .iter()
            .find(|e| e.monitor_type == monitor_type && e.daytype == daytype)
            .map(|e| &e.destination);
        debug!(monitor_type, %daytype, destination = ?found, "Resolved destination");
        found
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
