use crate::types::{CuratedRecord, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON file holding every record ever accepted.
///
/// The file is read once at the start of a run and rewritten in full at the end.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted collection with `is_new` cleared on every record.
    ///
    /// A missing, unreadable or malformed file yields an empty collection.
    pub fn load(&self) -> Vec<CuratedRecord> {
        if !self.path.exists() {
            info!("No history at {}, starting empty", self.path.display());
            return Vec::new();
        }

        let mut records = match self.read_records() {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load history from {}: {}, starting empty", self.path.display(), e);
                return Vec::new();
            }
        };

        for record in &mut records {
            record.is_new = false;
        }

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        records
    }

    fn read_records(&self) -> Result<Vec<CuratedRecord>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the file with the whole collection.
    pub fn save(&self, records: &[CuratedRecord]) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut serializer)?;

        fs::write(&self.path, buf)?;
        info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Links already present in the collection.
pub fn existing_links(records: &[CuratedRecord]) -> HashSet<String> {
    records.iter().map(|r| r.link.clone()).collect()
}
