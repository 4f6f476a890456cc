//! File-backed snapshot persistence.
//!
//! A [`SnapshotStore`] keeps the latest [`DiagramRecord`] of a diagram as
//! JSON in one file, so an editor can pick up where it left off. The
//! snapshot is a convenience copy: a corrupt file is reported, cleared and
//! otherwise ignored.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{error::FsmError, model::Diagram, record::DiagramRecord};

/// Persists diagram snapshots at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a snapshot of `diagram`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Io`] if the file cannot be written.
    pub fn save(&self, diagram: &Diagram) -> Result<(), FsmError> {
        let json = diagram.snapshot().to_json()?;
        fs::write(&self.path, &json)?;
        debug!(path:? = self.path, bytes = json.len(); "Snapshot saved");
        Ok(())
    }

    /// Restores the stored snapshot into `diagram`.
    ///
    /// Returns `Ok(false)` when there is nothing to restore: the file is
    /// missing or empty, or it held a corrupt record. A corrupt record is
    /// truncated so it is not retried, and `diagram` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Io`] if the file exists but cannot be read or
    /// cleared.
    pub fn load_into(&self, diagram: &mut Diagram) -> Result<bool, FsmError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path:? = self.path; "No snapshot to restore");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        if json.trim().is_empty() {
            return Ok(false);
        }

        match DiagramRecord::from_json(&json) {
            Ok(record) => {
                diagram.restore(&record);
                info!(path:? = self.path; "Snapshot restored");
                Ok(true)
            }
            Err(err) => {
                warn!(path:? = self.path, err:% = err; "Corrupt snapshot cleared");
                fs::write(&self.path, "")?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fsmdraw_core::geometry::Point;
    use tempfile::tempdir;

    use super::*;
    use crate::model::{Link, SelfLink};

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("diagram.json"));

        let mut diagram = Diagram::new();
        let a = diagram.create_node(Point::new(100.0, 100.0));
        diagram.set_text("q0");
        diagram.add_link(Link::SelfLoop(SelfLink::new(a).with_text("a")));
        store.save(&diagram).unwrap();

        let mut restored = Diagram::new();
        assert!(store.load_into(&mut restored).unwrap());
        assert_eq!(restored.nodes().len(), 1);
        assert_eq!(restored.nodes()[0].text(), "q0");
        assert_eq!(restored.links().len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        let mut diagram = Diagram::new();
        assert!(!store.load_into(&mut diagram).unwrap());
    }

    #[test]
    fn test_corrupt_snapshot_is_cleared() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diagram.json");
        fs::write(&path, "{\"nodes\": [").unwrap();
        let store = SnapshotStore::new(&path);

        let mut diagram = Diagram::new();
        diagram.create_node(Point::new(10.0, 10.0));
        assert!(!store.load_into(&mut diagram).unwrap());

        assert_eq!(diagram.nodes().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert!(!store.load_into(&mut diagram).unwrap());
    }
}
