//! Filesystem-backed checkpoint store

use super::state::{RunState, Slot};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writer half of the checkpoint store.
///
/// The background saver depends on this trait rather than on the concrete
/// store, so tests can swap in instrumented implementations.
pub trait CheckpointStorage: Send {
    /// Persist `state` into `slot`, replacing any prior contents.
    fn save(&self, state: &RunState, slot: Slot) -> Result<()>;

    /// Copy the Temp snapshot byte for byte into the Best slot.
    fn promote(&self) -> Result<()>;
}

/// Reads and writes run snapshots under `<root>/<model>_<run_id>/`.
///
/// # Example
///
/// ```no_run
/// use clasificar::checkpoint::{CheckpointStore, Slot};
///
/// let store = CheckpointStore::new("trained_nets", "mobile_v2", "run03");
/// match store.load(Slot::Temp).unwrap() {
///     Some(state) => println!("resuming after epoch {}", state.epoch),
///     None => println!("starting fresh"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Create a store for the run identified by `(model, run_id)`.
    ///
    /// No filesystem access happens here; the directory is created lazily
    /// by `load` and `save`.
    pub fn new(root: impl AsRef<Path>, model: &str, run_id: &str) -> Self {
        Self {
            dir: root.as_ref().join(format!("{model}_{run_id}")),
        }
    }

    /// The run directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a slot file.
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    /// Load the snapshot in `slot`.
    ///
    /// A missing run directory is created and reported as `None`; a missing
    /// slot file is `None` with no side effects. Both are the normal
    /// "start fresh" outcome, not errors. Anything else from the
    /// filesystem or a corrupt record is an error.
    pub fn load(&self, slot: Slot) -> Result<Option<RunState>> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            return Ok(None);
        }

        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let state = serde_json::from_str(&content).map_err(|e| {
            Error::Serialization(format!("checkpoint decode failed for {}: {e}", path.display()))
        })?;
        Ok(Some(state))
    }
}

impl CheckpointStorage for CheckpointStore {
    fn save(&self, state: &RunState, slot: Slot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let data = serde_json::to_string(state)
            .map_err(|e| Error::Serialization(format!("checkpoint encode failed: {e}")))?;

        // Write to a sibling file and rename so readers never observe a
        // partially written record.
        let path = self.slot_path(slot);
        let part = self.dir.join(format!("{}.part", slot.file_name()));
        fs::write(&part, data)?;
        fs::rename(&part, &path)?;
        Ok(())
    }

    fn promote(&self) -> Result<()> {
        fs::copy(self.slot_path(Slot::Temp), self.slot_path(Slot::Best))?;
        Ok(())
    }
}
