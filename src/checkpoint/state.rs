//! Checkpoint records and slot naming

use serde::{Deserialize, Serialize};

/// Best-loss starting value for a fresh run.
///
/// Finite rather than `f32::INFINITY` so the record survives a JSON round
/// trip; any real validation loss improves on it.
pub const BEST_LOSS_SENTINEL: f32 = 1e8;

/// Named checkpoint destination under the run directory.
///
/// Temp holds the most recent snapshot and is overwritten on every save;
/// Best is a copy of Temp taken whenever the validation loss improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Most recent snapshot.
    Temp,
    /// Snapshot with the lowest validation loss seen so far.
    Best,
}

impl Slot {
    /// Fixed file name for this slot.
    pub fn file_name(&self) -> &'static str {
        match self {
            Slot::Temp => "temp_model.dat",
            Slot::Best => "best_model.dat",
        }
    }
}

/// Persisted snapshot of a run: progress metadata plus the engine's opaque
/// parameter blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Label of the last completed epoch. A resumed run reports its first
    /// epoch as `epoch + 1`, keeping the metric timeline continuous.
    pub epoch: usize,

    /// Lowest validation loss seen across the run's lifetime.
    pub best_loss: f32,

    /// Serialized model parameters, produced and consumed by the executor.
    pub params: Vec<u8>,
}

impl RunState {
    /// Snapshot for a run that has not completed any epoch yet.
    pub fn fresh(params: Vec<u8>) -> Self {
        Self {
            epoch: 0,
            best_loss: BEST_LOSS_SENTINEL,
            params,
        }
    }
}
