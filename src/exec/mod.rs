//! Interface to the external compute engine
//!
//! Forward passes, gradients, and optimizer updates are not this crate's
//! business: they belong to whatever deep-learning engine backs the run.
//! The harness sees that engine through [`Executor`], a seam narrow enough
//! that the engine stays a black box exposing "compute forward pass" and
//! "compute gradient update", plus opaque parameter snapshots for
//! checkpointing.
//!
//! # Example
//!
//! ```no_run
//! use clasificar::exec::Executor;
//! use clasificar::data::Batch;
//! # fn engine() -> Box<dyn Executor> { unimplemented!() }
//!
//! let mut exec = engine();
//! # let batch: Batch = unimplemented!();
//! let out = exec.train_step(&batch).unwrap();
//! println!("batch loss: {:.4}", out.loss);
//! ```

use crate::data::Batch;
use crate::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Result of one delegated compute step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Scalar loss for the batch.
    pub loss: f32,

    /// Class scores, one row per sample in the batch.
    pub scores: Array2<f32>,
}

/// Trait implemented by the external compute engine.
///
/// Implementations own the model, the loss function, and the optimizer.
/// The harness only sequences calls and reads scalar losses and score
/// matrices back.
pub trait Executor {
    /// Run one training step over a batch: zero accumulated gradients,
    /// forward pass, loss, backward pass, optimizer update.
    ///
    /// Returns the batch loss and the per-sample class scores from the
    /// forward pass.
    fn train_step(&mut self, batch: &Batch) -> Result<StepOutput>;

    /// Run one inference-only step over a batch.
    ///
    /// Must not mutate model weights and must run in the engine's
    /// no-gradient mode.
    fn eval_step(&mut self, batch: &Batch) -> Result<StepOutput>;

    /// Serialize the current model parameters to an opaque blob.
    fn state(&self) -> Result<Vec<u8>>;

    /// Restore model parameters from a blob produced by [`Executor::state`].
    fn load_state(&mut self, blob: &[u8]) -> Result<()>;
}

/// Device placement strategy, chosen once at construction time.
///
/// The strategy is handed to whatever builds the executor and never
/// changes mid-run; a run is either single-device or data-parallel from
/// its first epoch to its last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceStrategy {
    /// All compute on one device.
    SingleDevice,

    /// Batches split across `replicas` identical model copies.
    DataParallel {
        /// Number of model replicas; must be at least 2.
        replicas: usize,
    },
}

impl Default for DeviceStrategy {
    fn default() -> Self {
        DeviceStrategy::SingleDevice
    }
}
