//! # Clasificar: Image-Classifier Training Harness
//!
//! Clasificar wires an external deep-learning engine into a complete
//! training and evaluation loop: checkpointing with a best-model slot,
//! background saves that never stall the epoch loop, top-k and
//! majority-vote evaluation, and per-epoch metric reporting.
//!
//! ## Architecture
//!
//! - **exec**: the seam to the external compute engine (forward, gradient
//!   update, opaque parameter snapshots)
//! - **data**: batch types shared by the trainer and evaluators
//! - **checkpoint**: Temp/Best slot store plus the background saver
//! - **eval**: top-k evaluation and grouped-view majority voting
//! - **train**: the epoch loop tying everything together
//! - **metrics**: named-scalar sinks consumed per epoch
//! - **config**: declarative YAML run specification
//!
//! The engine itself (tensor math, autograd, optimizers) is out of scope;
//! implement [`exec::Executor`] to plug one in.

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod exec;
pub mod metrics;
pub mod train;

// Re-export commonly used types
pub use data::Batch;
pub use error::{Error, Result};
