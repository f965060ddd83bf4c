//! High-level training loop
//!
//! [`Trainer`] drives the epoch loop: per-batch compute delegated to the
//! executor, one evaluation pass per epoch, metrics to the sink, and
//! periodic checkpoint submission to the background saver.
//!
//! # Example
//!
//! ```no_run
//! use clasificar::checkpoint::CheckpointStore;
//! use clasificar::metrics::ConsoleSink;
//! use clasificar::train::{FitConfig, Trainer};
//! # use clasificar::exec::Executor;
//! # fn engine() -> Box<dyn Executor> { unimplemented!() }
//!
//! let store = CheckpointStore::new("trained_nets", "net", "run1");
//! let config = FitConfig::new(50_000, 10_000).with_epochs(30);
//! let trainer = Trainer::resume(engine(), store, config, Box::new(ConsoleSink)).unwrap();
//! ```

mod config;
mod trainer;

pub use config::FitConfig;
pub use trainer::{EpochMetrics, FitResult, Trainer};
