//! YAML schema definitions for a harness run

use super::validate::validate_spec;
use crate::checkpoint::{CheckpointStore, SaverOptions};
use crate::exec::DeviceStrategy;
use crate::train::FitConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete specification of a training run.
///
/// # Example
///
/// ```yaml
/// model: mobile_v2
/// run_id: run03
/// save_root: trained_nets
/// optimizer:
///   name: adam
///   lr: 0.001
/// training:
///   epochs: 30
///   save_interval: 2
///   num_train: 50000
///   num_eval: 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessSpec {
    /// Model name, part of the run directory key.
    pub model: String,

    /// Run identifier, part of the run directory key.
    pub run_id: String,

    /// Root directory for checkpoint run directories.
    pub save_root: PathBuf,

    /// Optimizer configuration, handed to the executor builder.
    pub optimizer: OptimSpec,

    /// Device placement, chosen once for the whole run.
    #[serde(default)]
    pub device: DeviceStrategy,

    /// Training hyperparameters.
    pub training: TrainingParams,
}

/// Optimizer configuration.
///
/// The harness never steps the optimizer itself; the name and learning
/// rate go to whatever builds the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimSpec {
    /// Optimizer name: "adam" | "adamw" | "sgd".
    pub name: String,

    /// Learning rate.
    pub lr: f32,
}

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Number of epochs to run.
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Submit a checkpoint every N epochs.
    #[serde(default = "default_save_interval")]
    pub save_interval: usize,

    /// Top-K accuracy cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum confidence for a view to join the majority vote.
    #[serde(default = "default_vote_threshold")]
    pub vote_threshold: f32,

    /// Total training sample count, the training loss/accuracy normalizer.
    pub num_train: usize,

    /// Total validation sample count, the evaluation normalizer.
    pub num_eval: usize,

    /// Overwrite the Temp slot on every checkpoint.
    #[serde(default = "default_true")]
    pub save_temp: bool,

    /// Promote Temp to Best on validation-loss improvement.
    #[serde(default = "default_true")]
    pub save_best: bool,
}

fn default_epochs() -> usize {
    10
}

fn default_save_interval() -> usize {
    1
}

fn default_top_k() -> usize {
    3
}

fn default_vote_threshold() -> f32 {
    0.5
}

fn default_true() -> bool {
    true
}

impl HarnessSpec {
    /// Load and validate a specification from a YAML file.
    ///
    /// Invalid configuration (unsupported optimizer name, zero sample
    /// counts, and so on) is fatal here, before any training starts.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let spec: HarnessSpec = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))?;

        validate_spec(&spec).map_err(|e| Error::Config(e.to_string()))?;
        Ok(spec)
    }

    /// Checkpoint store for this run's `(model, run_id)` directory.
    pub fn store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.save_root, &self.model, &self.run_id)
    }

    /// Runtime fit configuration derived from the spec.
    pub fn fit_config(&self) -> FitConfig {
        FitConfig::new(self.training.num_train, self.training.num_eval)
            .with_epochs(self.training.epochs)
            .with_save_interval(self.training.save_interval)
            .with_top_k(self.training.top_k)
            .with_saver(SaverOptions {
                save_temp: self.training.save_temp,
                save_best: self.training.save_best,
            })
    }
}
