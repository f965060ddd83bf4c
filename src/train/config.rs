//! Training configuration

use crate::checkpoint::SaverOptions;

/// Configuration for a fit run.
#[derive(Clone, Debug)]
pub struct FitConfig {
    /// Number of epochs to run.
    pub epochs: usize,

    /// Submit a checkpoint every N epochs.
    pub save_interval: usize,

    /// A prediction counts as a hit when the label is among the K
    /// highest-scoring classes.
    pub top_k: usize,

    /// Loss/accuracy normalizer for training, the total training sample
    /// count.
    pub num_train: usize,

    /// Loss/accuracy normalizer for evaluation, the total validation
    /// sample count.
    pub num_eval: usize,

    /// Which checkpoint slots the background saver writes.
    pub saver: SaverOptions,
}

impl FitConfig {
    /// Create a configuration with the required sample-count normalizers
    /// and defaults for everything else (10 epochs, checkpoint every
    /// epoch, top-3 accuracy).
    pub fn new(num_train: usize, num_eval: usize) -> Self {
        Self {
            epochs: 10,
            save_interval: 1,
            top_k: 3,
            num_train,
            num_eval,
            saver: SaverOptions::default(),
        }
    }

    /// Set the epoch count.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the checkpoint interval, clamped to at least 1.
    pub fn with_save_interval(mut self, interval: usize) -> Self {
        self.save_interval = interval.max(1);
        self
    }

    /// Set the accuracy K.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the saver slot options.
    pub fn with_saver(mut self, saver: SaverOptions) -> Self {
        self.saver = saver;
        self
    }
}
