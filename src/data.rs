//! Batch types shared by the trainer and evaluators
//!
//! A [`Batch`] pairs an input tensor with one integer class label per
//! sample. The harness never interprets the input data; only the executor
//! does. For the voting path a batch holds every derived view of one
//! logical sample, and `labels` carries the group's single label repeated
//! per view.

use ndarray::ArrayD;

/// One batch of samples: opaque inputs plus per-sample class labels.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Input tensor, handed to the executor untouched.
    pub inputs: ArrayD<f32>,

    /// Ground-truth class index per sample.
    pub labels: Vec<usize>,
}

impl Batch {
    /// Create a new batch.
    pub fn new(inputs: ArrayD<f32>, labels: Vec<usize>) -> Self {
        Self { inputs, labels }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
