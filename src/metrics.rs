//! Metric names, records, and sinks
//!
//! The trainer emits one named scalar per metric per epoch. Where those
//! scalars go is the sink's business: [`MemorySink`] keeps them for
//! inspection, [`ConsoleSink`] prints them, external collectors implement
//! [`MetricsSink`] themselves.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Standard harness metrics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Training loss, normalized by the training sample count.
    TrainLoss,
    /// Training top-k accuracy.
    TrainAcc,
    /// Validation loss, normalized by the validation sample count.
    EvalLoss,
    /// Validation top-k accuracy.
    EvalAcc,
    /// Custom metric with name.
    Custom(String),
}

impl Metric {
    /// Convert metric to string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Metric::TrainLoss => "train/loss",
            Metric::TrainAcc => "train/acc",
            Metric::EvalLoss => "eval/loss",
            Metric::EvalAcc => "eval/acc",
            Metric::Custom(name) => name,
        }
    }
}

/// A single recorded scalar, keyed by epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// Metric name.
    pub metric: Metric,
    /// Epoch label the value belongs to.
    pub epoch: usize,
    /// Recorded value.
    pub value: f32,
}

impl MetricRecord {
    /// Create a record stamped with the current time.
    pub fn new(metric: Metric, epoch: usize, value: f32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            timestamp,
            metric,
            epoch,
            value,
        }
    }
}

/// Destination for named scalars keyed by epoch index.
pub trait MetricsSink {
    /// Record one scalar for one epoch.
    fn record(&mut self, metric: Metric, epoch: usize, value: f32);
}

/// Append-only in-memory sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<MetricRecord>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// The `(epoch, value)` series of one metric, in insertion order.
    pub fn series(&self, metric: &Metric) -> Vec<(usize, f32)> {
        self.records
            .iter()
            .filter(|r| &r.metric == metric)
            .map(|r| (r.epoch, r.value))
            .collect()
    }
}

impl MetricsSink for MemorySink {
    fn record(&mut self, metric: Metric, epoch: usize, value: f32) {
        self.records.push(MetricRecord::new(metric, epoch, value));
    }
}

/// A shared sink records through the lock, so one collector can serve
/// both the trainer and whoever reads the series.
impl<S: MetricsSink> MetricsSink for std::sync::Arc<std::sync::Mutex<S>> {
    fn record(&mut self, metric: Metric, epoch: usize, value: f32) {
        if let Ok(mut sink) = self.lock() {
            sink.record(metric, epoch, value);
        }
    }
}

/// Sink that prints each scalar as it arrives.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MetricsSink for ConsoleSink {
    fn record(&mut self, metric: Metric, epoch: usize, value: f32) {
        println!("{} [epoch {}]: {:.4}", metric.as_str(), epoch, value);
    }
}
