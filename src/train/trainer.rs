//! Epoch-level training loop

use super::FitConfig;
use crate::checkpoint::{BackgroundSaver, CheckpointStore, Slot, BEST_LOSS_SENTINEL};
use crate::data::Batch;
use crate::eval::{top_k_hits, Evaluator};
use crate::exec::Executor;
use crate::metrics::{Metric, MetricsSink};
use crate::Result;

/// Metrics for a single completed epoch.
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    /// Continuous epoch label, carrying over any resumed offset.
    pub epoch: usize,
    /// Average training loss.
    pub train_loss: f32,
    /// Training top-k accuracy.
    pub train_acc: f32,
    /// Average validation loss.
    pub eval_loss: f32,
    /// Validation top-k accuracy.
    pub eval_acc: f32,
}

/// Result of a fit run.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Label of the last completed epoch.
    pub final_epoch: usize,
    /// Training loss of the last epoch.
    pub final_train_loss: f32,
    /// Validation loss of the last epoch.
    pub final_eval_loss: f32,
    /// Best validation loss seen across the run, including prior runs.
    pub best_loss: f32,
    /// Per-epoch metrics in order.
    pub history: Vec<EpochMetrics>,
}

/// High-level trainer driving the epoch loop.
///
/// Per epoch: delegate every training batch to the executor, evaluate the
/// validation set once, push metrics to the sink, and periodically hand a
/// parameter snapshot to the background saver. Any executor or storage
/// error is fatal and halts the run.
///
/// # Example
///
/// ```no_run
/// use clasificar::checkpoint::CheckpointStore;
/// use clasificar::metrics::MemorySink;
/// use clasificar::train::{FitConfig, Trainer};
/// # use clasificar::exec::Executor;
/// # fn engine() -> Box<dyn Executor> { unimplemented!() }
/// # let (train_batches, eval_batches) = (vec![], vec![]);
///
/// let store = CheckpointStore::new("trained_nets", "mobile_v2", "run03");
/// let config = FitConfig::new(50_000, 10_000).with_epochs(30).with_save_interval(2);
///
/// let mut trainer = Trainer::resume(engine(), store, config, Box::new(MemorySink::new())).unwrap();
/// let result = trainer.fit(&train_batches, &eval_batches).unwrap();
/// println!("best eval loss: {:.4}", result.best_loss);
/// trainer.finish().unwrap();
/// ```
pub struct Trainer {
    exec: Box<dyn Executor>,
    config: FitConfig,
    saver: BackgroundSaver,
    sink: Box<dyn MetricsSink>,
    epoch_offset: usize,
}

impl Trainer {
    /// Create a trainer for a fresh run, ignoring any existing checkpoint.
    pub fn new(
        exec: Box<dyn Executor>,
        store: CheckpointStore,
        config: FitConfig,
        sink: Box<dyn MetricsSink>,
    ) -> Self {
        let saver = BackgroundSaver::spawn(store, config.saver, BEST_LOSS_SENTINEL);
        Self {
            exec,
            config,
            saver,
            sink,
            epoch_offset: 0,
        }
    }

    /// Create a trainer that resumes from the Temp slot when a snapshot
    /// exists.
    ///
    /// A missing checkpoint is the normal "start fresh" outcome. When one
    /// is found, the executor state, epoch offset, and best loss are
    /// restored so the run continues a logically continuous epoch
    /// counter.
    pub fn resume(
        mut exec: Box<dyn Executor>,
        store: CheckpointStore,
        config: FitConfig,
        sink: Box<dyn MetricsSink>,
    ) -> Result<Self> {
        let (epoch_offset, best_loss) = match store.load(Slot::Temp)? {
            Some(state) => {
                exec.load_state(&state.params)?;
                (state.epoch, state.best_loss)
            }
            None => (0, BEST_LOSS_SENTINEL),
        };

        let saver = BackgroundSaver::spawn(store, config.saver, best_loss);
        Ok(Self {
            exec,
            config,
            saver,
            sink,
            epoch_offset,
        })
    }

    /// Epoch count carried over from previous runs.
    pub fn epoch_offset(&self) -> usize {
        self.epoch_offset
    }

    /// Lowest validation loss seen so far.
    pub fn best_loss(&self) -> f32 {
        self.saver.best_loss()
    }

    /// Run the configured number of epochs.
    pub fn fit(&mut self, train_batches: &[Batch], eval_batches: &[Batch]) -> Result<FitResult> {
        let evaluator = Evaluator::new(self.config.top_k, self.config.num_eval);
        let last_label = self.epoch_offset + self.config.epochs;

        let mut history = Vec::with_capacity(self.config.epochs);

        for epoch in 0..self.config.epochs {
            let label = self.epoch_offset + epoch + 1;

            let mut loss_sum = 0.0f32;
            let mut hits = 0usize;
            for batch in train_batches {
                let out = self.exec.train_step(batch)?;
                loss_sum += out.loss;
                hits += top_k_hits(&out.scores, &batch.labels, self.config.top_k);
            }
            let train_loss = loss_sum / self.config.num_train as f32;
            let train_acc = hits as f32 / self.config.num_train as f32;

            let (eval_loss, eval_acc) = evaluator.evaluate(self.exec.as_mut(), eval_batches)?;

            self.sink.record(Metric::TrainLoss, label, train_loss);
            self.sink.record(Metric::TrainAcc, label, train_acc);
            self.sink.record(Metric::EvalLoss, label, eval_loss);
            self.sink.record(Metric::EvalAcc, label, eval_acc);

            println!(
                "Epoch {}/{} | train_loss: {:.4} | train_acc: {:.4} | eval_loss: {:.4} | eval_acc: {:.4}",
                label, last_label, train_loss, train_acc, eval_loss, eval_acc
            );

            history.push(EpochMetrics {
                epoch: label,
                train_loss,
                train_acc,
                eval_loss,
                eval_acc,
            });

            if (epoch + 1) % self.config.save_interval == 0 {
                let params = self.exec.state()?;
                self.saver.submit(label, eval_loss, params)?;
            }
        }

        self.epoch_offset = last_label;

        let last = history.last();
        Ok(FitResult {
            final_epoch: last_label,
            final_train_loss: last.map(|m| m.train_loss).unwrap_or(0.0),
            final_eval_loss: last.map(|m| m.eval_loss).unwrap_or(0.0),
            best_loss: self.saver.best_loss(),
            history,
        })
    }

    /// Flush pending checkpoint work and surface any storage failure.
    pub fn finish(self) -> Result<()> {
        self.saver.finish()
    }
}
