//! Background checkpoint persistence
//!
//! Writing a multi-megabyte parameter blob should not stall the epoch
//! loop. The saver owns one worker thread fed by a capacity-one channel:
//! tasks run strictly in submission order, at most one task executes at a
//! time, and `submit` only blocks once a task is executing and another is
//! already queued. Best-loss bookkeeping and the Temp-to-Best copy happen
//! inside a critical section guarded by a mutex the saver owns.

use super::state::{RunState, Slot};
use super::store::CheckpointStorage;
use crate::{Error, Result};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Which snapshots each save task writes.
#[derive(Debug, Clone, Copy)]
pub struct SaverOptions {
    /// Overwrite the Temp slot on every task.
    pub save_temp: bool,

    /// Track the best validation loss and promote Temp to Best when a task
    /// improves on it.
    pub save_best: bool,
}

impl Default for SaverOptions {
    fn default() -> Self {
        Self {
            save_temp: true,
            save_best: true,
        }
    }
}

/// Deferred unit of checkpoint work, captured in full at submission time.
struct SaveTask {
    epoch: usize,
    loss: f32,
    best_at_submit: f32,
    params: Vec<u8>,
}

/// Asynchronous checkpoint writer with a single worker.
///
/// # Example
///
/// ```no_run
/// use clasificar::checkpoint::{BackgroundSaver, CheckpointStore, SaverOptions, BEST_LOSS_SENTINEL};
///
/// let store = CheckpointStore::new("trained_nets", "net", "run1");
/// let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
///
/// saver.submit(1, 0.84, vec![/* parameter blob */]).unwrap();
/// saver.finish().unwrap();
/// ```
pub struct BackgroundSaver {
    tx: Option<SyncSender<SaveTask>>,
    worker: Option<JoinHandle<()>>,
    options: SaverOptions,
    best_loss: Arc<Mutex<f32>>,
    failure: Arc<Mutex<Option<Error>>>,
}

impl BackgroundSaver {
    /// Spawn the worker thread.
    ///
    /// `initial_best` seeds the best-loss tracker: the sentinel for a
    /// fresh run, or the value restored from a checkpoint on resume.
    pub fn spawn<S>(store: S, options: SaverOptions, initial_best: f32) -> Self
    where
        S: CheckpointStorage + 'static,
    {
        let best_loss = Arc::new(Mutex::new(initial_best));
        let failure: Arc<Mutex<Option<Error>>> = Arc::new(Mutex::new(None));

        let (tx, rx) = sync_channel::<SaveTask>(1);
        let best = Arc::clone(&best_loss);
        let fail = Arc::clone(&failure);

        let worker = thread::spawn(move || {
            while let Ok(task) = rx.recv() {
                if let Err(e) = run_task(&store, options, &best, task) {
                    // Storage failures are fatal: record and stop consuming.
                    *lock(&fail) = Some(e);
                    break;
                }
            }
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
            options,
            best_loss,
            failure,
        }
    }

    /// Lowest validation loss seen so far.
    pub fn best_loss(&self) -> f32 {
        *lock(&self.best_loss)
    }

    /// Queue a checkpoint for the just-completed epoch.
    ///
    /// The parameter blob and the current best loss are captured now, so
    /// the snapshot reflects the model at submission even if the write
    /// happens while training continues. An improving loss lowers the
    /// tracker immediately; the queued task still compares against the
    /// value captured here when deciding on promotion. Blocks while one
    /// task is executing and another is already queued. Surfaces any
    /// failure recorded by an earlier task.
    pub fn submit(&self, epoch: usize, loss: f32, params: Vec<u8>) -> Result<()> {
        self.check_failure()?;

        let best_at_submit = {
            let mut best = lock(&self.best_loss);
            let prior = *best;
            if self.options.save_best && loss < *best {
                *best = loss;
            }
            prior
        };

        let task = SaveTask {
            epoch,
            loss,
            best_at_submit,
            params,
        };

        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::Saver("saver already shut down".to_string()))?;
        if tx.send(task).is_err() {
            // The worker exited after a failed task; report why.
            self.check_failure()?;
            return Err(Error::Saver("worker thread is gone".to_string()));
        }
        Ok(())
    }

    /// Drain queued work, stop the worker, and surface any failure.
    pub fn finish(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        // Closing the channel lets the worker drain what is queued and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                return Err(Error::Saver("worker thread panicked".to_string()));
            }
        }
        self.check_failure()
    }

    fn check_failure(&self) -> Result<()> {
        match lock(&self.failure).take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for BackgroundSaver {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Execute one task inside the saver's critical section.
fn run_task<S: CheckpointStorage>(
    store: &S,
    options: SaverOptions,
    best_loss: &Mutex<f32>,
    task: SaveTask,
) -> Result<()> {
    let mut best = lock(best_loss);

    if options.save_temp {
        if task.loss < *best {
            *best = task.loss;
        }
        let state = RunState {
            epoch: task.epoch,
            best_loss: *best,
            params: task.params,
        };
        store.save(&state, Slot::Temp)?;
    }

    if options.save_best && task.loss < task.best_at_submit {
        *best = task.loss;
        store.promote()?;
    }

    Ok(())
}
