//! Mutual exclusion and ordering guarantees of the background saver

use clasificar::checkpoint::{
    BackgroundSaver, CheckpointStorage, RunState, SaverOptions, Slot, BEST_LOSS_SENTINEL,
};
use clasificar::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Storage probe that counts how many save calls overlap and records the
/// order tasks execute in.
#[derive(Clone, Default)]
struct ProbeStore {
    in_section: Arc<AtomicUsize>,
    max_in_section: Arc<AtomicUsize>,
    saved_epochs: Arc<Mutex<Vec<usize>>>,
    promotions: Arc<AtomicUsize>,
}

impl CheckpointStorage for ProbeStore {
    fn save(&self, state: &RunState, _slot: Slot) -> Result<()> {
        let now = self.in_section.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_section.fetch_max(now, Ordering::SeqCst);

        // Stay inside the critical section long enough for overlapping
        // executions to be observable if they could happen.
        thread::sleep(Duration::from_millis(3));
        self.saved_epochs.lock().unwrap().push(state.epoch);

        self.in_section.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn promote(&self) -> Result<()> {
        self.promotions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_at_most_one_task_in_critical_section() {
    let store = ProbeStore::default();
    let max_in_section = Arc::clone(&store.max_in_section);
    let saved_epochs = Arc::clone(&store.saved_epochs);

    let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
    for epoch in 1..=12 {
        saver.submit(epoch, 1.0 / epoch as f32, vec![epoch as u8]).unwrap();
    }
    saver.finish().unwrap();

    assert_eq!(max_in_section.load(Ordering::SeqCst), 1);

    // Submission order is execution order.
    let epochs = saved_epochs.lock().unwrap().clone();
    assert_eq!(epochs, (1..=12).collect::<Vec<usize>>());
}

#[test]
fn test_finish_drains_all_queued_work() {
    let store = ProbeStore::default();
    let saved_epochs = Arc::clone(&store.saved_epochs);

    let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
    for epoch in 1..=5 {
        saver.submit(epoch, 0.5, vec![]).unwrap();
    }
    saver.finish().unwrap();

    assert_eq!(saved_epochs.lock().unwrap().len(), 5);
}

#[test]
fn test_improving_losses_promote_each_time() {
    let store = ProbeStore::default();
    let promotions = Arc::clone(&store.promotions);

    let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
    for epoch in 1..=6 {
        saver.submit(epoch, 1.0 / epoch as f32, vec![]).unwrap();
    }
    saver.finish().unwrap();

    assert_eq!(promotions.load(Ordering::SeqCst), 6);
}

#[test]
fn test_regressing_losses_promote_once() {
    let store = ProbeStore::default();
    let promotions = Arc::clone(&store.promotions);

    let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
    for epoch in 1..=6 {
        saver.submit(epoch, epoch as f32, vec![]).unwrap();
    }
    saver.finish().unwrap();

    assert_eq!(promotions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_best_loss_visible_across_submissions() {
    let store = ProbeStore::default();

    let saver = BackgroundSaver::spawn(store, SaverOptions::default(), BEST_LOSS_SENTINEL);
    saver.submit(1, 0.6, vec![]).unwrap();
    assert_eq!(saver.best_loss(), 0.6);

    saver.submit(2, 0.2, vec![]).unwrap();
    saver.submit(3, 0.9, vec![]).unwrap();

    // The tracker holds the minimum as soon as submission returns.
    assert_eq!(saver.best_loss(), 0.2);
    saver.finish().unwrap();
}
