//! Consensus evaluation over grouped views
//!
//! Used when one logical sample is represented as several derived views
//! (for example six crops of one image) sharing a single label. Each batch
//! holds exactly one group's views; the group's prediction is decided by
//! confidence thresholding followed by a majority vote.

use crate::data::Batch;
use crate::exec::Executor;
use crate::Result;
use ndarray::{Array2, ArrayView1};
use std::collections::HashMap;

/// Group-level consensus evaluation.
///
/// Voting rules:
/// - each view contributes its top-1 class and that class's score as a
///   confidence;
/// - views with confidence below `threshold` are dropped;
/// - the majority class among the kept views wins, with ties broken by
///   the lowest class index;
/// - if no view clears the threshold, the single most confident view
///   decides (earlier view wins a confidence tie).
#[derive(Debug, Clone)]
pub struct VoteEvaluator {
    threshold: f32,
    num_eval: usize,
}

impl VoteEvaluator {
    /// Create a vote evaluator. `num_eval` normalizes loss and accuracy,
    /// matching how the caller built the groups.
    pub fn new(threshold: f32, num_eval: usize) -> Self {
        Self { threshold, num_eval }
    }

    /// Evaluate grouped batches in no-gradient mode.
    ///
    /// Returns `(avg_loss, accuracy)`; a group counts as correct when its
    /// consensus class equals the group's label. Groups with no views are
    /// skipped.
    pub fn vote_evaluate(
        &self,
        exec: &mut dyn Executor,
        batches: &[Batch],
    ) -> Result<(f32, f32)> {
        let mut loss_sum = 0.0f32;
        let mut correct = 0usize;

        for batch in batches {
            let out = exec.eval_step(batch)?;
            loss_sum += out.loss;

            let truth = match batch.labels.first() {
                Some(&label) => label,
                None => continue,
            };
            if let Some(consensus) = consensus_class(&out.scores, self.threshold) {
                if consensus == truth {
                    correct += 1;
                }
            }
        }

        let norm = self.num_eval as f32;
        Ok((loss_sum / norm, correct as f32 / norm))
    }
}

/// Decide one group's class from its per-view scores.
///
/// Returns `None` only for a group with zero views.
pub fn consensus_class(scores: &Array2<f32>, threshold: f32) -> Option<usize> {
    let views: Vec<(usize, f32)> = scores.rows().into_iter().map(top1).collect();
    if views.is_empty() {
        return None;
    }

    let kept: Vec<usize> = views
        .iter()
        .filter(|(_, confidence)| *confidence >= threshold)
        .map(|(class, _)| *class)
        .collect();

    if kept.is_empty() {
        // Every view is below the threshold; the most confident one decides.
        let mut best = views[0];
        for view in &views[1..] {
            if view.1 > best.1 {
                best = *view;
            }
        }
        return Some(best.0);
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for class in kept {
        *counts.entry(class).or_insert(0) += 1;
    }

    let mut winner = (usize::MAX, 0usize);
    for (&class, &count) in &counts {
        if count > winner.1 || (count == winner.1 && class < winner.0) {
            winner = (class, count);
        }
    }
    Some(winner.0)
}

/// Top-1 class and its score for one view; ties go to the lower class.
fn top1(row: ArrayView1<'_, f32>) -> (usize, f32) {
    let mut class = 0usize;
    let mut confidence = row[0];
    for (i, &score) in row.iter().enumerate().skip(1) {
        if score > confidence {
            class = i;
            confidence = score;
        }
    }
    (class, confidence)
}
