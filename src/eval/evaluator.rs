//! Validation-set evaluation

use crate::data::Batch;
use crate::exec::Executor;
use crate::Result;
use ndarray::{Array2, ArrayView1};

/// Count the rows whose label ranks among the top `k` scores.
///
/// A label is in the top k when fewer than k classes rank ahead of it;
/// equal scores rank by lower class index, so membership is deterministic
/// and monotone in k.
pub fn top_k_hits(scores: &Array2<f32>, labels: &[usize], k: usize) -> usize {
    assert_eq!(
        scores.nrows(),
        labels.len(),
        "one label per score row required"
    );
    assert!(
        labels.iter().all(|&label| label < scores.ncols()),
        "label out of class range"
    );

    scores
        .rows()
        .into_iter()
        .zip(labels)
        .filter(|(row, &label)| {
            let target = row[label];
            let ahead = row
                .iter()
                .enumerate()
                .filter(|&(class, &score)| {
                    score > target || (score == target && class < label)
                })
                .count();
            ahead < k
        })
        .count()
}

/// The `k` highest-scoring class indices of one row, best first.
///
/// Equal scores order by lower class index.
pub fn top_k_classes(row: ArrayView1<'_, f32>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| {
        row[b]
            .partial_cmp(&row[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(k.min(row.len()));
    order
}

/// Inference-mode evaluation over a validation set.
///
/// Loss and hit counts are normalized by `num_eval`, the caller-supplied
/// total validation sample count, not by batch count. Callers must keep
/// that constant consistent with how the batches were built.
#[derive(Debug, Clone)]
pub struct Evaluator {
    top_k: usize,
    num_eval: usize,
}

impl Evaluator {
    /// Create an evaluator counting a hit when the label is among the
    /// `top_k` highest-scoring classes.
    pub fn new(top_k: usize, num_eval: usize) -> Self {
        Self { top_k, num_eval }
    }

    /// Run the model over all batches in no-gradient mode.
    ///
    /// Returns `(avg_loss, top_k_accuracy)`. Weights are never mutated.
    pub fn evaluate(
        &self,
        exec: &mut dyn Executor,
        batches: &[Batch],
    ) -> Result<(f32, f32)> {
        let mut loss_sum = 0.0f32;
        let mut hits = 0usize;

        for batch in batches {
            let out = exec.eval_step(batch)?;
            loss_sum += out.loss;
            hits += top_k_hits(&out.scores, &batch.labels, self.top_k);
        }

        let norm = self.num_eval as f32;
        Ok((loss_sum / norm, hits as f32 / norm))
    }

    /// Top-k class predictions for every sample, in batch order.
    pub fn predict(
        &self,
        exec: &mut dyn Executor,
        batches: &[Batch],
    ) -> Result<Vec<Vec<usize>>> {
        let mut predictions = Vec::new();

        for batch in batches {
            let out = exec.eval_step(batch)?;
            for row in out.scores.rows() {
                predictions.push(top_k_classes(row, self.top_k));
            }
        }

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::StepOutput;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Replays a fixed sequence of step outputs.
    struct FixedExecutor {
        outputs: Vec<StepOutput>,
        cursor: usize,
    }

    impl FixedExecutor {
        fn new(outputs: Vec<StepOutput>) -> Self {
            Self { outputs, cursor: 0 }
        }

        fn next_output(&mut self) -> StepOutput {
            let out = self.outputs[self.cursor].clone();
            self.cursor += 1;
            out
        }
    }

    impl Executor for FixedExecutor {
        fn train_step(&mut self, _batch: &Batch) -> Result<StepOutput> {
            Ok(self.next_output())
        }

        fn eval_step(&mut self, _batch: &Batch) -> Result<StepOutput> {
            Ok(self.next_output())
        }

        fn state(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn load_state(&mut self, _blob: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    fn batch(labels: Vec<usize>) -> Batch {
        let n = labels.len();
        Batch::new(ndarray::ArrayD::zeros(vec![n, 1]), labels)
    }

    #[test]
    fn test_top_k_hits_top1() {
        let scores = array![[0.1, 0.7, 0.2], [0.5, 0.3, 0.2]];

        assert_eq!(top_k_hits(&scores, &[1, 0], 1), 2);
        assert_eq!(top_k_hits(&scores, &[0, 1], 1), 0);
    }

    #[test]
    fn test_top_k_hits_widening_k() {
        let scores = array![[0.1, 0.7, 0.2]];

        assert_eq!(top_k_hits(&scores, &[0], 1), 0);
        assert_eq!(top_k_hits(&scores, &[0], 2), 0);
        assert_eq!(top_k_hits(&scores, &[0], 3), 1);
    }

    #[test]
    fn test_top_k_hits_tie_prefers_lower_class() {
        // Classes 0 and 1 tie; class 0 takes the single top slot.
        let scores = array![[0.5, 0.5, 0.1]];

        assert_eq!(top_k_hits(&scores, &[0], 1), 1);
        assert_eq!(top_k_hits(&scores, &[1], 1), 0);
        assert_eq!(top_k_hits(&scores, &[1], 2), 1);
    }

    #[test]
    fn test_top_k_classes_order() {
        let scores = array![[0.1, 0.7, 0.2, 0.7]];

        // Descending score, ties by lower index.
        assert_eq!(top_k_classes(scores.row(0), 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_evaluate_normalizes_by_sample_count() {
        let outputs = vec![
            StepOutput {
                loss: 1.0,
                scores: array![[0.9, 0.1], [0.2, 0.8]],
            },
            StepOutput {
                loss: 3.0,
                scores: array![[0.6, 0.4], [0.3, 0.7]],
            },
        ];
        let mut exec = FixedExecutor::new(outputs);
        let batches = vec![batch(vec![0, 1]), batch(vec![1, 1])];

        let evaluator = Evaluator::new(1, 4);
        let (loss, acc) = evaluator.evaluate(&mut exec, &batches).unwrap();

        // Loss divided by num_eval, not by batch count.
        assert_relative_eq!(loss, 1.0, epsilon = 1e-6);
        // Hits: batch 1 both correct, batch 2 second row only.
        assert_relative_eq!(acc, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_predict_collects_per_sample() {
        let outputs = vec![StepOutput {
            loss: 0.0,
            scores: array![[0.1, 0.9, 0.0], [0.8, 0.1, 0.1]],
        }];
        let mut exec = FixedExecutor::new(outputs);
        let batches = vec![batch(vec![0, 0])];

        let evaluator = Evaluator::new(2, 2);
        let preds = evaluator.predict(&mut exec, &batches).unwrap();

        assert_eq!(preds, vec![vec![1, 0], vec![0, 1]]);
    }

    #[test]
    #[should_panic(expected = "one label per score row")]
    fn test_top_k_hits_shape_mismatch() {
        let scores = array![[0.1, 0.9]];
        top_k_hits(&scores, &[0, 1], 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Accuracy never decreases as k widens.
        #[test]
        fn top_k_hits_monotone_in_k(
            rows in 1usize..6,
            classes in 2usize..8,
            seed in proptest::collection::vec(0.0f32..1.0, 48),
        ) {
            let scores = Array2::from_shape_fn((rows, classes), |(r, c)| {
                seed[(r * classes + c) % seed.len()]
            });
            let labels: Vec<usize> = (0..rows).map(|r| r % classes).collect();

            let mut previous = 0;
            for k in 1..=classes {
                let hits = top_k_hits(&scores, &labels, k);
                prop_assert!(hits >= previous);
                previous = hits;
            }
            // With k covering every class, every label is a hit.
            prop_assert_eq!(previous, rows);
        }
    }
}
