//! Model evaluation
//!
//! Two inference-only paths: [`Evaluator`] scores a validation set with
//! top-k accuracy, [`VoteEvaluator`] reduces groups of augmented views to
//! one consensus prediction each.

mod evaluator;
mod vote;

pub use evaluator::{top_k_classes, top_k_hits, Evaluator};
pub use vote::{consensus_class, VoteEvaluator};
