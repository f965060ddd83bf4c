//! Configuration validation

use super::schema::HarnessSpec;
use crate::exec::DeviceStrategy;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Model name must not be empty")]
    EmptyModelName,

    #[error("Run id must not be empty")]
    EmptyRunId,

    #[error("Invalid optimizer: {0} (must be one of: adam, adamw, sgd)")]
    InvalidOptimizer(String),

    #[error("Invalid learning rate: {0} (must be > 0.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid save interval: {0} (must be > 0)")]
    InvalidSaveInterval(usize),

    #[error("Invalid top-k: {0} (must be > 0)")]
    InvalidTopK(usize),

    #[error("Invalid vote threshold: {0} (must be within 0.0..=1.0)")]
    InvalidVoteThreshold(f32),

    #[error("Invalid training sample count: {0} (must be > 0)")]
    InvalidTrainCount(usize),

    #[error("Invalid validation sample count: {0} (must be > 0)")]
    InvalidEvalCount(usize),

    #[error("Invalid replica count: {0} (data parallelism needs at least 2)")]
    InvalidReplicas(usize),
}

/// Validate a harness specification.
///
/// Checks:
/// - Names are non-empty
/// - Numeric values are in valid ranges
/// - Enumerated names match allowed values
pub fn validate_spec(spec: &HarnessSpec) -> Result<(), ValidationError> {
    if spec.model.is_empty() {
        return Err(ValidationError::EmptyModelName);
    }
    if spec.run_id.is_empty() {
        return Err(ValidationError::EmptyRunId);
    }

    let optimizer = spec.optimizer.name.to_lowercase();
    if !matches!(optimizer.as_str(), "adam" | "adamw" | "sgd") {
        return Err(ValidationError::InvalidOptimizer(
            spec.optimizer.name.clone(),
        ));
    }

    if spec.optimizer.lr <= 0.0 || !spec.optimizer.lr.is_finite() {
        return Err(ValidationError::InvalidLearningRate(spec.optimizer.lr));
    }

    if spec.training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(spec.training.epochs));
    }

    if spec.training.save_interval == 0 {
        return Err(ValidationError::InvalidSaveInterval(
            spec.training.save_interval,
        ));
    }

    if spec.training.top_k == 0 {
        return Err(ValidationError::InvalidTopK(spec.training.top_k));
    }

    if !(0.0..=1.0).contains(&spec.training.vote_threshold) {
        return Err(ValidationError::InvalidVoteThreshold(
            spec.training.vote_threshold,
        ));
    }

    if spec.training.num_train == 0 {
        return Err(ValidationError::InvalidTrainCount(spec.training.num_train));
    }

    if spec.training.num_eval == 0 {
        return Err(ValidationError::InvalidEvalCount(spec.training.num_eval));
    }

    if let DeviceStrategy::DataParallel { replicas } = spec.device {
        if replicas < 2 {
            return Err(ValidationError::InvalidReplicas(replicas));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{OptimSpec, TrainingParams};
    use std::path::PathBuf;

    fn valid_spec() -> HarnessSpec {
        HarnessSpec {
            model: "mobile_v2".to_string(),
            run_id: "run03".to_string(),
            save_root: PathBuf::from("trained_nets"),
            optimizer: OptimSpec {
                name: "adam".to_string(),
                lr: 0.001,
            },
            device: DeviceStrategy::SingleDevice,
            training: TrainingParams {
                epochs: 10,
                save_interval: 1,
                top_k: 3,
                vote_threshold: 0.5,
                num_train: 100,
                num_eval: 20,
                save_temp: true,
                save_best: true,
            },
        }
    }

    #[test]
    fn test_valid_spec_passes() {
        assert!(validate_spec(&valid_spec()).is_ok());
    }

    #[test]
    fn test_optimizer_names() {
        for name in ["adam", "AdamW", "sgd"] {
            let mut spec = valid_spec();
            spec.optimizer.name = name.to_string();
            assert!(validate_spec(&spec).is_ok(), "{name} should be accepted");
        }

        let mut spec = valid_spec();
        spec.optimizer.name = "rmsprop".to_string();
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidOptimizer(_))
        ));
    }

    #[test]
    fn test_rejects_bad_learning_rate() {
        let mut spec = valid_spec();
        spec.optimizer.lr = 0.0;
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidLearningRate(_))
        ));

        spec.optimizer.lr = f32::NAN;
        assert!(validate_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_zero_counts() {
        let mut spec = valid_spec();
        spec.training.num_train = 0;
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidTrainCount(0))
        ));

        let mut spec = valid_spec();
        spec.training.num_eval = 0;
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidEvalCount(0))
        ));
    }

    #[test]
    fn test_rejects_zero_epochs_and_interval() {
        let mut spec = valid_spec();
        spec.training.epochs = 0;
        assert!(validate_spec(&spec).is_err());

        let mut spec = valid_spec();
        spec.training.save_interval = 0;
        assert!(validate_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut spec = valid_spec();
        spec.training.vote_threshold = 1.5;
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidVoteThreshold(_))
        ));
    }

    #[test]
    fn test_rejects_single_replica_parallelism() {
        let mut spec = valid_spec();
        spec.device = DeviceStrategy::DataParallel { replicas: 1 };
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::InvalidReplicas(1))
        ));

        spec.device = DeviceStrategy::DataParallel { replicas: 2 };
        assert!(validate_spec(&spec).is_ok());
    }

    #[test]
    fn test_rejects_empty_names() {
        let mut spec = valid_spec();
        spec.model = String::new();
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::EmptyModelName)
        ));

        let mut spec = valid_spec();
        spec.run_id = String::new();
        assert!(matches!(
            validate_spec(&spec),
            Err(ValidationError::EmptyRunId)
        ));
    }
}
