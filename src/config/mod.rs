//! Declarative run configuration
//!
//! A [`HarnessSpec`] describes a whole run in YAML: the run identity, the
//! optimizer handed to the executor builder, device placement, and every
//! training tunable. Parsing validates eagerly, so a bad configuration
//! fails before any compute starts.

pub mod schema;
pub mod validate;

pub use schema::{HarnessSpec, OptimSpec, TrainingParams};
pub use validate::{validate_spec, ValidationError};
