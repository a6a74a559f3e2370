//! Error types for the churn scoring pipeline

use std::path::PathBuf;

/// Errors raised while loading artifacts or scoring a customer record.
///
/// Artifact-level kinds (`ArtifactMissing`, `ArtifactCorrupt`,
/// `DegenerateScale`, `DimensionMismatch`, `InferenceError`) mean the loaded
/// artifact set is unusable. `UnknownCategory` and `OutOfRange` are
/// per-request and leave the pipeline usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A required artifact file could not be located
    #[error("Artifact missing: {artifact} not found at {}", .path.display())]
    ArtifactMissing {
        /// Artifact name (geography_encoder, gender_encoder, scaler, model)
        artifact: &'static str,
        /// Path that was looked up
        path: PathBuf,
    },

    /// An artifact failed to decode or its shape is inconsistent
    #[error("Artifact corrupt: {artifact}: {reason}")]
    ArtifactCorrupt {
        /// Artifact name
        artifact: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A categorical value outside the fitted category set
    #[error("Unknown category for {field}: {value:?}")]
    UnknownCategory {
        /// Record field (Geography, Gender)
        field: &'static str,
        /// Value supplied by the caller
        value: String,
    },

    /// Feature vector length does not match the scaling statistics
    #[error("Dimension mismatch: expected {expected} columns, got {got}")]
    DimensionMismatch {
        /// Number of (mean, std) pairs
        expected: usize,
        /// Length of the supplied vector
        got: usize,
    },

    /// A stored standard deviation is zero, negative or not finite
    #[error("Degenerate scale for column {column}: std = {value}")]
    DegenerateScale {
        /// Column name
        column: String,
        /// Offending standard deviation
        value: f64,
    },

    /// Forward pass could not be evaluated
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Numeric field outside the documented record domain
    #[error("Field {field} out of range: {value}")]
    OutOfRange {
        /// Record field
        field: &'static str,
        /// Value supplied by the caller
        value: f64,
    },
}

impl PipelineError {
    /// Short kind label, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ArtifactMissing { .. } => "artifact_missing",
            PipelineError::ArtifactCorrupt { .. } => "artifact_corrupt",
            PipelineError::UnknownCategory { .. } => "unknown_category",
            PipelineError::DimensionMismatch { .. } => "dimension_mismatch",
            PipelineError::DegenerateScale { .. } => "degenerate_scale",
            PipelineError::InferenceError(_) => "inference_error",
            PipelineError::OutOfRange { .. } => "out_of_range",
        }
    }

    /// Whether the failure is specific to one request.
    ///
    /// Everything else points at the artifact set itself.
    pub fn is_per_request(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownCategory { .. } | PipelineError::OutOfRange { .. }
        )
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
