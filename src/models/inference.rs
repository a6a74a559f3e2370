//! Churn probability inference

use crate::error::{PipelineError, PipelineResult};
use crate::models::network::NetworkArtifact;

/// Runs scaled feature vectors through the trained network.
///
/// Owns the network artifact. Inference only: no state is touched between
/// calls, so one predictor can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Predictor {
    network: NetworkArtifact,
}

impl Predictor {
    pub fn new(network: NetworkArtifact) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &NetworkArtifact {
        &self.network
    }

    /// Width the input vector must have
    pub fn input_width(&self) -> usize {
        self.network.input_width()
    }

    /// Churn probability for one scaled feature vector
    pub fn predict(&self, scaled: &[f64]) -> PipelineResult<f64> {
        let output = self.network.forward(scaled)?;
        let probability = output as f64;

        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InferenceError(format!(
                "probability {} outside [0, 1]",
                probability
            )));
        }

        Ok(probability)
    }
}
