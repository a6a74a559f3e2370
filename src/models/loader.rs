//! Artifact store: loads the fitted encoders, scaler and network

use crate::config::ArtifactsConfig;
use crate::encoding::{GenderTable, GeographyTable};
use crate::error::{PipelineError, PipelineResult};
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::Predictor;
use crate::models::network::NetworkArtifact;
use crate::scaler::ScalingStats;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Read-only holder of the four fitted artifacts.
///
/// Either every artifact loads and agrees on the feature layout, or no store
/// is produced. Share it behind an `Arc`; to move to a newer artifact set,
/// swap the whole reference.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    geography: GeographyTable,
    gender: GenderTable,
    scaling: ScalingStats,
    predictor: Predictor,
}

impl ArtifactStore {
    /// Load all artifacts named by the configuration
    pub fn load(config: &ArtifactsConfig) -> PipelineResult<Self> {
        let dir = Path::new(&config.dir);

        info!(dir = %dir.display(), "Loading churn model artifacts");

        let geography = GeographyTable::from_json(&read_artifact(
            "geography_encoder",
            &dir.join(&config.geography_encoder),
        )?)?;
        let gender = GenderTable::from_json(&read_artifact(
            "gender_encoder",
            &dir.join(&config.gender_encoder),
        )?)?;
        let scaling =
            ScalingStats::from_json(&read_artifact("scaler", &dir.join(&config.scaler))?)?;
        let network =
            NetworkArtifact::from_json(&read_artifact("model", &dir.join(&config.model))?)?;

        let store = Self::from_parts(geography, gender, scaling, network)?;

        info!(
            features = store.scaling.len(),
            layers = store.predictor.network().num_layers(),
            parameters = store.predictor.network().num_parameters(),
            "Artifacts loaded successfully"
        );

        Ok(store)
    }

    /// Assemble a store from already-decoded artifacts.
    ///
    /// Checks that the scaler columns and the network input width match the
    /// layout the assembler will produce.
    pub fn from_parts(
        geography: GeographyTable,
        gender: GenderTable,
        scaling: ScalingStats,
        network: NetworkArtifact,
    ) -> PipelineResult<Self> {
        let expected = FeatureExtractor::new(&geography).feature_names();

        if scaling.columns() != expected.as_slice() {
            return Err(PipelineError::ArtifactCorrupt {
                artifact: "scaler",
                reason: format!(
                    "columns {:?} do not match feature layout {:?}",
                    scaling.columns(),
                    expected
                ),
            });
        }

        if network.input_width() != expected.len() {
            return Err(PipelineError::ArtifactCorrupt {
                artifact: "model",
                reason: format!(
                    "input width {} does not match feature layout width {}",
                    network.input_width(),
                    expected.len()
                ),
            });
        }

        Ok(Self {
            geography,
            gender,
            scaling,
            predictor: Predictor::new(network),
        })
    }

    pub fn geography(&self) -> &GeographyTable {
        &self.geography
    }

    pub fn gender(&self) -> &GenderTable {
        &self.gender
    }

    pub fn scaling(&self) -> &ScalingStats {
        &self.scaling
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }
}

fn read_artifact(artifact: &'static str, path: &Path) -> PipelineResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::ArtifactMissing {
            artifact,
            path: path.to_path_buf(),
        },
        _ => PipelineError::ArtifactCorrupt {
            artifact,
            reason: format!("failed to read {}: {}", path.display(), e),
        },
    })
}
