//! Record-to-probability pipeline: encode, assemble, scale, predict

use crate::encoding::FeatureEncoder;
use crate::error::PipelineResult;
use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::models::loader::ArtifactStore;
use crate::scaler::Scaler;
use crate::types::customer::CustomerRecord;
use crate::types::prediction::ChurnPrediction;
use std::sync::Arc;
use tracing::debug;

/// Scores customer records against one loaded artifact set.
///
/// Holds a shared read-only reference to the store; `predict` is pure and
/// reentrant, so a pipeline can be cloned or shared across workers freely.
#[derive(Debug, Clone)]
pub struct Pipeline {
    artifacts: Arc<ArtifactStore>,
    extractor: FeatureExtractor,
}

impl Pipeline {
    pub fn new(artifacts: Arc<ArtifactStore>) -> Self {
        let extractor = FeatureExtractor::new(artifacts.geography());
        Self {
            artifacts,
            extractor,
        }
    }

    pub fn artifacts(&self) -> &Arc<ArtifactStore> {
        &self.artifacts
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Encoded and assembled feature vector, before scaling
    pub fn features(&self, record: &CustomerRecord) -> PipelineResult<FeatureVector> {
        let encoder = FeatureEncoder::new(self.artifacts.geography(), self.artifacts.gender());
        let encoded = encoder.encode(record)?;
        self.extractor.assemble(record, &encoded)
    }

    /// Score one record. The first failing stage's error is returned as is.
    pub fn predict(&self, record: &CustomerRecord) -> PipelineResult<ChurnPrediction> {
        let features = self.features(record)?;
        let scaled = Scaler::new(self.artifacts.scaling()).transform(&features)?;
        let probability = self.artifacts.predictor().predict(&scaled)?;

        let prediction = ChurnPrediction::from_probability(probability);

        debug!(
            probability = prediction.probability,
            high_risk = prediction.high_risk,
            "Customer scored"
        );

        Ok(prediction)
    }

    /// Score several records independently
    pub fn predict_batch(&self, records: &[CustomerRecord]) -> Vec<PipelineResult<ChurnPrediction>> {
        records.iter().map(|r| self.predict(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{GenderTable, GeographyTable};
    use crate::error::PipelineError;
    use crate::models::network::{Activation, DenseLayer, NetworkArtifact};
    use crate::scaler::ScalingStats;

    /// Identity scaling and a logistic unit weighting only the age column.
    fn pipeline() -> Pipeline {
        let geography = GeographyTable::new(&["France", "Germany", "Spain"], false).unwrap();
        let gender = GenderTable::new(&["Female", "Male"]).unwrap();
        let columns = FeatureExtractor::new(&geography).feature_names();
        let width = columns.len();

        let mut mean = vec![0.0; width];
        let mut std = vec![1.0; width];
        mean[1] = 40.0;
        std[1] = 10.0;
        let scaling = ScalingStats::new(columns, mean, std).unwrap();

        let mut kernel = vec![vec![0.0]; width];
        kernel[1] = vec![2.0];
        let network = NetworkArtifact::new(
            width,
            vec![DenseLayer {
                units: 1,
                activation: Activation::Sigmoid,
                kernel,
                bias: vec![0.0],
            }],
        )
        .unwrap();

        let store = ArtifactStore::from_parts(geography, gender, scaling, network).unwrap();
        Pipeline::new(Arc::new(store))
    }

    #[test]
    fn test_predict_end_to_end() {
        let pipeline = pipeline();

        // age 40 scales to 0 -> sigmoid(0)
        let prediction = pipeline.predict(&CustomerRecord::default()).unwrap();
        assert_eq!(prediction.probability, 0.5);
        assert!(!prediction.high_risk);

        // age 60 scales to 2 -> sigmoid(4)
        let record = CustomerRecord {
            age: 60,
            ..CustomerRecord::default()
        };
        let prediction = pipeline.predict(&record).unwrap();
        assert!((prediction.probability - 0.982_013_8).abs() < 1e-6);
        assert!(prediction.high_risk);
    }

    #[test]
    fn test_features_layout() {
        let pipeline = pipeline();
        let record = CustomerRecord {
            geography: "Germany".to_string(),
            gender: "Female".to_string(),
            has_cr_card: false,
            ..CustomerRecord::default()
        };

        let features = pipeline.features(&record).unwrap();
        assert_eq!(features.len(), pipeline.extractor().feature_count());
        assert_eq!(
            features,
            vec![650.0, 40.0, 5.0, 50000.0, 2.0, 0.0, 1.0, 50000.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_unknown_category_short_circuits() {
        let pipeline = pipeline();
        let record = CustomerRecord {
            geography: "Italy".to_string(),
            ..CustomerRecord::default()
        };

        assert_eq!(
            pipeline.predict(&record).unwrap_err(),
            PipelineError::UnknownCategory {
                field: "Geography",
                value: "Italy".to_string()
            }
        );

        // Still usable afterwards
        assert!(pipeline.predict(&CustomerRecord::default()).is_ok());
    }

    #[test]
    fn test_predict_batch() {
        let pipeline = pipeline();
        let records = vec![
            CustomerRecord::default(),
            CustomerRecord {
                gender: "Other".to_string(),
                ..CustomerRecord::default()
            },
            CustomerRecord {
                age: 25,
                ..CustomerRecord::default()
            },
        ];

        let results = pipeline.predict_batch(&records);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(PipelineError::UnknownCategory { field: "Gender", .. })
        ));
        assert!(!results[2].as_ref().unwrap().high_risk);
    }

    #[test]
    fn test_shared_across_threads() {
        let pipeline = pipeline();
        let expected = pipeline.predict(&CustomerRecord::default()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || pipeline.predict(&CustomerRecord::default()).unwrap())
            })
            .collect();

        for handle in handles {
            let prediction = handle.join().unwrap();
            assert_eq!(prediction.probability.to_bits(), expected.probability.to_bits());
        }
    }
}
