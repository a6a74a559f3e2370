//! Standardization of assembled feature vectors

use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;

const SCALER_ARTIFACT: &str = "scaler";

/// On-disk schema of the scaling statistics
#[derive(Debug, Deserialize)]
struct ScalingStatsFile {
    columns: Vec<String>,
    mean: Vec<f64>,
    #[serde(alias = "std")]
    scale: Vec<f64>,
}

/// Fitted per-column (mean, std) pairs, in feature vector order
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingStats {
    columns: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl ScalingStats {
    /// Build statistics from fitted values.
    ///
    /// Any std that is not strictly positive and finite is rejected with
    /// `DegenerateScale`.
    pub fn new(columns: Vec<String>, mean: Vec<f64>, std: Vec<f64>) -> PipelineResult<Self> {
        if mean.len() != columns.len() || std.len() != columns.len() {
            return Err(PipelineError::ArtifactCorrupt {
                artifact: SCALER_ARTIFACT,
                reason: format!(
                    "{} columns but {} means and {} stds",
                    columns.len(),
                    mean.len(),
                    std.len()
                ),
            });
        }

        if let Some(idx) = mean.iter().position(|m| !m.is_finite()) {
            return Err(PipelineError::ArtifactCorrupt {
                artifact: SCALER_ARTIFACT,
                reason: format!("non-finite mean for column {}", columns[idx]),
            });
        }

        if let Some(idx) = std.iter().position(|s| *s <= 0.0 || !s.is_finite()) {
            return Err(PipelineError::DegenerateScale {
                column: columns[idx].clone(),
                value: std[idx],
            });
        }

        Ok(Self { columns, mean, std })
    }

    /// Decode the JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let file: ScalingStatsFile =
            serde_json::from_str(json).map_err(|e| PipelineError::ArtifactCorrupt {
                artifact: SCALER_ARTIFACT,
                reason: e.to_string(),
            })?;
        Self::new(file.columns, file.mean, file.scale)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Applies z-score scaling with a fitted set of statistics
#[derive(Debug, Clone, Copy)]
pub struct Scaler<'a> {
    stats: &'a ScalingStats,
}

impl<'a> Scaler<'a> {
    pub fn new(stats: &'a ScalingStats) -> Self {
        Self { stats }
    }

    /// `scaled[i] = (raw[i] - mean[i]) / std[i]`
    pub fn transform(&self, raw: &[f64]) -> PipelineResult<Vec<f64>> {
        if raw.len() != self.stats.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.stats.len(),
                got: raw.len(),
            });
        }

        Ok(raw
            .iter()
            .zip(self.stats.mean.iter().zip(&self.stats.std))
            .map(|(x, (mean, std))| (x - mean) / std)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_standardization() {
        let stats = ScalingStats::new(names(3), vec![10.0, 0.0, -2.0], vec![2.0, 1.0, 0.5]).unwrap();
        let scaled = Scaler::new(&stats).transform(&[14.0, 3.0, -2.0]).unwrap();
        assert_eq!(scaled, vec![2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let stats = ScalingStats::new(names(3), vec![0.0; 3], vec![1.0; 3]).unwrap();
        let scaler = Scaler::new(&stats);

        assert_eq!(
            scaler.transform(&[1.0, 2.0]).unwrap_err(),
            PipelineError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
        // Longer vectors are rejected too, never truncated
        assert!(scaler.transform(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn test_degenerate_scale() {
        let err = ScalingStats::new(names(3), vec![0.0; 3], vec![1.0, 0.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DegenerateScale {
                column: "c1".to_string(),
                value: 0.0
            }
        );

        assert!(matches!(
            ScalingStats::new(names(2), vec![0.0; 2], vec![1.0, f64::NAN]),
            Err(PipelineError::DegenerateScale { .. })
        ));
    }

    #[test]
    fn test_negative_scale_is_degenerate() {
        let err = ScalingStats::new(names(3), vec![0.0; 3], vec![1.0, 2.0, -0.5]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DegenerateScale {
                column: "c2".to_string(),
                value: -0.5
            }
        );

        assert!(matches!(
            ScalingStats::from_json(r#"{"columns": ["Age"], "mean": [38.9], "std": [-10.5]}"#),
            Err(PipelineError::DegenerateScale { .. })
        ));
    }

    #[test]
    fn test_length_disagreement_is_corrupt() {
        assert!(matches!(
            ScalingStats::new(names(3), vec![0.0; 2], vec![1.0; 3]),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let stats = ScalingStats::from_json(
            r#"{"columns": ["Age", "Tenure"], "mean": [38.9, 5.0], "scale": [10.5, 2.9]}"#,
        )
        .unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.columns()[0], "Age");

        assert!(matches!(
            ScalingStats::from_json(r#"{"columns": ["Age"], "mean": [38.9], "scale": [0.0]}"#),
            Err(PipelineError::DegenerateScale { .. })
        ));
        assert!(matches!(
            ScalingStats::from_json(r#"{"columns": ["Age"]}"#),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
    }
}
