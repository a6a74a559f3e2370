//! Feature assembly for churn model inference.
//!
//! This module lays out the feature vector in the exact column order the
//! scaler was fitted and the network was trained against.

use crate::encoding::{EncodedCategories, GeographyTable};
use crate::error::{PipelineError, PipelineResult};
use crate::types::customer::CustomerRecord;

/// Leading columns of every feature vector, in training order.
///
/// The geography one-hot columns follow these, in fitted category order.
pub const BASE_COLUMNS: [&str; 9] = [
    "CreditScore",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
    "Gender",
];

/// Ordered feature vector handed to the scaler
pub type FeatureVector = Vec<f64>;

/// Assembles raw numeric fields and encoded categoricals into a feature vector.
///
/// Raw values pass through unmodified; nothing is clamped or coerced here.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    geography_columns: Vec<String>,
}

impl FeatureExtractor {
    /// Create an extractor for the layout implied by a geography table.
    pub fn new(geography: &GeographyTable) -> Self {
        Self {
            geography_columns: geography.column_names(),
        }
    }

    /// Assemble the feature vector for one record.
    pub fn assemble(
        &self,
        record: &CustomerRecord,
        encoded: &EncodedCategories,
    ) -> PipelineResult<FeatureVector> {
        if encoded.geography.len() != self.geography_columns.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.geography_columns.len(),
                got: encoded.geography.len(),
            });
        }

        let mut features = Vec::with_capacity(self.feature_count());

        features.push(record.credit_score as f64);
        features.push(record.age as f64);
        features.push(record.tenure as f64);
        features.push(record.balance);
        features.push(record.num_of_products as f64);
        features.push(if record.has_cr_card { 1.0 } else { 0.0 });
        features.push(if record.is_active_member { 1.0 } else { 0.0 });
        features.push(record.estimated_salary);
        features.push(encoded.gender_code);

        features.extend_from_slice(&encoded.geography);

        Ok(features)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        BASE_COLUMNS.len() + self.geography_columns.len()
    }

    /// Get feature names in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.geography_columns.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_assembly() {
        let geography = GeographyTable::new(&["France", "Germany", "Spain"], true).unwrap();
        let extractor = FeatureExtractor::new(&geography);

        let record = CustomerRecord {
            credit_score: 650,
            age: 40,
            tenure: 5,
            num_of_products: 2,
            geography: "Spain".to_string(),
            gender: "Male".to_string(),
            balance: 50000.0,
            has_cr_card: true,
            is_active_member: false,
            estimated_salary: 60000.0,
        };
        let encoded = EncodedCategories {
            gender_code: 1.0,
            geography: vec![0.0, 1.0],
        };

        let features = extractor.assemble(&record, &encoded).unwrap();

        assert_eq!(features.len(), 11);
        assert_eq!(
            features,
            vec![650.0, 40.0, 5.0, 50000.0, 2.0, 1.0, 0.0, 60000.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_feature_names() {
        let geography = GeographyTable::new(&["France", "Germany", "Spain"], false).unwrap();
        let extractor = FeatureExtractor::new(&geography);

        assert_eq!(extractor.feature_count(), 12);
        let names = extractor.feature_names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "CreditScore");
        assert_eq!(names[8], "Gender");
        assert_eq!(names[9], "Geography_France");
        assert_eq!(names[11], "Geography_Spain");
    }

    #[test]
    fn test_values_pass_through_unclamped() {
        let geography = GeographyTable::new(&["France", "Germany", "Spain"], false).unwrap();
        let extractor = FeatureExtractor::new(&geography);

        let record = CustomerRecord {
            credit_score: 1200,
            balance: -10.0,
            ..CustomerRecord::default()
        };
        let encoded = EncodedCategories {
            gender_code: 0.0,
            geography: vec![1.0, 0.0, 0.0],
        };

        let features = extractor.assemble(&record, &encoded).unwrap();
        assert_eq!(features[0], 1200.0);
        assert_eq!(features[3], -10.0);
    }

    #[test]
    fn test_geography_width_mismatch() {
        let geography = GeographyTable::new(&["France", "Germany", "Spain"], false).unwrap();
        let extractor = FeatureExtractor::new(&geography);

        let encoded = EncodedCategories {
            gender_code: 0.0,
            geography: vec![1.0, 0.0],
        };
        assert_eq!(
            extractor
                .assemble(&CustomerRecord::default(), &encoded)
                .unwrap_err(),
            PipelineError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
    }
}
