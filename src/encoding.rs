//! Categorical feature encoding against the fitted encoder tables.
//!
//! Geography is one-hot encoded, gender is label encoded. Both tables are
//! checked at load time against the closed [`Geography`] / [`Gender`]
//! enumerations, so a fitted table can never introduce a category the
//! pipeline does not know about.

use crate::error::{PipelineError, PipelineResult};
use crate::types::customer::{CustomerRecord, Gender, Geography};
use serde::Deserialize;
use std::collections::HashSet;

const GEOGRAPHY_ARTIFACT: &str = "geography_encoder";
const GENDER_ARTIFACT: &str = "gender_encoder";

fn corrupt(artifact: &'static str, reason: impl Into<String>) -> PipelineError {
    PipelineError::ArtifactCorrupt {
        artifact,
        reason: reason.into(),
    }
}

/// On-disk schema of the geography encoder
#[derive(Debug, Deserialize)]
struct GeographyTableFile {
    #[serde(default = "default_geography_feature")]
    feature: String,
    categories: Vec<String>,
    #[serde(default)]
    drop: Option<String>,
}

fn default_geography_feature() -> String {
    "Geography".to_string()
}

/// One-hot encoding table for the geography attribute
#[derive(Debug, Clone, PartialEq)]
pub struct GeographyTable {
    /// Categories in fitted column order
    categories: Vec<Geography>,
    /// First category encodes to all zeros and has no column
    drop_first: bool,
}

impl GeographyTable {
    /// Build a table from fitted category names.
    ///
    /// The names must be exactly the known geography set, each once.
    pub fn new<S: AsRef<str>>(categories: &[S], drop_first: bool) -> PipelineResult<Self> {
        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(categories.len());

        for name in categories {
            let geography = name.as_ref().parse::<Geography>().map_err(|_| {
                corrupt(
                    GEOGRAPHY_ARTIFACT,
                    format!("unexpected category {:?}", name.as_ref()),
                )
            })?;
            if !seen.insert(geography) {
                return Err(corrupt(
                    GEOGRAPHY_ARTIFACT,
                    format!("duplicate category {:?}", name.as_ref()),
                ));
            }
            parsed.push(geography);
        }

        if parsed.len() != Geography::ALL.len() {
            return Err(corrupt(
                GEOGRAPHY_ARTIFACT,
                format!(
                    "expected {} categories, found {}",
                    Geography::ALL.len(),
                    parsed.len()
                ),
            ));
        }

        Ok(Self {
            categories: parsed,
            drop_first,
        })
    }

    /// Decode the JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let file: GeographyTableFile =
            serde_json::from_str(json).map_err(|e| corrupt(GEOGRAPHY_ARTIFACT, e.to_string()))?;

        if file.feature != "Geography" {
            return Err(corrupt(
                GEOGRAPHY_ARTIFACT,
                format!("fitted on feature {:?}, expected \"Geography\"", file.feature),
            ));
        }

        let drop_first = match file.drop.as_deref() {
            None => false,
            Some("first") => true,
            Some(other) => {
                return Err(corrupt(
                    GEOGRAPHY_ARTIFACT,
                    format!("unsupported drop mode {:?}", other),
                ))
            }
        };

        Self::new(&file.categories, drop_first)
    }

    /// Fitted categories in column order (including a dropped first one)
    pub fn categories(&self) -> &[Geography] {
        &self.categories
    }

    pub fn drop_first(&self) -> bool {
        self.drop_first
    }

    fn emitted(&self) -> &[Geography] {
        if self.drop_first {
            &self.categories[1..]
        } else {
            &self.categories
        }
    }

    /// Number of one-hot columns emitted
    pub fn width(&self) -> usize {
        self.emitted().len()
    }

    /// Column names, `Geography_<category>`
    pub fn column_names(&self) -> Vec<String> {
        self.emitted()
            .iter()
            .map(|g| format!("Geography_{}", g))
            .collect()
    }

    /// One-hot encode a geography value
    pub fn encode(&self, geography: Geography) -> PipelineResult<Vec<f64>> {
        if !self.categories.contains(&geography) {
            return Err(PipelineError::UnknownCategory {
                field: "Geography",
                value: geography.to_string(),
            });
        }

        Ok(self
            .emitted()
            .iter()
            .map(|&g| if g == geography { 1.0 } else { 0.0 })
            .collect())
    }
}

/// On-disk schema of the gender encoder
#[derive(Debug, Deserialize)]
struct GenderTableFile {
    classes: Vec<String>,
}

/// Label encoding table for the gender attribute
#[derive(Debug, Clone, PartialEq)]
pub struct GenderTable {
    /// Code is the index into this list
    classes: Vec<Gender>,
}

impl GenderTable {
    pub fn new<S: AsRef<str>>(classes: &[S]) -> PipelineResult<Self> {
        let mut parsed: Vec<Gender> = Vec::with_capacity(classes.len());

        for name in classes {
            let gender = name.as_ref().parse::<Gender>().map_err(|_| {
                corrupt(
                    GENDER_ARTIFACT,
                    format!("unexpected class {:?}", name.as_ref()),
                )
            })?;
            if parsed.contains(&gender) {
                return Err(corrupt(
                    GENDER_ARTIFACT,
                    format!("duplicate class {:?}", name.as_ref()),
                ));
            }
            parsed.push(gender);
        }

        if parsed.len() != Gender::ALL.len() {
            return Err(corrupt(
                GENDER_ARTIFACT,
                format!(
                    "expected {} classes, found {}",
                    Gender::ALL.len(),
                    parsed.len()
                ),
            ));
        }

        Ok(Self { classes: parsed })
    }

    /// Decode the JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let file: GenderTableFile =
            serde_json::from_str(json).map_err(|e| corrupt(GENDER_ARTIFACT, e.to_string()))?;
        Self::new(&file.classes)
    }

    pub fn classes(&self) -> &[Gender] {
        &self.classes
    }

    /// Integer code for a gender value
    pub fn code(&self, gender: Gender) -> PipelineResult<f64> {
        self.classes
            .iter()
            .position(|&g| g == gender)
            .map(|idx| idx as f64)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: "Gender",
                value: gender.to_string(),
            })
    }
}

/// Encoded categorical fields of one record
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCategories {
    pub gender_code: f64,
    pub geography: Vec<f64>,
}

/// Maps a record's categorical fields to their fitted encodings
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    geography: &'a GeographyTable,
    gender: &'a GenderTable,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(geography: &'a GeographyTable, gender: &'a GenderTable) -> Self {
        Self { geography, gender }
    }

    /// Encode geography and gender; unknown values are rejected, never defaulted
    pub fn encode(&self, record: &CustomerRecord) -> PipelineResult<EncodedCategories> {
        let geography = record.geography.parse::<Geography>()?;
        let gender = record.gender.parse::<Gender>()?;

        Ok(EncodedCategories {
            gender_code: self.gender.code(gender)?,
            geography: self.geography.encode(geography)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(drop_first: bool) -> (GeographyTable, GenderTable) {
        (
            GeographyTable::new(&["France", "Germany", "Spain"], drop_first).unwrap(),
            GenderTable::new(&["Female", "Male"]).unwrap(),
        )
    }

    #[test]
    fn test_one_hot_full() {
        let (geo, _) = tables(false);
        assert_eq!(geo.width(), 3);
        assert_eq!(geo.encode(Geography::France).unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(geo.encode(Geography::Spain).unwrap(), vec![0.0, 0.0, 1.0]);
        assert_eq!(
            geo.column_names(),
            vec!["Geography_France", "Geography_Germany", "Geography_Spain"]
        );
    }

    #[test]
    fn test_one_hot_drop_first() {
        let (geo, _) = tables(true);
        assert_eq!(geo.width(), 2);
        assert_eq!(geo.encode(Geography::France).unwrap(), vec![0.0, 0.0]);
        assert_eq!(geo.encode(Geography::Germany).unwrap(), vec![1.0, 0.0]);
        assert_eq!(
            geo.column_names(),
            vec!["Geography_Germany", "Geography_Spain"]
        );
    }

    #[test]
    fn test_fitted_order_is_respected() {
        let geo = GeographyTable::new(&["Spain", "France", "Germany"], false).unwrap();
        assert_eq!(geo.encode(Geography::Spain).unwrap(), vec![1.0, 0.0, 0.0]);

        let gender = GenderTable::new(&["Male", "Female"]).unwrap();
        assert_eq!(gender.code(Gender::Male).unwrap(), 0.0);
        assert_eq!(gender.code(Gender::Female).unwrap(), 1.0);
    }

    #[test]
    fn test_gender_codes() {
        let (_, gender) = tables(false);
        assert_eq!(gender.code(Gender::Female).unwrap(), 0.0);
        assert_eq!(gender.code(Gender::Male).unwrap(), 1.0);
    }

    #[test]
    fn test_encoder_rejects_unknown_values() {
        let (geo, gender) = tables(false);
        let encoder = FeatureEncoder::new(&geo, &gender);

        let record = CustomerRecord {
            geography: "Italy".to_string(),
            ..CustomerRecord::default()
        };
        assert_eq!(
            encoder.encode(&record).unwrap_err(),
            PipelineError::UnknownCategory {
                field: "Geography",
                value: "Italy".to_string()
            }
        );

        let record = CustomerRecord {
            gender: "Unknown".to_string(),
            ..CustomerRecord::default()
        };
        assert!(matches!(
            encoder.encode(&record),
            Err(PipelineError::UnknownCategory { field: "Gender", .. })
        ));
    }

    #[test]
    fn test_encoder_output() {
        let (geo, gender) = tables(false);
        let encoder = FeatureEncoder::new(&geo, &gender);

        let record = CustomerRecord {
            geography: "Germany".to_string(),
            gender: "Female".to_string(),
            ..CustomerRecord::default()
        };
        let encoded = encoder.encode(&record).unwrap();
        assert_eq!(encoded.gender_code, 0.0);
        assert_eq!(encoded.geography, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_table_validation() {
        assert!(matches!(
            GeographyTable::new(&["France", "Germany"], false),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            GeographyTable::new(&["France", "Germany", "Italy"], false),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            GeographyTable::new(&["France", "France", "Spain"], false),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            GenderTable::new(&["Male"]),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let geo = GeographyTable::from_json(
            r#"{"feature": "Geography", "categories": ["France", "Germany", "Spain"], "drop": "first"}"#,
        )
        .unwrap();
        assert!(geo.drop_first());
        assert_eq!(geo.width(), 2);

        let geo =
            GeographyTable::from_json(r#"{"categories": ["France", "Germany", "Spain"]}"#).unwrap();
        assert!(!geo.drop_first());

        assert!(matches!(
            GeographyTable::from_json(
                r#"{"categories": ["France", "Germany", "Spain"], "drop": "if_binary"}"#
            ),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));
        assert!(matches!(
            GenderTable::from_json("not json"),
            Err(PipelineError::ArtifactCorrupt { .. })
        ));

        let gender = GenderTable::from_json(r#"{"classes": ["Female", "Male"]}"#).unwrap();
        assert_eq!(gender.classes(), &[Gender::Female, Gender::Male]);
    }
}
