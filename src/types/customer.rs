//! Customer record data structures for churn scoring

use crate::error::{PipelineError, PipelineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geography categories the encoder tables may be fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Geography {
    /// Every known category
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Germany, Geography::Spain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

impl FromStr for Geography {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Geography::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: "Geography",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender categories the encoder tables may be fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Every known category
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

impl FromStr for Gender {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: "Gender",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ten attributes a churn prediction is made from.
///
/// Categorical fields are kept as received; the encoder resolves them
/// against the fitted tables and rejects anything it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Credit score (300-900)
    #[serde(alias = "CreditScore")]
    pub credit_score: i32,

    /// Age in years (18-100)
    #[serde(alias = "Age")]
    pub age: i32,

    /// Years as a customer (0-10)
    #[serde(alias = "Tenure")]
    pub tenure: i32,

    /// Number of bank products held (1-4)
    #[serde(alias = "NumOfProducts")]
    pub num_of_products: i32,

    /// Country of residence
    #[serde(alias = "Geography")]
    pub geography: String,

    /// Gender
    #[serde(alias = "Gender")]
    pub gender: String,

    /// Account balance
    #[serde(alias = "Balance")]
    pub balance: f64,

    /// Holds a credit card
    #[serde(alias = "HasCrCard")]
    pub has_cr_card: bool,

    /// Active member
    #[serde(alias = "IsActiveMember")]
    pub is_active_member: bool,

    /// Estimated yearly salary
    #[serde(alias = "EstimatedSalary")]
    pub estimated_salary: f64,
}

impl CustomerRecord {
    /// Check the numeric fields against the documented record domain.
    ///
    /// `predict` never calls this; the service shell does before scoring.
    pub fn validate(&self) -> PipelineResult<()> {
        let int_ranges = [
            ("CreditScore", self.credit_score, 300, 900),
            ("Age", self.age, 18, 100),
            ("Tenure", self.tenure, 0, 10),
            ("NumOfProducts", self.num_of_products, 1, 4),
        ];
        for (field, value, min, max) in int_ranges {
            if !(min..=max).contains(&value) {
                return Err(PipelineError::OutOfRange {
                    field,
                    value: value as f64,
                });
            }
        }

        for (field, value) in [
            ("Balance", self.balance),
            ("EstimatedSalary", self.estimated_salary),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::OutOfRange { field, value });
            }
        }

        Ok(())
    }
}

impl Default for CustomerRecord {
    fn default() -> Self {
        Self {
            credit_score: 650,
            age: 40,
            tenure: 5,
            num_of_products: 2,
            geography: Geography::France.as_str().to_string(),
            gender: Gender::Male.as_str().to_string(),
            balance: 50000.0,
            has_cr_card: true,
            is_active_member: true,
            estimated_salary: 50000.0,
        }
    }
}

/// Scoring request as received from the message bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRequest {
    /// Caller-side customer identifier
    #[serde(alias = "CustomerId")]
    pub customer_id: String,

    /// Attributes to score
    #[serde(flatten)]
    pub record: CustomerRecord,

    /// Request timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChurnRequest {
    pub fn new(customer_id: String, record: CustomerRecord) -> Self {
        Self {
            customer_id,
            record,
            timestamp: Utc::now(),
        }
    }
}
