//! Type definitions for the churn scoring pipeline

pub mod customer;
pub mod prediction;

pub use customer::{ChurnRequest, CustomerRecord, Gender, Geography};
pub use prediction::{ChurnAssessment, ChurnPrediction, RiskLevel};
