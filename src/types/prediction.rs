//! Churn prediction data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probability above which a customer is flagged as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Risk classification derived from the churn probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    High,
}

impl RiskLevel {
    /// Classify a churn probability (strictly greater than the threshold is high)
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::High => "high",
        }
    }
}

/// Output of a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnPrediction {
    /// Probability the customer churns, in [0, 1]
    pub probability: f64,
    /// `probability > 0.5`
    pub high_risk: bool,
}

impl ChurnPrediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            high_risk: probability > HIGH_RISK_THRESHOLD,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }

    /// Probability the customer stays
    pub fn retention_probability(&self) -> f64 {
        1.0 - self.probability
    }

    /// Probability mass behind the predicted outcome
    pub fn confidence(&self) -> f64 {
        self.probability.max(self.retention_probability())
    }
}

/// Scored customer, as published to downstream consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Customer the assessment belongs to
    pub customer_id: String,

    /// Churn probability (0.0 - 1.0)
    pub churn_probability: f64,

    /// Probability above the high-risk threshold
    pub high_risk: bool,

    /// Risk classification
    pub risk_level: RiskLevel,

    /// max(p, 1 - p)
    pub confidence: f64,

    /// Assessment timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChurnAssessment {
    pub fn new(customer_id: String, prediction: &ChurnPrediction) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            churn_probability: prediction.probability,
            high_risk: prediction.high_risk,
            risk_level: prediction.risk_level(),
            confidence: prediction.confidence(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_flag_boundary() {
        assert!(!ChurnPrediction::from_probability(0.5).high_risk);
        assert!(ChurnPrediction::from_probability(0.5000001).high_risk);
        assert_eq!(RiskLevel::from_probability(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.9), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_label_matches_wire_name() {
        for level in [RiskLevel::Low, RiskLevel::High] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }

    #[test]
    fn test_confidence() {
        let prediction = ChurnPrediction::from_probability(0.2);
        assert!((prediction.retention_probability() - 0.8).abs() < 1e-12);
        assert!((prediction.confidence() - 0.8).abs() < 1e-12);

        let prediction = ChurnPrediction::from_probability(0.75);
        assert!((prediction.confidence() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_assessment_serialization() {
        let prediction = ChurnPrediction::from_probability(0.82);
        let assessment = ChurnAssessment::new("15634602".to_string(), &prediction);

        let json = serde_json::to_string(&assessment).unwrap();
        assert!(json.contains("\"risk_level\":\"high\""));

        let deserialized: ChurnAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(assessment.customer_id, deserialized.customer_id);
        assert_eq!(assessment.churn_probability, deserialized.churn_probability);
        assert_eq!(deserialized.risk_level, RiskLevel::High);
        assert!(deserialized.high_risk);
    }
}
