//! NATS message producer for churn assessments

use crate::types::prediction::ChurnAssessment;
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing churn assessments to NATS
#[derive(Clone)]
pub struct AssessmentProducer {
    client: Client,
    subject: String,
}

impl AssessmentProducer {
    /// Create a new assessment producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a churn assessment
    pub async fn publish(&self, assessment: &ChurnAssessment) -> Result<()> {
        let payload = serde_json::to_vec(assessment)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            assessment_id = %assessment.assessment_id,
            customer_id = %assessment.customer_id,
            churn_probability = assessment.churn_probability,
            "Published churn assessment"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
