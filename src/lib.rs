//! Customer Churn Prediction Library
//!
//! Encodes, assembles and scales a bank customer's attributes in the exact
//! column layout the churn network was trained on, then runs the network's
//! forward pass to estimate the probability the customer leaves.

pub mod config;
pub mod consumer;
pub mod encoding;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod producer;
pub mod scaler;
pub mod types;

pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::{PipelineError, PipelineResult};
pub use feature_extractor::FeatureExtractor;
pub use models::loader::ArtifactStore;
pub use pipeline::Pipeline;
pub use producer::AssessmentProducer;
pub use types::{
    customer::{ChurnRequest, CustomerRecord},
    prediction::{ChurnAssessment, ChurnPrediction},
};
