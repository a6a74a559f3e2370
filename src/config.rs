//! Configuration management for the churn scoring service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming scoring requests
    pub request_subject: String,
    /// Subject for outgoing churn assessments
    pub assessment_subject: String,
}

/// Location of the fitted artifact files
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact files
    pub dir: String,
    #[serde(default = "default_geography_encoder")]
    pub geography_encoder: String,
    #[serde(default = "default_gender_encoder")]
    pub gender_encoder: String,
    #[serde(default = "default_scaler")]
    pub scaler: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_geography_encoder() -> String {
    "geography_encoder.json".to_string()
}

fn default_gender_encoder() -> String {
    "gender_encoder.json".to_string()
}

fn default_scaler() -> String {
    "scaler.json".to_string()
}

fn default_model() -> String {
    "model.json".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: "artifacts".to_string(),
            geography_encoder: default_geography_encoder(),
            gender_encoder: default_gender_encoder(),
            scaler: default_scaler(),
            model: default_model(),
        }
    }
}

/// Service pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of requests scored concurrently
    pub workers: usize,
    /// Reject records outside the documented numeric domain before scoring
    #[serde(default = "default_validate_ranges")]
    pub validate_ranges: bool,
    /// Seconds between metrics summaries
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_validate_ranges() -> bool {
    true
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "churn.requests".to_string(),
                assessment_subject: "churn.assessments".to_string(),
            },
            artifacts: ArtifactsConfig::default(),
            pipeline: PipelineConfig {
                workers: 4,
                validate_ranges: true,
                metrics_interval_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
