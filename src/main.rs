//! Churn Scoring Service - Main Entry Point
//!
//! Consumes customer records from NATS, scores them with the churn pipeline,
//! and publishes churn assessments. Requests are scored concurrently against
//! one shared, read-only artifact set.

use anyhow::{Context, Result};
use churn_prediction::{
    config::AppConfig,
    consumer::RequestConsumer,
    metrics::{MetricsReporter, PipelineMetrics},
    models::loader::ArtifactStore,
    pipeline::Pipeline,
    producer::AssessmentProducer,
    ChurnAssessment, ChurnRequest,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("churn_prediction={}", config.logging.level).parse()?);

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => AppConfig::load()?,
    };

    init_logging(&config)?;

    info!("Starting Churn Scoring Service");

    // All four artifacts load, or the service does not start
    let artifacts = Arc::new(
        ArtifactStore::load(&config.artifacts).context("Failed to load churn model artifacts")?,
    );
    let pipeline = Arc::new(Pipeline::new(artifacts));
    info!(
        features = pipeline.extractor().feature_count(),
        columns = ?pipeline.extractor().feature_names(),
        "Churn pipeline initialized"
    );

    let metrics = Arc::new(PipelineMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(client.clone(), &config.nats.request_subject);
    let producer = Arc::new(AssessmentProducer::new(
        client.clone(),
        &config.nats.assessment_subject,
    ));

    let num_workers = config.pipeline.workers.max(1);
    info!(
        workers = num_workers,
        requests = %consumer.subject(),
        assessments = %producer.subject(),
        "Starting request processing loop"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));
    let validate_ranges = config.pipeline.validate_ranges;

    let metrics_clone = metrics.clone();
    let interval_secs = config.pipeline.metrics_interval_secs;
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, interval_secs);
        reporter.start().await;
    });

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker semaphore closed")?;

        let pipeline = pipeline.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            let request = match serde_json::from_slice::<ChurnRequest>(&message.payload) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize churn request");
                    metrics.record_rejection("malformed_request");
                    drop(permit);
                    return;
                }
            };
            let customer_id = request.customer_id.clone();

            let scored = if validate_ranges {
                request
                    .record
                    .validate()
                    .and_then(|_| pipeline.predict(&request.record))
            } else {
                pipeline.predict(&request.record)
            };

            match scored {
                Ok(prediction) => {
                    let processing_time = start_time.elapsed();
                    metrics.record_prediction(
                        processing_time,
                        prediction.probability,
                        prediction.high_risk,
                    );

                    let assessment = ChurnAssessment::new(customer_id.clone(), &prediction);
                    if let Err(e) = producer.publish(&assessment).await {
                        error!(
                            customer_id = %customer_id,
                            error = %e,
                            "Failed to publish churn assessment"
                        );
                    } else {
                        debug!(
                            customer_id = %customer_id,
                            churn_probability = prediction.probability,
                            risk_level = prediction.risk_level().as_str(),
                            processing_time_us = processing_time.as_micros(),
                            "Churn assessment published"
                        );
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 100 == 0 {
                        let processing_stats = metrics.get_processing_stats();
                        info!(
                            processed = count,
                            throughput = format!("{:.1} req/s", metrics.get_throughput()),
                            avg_latency_us = processing_stats.mean_us,
                            "Processing milestone"
                        );
                    }
                }
                Err(e) if e.is_per_request() => {
                    metrics.record_rejection(e.kind());
                    warn!(
                        customer_id = %customer_id,
                        kind = e.kind(),
                        error = %e,
                        "Churn request rejected"
                    );
                }
                Err(e) => {
                    metrics.record_rejection(e.kind());
                    error!(
                        customer_id = %customer_id,
                        kind = e.kind(),
                        error = %e,
                        "Churn pipeline failed; artifact set is inconsistent"
                    );
                }
            }

            drop(permit);
        });
    }

    info!("Churn scoring service shutting down...");
    metrics.print_summary();

    Ok(())
}
