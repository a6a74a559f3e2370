//! Performance metrics and statistics tracking for the churn scoring service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for service performance
pub struct PipelineMetrics {
    /// Total requests scored
    pub requests_scored: AtomicU64,
    /// Scored requests flagged high risk
    pub high_risk: AtomicU64,
    /// Total requests rejected
    pub requests_rejected: AtomicU64,
    /// Rejections by error kind
    rejections_by_kind: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_scored: AtomicU64::new(0),
            high_risk: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            rejections_by_kind: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored request
    pub fn record_prediction(&self, processing_time: Duration, probability: f64, high_risk: bool) {
        self.requests_scored.fetch_add(1, Ordering::Relaxed);
        if high_risk {
            self.high_risk.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a rejected request
    pub fn record_rejection(&self, kind: &str) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.rejections_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted: Vec<u64> = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    /// Get rejections by error kind
    pub fn get_rejections_by_kind(&self) -> HashMap<String, u64> {
        self.rejections_by_kind
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.requests_scored.load(Ordering::Relaxed);
        let high_risk = self.high_risk.load(Ordering::Relaxed);
        let rejected = self.requests_rejected.load(Ordering::Relaxed);
        let high_risk_rate = if scored > 0 {
            (high_risk as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let rejections = self.get_rejections_by_kind();
        let distribution = self.get_probability_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            CHURN SCORING SERVICE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests Scored: {:>8}  │  Throughput: {:>6.1} req/s       ║",
            scored, throughput
        );
        info!(
            "║ High Risk:       {:>8}  │  Rate: {:>6.1}%                  ║",
            high_risk, high_risk_rate
        );
        info!("║ Rejected:        {:>8}                                     ║", rejected);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        if !rejections.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Rejections by Kind:                                          ║");
            for (kind, count) in &rejections {
                info!("║   {:18}: {:>6}                                 ║", kind, count);
            }
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Churn Probability Distribution:                              ║");
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
