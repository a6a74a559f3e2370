//! Test Request Producer
//!
//! Generates and publishes churn scoring requests to NATS for service testing.

use churn_prediction::{ChurnRequest, CustomerRecord};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Customer record generator for testing
struct CustomerGenerator {
    rng: rand::rngs::ThreadRng,
    customer_counter: u64,
}

impl CustomerGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            customer_counter: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.customer_counter += 1;
        format!("cust_{:010}", self.customer_counter)
    }

    /// Generate an engaged, long-standing customer
    fn generate_loyal(&mut self) -> ChurnRequest {
        let customer_id = self.next_id();
        let record = CustomerRecord {
            credit_score: self.rng.gen_range(550..=850),
            age: self.rng.gen_range(22..=45),
            tenure: self.rng.gen_range(3..=10),
            num_of_products: self.rng.gen_range(1..=2),
            geography: self.random_choice(&["France", "Spain", "France"]).to_string(),
            gender: self.random_choice(&["Male", "Female"]).to_string(),
            balance: if self.rng.gen_bool(0.4) {
                0.0
            } else {
                self.rng.gen_range(20000.0..150000.0)
            },
            has_cr_card: self.rng.gen_bool(0.7),
            is_active_member: self.rng.gen_bool(0.8),
            estimated_salary: self.rng.gen_range(20000.0..200000.0),
        };
        ChurnRequest::new(customer_id, record)
    }

    /// Generate a customer with the usual churn markers
    fn generate_at_risk(&mut self) -> ChurnRequest {
        let customer_id = self.next_id();
        let record = CustomerRecord {
            credit_score: self.rng.gen_range(350..=650),
            age: self.rng.gen_range(45..=70), // Older customers churn more
            tenure: self.rng.gen_range(0..=3),
            num_of_products: self.rng.gen_range(3..=4),
            geography: "Germany".to_string(),
            gender: "Female".to_string(),
            balance: self.rng.gen_range(80000.0..250000.0),
            has_cr_card: self.rng.gen_bool(0.5),
            is_active_member: false, // Inactive
            estimated_salary: self.rng.gen_range(20000.0..200000.0),
        };
        ChurnRequest::new(customer_id, record)
    }

    /// Generate a request the service must reject
    fn generate_invalid(&mut self) -> ChurnRequest {
        let mut request = self.generate_loyal();
        request.record.geography = self.random_choice(&["Italy", "Portugal", ""]).to_string();
        request
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }

    fn generate(&mut self, at_risk_rate: f64, invalid_rate: f64) -> ChurnRequest {
        if self.rng.gen_bool(invalid_rate) {
            self.generate_invalid()
        } else if self.rng.gen_bool(at_risk_rate) {
            self.generate_at_risk()
        } else {
            self.generate_loyal()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("churn.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let at_risk_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let invalid_rate: f64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(0.02);
    let delay_ms: u64 = args.get(6).and_then(|s| s.parse().ok()).unwrap_or(100);

    let at_risk_rate = at_risk_rate.clamp(0.0, 1.0);
    let invalid_rate = invalid_rate.clamp(0.0, 1.0);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        at_risk_rate = at_risk_rate,
        invalid_rate = invalid_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, at_risk_rate, invalid_rate, delay_ms).await;
        }
    };

    let mut generator = CustomerGenerator::new();

    info!("Starting to publish {} requests...", count);

    for i in 0..count {
        let request = generator.generate(at_risk_rate, invalid_rate);
        let payload = serde_json::to_vec(&request)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!("Published {}/{} requests", i + 1, count);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!("Completed! Published {} requests", count);

    Ok(())
}

async fn run_dry_mode(
    count: u64,
    at_risk_rate: f64,
    invalid_rate: f64,
    delay_ms: u64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = CustomerGenerator::new();

    for i in 0..count {
        let request = generator.generate(at_risk_rate, invalid_rate);
        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
