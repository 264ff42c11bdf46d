//! Paced block production
//!
//! [`PacedMiningController`] runs a fixed number of cycles. Each cycle
//! produces one block (with bounded retry), reads its difficulty, optionally
//! injects a batch of payments, and then sleeps out the remainder of the
//! block interval.

use crate::batch::plan_batch;
use crate::clock::{Clock, TokioClock};
use crate::error::{MinerError, MinerResult};
use crate::report::{MiningEvent, ProgressReporter};
use crate::retry::RetryPolicy;
use crate::timing::{RunSummary, TimingBuckets};
use chrono::{DateTime, Local};
use pacer_config::{AddressConfig, BLOCK_HEIGHT_THRESHOLD};
use pacer_rpc_client::{LedgerClient, RpcError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a run needs to know besides its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningSettings {
    /// Cycles to run, skipped ones included
    pub num_blocks: u64,
    /// Target wall-clock time per cycle
    pub block_interval: Duration,
    /// Reward address; the node wallet is used when absent
    pub mining_address: Option<String>,
    /// Payment recipients, drawn with replacement
    pub recipients: Vec<String>,
    /// Whether payment batches were requested
    pub enable_transactions: bool,
}

impl MiningSettings {
    pub fn new(num_blocks: u64, block_interval: Duration) -> Self {
        Self {
            num_blocks,
            block_interval,
            mining_address: None,
            recipients: Vec::new(),
            enable_transactions: false,
        }
    }

    /// Settings for a run driven by an address configuration file
    pub fn from_addresses(
        config: &AddressConfig,
        num_blocks: u64,
        block_interval: Duration,
        enable_transactions: bool,
    ) -> Self {
        Self {
            num_blocks,
            block_interval,
            mining_address: Some(config.mining_address.clone()),
            recipients: config.recipient_addresses.clone(),
            enable_transactions: config.transactions_allowed(enable_transactions),
        }
    }

    pub fn with_mining_address(mut self, address: impl Into<String>) -> Self {
        self.mining_address = Some(address.into());
        self
    }

    pub fn with_payments(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self.enable_transactions = true;
        self
    }

    /// Payments are injected only when requested and someone can receive them
    pub fn transactions_enabled(&self) -> bool {
        self.enable_transactions && !self.recipients.is_empty()
    }

    pub fn validate(&self) -> MinerResult<()> {
        if self.num_blocks == 0 {
            return Err(MinerError::InvalidSettings(
                "num_blocks must be at least 1".to_string(),
            ));
        }
        if matches!(self.mining_address.as_deref(), Some(address) if address.trim().is_empty())
        {
            return Err(MinerError::InvalidSettings(
                "mining address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// What one successful cycle observed
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    /// Target height of the cycle (`start_height + i + 1`)
    pub block_index: u64,
    pub block_hash: String,
    /// Local time at which the cycle began
    pub started_at: DateTime<Local>,
    /// Production time, retries and backoff included
    pub mine_duration: Duration,
    /// Reported difficulty, `0.0` when the block could not be inspected
    pub difficulty: f64,
    /// Remainder of the interval after production and payments
    pub wait_duration: Duration,
    /// Payments the node accepted
    pub transactions_accepted: usize,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every cycle was attempted
    Completed(RunSummary),
    /// The shutdown signal fired first
    Interrupted { cycles_started: u64 },
}

/// Drives a node at a fixed block cadence
pub struct PacedMiningController {
    client: Arc<dyn LedgerClient>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn ProgressReporter>,
    retry: RetryPolicy,
    rng: StdRng,
    cycles_started: Arc<AtomicU64>,
}

impl PacedMiningController {
    /// Creates a controller on real time with an entropy-seeded random source
    pub fn new(client: Arc<dyn LedgerClient>, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            client,
            clock: Arc::new(TokioClock),
            reporter,
            retry: RetryPolicy::default(),
            rng: StdRng::from_entropy(),
            cycles_started: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Makes payment batches reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cycles begun by the current or last run
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::SeqCst)
    }

    /// Runs every cycle, stopping early if `shutdown` completes first.
    ///
    /// The run is dropped at whatever await point it reached; no further
    /// remote call is made after `shutdown` fires.
    pub async fn run_until<S>(
        &mut self,
        settings: &MiningSettings,
        shutdown: S,
    ) -> MinerResult<RunOutcome>
    where
        S: Future<Output = ()>,
    {
        let cycles_started = Arc::clone(&self.cycles_started);
        tokio::select! {
            biased;
            _ = shutdown => {
                let cycles_started = cycles_started.load(Ordering::SeqCst);
                info!("Run interrupted after {} started cycles", cycles_started);
                Ok(RunOutcome::Interrupted { cycles_started })
            }
            result = self.run(settings) => result.map(RunOutcome::Completed),
        }
    }

    /// Runs `settings.num_blocks` cycles and summarizes them
    pub async fn run(&mut self, settings: &MiningSettings) -> MinerResult<RunSummary> {
        settings.validate()?;
        self.cycles_started.store(0, Ordering::SeqCst);

        let start_height = self
            .client
            .current_height()
            .await
            .map_err(|source| MinerError::Rpc {
                context: "query the start height",
                source,
            })?;

        let payments = settings.transactions_enabled();
        info!(
            "Mining {} blocks from height {} every {:?} (payments: {})",
            settings.num_blocks, start_height, settings.block_interval, payments
        );
        self.reporter.report(&MiningEvent::RunStarted {
            start_height,
            num_blocks: settings.num_blocks,
            block_interval: settings.block_interval,
            mining_address: settings.mining_address.clone(),
            payment_recipients: payments.then_some(settings.recipients.len()),
        });

        let run_start = self.clock.now();
        let mut buckets = TimingBuckets::new(BLOCK_HEIGHT_THRESHOLD);
        let mut skipped = 0;

        for i in 0..settings.num_blocks {
            self.cycles_started.store(i + 1, Ordering::SeqCst);
            let block_index = start_height + i + 1;

            let Some(cycle) = self.run_cycle(settings, block_index).await else {
                skipped += 1;
                continue;
            };

            buckets.record(block_index, cycle.mine_duration);
            let wait = cycle.wait_duration;
            self.reporter.report(&MiningEvent::CycleCompleted(cycle));

            if i + 1 < settings.num_blocks {
                self.clock.sleep(wait).await;
            }
        }

        let total_elapsed = self.clock.now().saturating_duration_since(run_start);
        let final_height = self
            .client
            .current_height()
            .await
            .map_err(|source| MinerError::Rpc {
                context: "query the final height",
                source,
            })?;

        let summary = RunSummary {
            start_height,
            final_height,
            cycles: settings.num_blocks,
            skipped,
            total_elapsed,
            buckets,
        };
        info!(
            "Run finished: {} produced, {} skipped, final height {}",
            summary.produced(),
            summary.skipped,
            final_height
        );
        self.reporter.report(&MiningEvent::RunFinished(summary.clone()));
        Ok(summary)
    }

    /// One cycle; `None` when block production gave up
    async fn run_cycle(&mut self, settings: &MiningSettings, block_index: u64) -> Option<CycleResult> {
        let iteration_start = self.clock.now();
        let started_at = self.clock.local_time();

        let block_hash = self.produce_block(settings, block_index).await?;
        let mine_duration = self.clock.now().saturating_duration_since(iteration_start);

        let difficulty = match self.client.inspect_block(&block_hash).await {
            Ok(info) => info.difficulty,
            Err(error) => {
                debug!("Could not inspect block {}: {}", block_index, error);
                self.reporter
                    .report(&MiningEvent::DifficultyUnavailable { block_index, error });
                0.0
            }
        };

        let transactions_accepted = if settings.transactions_enabled() {
            self.inject_payments(&settings.recipients).await
        } else {
            0
        };

        let elapsed = self.clock.now().saturating_duration_since(iteration_start);
        let wait_duration = settings.block_interval.saturating_sub(elapsed);
        debug!(
            "Block {} ({}) mined in {:?}, waiting {:?}",
            block_index, block_hash, mine_duration, wait_duration
        );

        Some(CycleResult {
            block_index,
            block_hash,
            started_at,
            mine_duration,
            difficulty,
            wait_duration,
            transactions_accepted,
        })
    }

    async fn produce_block(&self, settings: &MiningSettings, block_index: u64) -> Option<String> {
        let client = self.client.as_ref();
        let reporter = self.reporter.as_ref();
        let target = settings.mining_address.as_deref();
        let max_attempts = self.retry.max_attempts.max(1);

        let produced = self
            .retry
            .execute(
                self.clock.as_ref(),
                move || async move {
                    let hashes = client.produce_blocks(1, target).await?;
                    hashes.into_iter().next().ok_or_else(|| {
                        let method = if target.is_some() {
                            "generatetoaddress"
                        } else {
                            "generate"
                        };
                        RpcError::invalid_response(method, "no block hash returned")
                    })
                },
                |attempt, error| {
                    debug!(
                        "Block {} attempt {}/{} failed: {}",
                        block_index, attempt, max_attempts, error
                    );
                    reporter.report(&MiningEvent::ProduceRetry {
                        block_index,
                        attempt,
                        max_attempts,
                        error: error.clone(),
                    });
                },
            )
            .await;

        match produced {
            Ok(hash) => Some(hash),
            Err(exhausted) => {
                debug!("Skipping block {}: {}", block_index, exhausted);
                reporter.report(&MiningEvent::BlockSkipped {
                    block_index,
                    attempts: exhausted.attempts,
                });
                None
            }
        }
    }

    /// Submits one random batch, returning how many payments were accepted
    async fn inject_payments(&mut self, recipients: &[String]) -> usize {
        let batch = plan_batch(&mut self.rng, recipients);
        let batch_size = batch.len();
        let mut accepted = 0;

        for (i, slot) in batch.into_iter().enumerate() {
            let event = match self.client.submit_payment(&slot.recipient, slot.amount).await {
                Ok(txid) => {
                    accepted += 1;
                    MiningEvent::PaymentSent {
                        slot: i + 1,
                        batch_size,
                        amount: slot.amount,
                        recipient: slot.recipient,
                        txid,
                    }
                }
                Err(error) => {
                    debug!("Payment {}/{} failed: {}", i + 1, batch_size, error);
                    MiningEvent::PaymentFailed {
                        slot: i + 1,
                        batch_size,
                        amount: slot.amount,
                        recipient: slot.recipient,
                        error,
                    }
                }
            };
            self.reporter.report(&event);
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_blocks_is_rejected() {
        let err = MiningSettings::new(0, Duration::from_secs(30))
            .validate()
            .unwrap_err();
        assert!(matches!(err, MinerError::InvalidSettings(_)));
    }

    #[test]
    fn blank_mining_address_is_rejected() {
        let settings = MiningSettings::new(1, Duration::ZERO).with_mining_address("  ");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn payments_need_recipients() {
        let settings = MiningSettings::new(1, Duration::ZERO).with_payments(Vec::new());
        assert!(settings.enable_transactions);
        assert!(!settings.transactions_enabled());

        let settings =
            MiningSettings::new(1, Duration::ZERO).with_payments(vec!["WHPbob".to_string()]);
        assert!(settings.transactions_enabled());
    }

    #[test]
    fn settings_from_address_config() {
        let config = AddressConfig::new("WHPminer", Vec::new()).unwrap();
        let settings = MiningSettings::from_addresses(&config, 10, Duration::from_secs(30), true);
        assert_eq!(settings.mining_address.as_deref(), Some("WHPminer"));
        assert!(!settings.enable_transactions);
        assert!(settings.validate().is_ok());
    }
}
