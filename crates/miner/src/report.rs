//! Progress reporting
//!
//! The controller describes what happens as [`MiningEvent`]s; a
//! [`ProgressReporter`] decides how to show them. [`ConsoleReporter`] renders
//! the human-readable table the tool prints.

use crate::controller::CycleResult;
use crate::timing::RunSummary;
use pacer_rpc_client::RpcError;
use parking_lot::Mutex;
use std::io::{self, Stdout, Write};
use std::time::Duration;

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum MiningEvent {
    /// The start height is known and the first cycle is about to begin
    RunStarted {
        start_height: u64,
        num_blocks: u64,
        block_interval: Duration,
        mining_address: Option<String>,
        /// Recipient pool size when payments are injected
        payment_recipients: Option<usize>,
    },
    /// A block production attempt failed
    ProduceRetry {
        block_index: u64,
        attempt: u32,
        max_attempts: u32,
        error: RpcError,
    },
    /// Every production attempt failed; the cycle is skipped
    BlockSkipped { block_index: u64, attempts: u32 },
    /// The produced block could not be inspected
    DifficultyUnavailable { block_index: u64, error: RpcError },
    /// A payment was accepted by the node
    PaymentSent {
        slot: usize,
        batch_size: usize,
        amount: u64,
        recipient: String,
        txid: String,
    },
    /// A payment was rejected or could not be sent
    PaymentFailed {
        slot: usize,
        batch_size: usize,
        amount: u64,
        recipient: String,
        error: RpcError,
    },
    /// A cycle produced its block and computed its wait
    CycleCompleted(CycleResult),
    /// Every cycle was attempted
    RunFinished(RunSummary),
}

/// Receives run events in order
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &MiningEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _event: &MiningEvent) {}
}

/// Writes the progress table and summary as text
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleReporter<W> {
    fn report(&self, event: &MiningEvent) {
        let mut out = self.out.lock();
        for line in render_event(event) {
            // Progress output is best effort; a closed stdout must not stop the run.
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}

/// Renders one event as console lines
pub fn render_event(event: &MiningEvent) -> Vec<String> {
    match event {
        MiningEvent::RunStarted {
            start_height,
            num_blocks,
            block_interval,
            mining_address,
            payment_recipients,
        } => {
            let mut lines = vec![
                format!("Starting at block height: {start_height}"),
                format!(
                    "Mining {num_blocks} blocks at {}s intervals...",
                    block_interval.as_secs()
                ),
            ];
            if let Some(address) = mining_address {
                lines.push(format!("Mining to address: {address}"));
            }
            if let Some(count) = payment_recipients {
                lines.push(format!(
                    "Transactions enabled: 3-5 txs per block to {count} recipients"
                ));
            }
            lines.push(String::new());
            lines.push(format!(
                "{:<8} {:<20} {:<12} {:<12} {:<15}",
                "Block", "Time", "Mine (s)", "Wait (s)", "Difficulty"
            ));
            lines.push("-".repeat(85));
            lines
        }
        MiningEvent::ProduceRetry {
            attempt,
            max_attempts,
            error,
            ..
        } => vec![format!("  [Retry {attempt}/{max_attempts}] RPC error: {error}")],
        MiningEvent::BlockSkipped {
            block_index,
            attempts,
        } => vec![format!(
            "  [FAILED] Skipping block {block_index} after {attempts} retries"
        )],
        MiningEvent::DifficultyUnavailable { error, .. } => {
            vec![format!("  [Warning] Could not get block info: {error}")]
        }
        MiningEvent::PaymentSent {
            slot,
            batch_size,
            amount,
            recipient,
            txid,
        } => vec![format!(
            "  [TX {slot}/{batch_size}] {} COIN → {}... (txid: {}...)",
            group_thousands(*amount),
            prefix(recipient, 10),
            prefix(txid, 16)
        )],
        MiningEvent::PaymentFailed {
            slot,
            batch_size,
            error,
            ..
        } => vec![format!("  [TX {slot}/{batch_size}] Failed: {error}")],
        MiningEvent::CycleCompleted(cycle) => vec![progress_line(cycle)],
        MiningEvent::RunFinished(summary) => summary_lines(summary),
    }
}

/// The table row of a completed cycle
pub fn progress_line(cycle: &CycleResult) -> String {
    format!(
        "{:<8} {:<20} {:<12.3} {:<12.1} {:<15.6}",
        cycle.block_index,
        cycle.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        cycle.mine_duration.as_secs_f64(),
        cycle.wait_duration.as_secs_f64(),
        cycle.difficulty
    )
}

/// The closing summary block
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let threshold = summary.buckets.threshold();
    let mut lines = vec![
        String::new(),
        format!(
            "Total time: {:.2} seconds",
            summary.total_elapsed.as_secs_f64()
        ),
        format!(
            "Average time per block: {:.6} seconds",
            summary.average_cycle_time().as_secs_f64()
        ),
    ];

    if let Some(mean) = summary.mean_mine_duration() {
        lines.push(format!(
            "Average mining time ({} blocks): {:.6} seconds",
            summary.buckets.len(),
            mean.as_secs_f64()
        ));
    }

    if let Some(mean) = summary.buckets.mean_up_to_threshold() {
        lines.push(format!(
            "Average mining time before block {threshold} ({} blocks): {:.6} seconds",
            summary.buckets.up_to_threshold().len(),
            mean.as_secs_f64()
        ));
    }
    if let Some(mean) = summary.buckets.mean_after_threshold() {
        lines.push(format!(
            "Average mining time after block {threshold} ({} blocks): {:.6} seconds",
            summary.buckets.after_threshold().len(),
            mean.as_secs_f64()
        ));
    }
    if summary.skipped > 0 {
        lines.push(format!("Skipped blocks: {}", summary.skipped));
    }
    lines.push(format!("Final block height: {}", summary.final_height));
    lines
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// First `max_chars` characters of `s`
fn prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
