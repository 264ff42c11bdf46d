//! Pacer Miner Library
//!
//! This crate implements the paced block production loop: one block per
//! fixed interval, bounded retry on production failures, optional random
//! payment batches, and timing statistics split at a height threshold.
//! Everything remote goes through [`pacer_rpc_client::LedgerClient`], all
//! waiting through [`Clock`] and all output through [`ProgressReporter`].

mod batch;
mod clock;
mod controller;
mod error;
pub mod report;
mod retry;
mod timing;

pub use batch::{plan_batch, PaymentSlot};
pub use clock::{Clock, ManualClock, TokioClock};
pub use controller::{CycleResult, MiningSettings, PacedMiningController, RunOutcome};
pub use error::{MinerError, MinerResult, RetryExhausted};
pub use report::{ConsoleReporter, MiningEvent, NullReporter, ProgressReporter};
pub use retry::RetryPolicy;
pub use timing::{RunSummary, TimingBuckets};
