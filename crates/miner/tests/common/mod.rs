//! Shared fixtures for controller tests: a scripted ledger node that runs on
//! simulated time and a reporter that keeps every event.

#![allow(dead_code)]

use async_trait::async_trait;
use pacer_miner::{ManualClock, MiningEvent, ProgressReporter};
use pacer_rpc_client::{BlockInfo, LedgerClient, RpcError, RpcResult};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one block production call
#[derive(Debug, Clone)]
pub enum ProduceStep {
    /// Produce the block after the configured mine time
    Ok,
    /// Fail immediately
    Fail(RpcError),
    /// Answer successfully but with no block hash
    Empty,
    /// Never answer
    Hang,
}

/// A remote call the controller made
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    Height,
    Produce { target: Option<String> },
    Inspect { hash: String },
    Payment { recipient: String, amount: u64 },
}

pub fn transport_error(message: &str) -> RpcError {
    RpcError::Transport(message.to_string())
}

pub fn block_hash(height: u64) -> String {
    format!("{height:064x}")
}

pub struct ScriptedLedger {
    clock: Arc<ManualClock>,
    mine_time: Duration,
    height: Mutex<u64>,
    produce_script: Mutex<VecDeque<ProduceStep>>,
    difficulty: Option<f64>,
    height_unavailable: bool,
    failing_payments: HashSet<usize>,
    payments_seen: Mutex<usize>,
    calls: Mutex<Vec<LedgerCall>>,
}

impl ScriptedLedger {
    pub fn new(clock: Arc<ManualClock>, start_height: u64) -> Self {
        Self {
            clock,
            mine_time: Duration::from_secs(1),
            height: Mutex::new(start_height),
            produce_script: Mutex::new(VecDeque::new()),
            difficulty: Some(0.25),
            height_unavailable: false,
            failing_payments: HashSet::new(),
            payments_seen: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mine_time(mut self, mine_time: Duration) -> Self {
        self.mine_time = mine_time;
        self
    }

    /// Production steps consumed in order; calls past the end succeed
    pub fn with_script(self, steps: impl IntoIterator<Item = ProduceStep>) -> Self {
        self.produce_script.lock().extend(steps);
        self
    }

    /// Block inspection fails when `None`
    pub fn with_difficulty(mut self, difficulty: Option<f64>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn without_height(mut self) -> Self {
        self.height_unavailable = true;
        self
    }

    /// Payment calls (1-based, counted over the whole run) that are rejected
    pub fn failing_payments(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_payments = calls.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().clone()
    }

    pub fn height(&self) -> u64 {
        *self.height.lock()
    }

    fn record(&self, call: LedgerCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn current_height(&self) -> RpcResult<u64> {
        self.record(LedgerCall::Height);
        if self.height_unavailable {
            return Err(transport_error("connection refused"));
        }
        Ok(self.height())
    }

    async fn produce_blocks(&self, count: u32, target: Option<&str>) -> RpcResult<Vec<String>> {
        self.record(LedgerCall::Produce {
            target: target.map(str::to_string),
        });
        let step = self.produce_script.lock().pop_front().unwrap_or(ProduceStep::Ok);
        match step {
            ProduceStep::Ok => {
                self.clock.advance(self.mine_time);
                let mut height = self.height.lock();
                let mut hashes = Vec::new();
                for _ in 0..count {
                    *height += 1;
                    hashes.push(block_hash(*height));
                }
                Ok(hashes)
            }
            ProduceStep::Fail(err) => Err(err),
            ProduceStep::Empty => Ok(Vec::new()),
            ProduceStep::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }

    async fn inspect_block(&self, hash: &str) -> RpcResult<BlockInfo> {
        self.record(LedgerCall::Inspect {
            hash: hash.to_string(),
        });
        match self.difficulty {
            Some(difficulty) => Ok(BlockInfo {
                hash: hash.to_string(),
                difficulty,
                height: None,
                confirmations: Some(1),
                time: None,
                tx: Vec::new(),
            }),
            None => Err(RpcError::Server {
                code: -5,
                message: "Block not found".to_string(),
            }),
        }
    }

    async fn submit_payment(&self, recipient: &str, amount: u64) -> RpcResult<String> {
        self.record(LedgerCall::Payment {
            recipient: recipient.to_string(),
            amount,
        });
        let n = {
            let mut seen = self.payments_seen.lock();
            *seen += 1;
            *seen
        };
        if self.failing_payments.contains(&n) {
            return Err(RpcError::Server {
                code: -6,
                message: "Insufficient funds".to_string(),
            });
        }
        Ok(format!("{n:064x}"))
    }
}

/// Keeps every reported event in order
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<MiningEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<MiningEvent> {
        self.events.lock().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: &MiningEvent) {
        self.events.lock().push(event.clone());
    }
}
