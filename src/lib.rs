//! # mine-pacer: paced block production for ledger nodes
//!
//! Drives a node's JSON-RPC interface to produce blocks at a fixed interval,
//! optionally submitting a random batch of wallet payments after each block,
//! and reports how long every block took to mine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mine_pacer::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AddressConfig::load("addresses.json")?;
//!     let settings = MiningSettings::from_addresses(&config, 10, Duration::from_secs(30), true);
//!
//!     let mut controller = mine_pacer::connect(DEFAULT_RPC_URL, ConsoleReporter::stdout())?;
//!     let summary = controller.run(&settings).await?;
//!     println!("final height {}", summary.final_height);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - constants, network modes and the address file
//! - [`rpc_client`] - the [`LedgerClient`](rpc_client::LedgerClient) seam and its JSON-RPC client
//! - [`miner`] - the pacing controller, retry policy, payment batches and statistics

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::sync::Arc;

pub use pacer_config as config;
pub use pacer_miner as miner;
pub use pacer_rpc_client as rpc_client;

/// Common imports for driving a node
pub mod prelude {
    pub use crate::config::{AddressConfig, NetworkMode, DEFAULT_RPC_URL};
    pub use crate::miner::{
        ConsoleReporter, MiningEvent, MiningSettings, PacedMiningController, ProgressReporter,
        RetryPolicy, RunOutcome, RunSummary,
    };
    pub use crate::rpc_client::{LedgerClient, RpcClient, RpcError};
}

/// Builds a controller talking to the node at `rpc_url`
pub fn connect<R>(rpc_url: &str, reporter: R) -> rpc_client::RpcResult<miner::PacedMiningController>
where
    R: miner::ProgressReporter + 'static,
{
    let client = rpc_client::RpcClient::new(rpc_url)?;
    Ok(miner::PacedMiningController::new(
        Arc::new(client),
        Arc::new(reporter),
    ))
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
