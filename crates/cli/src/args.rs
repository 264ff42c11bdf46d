use clap::{Parser, ValueEnum};
use pacer_config::{
    NetworkMode, DEFAULT_BLOCK_INTERVAL_SECS, DEFAULT_CLI_BIN, DEFAULT_DAEMON_BIN,
    DEFAULT_NUM_BLOCKS, DEFAULT_RPC_URL,
};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const AFTER_HELP: &str = r#"Example configuration file (addresses.json):
  {
    "mining_address": "YOUR_MINING_ADDRESS",
    "recipient_addresses": [
      "ADDRESS1",
      "ADDRESS2",
      "ADDRESS3"
    ]
  }

Examples:
  # Mine 100 blocks every 30 seconds
  mine-blocks -n 100 -c addresses.json

  # Mine with transactions enabled every 60 seconds
  mine-blocks -n 50 -c addresses.json --enable-transactions --interval 60

  # Start a regtest daemon, mine 10 blocks, stop it again
  mine-blocks -n 10 -c addresses.json --regtest --datadir /tmp/regtest"#;

/// Command-line arguments for mine-blocks
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mine-blocks",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mine blocks at a steady pace with optional transactions",
    long_about = "Produces blocks on a node through its JSON-RPC interface at a fixed interval, optionally submitting a random batch of payments after each block, and reports per-block timing and difficulty.",
    after_help = AFTER_HELP
)]
pub struct CliArgs {
    /// Number of blocks to mine
    #[arg(
        short = 'n',
        long = "num-blocks",
        value_name = "N",
        default_value_t = DEFAULT_NUM_BLOCKS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub num_blocks: u64,

    /// JSON configuration file with addresses
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Generate 3-5 transactions per block
    #[arg(long = "enable-transactions")]
    pub enable_transactions: bool,

    /// Seconds between blocks
    #[arg(long = "interval", value_name = "SECONDS", default_value_t = DEFAULT_BLOCK_INTERVAL_SECS)]
    pub interval: u64,

    /// RPC endpoint, credentials in the userinfo part
    #[arg(long = "rpc-url", value_name = "URL", env = "MINE_PACER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Data directory; the daemon is started before mining and stopped after
    #[arg(long = "datadir", value_name = "DIR")]
    pub datadir: Option<PathBuf>,

    /// Use regtest mode
    #[arg(long = "regtest")]
    pub regtest: bool,

    /// Daemon executable used with --datadir
    #[arg(long = "daemon-bin", value_name = "PATH", default_value = DEFAULT_DAEMON_BIN)]
    pub daemon_bin: PathBuf,

    /// Control executable used to stop the daemon
    #[arg(long = "cli-bin", value_name = "PATH", default_value = DEFAULT_CLI_BIN)]
    pub cli_bin: PathBuf,

    /// Seed for the transaction randomizer
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// The verbose log level
    #[arg(long = "verbose", value_enum, default_value = "info")]
    pub verbose: LogLevel,
}

/// Log level enumeration
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace level logging
    Trace,
    /// Debug level logging
    Debug,
    /// Info level logging
    Info,
    /// Warning level logging
    Warn,
    /// Error level logging
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl CliArgs {
    pub fn network_mode(&self) -> NetworkMode {
        if self.regtest {
            NetworkMode::Regtest
        } else {
            NetworkMode::Mainnet
        }
    }

    pub fn block_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Get the endpoint to talk to.
    ///
    /// In regtest mode the untouched default URL is moved to the regtest
    /// port; an explicitly given URL is always used as is.
    pub fn effective_rpc_url(&self) -> String {
        let mode = self.network_mode();
        if mode == NetworkMode::Mainnet || self.rpc_url != DEFAULT_RPC_URL {
            return self.rpc_url.clone();
        }

        match Url::parse(&self.rpc_url) {
            Ok(mut url) => {
                if url.set_port(Some(mode.default_rpc_port())).is_ok() {
                    url.to_string().trim_end_matches('/').to_string()
                } else {
                    self.rpc_url.clone()
                }
            }
            Err(_) => self.rpc_url.clone(),
        }
    }
}
