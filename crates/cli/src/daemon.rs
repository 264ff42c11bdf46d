//! Node daemon lifecycle
//!
//! When a data directory is given the tool launches the node itself before
//! mining and asks it to shut down afterwards.

use async_trait::async_trait;
use pacer_config::{NetworkMode, DAEMON_STARTUP_DELAY, DEFAULT_RPC_PASSWORD, DEFAULT_RPC_USER};
use pacer_rpc_client::RpcCredentials;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Failure to run one of the node executables
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}", .program.display())]
    Exit { program: PathBuf, status: ExitStatus },
}

/// A daemon this process started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonHandle {
    pub data_dir: PathBuf,
    pub mode: NetworkMode,
}

/// Starts and stops the node around a run
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DaemonLifecycle: Send + Sync {
    /// Launches the daemon on `data_dir` and waits for it to come up
    async fn start(&self, data_dir: &Path, mode: NetworkMode) -> Result<DaemonHandle, DaemonError>;

    /// Asks the daemon to shut down
    async fn stop(&self, handle: &DaemonHandle) -> Result<(), DaemonError>;
}

/// Runs the node executables as child processes
#[derive(Debug, Clone)]
pub struct ProcessDaemon {
    daemon_bin: PathBuf,
    cli_bin: PathBuf,
    credentials: RpcCredentials,
    startup_delay: Duration,
}

impl ProcessDaemon {
    pub fn new(daemon_bin: impl Into<PathBuf>, cli_bin: impl Into<PathBuf>) -> Self {
        Self {
            daemon_bin: daemon_bin.into(),
            cli_bin: cli_bin.into(),
            credentials: RpcCredentials {
                user: DEFAULT_RPC_USER.to_string(),
                password: DEFAULT_RPC_PASSWORD.to_string(),
            },
            startup_delay: DAEMON_STARTUP_DELAY,
        }
    }

    /// RPC credentials the daemon is started with
    pub fn with_credentials(mut self, credentials: RpcCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Arguments for launching the daemon
    pub fn start_args(&self, data_dir: &Path, mode: NetworkMode) -> Vec<String> {
        let mut args = vec![
            "-daemon".to_string(),
            format!("-datadir={}", data_dir.display()),
            format!("-rpcuser={}", self.credentials.user),
            format!("-rpcpassword={}", self.credentials.password),
        ];
        if let Some(flag) = mode.node_flag() {
            args.push(flag.to_string());
        }
        args
    }

    /// Arguments for the stop request
    pub fn stop_args(&self, handle: &DaemonHandle) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(flag) = handle.mode.node_flag() {
            args.push(flag.to_string());
        }
        args.push(format!("-datadir={}", handle.data_dir.display()));
        args.push("stop".to_string());
        args
    }
}

#[async_trait]
impl DaemonLifecycle for ProcessDaemon {
    async fn start(&self, data_dir: &Path, mode: NetworkMode) -> Result<DaemonHandle, DaemonError> {
        let args = self.start_args(data_dir, mode);
        debug!(program = %self.daemon_bin.display(), ?args, "launching daemon");

        let status = Command::new(&self.daemon_bin)
            .args(&args)
            .status()
            .await
            .map_err(|source| DaemonError::Spawn {
                program: self.daemon_bin.clone(),
                source,
            })?;
        if !status.success() {
            // An already running daemon refuses a second start; mining can
            // still proceed against it.
            warn!(
                "{} exited with {}, continuing",
                self.daemon_bin.display(),
                status
            );
        }

        tokio::time::sleep(self.startup_delay).await;
        Ok(DaemonHandle {
            data_dir: data_dir.to_path_buf(),
            mode,
        })
    }

    async fn stop(&self, handle: &DaemonHandle) -> Result<(), DaemonError> {
        let args = self.stop_args(handle);
        debug!(program = %self.cli_bin.display(), ?args, "stopping daemon");

        let status = Command::new(&self.cli_bin)
            .args(&args)
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| DaemonError::Spawn {
                program: self.cli_bin.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(DaemonError::Exit {
                program: self.cli_bin.clone(),
                status,
            })
        }
    }
}
