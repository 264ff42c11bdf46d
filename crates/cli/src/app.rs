//! mine-blocks application flow
//!
//! Load addresses, optionally start the daemon, run the paced controller
//! until it finishes or Ctrl-C arrives, then stop the daemon again.

use crate::args::CliArgs;
use crate::daemon::{DaemonHandle, DaemonLifecycle, ProcessDaemon};
use anyhow::{Context, Result};
use pacer_config::AddressConfig;
use pacer_miner::{ConsoleReporter, MiningSettings, PacedMiningController, RunOutcome};
use pacer_rpc_client::{parse_endpoint, RpcClient};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the tool with the real daemon executables and Ctrl-C as shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let mut daemon = ProcessDaemon::new(&args.daemon_bin, &args.cli_bin);
    if let Ok((_, Some(credentials))) = parse_endpoint(&args.effective_rpc_url()) {
        daemon = daemon.with_credentials(credentials);
    }
    run_with(&args, &daemon, shutdown_signal()).await
}

/// Runs the tool against the given daemon lifecycle.
///
/// Whatever happens after the daemon was started, it is asked to stop
/// before this returns.
pub async fn run_with<S>(args: &CliArgs, daemon: &dyn DaemonLifecycle, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    let config = load_addresses(args)?;
    let settings = MiningSettings::from_addresses(
        &config,
        args.num_blocks,
        args.block_interval(),
        args.enable_transactions,
    );
    if args.enable_transactions && !settings.transactions_enabled() {
        println!("Warning: --enable-transactions specified but no recipient_addresses in config");
        println!("         Transactions will be disabled");
    }

    let rpc_url = args.effective_rpc_url();
    let client = RpcClient::new(&rpc_url).context("Failed to create RPC client")?;
    info!(target: "mine_pacer", "Using RPC endpoint {}", client.endpoint());

    let handle = match &args.datadir {
        Some(data_dir) => {
            println!("Starting {} with datadir: {}", daemon_name(args), data_dir.display());
            let handle = daemon
                .start(data_dir, args.network_mode())
                .await
                .context("Failed to start daemon")?;
            Some(handle)
        }
        None => None,
    };

    let mut controller =
        PacedMiningController::new(Arc::new(client), Arc::new(ConsoleReporter::stdout()));
    if let Some(seed) = args.seed {
        controller = controller.with_seed(seed);
    }

    let result = match controller.run_until(&settings, shutdown).await {
        Ok(RunOutcome::Completed(_)) => Ok(()),
        Ok(RunOutcome::Interrupted { .. }) => {
            println!("\n\nInterrupted by user");
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context("Mining run failed")),
    };

    if let Some(handle) = handle {
        stop_daemon(daemon, &handle).await;
    }

    result
}

fn load_addresses(args: &CliArgs) -> Result<AddressConfig> {
    let config = AddressConfig::load(&args.config).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.config.display()
        )
    })?;

    println!("Loaded configuration from {}", args.config.display());
    println!("  Mining address: {}", config.mining_address);
    println!("  Recipient addresses: {}", config.recipient_count());
    Ok(config)
}

async fn stop_daemon(daemon: &dyn DaemonLifecycle, handle: &DaemonHandle) {
    println!("\nStopping daemon...");
    if let Err(err) = daemon.stop(handle).await {
        warn!(target: "mine_pacer", "Failed to stop daemon: {}", err);
    }
}

fn daemon_name(args: &CliArgs) -> String {
    args.daemon_bin
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.daemon_bin.display().to_string())
}

/// Completes on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "mine_pacer", "Cannot listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::{DaemonError, MockDaemonLifecycle};
    use clap::Parser;
    use mockito::{Matcher, Server, ServerGuard};
    use pacer_config::NetworkMode;
    use serde_json::json;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    fn address_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn args(config: &Path, extra: &[&str]) -> CliArgs {
        let mut argv = vec![
            "mine-blocks".to_string(),
            "-c".to_string(),
            config.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        CliArgs::parse_from(argv)
    }

    async fn node() -> ServerGuard {
        let mut server = Server::new_async().await;
        for (method, result) in [
            ("getblockcount", json!(7)),
            ("generatetoaddress", json!(["00ab"])),
            ("getblock", json!({"hash": "00ab", "difficulty": 1.5})),
        ] {
            server
                .mock("POST", "/")
                .match_body(Matcher::PartialJson(json!({ "method": method })))
                .with_body(json!({"result": result, "error": null, "id": 1}).to_string())
                .create_async()
                .await;
        }
        server
    }

    fn url(server: &ServerGuard) -> String {
        format!("http://rpcuser:rpcpass@{}", server.host_with_port())
    }

    #[tokio::test]
    async fn missing_config_starts_nothing() {
        let daemon = MockDaemonLifecycle::new();
        let args = args(Path::new("/nonexistent/addresses.json"), &["--datadir", "/tmp/x"]);

        let err = run_with(&args, &daemon, std::future::pending())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[tokio::test]
    async fn daemon_is_started_and_stopped_around_run() {
        let server = node().await;
        let file = address_file(r#"{"mining_address": "WHPminer"}"#);
        let args = args(
            file.path(),
            &[
                "-n",
                "1",
                "--interval",
                "0",
                "--regtest",
                "--datadir",
                "/tmp/regtest",
                "--rpc-url",
                &url(&server),
            ],
        );

        let mut daemon = MockDaemonLifecycle::new();
        daemon
            .expect_start()
            .withf(|dir, mode| dir == Path::new("/tmp/regtest") && *mode == NetworkMode::Regtest)
            .times(1)
            .returning(|dir, mode| {
                Ok(DaemonHandle {
                    data_dir: dir.to_path_buf(),
                    mode,
                })
            });
        daemon
            .expect_stop()
            .withf(|handle| handle.data_dir == PathBuf::from("/tmp/regtest"))
            .times(1)
            .returning(|_| Ok(()));

        run_with(&args, &daemon, std::future::pending()).await.unwrap();
    }

    #[tokio::test]
    async fn daemon_is_stopped_after_failed_run() {
        let file = address_file(r#"{"mining_address": "WHPminer"}"#);
        let args = args(
            file.path(),
            &["--datadir", "/tmp/d", "--rpc-url", "http://u:p@127.0.0.1:1"],
        );

        let mut daemon = MockDaemonLifecycle::new();
        daemon.expect_start().times(1).returning(|dir, mode| {
            Ok(DaemonHandle {
                data_dir: dir.to_path_buf(),
                mode,
            })
        });
        daemon
            .expect_stop()
            .withf(|handle| handle.mode == NetworkMode::Mainnet)
            .times(1)
            .returning(|_| {
                Err(DaemonError::Spawn {
                    program: PathBuf::from("whippet-cli"),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                })
            });

        let err = run_with(&args, &daemon, std::future::pending())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("start height"));
    }

    #[tokio::test]
    async fn failed_daemon_start_is_fatal() {
        let file = address_file(r#"{"mining_address": "WHPminer"}"#);
        let args = args(file.path(), &["--datadir", "/tmp/d"]);

        let mut daemon = MockDaemonLifecycle::new();
        daemon.expect_start().times(1).returning(|_, _| {
            Err(DaemonError::Spawn {
                program: PathBuf::from("./src/whippetd"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        });
        daemon.expect_stop().never();

        let err = run_with(&args, &daemon, std::future::pending())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to start daemon"));
    }

    #[tokio::test]
    async fn interrupt_still_stops_daemon() {
        let file = address_file(r#"{"mining_address": "WHPminer"}"#);
        let args = args(
            file.path(),
            &["--datadir", "/tmp/d", "--rpc-url", "http://u:p@127.0.0.1:1"],
        );

        let mut daemon = MockDaemonLifecycle::new();
        daemon.expect_start().times(1).returning(|dir, mode| {
            Ok(DaemonHandle {
                data_dir: dir.to_path_buf(),
                mode,
            })
        });
        daemon.expect_stop().times(1).returning(|_| Ok(()));

        run_with(&args, &daemon, std::future::ready(())).await.unwrap();
    }

    #[tokio::test]
    async fn runs_without_daemon() {
        let server = node().await;
        let file = address_file(r#"{"mining_address": "WHPminer", "recipient_addresses": []}"#);
        let args = args(
            file.path(),
            &[
                "-n",
                "2",
                "--interval",
                "0",
                "--enable-transactions",
                "--rpc-url",
                &url(&server),
            ],
        );

        let daemon = MockDaemonLifecycle::new();
        run_with(&args, &daemon, std::future::pending()).await.unwrap();
    }
}
