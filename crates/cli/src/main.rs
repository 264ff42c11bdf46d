use anyhow::Result;
use clap::Parser;
use pacer_cli::{app, args::CliArgs, VERSION};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose.into());
    debug!(target: "mine_pacer", "mine-blocks {}", VERSION);

    app::run(args).await
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
