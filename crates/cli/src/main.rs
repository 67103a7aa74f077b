use clap::Parser;
use dnstrap_domain::CliOverrides;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "dnstrap")]
#[command(version)]
#[command(about = "dnstrap - DNS interception engine with blocklist filtering")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Virtual interface name
    #[arg(short = 'i', long)]
    interface: Option<String>,

    /// Answer for blocked queries (nxdomain, zero_ip, refused)
    #[arg(long)]
    block_policy: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        interface_name: cli.interface.clone(),
        block_policy: cli.block_policy.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting dnstrap v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();

    let blocklist = di::BlocklistServices::new(&config).await?;
    // Keeps the live-update listener running for the lifetime of the engine.
    let _blocklist_commands = blocklist.commands.clone();
    let interface = server::open_interface(&config.interception)?;
    let engine = di::EngineServices::new(&config, &blocklist, interface)?;

    di::apply_dns_trap(&config).await?;

    server::spawn_stats_reporter(
        engine.engine.stats(),
        engine.cache.clone(),
        shutdown.clone(),
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    let result = engine.engine.clone().run(shutdown.clone()).await;
    shutdown.cancel();

    match result {
        Ok(()) => {
            info!("dnstrap shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Interception loop stopped");
            Err(e.into())
        }
    }
}
