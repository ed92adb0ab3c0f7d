use clap::{Parser, Subcommand};
use eyre::{Error, Result};
use log::{error, info};
use pingpong::config::Config;
use pingpong::diagnostics::run_check;
use pingpong::transfer::session::{Session, SessionReport};
use pingpong::transfer::types::Role;
use pingpong::utils::app_context::AppContext;
use pingpong::utils::logger::setup_logger;
use pingpong::utils::units::{display_amount, display_gwei};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Move all funds from wallet B back to wallet A without checking balances
    #[arg(short, long)]
    recover: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single transfer from wallet A to wallet B
    Transfer,
    /// Check environment variables and the RPC connection
    Check,
}

/// Loads the configuration and builds a ledger signing for `senders`
fn init(senders: &[Role]) -> Result<AppContext, Error> {
    let config = Config::from_env()?;
    AppContext::new(config, senders).inspect_err(|e| error!("Initialization failed: {e}"))
}

fn log_banner(title: &str, config: &Config) {
    let network = &config.network;
    let settings = &config.transfer;
    info!("{title}");
    info!("Network: {} (chain {})", network.name, network.chain_id);
    info!("RPC URL: {}", network.rpc_url);
    info!("Wallet A: {}", config.wallet_a.address);
    info!("Wallet B: {}", config.wallet_b.address);
    info!("Currency: {}", network.currency);
    info!("Max Cycles: {}", settings.max_cycles);
    info!(
        "Min Remaining: {}",
        display_amount(settings.min_remaining_amount, &network.currency)
    );
    info!("Reference Gas Price: {}", display_gwei(settings.reference_gas_price));
    info!("Max Retries: {}", settings.max_retries);
    info!("Retry Delay: {}ms", settings.retry_delay.as_millis());
}

async fn run_ping_pong(force_recovery: bool) -> Result<SessionReport, Error> {
    let ctx = init(&[Role::A, Role::B])?;
    log_banner("Ping-Pong Transfer", &ctx.config);
    Session::new(ctx.ledger.as_ref(), &ctx.config)
        .ping_pong(force_recovery)
        .await
}

async fn run_single_transfer() -> Result<SessionReport, Error> {
    let ctx = init(&[Role::A])?;
    log_banner("Single Transfer", &ctx.config);
    Session::new(ctx.ledger.as_ref(), &ctx.config)
        .single_transfer()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    setup_logger()?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Transfer) => {
            run_single_transfer().await?;
        }
        Some(Commands::Check) => {
            run_check().await?;
        }
        None => {
            run_ping_pong(cli.recover).await?;
        }
    }

    Ok(())
}
