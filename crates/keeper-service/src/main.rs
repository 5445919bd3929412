use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keeper_config::ConfigLoader;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod service;

#[derive(Parser)]
#[command(name = "keeper-service")]
#[command(about = "AMM limit-order keeper", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Optional TOML config file; environment variables win over it
	#[arg(short, long, value_name = "FILE", env = "KEEPER_CONFIG")]
	config: Option<PathBuf>,

	#[arg(long, env = "KEEPER_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the keeper service
	Start,
	/// Validate the configuration and exit
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("starting AMM limit-order keeper");

	let config = ConfigLoader::from_env_and_file(cli.config.as_deref())
		.context("failed to load configuration")?;

	// a broken executor configuration degrades to API-only; the status API
	// then reports running = false
	let keeper = match service::build(&config) {
		Ok(keeper) => keeper,
		Err(e) => {
			error!(error = ?e, "executor unavailable; running status API only");
			service::KeeperService::idle()
		}
	};

	let (shutdown_tx, _) = broadcast::channel::<()>(16);

	if let Some(executor) = keeper.executor.clone() {
		let shutdown = shutdown_tx.clone();
		tokio::spawn(async move { executor.run(shutdown).await });
	} else {
		info!("executor disabled");
	}

	let api_handle = {
		let keeper = keeper.clone();
		let port = config.api.port;
		tokio::spawn(async move { api::serve(keeper, port).await })
	};

	shutdown_signal().await;
	info!("shutdown signal received, stopping");

	// let an in-flight submission finish; the sweep stops between orders
	let _ = shutdown_tx.send(());
	tokio::time::sleep(std::time::Duration::from_millis(200)).await;

	api_handle.abort();
	info!("keeper stopped");
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	let config = ConfigLoader::from_env_and_file(cli.config.as_deref())
		.context("failed to load configuration")?;
	ConfigLoader::validate(&config).context("configuration invalid")?;

	info!("configuration is valid");
	info!("gateway: {}", config.chain.rpc_url);
	info!(
		"contract: {}",
		config.contract.address.as_deref().unwrap_or("<unset>")
	);
	info!("executor enabled: {}", config.executor.enabled);
	for token in &config.tokens {
		info!("  token {} with {} decimals", token.id, token.decimals);
	}
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
