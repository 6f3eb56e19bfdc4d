use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;

mod config;
mod controllers;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod store;

use error::StartupError;

/// HTTP server for the mpr-monitor dashboard and per-controller CSV logs
#[derive(Debug, Parser)]
#[command(name = "mpr-monitor", version, about)]
struct Cli {
    /// Configuration file (TOML); missing file means defaults plus environment
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Load and validate the configuration, print it, then exit
    #[arg(long)]
    check_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<(), StartupError> {
    let cfg = config::Config::load_from(&cli.config)?;

    if cli.check_config {
        print_config(&cfg)?;
        return Ok(());
    }

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let addr = cfg.socket_addr()?;
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_listener(addr)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    server::start_signal_handler(shutdown_tx)?;

    logger::log_server_start(&addr, &cfg);
    server::run(listener, state, shutdown_rx).await;
    Ok(())
}

fn print_config(cfg: &config::Config) -> Result<(), StartupError> {
    let controllers = cfg.controller_set()?;
    println!("listen:      {}", cfg.socket_addr()?);
    println!("html_dir:    {}", cfg.paths.html_dir);
    println!("data_dir:    {}", cfg.paths.data_dir);
    println!(
        "controllers: {} (mpr0_stats.csv .. mpr{}_stats.csv)",
        controllers.count(),
        controllers.count() - 1
    );
    println!(
        "access log:  {} ({})",
        if cfg.logging.access_log { "all requests" } else { "errors only" },
        cfg.logging.access_log_format
    );
    println!(
        "timeouts:    connection {}s, shutdown {}s",
        cfg.performance.connection_timeout, cfg.performance.shutdown_timeout
    );
    Ok(())
}
