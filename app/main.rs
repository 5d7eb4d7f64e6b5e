use clap::Parser;
use time::macros::format_description;
use tokio::signal;
use tracing_subscriber::{self, EnvFilter, fmt::time::LocalTime};

mod cli;
mod config;
mod errors;
mod util;

use crate::{cli::AppCli, config::AppConfig};

#[tokio::main]
async fn main() {
    let cli_args = AppCli::parse();
    let config_path = cli_args
        .config
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());

    let mut app_config = match AppConfig::new(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = app_config.apply(cli_args) {
        eprintln!("invalid configuration: {}", err);
        std::process::exit(1);
    }
    if let Err(err) = app_config.validate() {
        eprintln!("invalid configuration: {}", err);
        std::process::exit(1);
    }

    let _log_guard = init_tracing(&app_config);

    tracing::info!("bluetube streaming backend is starting");

    let running = match bootstrap::initialize(app_config.ingest.clone()).await {
        Ok(running) => running,
        Err(err) => {
            // Serving is this process's sole purpose; a failed bind is fatal.
            tracing::error!("startup failed: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!("all servers are started");
    let _ = signal::ctrl_c().await;

    tracing::info!("shutting down");
    running.shutdown();
}

fn init_tracing(app_config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(app_config.logger.level.clone()));
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    match &app_config.logger.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bluetube_server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_timer(timer)
                .compact()
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(true)
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_timer(timer)
                .compact()
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(true)
                .with_env_filter(filter)
                .init();
            None
        }
    }
}
