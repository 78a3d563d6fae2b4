use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthcheck::check_modules::config::{config_dir, read_config_file, Config};
use healthcheck::check_modules::error::ConfigError;
use healthcheck::check_modules::runner::CheckRunner;
use healthcheck::check_modules::scheduler::Scheduler;
use healthcheck::version::VERSION;

const USAGE: &str = "
****************************************************************
                          healthcheck
****************************************************************

 SYNOPSIS
    healthcheck -f config_file.yml
 DESCRIPTION
    Polls a list of HTTP endpoints on a fixed schedule and reports
    which ones answered with the expected status and body.
 OPTIONS
    -f, --file [file]             Config file (YAML, TOML or JSON) setting the
                                  base url, port, schedule and the checks to run.
    -V, --version                 Print version information
 EXAMPLES
    healthcheck -f production-check.yml
";

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// The configuration file for healthcheck
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,
}

fn init_logging(log_dir: Option<&Path>) {
    // Optional file output: JSON lines, daily rotation
    let file_layer = log_dir.map(|dir| {
        fmt::layer()
            .with_writer(rolling::daily(dir, "healthcheck.log"))
            .with_ansi(false)
            .json()
    });

    // Human-readable output on stdout
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

/// Startup errors get the usage banner and a non-zero exit, before any
/// cycle is scheduled.
fn exit_with_usage(err: ConfigError) -> ! {
    eprintln!("{USAGE}");
    eprintln!("{err}");
    std::process::exit(1);
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C, running until killed.");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let Some(config_path) = args.file else {
        exit_with_usage(ConfigError::NotProvided);
    };

    // The file is parsed before logging starts because it may name a log directory.
    let config_file = read_config_file(&config_path).unwrap_or_else(|e| exit_with_usage(e));
    init_logging(config_file.log_dir.as_deref().map(Path::new));
    info!(version = VERSION, path = ?config_path, "Starting...");

    let config = Config::from_file(config_file, config_dir(&config_path))
        .unwrap_or_else(|e| exit_with_usage(e));

    let runner = CheckRunner::new(Arc::new(config))?;
    let scheduler = Scheduler::new(runner);
    let cycles = scheduler.run_until(wait_for_ctrl_c()).await?;

    info!(cycles, "Stopped.");
    Ok(())
}
