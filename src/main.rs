use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use pastepath::clipboard::{self, Platform};
use pastepath::extract::Pipeline;
use pastepath::host::{OneShotHost, StdioHost};
use pastepath::interceptor::Interceptor;
use pastepath::logging;
use pastepath::process::{SystemRunner, ToolRunner};
use pastepath::storage::{self, ResolvedConfig, load_config};

#[derive(Parser)]
#[command(name = "pastepath")]
#[command(about = "Paste clipboard images into the terminal as file paths", long_about = None)]
struct Cli {
    /// Config file checked before the standard locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for the log file (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Intercept paste gestures from the host over stdin/stdout (default)
    Listen,

    /// Paste once: print an image path or the clipboard text to stdout
    Paste,

    /// Show the resolved configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Listen) {
        Commands::Listen => cmd_listen(cli.config, &cli.log_level),
        Commands::Paste => {
            env_logger::init();
            cmd_paste(cli.config)
        }
        Commands::Config => {
            env_logger::init();
            cmd_config(cli.config)
        }
    }
}

/// Build the interceptor for the detected platform
fn build_interceptor(config: ResolvedConfig) -> Result<Interceptor> {
    let platform = Platform::detect()?;
    let runner: Arc<dyn ToolRunner> = Arc::new(SystemRunner);

    let backend = clipboard::create_backend(platform, runner.clone());
    let pipeline = Pipeline::for_platform(platform, runner);
    Ok(Interceptor::new(config, backend, pipeline))
}

/// Run the interception loop against the host bridge on stdin/stdout
fn cmd_listen(config_path: Option<PathBuf>, log_level: &str) -> Result<()> {
    let log_path = storage::data_dir()?.join("pastepath.log");
    logging::init_logger(&log_path, log_level, "warn").context("Failed to initialize logging")?;
    log::info!("Starting pastepath, logging to {:?}", log_path);

    let config = load_config(config_path.as_deref());
    let mut interceptor = build_interceptor(config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut host = StdioHost::new(stdin.lock(), stdout.lock());

    interceptor
        .run(&mut host)
        .context("Paste interception stopped")?;

    log::info!("Host disconnected, exiting");
    Ok(())
}

/// Handle a single paste and write the result to stdout
fn cmd_paste(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());
    let mut interceptor = build_interceptor(config)?;

    let mut host = OneShotHost::new(io::stdout().lock());
    interceptor.run(&mut host)
}

/// Print the resolved configuration as JSON
fn cmd_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}
