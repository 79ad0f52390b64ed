mod commands;
mod logging;
mod progress;
mod prompt;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::{Cli, Commands, GlobalArgs};
use dotenv::dotenv;
use iltransfer_core::config::{self, AppConfig};
use iltransfer_core::TransferEngine;
use progress::CliReporter;
use tracing::{debug, error, info, warn};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger(args.global.verbose || args.global.debug);

    info!("Start of session");

    let result = match args.command {
        None | Some(Commands::Run) => run_transfer(&args.global),
        Some(Commands::Init { force }) => run_init(&args.global, force),
        Some(Commands::PrintConfig) => print_config(&args.global),
    };

    match result {
        Ok(()) => {
            info!("End of session");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_transfer(global: &GlobalArgs) -> anyhow::Result<()> {
    let overrides = global.overrides();
    if overrides.config_file.is_none() && !config::default_config_file().is_file() {
        warn!(
            "Configuration file {} doesn't exist, using defaults. Run `iltransfer init` to create it.",
            config::default_config_file().display()
        );
    }

    let config = config::load_configuration(&overrides).context("Error loading configuration")?;
    debug!("config: {:?}", config);
    info!("Source path: {}", config.source_path.display());
    info!("Destination path: {}", config.dest_path.display());

    let interrupt = Arc::new(AtomicBool::new(false));
    let handler_flag = interrupt.clone();
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
        .context("Error installing Ctrl-C handler")?;

    let engine = TransferEngine::new(config);
    let reporter = CliReporter::new();
    let summary = engine.run(&reporter, &interrupt)?;

    if summary.interrupted {
        println!();
        info!(
            "{} after {} of {} entries, the rest is left in place",
            "Caught interrupt, stopping".yellow(),
            summary.processed,
            summary.total_entries
        );
    }
    if summary.failed > 0 {
        warn!(
            "{} entries could not be fully moved, see the log for details",
            format!("{}", summary.failed).red()
        );
    }

    Ok(())
}

fn run_init(global: &GlobalArgs, force: bool) -> anyhow::Result<()> {
    let path = global
        .config_file
        .clone()
        .unwrap_or_else(config::default_config_file);

    if path.exists()
        && !force
        && !prompt::prompt_confirm(
            &format!("{} already exists. Overwrite it?", path.display()),
            Some(false),
        )?
    {
        info!("Keeping existing configuration file {}", path.display());
        return Ok(());
    }

    let default_source = global
        .source_path
        .clone()
        .unwrap_or_else(config::default_source_path);
    let default_dest = global
        .dest_path
        .clone()
        .unwrap_or_else(config::default_dest_path);

    let source = prompt::prompt_dir("Enter the source path", &default_source)?;
    let dest = prompt::prompt_dir("Enter the destination path", &default_dest)?;

    let mut new_config = AppConfig::new(source, dest);
    new_config.ignore_patterns = global.ignore_patterns.clone();
    new_config.collision_policy = global.collision_policy.unwrap_or_default();

    config::save_configuration(&new_config, &path)
        .with_context(|| format!("Error writing {}", path.display()))?;

    if new_config.source_path == config::default_source_path()
        && new_config.dest_path == config::default_dest_path()
    {
        warn!(
            "Configuration file created at {} with default paths. Edit it to change the paths.",
            path.display()
        );
    } else {
        info!("Configuration file created at {}", path.display());
    }

    Ok(())
}

fn print_config(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = config::load_configuration(&global.overrides())
        .context("Error loading configuration")?;
    let file = global
        .config_file
        .clone()
        .unwrap_or_else(config::default_config_file);

    println!("Configuration file: {}", file.display());
    println!("Configuration: {:#?}", config);
    Ok(())
}
