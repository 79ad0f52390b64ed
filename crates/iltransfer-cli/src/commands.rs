use clap::{Args, Parser, Subcommand};
use iltransfer_core::config::ConfigOverrides;
use iltransfer_core::CollisionPolicy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "iltransfer", version)]
#[command(about = "Move finished profile downloads into their permanent folder", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Folder holding the downloaded profiles
    #[arg(short = 's', long = "source", global = true)]
    pub source_path: Option<PathBuf>,

    /// Folder the profiles are moved into
    #[arg(short = 'd', long = "destination", global = true)]
    pub dest_path: Option<PathBuf>,

    /// Configuration file to use instead of the default one
    #[arg(short = 'c', long = "config", global = true)]
    pub config_file: Option<PathBuf>,

    /// What to do with files whose name is already taken when merging
    #[arg(long = "on-collision", global = true)]
    pub collision_policy: Option<CollisionPolicy>,

    /// Skip source entries whose name matches this glob (repeatable)
    #[arg(long = "ignore", global = true)]
    pub ignore_patterns: Vec<String>,

    /// Debug mode: verbose logs and a pause between folders
    #[arg(long, global = true)]
    pub debug: bool,

    /// Verbose logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config_file.clone(),
            source_path: self.source_path.clone(),
            dest_path: self.dest_path.clone(),
            ignore_patterns: self.ignore_patterns.clone(),
            collision_policy: self.collision_policy,
            debug: self.debug,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move complete profile folders (default)
    Run,
    /// Create the configuration file interactively
    Init {
        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print configuration values
    PrintConfig,
}
