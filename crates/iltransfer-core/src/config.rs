use ::config::{Config, Environment, File as ConfigFile, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

pub const APP_NAME: &str = "iltransfer";
pub const ENV_PREFIX: &str = "ILTRANSFER";

/// What to do when a merged item lands on a name that is already taken at the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave both entries where they are.
    #[default]
    Skip,
    /// Replace the destination entry.
    Overwrite,
    /// Move under the first free `name (N).ext`.
    Rename,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionPolicy::Skip => "skip",
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Rename => "rename",
        };
        f.write_str(name)
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(CollisionPolicy::Skip),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "rename" => Ok(CollisionPolicy::Rename),
            other => Err(format!(
                "unknown collision policy '{}' (expected skip, overwrite or rename)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    /// Slows the run down between entries so progress can be followed by eye.
    #[serde(default)]
    pub debug: bool,
}

impl AppConfig {
    pub fn new(source_path: impl Into<PathBuf>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            ignore_patterns: Vec::new(),
            collision_policy: CollisionPolicy::default(),
            debug: false,
        }
    }
}

/// Values supplied on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file. Unlike the default location, it must exist.
    pub config_file: Option<PathBuf>,
    pub source_path: Option<PathBuf>,
    pub dest_path: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub collision_policy: Option<CollisionPolicy>,
    pub debug: bool,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

pub fn default_config_file() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.config_dir().join(format!("{}.toml", APP_NAME)),
        None => PathBuf::from(format!("{}.toml", APP_NAME)),
    }
}

pub fn default_data_dir() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

pub fn default_source_path() -> PathBuf {
    default_data_dir().join("instagram")
}

pub fn default_dest_path() -> PathBuf {
    default_data_dir().join("move")
}

pub fn default_log_file() -> PathBuf {
    default_data_dir()
        .join("logs")
        .join(format!("{}.log", APP_NAME))
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Resolve the configuration from defaults, config file, `ILTRANSFER_*` environment
/// variables and command-line overrides, in that order.
pub fn load_configuration(overrides: &ConfigOverrides) -> Result<AppConfig, Error> {
    let (config_file, required) = match &overrides.config_file {
        Some(path) => (path.clone(), true),
        None => (default_config_file(), false),
    };

    let mut builder = Config::builder()
        .set_default("source_path", path_value(&default_source_path()))?
        .set_default("dest_path", path_value(&default_dest_path()))?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("collision_policy", CollisionPolicy::default().to_string())?
        .set_default("debug", false)?
        .add_source(
            ConfigFile::from(config_file.as_path())
                .format(FileFormat::Toml)
                .required(required),
        )
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .set_override_option("source_path", overrides.source_path.as_deref().map(path_value))?
        .set_override_option("dest_path", overrides.dest_path.as_deref().map(path_value))?
        .set_override_option(
            "collision_policy",
            overrides.collision_policy.map(|policy| policy.to_string()),
        )?;

    if !overrides.ignore_patterns.is_empty() {
        builder = builder.set_override("ignore_patterns", overrides.ignore_patterns.clone())?;
    }
    if overrides.debug {
        builder = builder.set_override("debug", true)?;
    }

    Ok(builder.build()?.try_deserialize::<AppConfig>()?)
}

/// Write `config` as TOML, creating parent directories as needed.
pub fn save_configuration(config: &AppConfig, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
