use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::args::Defaults;
use crate::error::CommandLineError;
use crate::table::Tables;
use crate::Result;

/// Names the optional configuration file.
pub const CONFIG_PATH_VAR: &str = "PRIORITY_DRIFT_CONFIG_PATH";

/// Settings read from the configuration file. Everything is optional; the
/// command line still overrides the defaults given here.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub iterations: Option<u64>,
    /// Name, `0x` literal or decimal literal
    pub priority_class: Option<String>,
    /// Name, `0x` literal or decimal literal
    pub thread_priority: Option<String>,
    /// Log filter used when `RUST_LOG` is not set
    pub log: Option<String>,
    /// File the settings were read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("could not read {}: {err}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|err| format!("could not parse {}: {err}", path.display()))?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            ..config
        })
    }

    /// Loads the file named by [`CONFIG_PATH_VAR`], or the empty
    /// configuration when the variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        match env::var_os(CONFIG_PATH_VAR) {
            Some(path) if !path.is_empty() => {
                debug!(?path, "reading configuration");
                Self::from_path(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Resolves the configured values against `tables`. Errors name the
    /// file the bad value came from.
    pub fn defaults(&self, tables: &Tables) -> Result<Defaults> {
        let origin = match &self.source {
            Some(path) => path.display().to_string(),
            None => "configuration".to_owned(),
        };
        let invalid = |err: CommandLineError| format!("invalid value in {origin}: {err}");

        let builtin = Defaults::default();
        Ok(Defaults {
            iterations: self.iterations.unwrap_or(builtin.iterations),
            priority_class: match &self.priority_class {
                Some(value) => tables.classes.resolve(value).map_err(&invalid)?,
                None => builtin.priority_class,
            },
            thread_priority: match &self.thread_priority {
                Some(value) => tables.threads.resolve(value).map_err(&invalid)?,
                None => builtin.thread_priority,
            },
        })
    }
}
