/// Runtime configuration.
///
/// Loaded from an optional TOML file; every field has a default so an empty
/// file (or no file) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::os_family::OsFamily;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Program that dumps the dynamic-linker cache.
    pub ldconfig_program: String,
    pub ldconfig_args: Vec<String>,
    /// Host descriptor used to pick a package finder.
    pub os_release: PathBuf,
    /// Force a package finder instead of detecting one (`debian`, `rpm`, `alpine`).
    pub os_family: Option<String>,
    /// Upper bound for each external package lookup.
    pub lookup_timeout_secs: u64,
    /// Attribution workers; 0 means half the available cores.
    pub workers: usize,
    /// Expand sibling dependencies concurrently.
    pub parallel: bool,
    /// Prefer ld cache entries matching the requesting binary's architecture.
    pub arch_aware: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ldconfig_program: "ldconfig".to_string(),
            ldconfig_args: vec!["-p".to_string()],
            os_release: PathBuf::from("/etc/os-release"),
            os_family: None,
            lookup_timeout_secs: 10,
            workers: 0,
            parallel: true,
            arch_aware: true,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Invalid configuration TOML")?;
        if let Some(name) = &config.os_family {
            if OsFamily::from_name(name).is_none() {
                anyhow::bail!("Unknown os_family '{}' (expected debian, rpm or alpine)", name);
            }
        }
        Ok(config)
    }

    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs.max(1))
    }

    /// Forced family, if configured.
    pub fn forced_family(&self) -> Option<OsFamily> {
        self.os_family.as_deref().and_then(OsFamily::from_name)
    }
}
