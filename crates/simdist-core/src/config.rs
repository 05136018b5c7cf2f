//! Dispatch configuration.
//!
//! Sources are layered, later overriding earlier:
//!
//! 1. Built-in defaults
//! 2. TOML file (`simdist.toml` in the working directory, or an explicit path)
//! 3. Environment variables prefixed with `SIMDIST_`
//!
//! ```toml
//! # simdist.toml
//! max_tier = "avx2"
//! log_selection = false
//! ```
//!
//! `SIMDIST_CONFIG` names an alternative TOML file for [`DispatchConfig::from_env`].

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::simd_native::Tier;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SIMDIST_";

/// Environment variable naming the TOML file read by [`DispatchConfig::from_env`].
pub const CONFIG_PATH_ENV: &str = "SIMDIST_CONFIG";

/// TOML file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "simdist.toml";

/// Settings consulted when binding kernel variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Widest tier the registry may select, compared by register width.
    ///
    /// `None` lets the host's best tier win. `Some(Tier::Scalar)` forces the
    /// portable baseline everywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tier: Option<Tier>,

    /// Emit a `debug` event for every kernel selection.
    pub log_selection: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_tier: None,
            log_selection: true,
        }
    }
}

impl DispatchConfig {
    /// Returns a copy with the tier ceiling set to `tier`.
    #[must_use]
    pub fn with_max_tier(mut self, tier: Tier) -> Self {
        self.max_tier = Some(tier);
        self
    }

    /// Loads configuration from defaults, a TOML file and the environment.
    ///
    /// With `path = None` the optional `simdist.toml` in the working
    /// directory is read if present; parent directories are not searched.
    /// An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) if !p.is_file() => {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Self = Self::figment(&file).extract()?;
        tracing::debug!(?config, file = %file.display(), "Loaded dispatch configuration");
        Ok(config)
    }

    /// Loads configuration, taking the TOML path from `SIMDIST_CONFIG` if set.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::load(Some(Path::new(&path))),
            _ => Self::load(None),
        }
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }
}
