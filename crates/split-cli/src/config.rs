//! CLI configuration

use crate::error::{CliError, CliResult};
use royalty_split_core::{CurrencyCode, SplitMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "royalty-split";

/// CLI configuration, read from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    /// Split mode used when `--mode` is not given
    pub default_mode: Option<SplitMode>,

    /// Decimal digits used when `--precision` is not given
    pub default_precision: Option<u32>,

    /// Currency label used when `--currency` is not given
    pub default_currency: Option<String>,

    /// Location of the saved-splits file
    pub store_path: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// `<config_dir>/royalty-split/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    pub fn mode(&self, flag: Option<SplitMode>) -> SplitMode {
        flag.or(self.default_mode).unwrap_or_default()
    }

    pub fn precision(&self, flag: Option<u32>) -> u32 {
        flag.or(self.default_precision).unwrap_or(2)
    }

    pub fn currency(&self, flag: Option<&str>) -> CurrencyCode {
        flag.or(self.default_currency.as_deref())
            .map(CurrencyCode::new)
            .unwrap_or_default()
    }

    /// Flag, then config file, then `<data_dir>/royalty-split/splits.json`.
    pub fn store_path(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(p) = flag {
            return p.to_path_buf();
        }
        if let Some(p) = &self.store_path {
            return p.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
            .join("splits.json")
    }
}
