//! Configuration management for ferret
//!
//! This crate provides functionality for managing the ferret harness configuration,
//! including loading, saving, updating, and deleting configuration settings.

/// Error types for the configuration module
pub mod error;

use std::{path::PathBuf, str::FromStr};

use crate::error::Error;
use alloy::primitives::{Address, U256};
use clap::Parser;
use ferret_common::utils::io::file::{delete_path, read_file, write_file};
use serde::{Deserialize, Serialize};
#[allow(deprecated)]
use std::env::home_dir;
use tracing::{debug, error, info};

/// The default per-transaction gas ceiling, `0xffffffff`.
pub const DEFAULT_GAS_LIMIT: u64 = 0xffff_ffff;

/// Command line arguments for the configuration command
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Display and edit the current configuration",
    override_usage = "ferret config [OPTIONS]"
)]
pub struct ConfigArgs {
    /// The target key to update.
    #[clap(required = false, default_value = "")]
    key: String,

    /// The value to set the key to.
    #[clap(required = false, default_value = "")]
    value: String,
}

/// The [`Configuration`] struct represents the persisted harness configuration. The `ferret`
/// binary reads its defaults from here whenever a flag is not given explicitly.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// The per-transaction gas ceiling.
    pub gas_limit: u64,

    /// Whether transactions are executed with coverage instrumentation.
    pub coverage: bool,

    /// The default transaction sender.
    pub sender: String,

    /// The balance the default sender is funded with.
    pub sender_balance: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            gas_limit: DEFAULT_GAS_LIMIT,
            coverage: false,
            sender: "0x0000000000000000000000000000000000010000".to_string(),
            sender_balance: "0xffffffff".to_string(),
        }
    }
}

#[allow(deprecated)]
fn default_config_path() -> Result<PathBuf, Error> {
    let mut home = home_dir().ok_or_else(|| {
        Error::Generic(
            "failed to get home directory. does your os support `std::env::home_dir()`?"
                .to_string(),
        )
    })?;
    home.push(".ferret");
    home.push("config.toml");
    Ok(home)
}

fn path_str(path: &std::path::Path) -> Result<&str, Error> {
    path.to_str().ok_or_else(|| Error::Generic("failed to convert path to string".to_string()))
}

impl Configuration {
    /// Returns the current configuration from `$HOME/.ferret/config.toml`, creating it with
    /// default values if it does not exist yet.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&default_config_path()?)
    }

    /// Returns the configuration stored at `path`, creating it with default values if it does
    /// not exist yet.
    pub fn load_from(path: &std::path::Path) -> Result<Self, Error> {
        // if the config file doesn't exist, create it
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, writing defaults");
            Configuration::default().save_to(path)?;
        }

        let contents = read_file(path_str(path)?)
            .map_err(|e| Error::Generic(format!("failed to read config file: {e}")))?;

        toml::from_str(&contents)
            .map_err(|e| Error::ParseError(format!("failed to parse config file: {e}")))
    }

    /// Saves the current configuration to `$HOME/.ferret/config.toml`.
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&default_config_path()?)
    }

    /// Saves the current configuration to `path`.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), Error> {
        write_file(
            path_str(path)?,
            &toml::to_string(&self)
                .map_err(|e| Error::ParseError(format!("failed to serialize config: {e}")))?,
        )
        .map_err(|e| Error::Generic(format!("failed to write config file: {e}")))?;

        Ok(())
    }

    /// Deletes the configuration file at `$HOME/.ferret/config.toml`.
    pub fn delete() -> Result<(), Error> {
        Self::delete_at(&default_config_path()?)
    }

    /// Deletes the configuration file at `path`.
    pub fn delete_at(path: &std::path::Path) -> Result<(), Error> {
        if !delete_path(path_str(path)?) {
            return Err(Error::Generic(format!("failed to delete {}", path.display())));
        }

        Ok(())
    }

    /// Update a single key/value pair in the configuration. The value is validated against the
    /// key's type before it is stored; nothing is written to disk.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), Error> {
        match key {
            "gas_limit" => {
                let gas = U256::from_str(value)
                    .ok()
                    .and_then(|gas| u64::try_from(gas).ok())
                    .ok_or_else(|| Error::ParseError(format!("invalid gas limit: '{value}'")))?;
                self.gas_limit = gas;
            }
            "coverage" => {
                self.coverage = value
                    .parse::<bool>()
                    .map_err(|_| Error::ParseError(format!("invalid boolean: '{value}'")))?;
            }
            "sender" => {
                Address::from_str(value)
                    .map_err(|e| Error::ParseError(format!("invalid sender '{value}': {e}")))?;
                self.sender = value.to_string();
            }
            "sender_balance" => {
                U256::from_str(value)
                    .map_err(|e| Error::ParseError(format!("invalid balance '{value}': {e}")))?;
                self.sender_balance = value.to_string();
            }
            _ => return Err(Error::InvalidKey(key.to_string())),
        }

        Ok(())
    }

    /// The configured sender as an [`Address`].
    pub fn sender_address(&self) -> Result<Address, Error> {
        Address::from_str(&self.sender)
            .map_err(|e| Error::ParseError(format!("invalid sender '{}': {e}", self.sender)))
    }

    /// The configured sender balance as a [`U256`].
    pub fn sender_balance(&self) -> Result<U256, Error> {
        U256::from_str(&self.sender_balance).map_err(|e| {
            Error::ParseError(format!("invalid balance '{}': {e}", self.sender_balance))
        })
    }
}

/// The `config` command is used to display and edit the current configuration.
pub fn config(args: ConfigArgs) -> Result<(), Error> {
    if !args.key.is_empty() {
        if !args.value.is_empty() {
            // read the config file and update the key/value pair
            let mut config = Configuration::load()?;
            config.update(&args.key, &args.value)?;
            config.save()?;
            info!("updated configuration! Set '{}' = '{}' .", &args.key, &args.value);
        } else {
            // key is set, but no value is set
            error!("found key but no value to set. Please specify a value to set, use `ferret config --help` for more information.");
        }
    } else {
        // no key is set, print the config file
        println!("{:#?}", Configuration::load()?);
        info!("use `ferret config <KEY> <VALUE>` to set a key/value pair.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn scratch_config() -> PathBuf {
        let path = std::env::temp_dir().join("ferret-config-tests").join("config.toml");
        let _ = Configuration::delete_at(&path);
        path
    }

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.gas_limit, 0xffffffff);
        assert!(!config.coverage);
        assert_eq!(
            config.sender_address().expect("default sender must parse"),
            Address::from_str("0x0000000000000000000000000000000000010000").expect("valid")
        );
        assert_eq!(config.sender_balance().expect("default balance"), U256::from(0xffffffffu64));
    }

    #[test]
    #[serial]
    fn test_load_creates_defaults() {
        let path = scratch_config();
        let config = Configuration::load_from(&path).expect("failed to load config file");

        assert!(path.exists());
        assert_eq!(config, Configuration::default());
    }

    #[test]
    #[serial]
    fn test_save_configuration() {
        let path = scratch_config();
        let mut config = Configuration::default();

        config.update("gas_limit", "0x1000").expect("failed to update gas_limit");
        config.update("coverage", "true").expect("failed to update coverage");
        config.save_to(&path).expect("failed to save config file");

        let loaded = Configuration::load_from(&path).expect("failed to load config file");
        assert_eq!(loaded.gas_limit, 0x1000);
        assert!(loaded.coverage);
        assert_eq!(loaded.sender, Configuration::default().sender);
    }

    #[test]
    #[serial]
    fn test_delete_configuration() {
        let path = scratch_config();
        let mut config = Configuration::load_from(&path).expect("failed to load config file");
        config.update("sender_balance", "1000").expect("failed to update sender_balance");
        config.save_to(&path).expect("failed to save config file");

        Configuration::delete_at(&path).expect("failed to delete config file");
        let config = Configuration::load_from(&path).expect("failed to load config file");
        assert_eq!(config.sender_balance, "0xffffffff");
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let mut config = Configuration::default();

        assert!(matches!(config.update("gas_limit", "lots"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("coverage", "maybe"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("sender", "0x1234"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("rpc_url", "http://localhost"), Err(Error::InvalidKey(_))));
        assert_eq!(config, Configuration::default());
    }
}
