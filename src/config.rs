// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `ledger.redb` | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `GENESIS_ACCOUNT` | Address credited on first start | Unset (no genesis mint) |
//! | `GENESIS_SUPPLY` | Amount minted to `GENESIS_ACCOUNT` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;

use crate::logging::LogFormat;
use crate::storage::LEDGER_DB_FILE;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Address that receives the genesis supply when the ledger is first created.
pub const GENESIS_ACCOUNT_ENV: &str = "GENESIS_ACCOUNT";

/// Genesis supply, in smallest units (decimal string).
pub const GENESIS_SUPPLY_ENV: &str = "GENESIS_SUPPLY";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} is set but GENESIS_ACCOUNT is not")]
    GenesisWithoutAccount(&'static str),
}

/// Initial mint applied to an empty ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisConfig {
    pub account: Address,
    pub supply: u128,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub genesis: Option<GenesisConfig>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            genesis: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let host = lookup(HOST_ENV).unwrap_or(defaults.host);
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => defaults.port,
        };
        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::from_str_lossy(&raw))
            .unwrap_or(defaults.log_format);

        let genesis = match (lookup(GENESIS_ACCOUNT_ENV), lookup(GENESIS_SUPPLY_ENV)) {
            (Some(account), supply) => {
                let account = account.trim().parse::<Address>().map_err(|e| ConfigError::Invalid {
                    name: GENESIS_ACCOUNT_ENV,
                    reason: format!("{e}"),
                })?;
                let supply = match supply {
                    Some(raw) => raw.trim().parse::<u128>().map_err(|e| ConfigError::Invalid {
                        name: GENESIS_SUPPLY_ENV,
                        reason: format!("{e}"),
                    })?,
                    None => 0,
                };
                Some(GenesisConfig { account, supply })
            }
            (None, Some(_)) => return Err(ConfigError::GenesisWithoutAccount(GENESIS_SUPPLY_ENV)),
            (None, None) => None,
        };

        Ok(Self {
            data_dir,
            host,
            port,
            genesis,
            log_format,
        })
    }

    /// Path of the ledger database file.
    pub fn ledger_path(&self) -> PathBuf {
        ledger_path_in(&self.data_dir)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            })
    }
}

pub fn ledger_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(LEDGER_DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.genesis.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.ledger_path(), PathBuf::from("./data/ledger.redb"));
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATA_DIR", "/var/lib/ledger"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("LOG_FORMAT", "JSON"),
            ("GENESIS_ACCOUNT", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            ("GENESIS_SUPPLY", "10000000000000000000000"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        let genesis = config.genesis.unwrap();
        assert_eq!(genesis.supply, 10_000 * 10u128.pow(18));
        assert_eq!(
            genesis.account.to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn supply_without_account_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("GENESIS_SUPPLY", "5")])).unwrap_err();
        assert_eq!(err, ConfigError::GenesisWithoutAccount("GENESIS_SUPPLY"));
    }

    #[test]
    fn invalid_genesis_account_is_rejected() {
        let err =
            ServerConfig::from_lookup(lookup(&[("GENESIS_ACCOUNT", "not-an-address")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "GENESIS_ACCOUNT", .. }));
    }
}
