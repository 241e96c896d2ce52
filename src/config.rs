// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration: built-in defaults, then an optional JSON file, then environment
//! overrides.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::WriteDurability;
use crate::sync::{HostSelectors, RetryPolicy};

pub const ENV_DEBUG: &str = "CONVO_FOLDERS_DEBUG";
pub const ENV_STORAGE_KEY: &str = "CONVO_FOLDERS_STORAGE_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub storage_key: String,
    pub backup_key: String,
    pub debug: bool,
    pub durable_writes: bool,
    pub conversation_base_url: String,
    pub container_poll_interval_ms: u64,
    pub menu_poll_interval_ms: u64,
    pub menu_poll_max_attempts: u32,
    pub selectors: HostSelectors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: "folderData".to_owned(),
            backup_key: "folderData.backup".to_owned(),
            debug: false,
            durable_writes: false,
            conversation_base_url: "https://chat.deepseek.com".to_owned(),
            container_poll_interval_ms: 500,
            menu_poll_interval_ms: 50,
            menu_poll_max_attempts: 20,
            selectors: HostSelectors::default(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| env::var(name))?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Result<String, env::VarError>,
    {
        if let Some(value) = read_env(&lookup, ENV_DEBUG)? {
            self.debug = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_DEBUG,
                        value,
                    })
                }
            };
        }
        if let Some(value) = read_env(&lookup, ENV_STORAGE_KEY)? {
            self.storage_key = value;
        }
        Ok(())
    }

    pub fn container_poll_interval(&self) -> Duration {
        Duration::from_millis(self.container_poll_interval_ms)
    }

    pub fn menu_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.menu_poll_interval_ms),
            self.menu_poll_max_attempts,
        )
    }

    pub fn write_durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        }
    }

    /// Default `tracing` filter directive for the binary.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "convo_folders=debug"
        } else {
            "convo_folders=info"
        }
    }
}

/// Unset and blank values count as absent.
fn read_env<F>(lookup: &F, name: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    match lookup(name) {
        Ok(value) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv {
            name,
            value: "<non-unicode>".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::env::VarError;
    use std::time::Duration;

    use rstest::rstest;

    use super::{Config, ConfigError, ENV_DEBUG, ENV_STORAGE_KEY};

    fn lookup(
        pairs: Vec<(&'static str, &'static str)>,
    ) -> impl Fn(&'static str) -> Result<String, VarError> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_match_the_host() {
        let config = Config::default();
        assert_eq!(config.storage_key, "folderData");
        assert_eq!(config.container_poll_interval(), Duration::from_millis(500));
        assert_eq!(config.menu_retry().budget(), Duration::from_millis(1_000));
        assert_eq!(config.log_directive(), "convo_folders=info");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"debug":true,"menuPollMaxAttempts":5}"#).expect("parse");
        assert!(config.debug);
        assert_eq!(config.menu_poll_max_attempts, 5);
        assert_eq!(config.backup_key, "folderData.backup");
        assert_eq!(config.selectors, Config::default().selectors);
    }

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case("off", false)]
    fn debug_env_override(#[case] raw: &'static str, #[case] expected: bool) {
        let mut config = Config::default();
        config.debug = !expected;
        config.apply_env(lookup(vec![(ENV_DEBUG, raw)])).expect("env");
        assert_eq!(config.debug, expected);
    }

    #[test]
    fn storage_key_env_override_and_bad_debug_value() {
        let mut config = Config::default();
        config
            .apply_env(lookup(vec![(ENV_STORAGE_KEY, " altData ")]))
            .expect("env");
        assert_eq!(config.storage_key, "altData");

        let err = config
            .apply_env(lookup(vec![(ENV_DEBUG, "maybe")]))
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_DEBUG, .. }));
    }
}
