// Copyright 2024 The TopoMQ Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Control-plane configuration.

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use topomq_error::TopoMQError;
use topomq_error::TopoMQResult;

/// Tunables for the topology engine.
///
/// All fields have working defaults; a configuration file is optional and
/// parsed through [`ParseConfigFile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopologyConfig {
    /// Directory holding the file-backed persistence documents.
    pub storage_path: String,

    /// Fixed interval between data-plane reconnect attempts, in milliseconds.
    pub reconnect_retry_interval_ms: u64,

    /// Total window allowed for data-plane reconnection before the
    /// connection manager gives up, in milliseconds.
    pub reconnect_retry_window_ms: u64,

    /// Default privilege mode installed on freshly created allow/deny lists,
    /// by name (e.g. "DenyAllImplicitAllow").
    pub default_privilege: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        TopologyConfig {
            storage_path: String::from("topology-store"),
            reconnect_retry_interval_ms: 1000,
            reconnect_retry_window_ms: 5 * 60 * 1000,
            default_privilege: String::from("DenyAllImplicitAllow"),
        }
    }
}

/// Parses a configuration file into a typed config struct.
pub struct ParseConfigFile;

impl ParseConfigFile {
    pub fn parse_config_file<T>(config_file: PathBuf) -> TopoMQResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        config::Config::builder()
            .add_source(config::File::from(config_file))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<T>())
            .map_err(|e| TopoMQError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = TopologyConfig::default();
        assert_eq!(cfg.reconnect_retry_interval_ms, 1000);
        assert_eq!(cfg.reconnect_retry_window_ms, 300_000);
        assert_eq!(cfg.default_privilege, "DenyAllImplicitAllow");
    }

    #[test]
    fn parse_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "reconnectRetryIntervalMs = 250").unwrap();
        writeln!(file, "storagePath = \"/var/lib/topomq\"").unwrap();

        let cfg: TopologyConfig = ParseConfigFile::parse_config_file(path).unwrap();
        assert_eq!(cfg.reconnect_retry_interval_ms, 250);
        assert_eq!(cfg.storage_path, "/var/lib/topomq");
        // untouched fields keep their defaults
        assert_eq!(cfg.reconnect_retry_window_ms, 300_000);
    }

    #[test]
    fn parse_config_file_reports_missing_file() {
        let result: TopoMQResult<TopologyConfig> =
            ParseConfigFile::parse_config_file(PathBuf::from("/nonexistent/topology.toml"));
        assert!(result.is_err());
    }
}
