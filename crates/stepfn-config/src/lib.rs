// Copyright 2025 DataStax Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use std::path::Path;

use error_stack::{Report, ResultExt as _};
use serde::{Deserialize, Serialize};
use stepfn_observability::ObservabilityConfig;
use thiserror::Error;

mod retry_defaults;

pub use retry_defaults::{
    RETRY_DEFAULT_BACKOFF_RATE, RETRY_DEFAULT_INTERVAL_SECONDS, RETRY_DEFAULT_MAX_ATTEMPTS,
    RetryDefaults,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error")]
    Configuration,
}

type Result<T> = std::result::Result<T, Report<ConfigError>>;

/// Engine-wide configuration shared by executors and branch runners.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Defaults for fields omitted from `Retry` clauses.
    pub retry_defaults: RetryDefaults,
    /// Logging and tracing setup.
    pub logging: ObservabilityConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .change_context(ConfigError::Configuration)
            .attach_printable_lazy(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&contents)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml_ng::from_str(contents)
            .change_context(ConfigError::Configuration)
            .attach_printable("Failed to parse config YAML")?;

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        let retry = &self.retry_defaults;
        if !retry.interval_seconds.is_finite() || retry.interval_seconds < 0.0 {
            return Err(Report::new(ConfigError::Configuration).attach_printable(format!(
                "retryDefaults.intervalSeconds must be a non-negative number, got {}",
                retry.interval_seconds
            )));
        }
        if !retry.backoff_rate.is_finite() || retry.backoff_rate < 0.0 {
            return Err(Report::new(ConfigError::Configuration).attach_printable(format!(
                "retryDefaults.backoffRate must be a non-negative number, got {}",
                retry.backoff_rate
            )));
        }
        self.logging
            .validate()
            .change_context(ConfigError::Configuration)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use stepfn_observability::{LogDestinationType, LogFormat};

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.retry_defaults.interval_seconds, 1.0);
        assert_eq!(config.retry_defaults.backoff_rate, 2.0);
        assert_eq!(config.retry_defaults.max_attempts, 3);
        assert_eq!(config.logging, ObservabilityConfig::default());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = EngineConfig::from_yaml("retryDefaults:\n  maxAttempts: 5\n").unwrap();
        assert_eq!(config.retry_defaults.max_attempts, 5);
        assert_eq!(
            config.retry_defaults.interval_seconds,
            RETRY_DEFAULT_INTERVAL_SECONDS
        );
        assert_eq!(config.retry_defaults.backoff_rate, RETRY_DEFAULT_BACKOFF_RATE);

        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rejects_negative_interval() {
        let error =
            EngineConfig::from_yaml("retryDefaults:\n  intervalSeconds: -1\n").unwrap_err();
        assert!(matches!(
            error.current_context(),
            ConfigError::Configuration
        ));
    }

    #[test]
    fn test_rejects_invalid_logging() {
        assert!(EngineConfig::from_yaml("logging:\n  logDestination: file\n").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
retryDefaults:
  intervalSeconds: 0.5
  backoffRate: 3
  maxAttempts: 2
logging:
  logLevel: debug
  logFormat: json
"#
        )
        .unwrap();

        let config = EngineConfig::load_from_file(file.path()).await.unwrap();
        assert_eq!(
            config.retry_defaults,
            RetryDefaults {
                interval_seconds: 0.5,
                backoff_rate: 3.0,
                max_attempts: 2,
            }
        );
        assert_eq!(config.logging.log_level, log::LevelFilter::Debug);
        assert_eq!(config.logging.log_format, LogFormat::Json);
        assert_eq!(config.logging.log_destination, LogDestinationType::Stdout);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load_from_file(&dir.path().join("missing.yaml")).await;
        assert!(result.is_err());
    }
}
