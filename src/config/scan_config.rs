use crate::errors::ConfigError;
use crate::logging::LogFormat;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::Level;

pub const ENV_ERROR_POLICY: &str = "DI_SCAN_ERROR_POLICY";
pub const ENV_LOG_LEVEL: &str = "DI_SCAN_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "DI_SCAN_LOG_FORMAT";

/// What a scan does when a type is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop at the first malformed type
    #[default]
    FailFast,
    /// Examine every type and report all errors together
    CollectAll,
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fail-fast" | "failfast" => Ok(ErrorPolicy::FailFast),
            "collect-all" | "collectall" => Ok(ErrorPolicy::CollectAll),
            _ => Err(ConfigError::InvalidValue {
                key: "error_policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Log output settings of the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
        }
    }
}

/// Settings of a scan run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanConfig {
    pub error_policy: ErrorPolicy,
    pub logging: LogSettings,
}

/// Partial configurations for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialScanConfig {
    scan: Option<PartialScanSection>,
    logging: Option<PartialLogSettings>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialScanSection {
    error_policy: Option<ErrorPolicy>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialLogSettings {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl ScanConfig {
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// Merges file values with environment overrides; environment wins
    pub fn from_partial_and_env(
        partial: Option<PartialScanConfig>,
        env_map: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let scan = partial.scan.unwrap_or_default();
        let logging = partial.logging.unwrap_or_default();

        let error_policy = match env_map.get(ENV_ERROR_POLICY) {
            Some(value) => value.parse()?,
            None => scan.error_policy.unwrap_or_default(),
        };

        let level = match env_map.get(ENV_LOG_LEVEL).or(logging.level.as_ref()) {
            Some(value) => Level::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: value.clone(),
            })?,
            None => LogSettings::default().level,
        };

        let format = match env_map.get(ENV_LOG_FORMAT) {
            Some(value) => value.parse()?,
            None => logging.format.unwrap_or(LogSettings::default().format),
        };

        Ok(ScanConfig {
            error_policy,
            logging: LogSettings { level, format },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::from_partial_and_env(None, &HashMap::new()).unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.logging.level, Level::INFO);
    }

    #[test]
    fn test_env_overrides_file() {
        let partial: PartialScanConfig = toml::from_str(
            r#"
            [scan]
            error_policy = "fail-fast"

            [logging]
            level = "warn"
            format = "pretty"
            "#,
        )
        .unwrap();

        let env = HashMap::from([
            (ENV_ERROR_POLICY.to_string(), "collect_all".to_string()),
            (ENV_LOG_LEVEL.to_string(), "debug".to_string()),
        ]);

        let config = ScanConfig::from_partial_and_env(Some(partial), &env).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::CollectAll);
        assert_eq!(config.logging.level, Level::DEBUG);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let env = HashMap::from([(ENV_ERROR_POLICY.to_string(), "sometimes".to_string())]);
        let result = ScanConfig::from_partial_and_env(None, &env);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let env = HashMap::from([(ENV_LOG_LEVEL.to_string(), "loud".to_string())]);
        let result = ScanConfig::from_partial_and_env(None, &env);
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "logging.level"));
    }
}
