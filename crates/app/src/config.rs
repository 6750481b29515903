//! Runtime configuration read from `POCKETBOOK_*` environment variables.

use thiserror::Error;

use pocketbook_observability::{LogConfig, LogFormat};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number between 1 and 100 (got {value:?})")]
    InvalidPageSize { var: &'static str, value: String },

    #[error("{var}: {source}")]
    InvalidLogFormat {
        var: &'static str,
        #[source]
        source: pocketbook_observability::ObservabilityError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log: LogConfig,
    /// Page size used when a listing does not ask for one.
    pub default_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub const LOG_VAR: &'static str = "POCKETBOOK_LOG";
    pub const LOG_FORMAT_VAR: &'static str = "POCKETBOOK_LOG_FORMAT";
    pub const PAGE_SIZE_VAR: &'static str = "POCKETBOOK_PAGE_SIZE";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Unset or
    /// blank variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let filter = get(Self::LOG_VAR).unwrap_or(defaults.log.filter);

        let format = match get(Self::LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|source| ConfigError::InvalidLogFormat {
                    var: Self::LOG_FORMAT_VAR,
                    source,
                })?,
            None => defaults.log.format,
        };

        let default_page_size = match get(Self::PAGE_SIZE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                .ok_or(ConfigError::InvalidPageSize {
                    var: Self::PAGE_SIZE_VAR,
                    value: raw,
                })?,
            None => defaults.default_page_size,
        };

        Ok(Self {
            log: LogConfig { filter, format },
            default_page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("POCKETBOOK_LOG", "debug,pocketbook_events=trace"),
            ("POCKETBOOK_LOG_FORMAT", "pretty"),
            ("POCKETBOOK_PAGE_SIZE", " 50 "),
        ])
        .unwrap();

        assert_eq!(cfg.log.filter, "debug,pocketbook_events=trace");
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.default_page_size, 50);
    }

    #[test]
    fn rejects_out_of_range_page_sizes() {
        for bad in ["0", "101", "ten"] {
            assert!(matches!(
                config(&[("POCKETBOOK_PAGE_SIZE", bad)]),
                Err(ConfigError::InvalidPageSize { .. })
            ));
        }
    }

    #[test]
    fn rejects_unknown_log_formats() {
        let err = config(&[("POCKETBOOK_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(err.to_string().starts_with("POCKETBOOK_LOG_FORMAT: "));
    }
}
