//! Configuration Module
//!
//! Reads the checker's settings from the environment of the observed
//! process. The library is injected with `LD_PRELOAD`, so environment
//! variables are the only channel available.
//!
//! | Variable | Effect | Default |
//! |---|---|---|
//! | `EPOLL_CHECKER_LOG` | `env_logger` filter for the checker's output | `warn` |
//! | `EPOLL_CHECKER_STRICT` | abort the process on a contract violation | off |
//! | `EPOLL_CHECKER_DISABLE` | forward every call without tracking | off |

use std::env;

pub const LOG_VAR: &str = "EPOLL_CHECKER_LOG";
pub const STRICT_VAR: &str = "EPOLL_CHECKER_STRICT";
pub const DISABLE_VAR: &str = "EPOLL_CHECKER_DISABLE";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Checker settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Filter directives passed to `env_logger`
    pub log_filter: String,
    /// Abort when the interception layer reports an impossible sequence
    pub strict: bool,
    /// Track nothing
    pub disabled: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            strict: false,
            disabled: false,
        }
    }
}

impl CheckerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_filter: lookup(LOG_VAR)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.log_filter),
            strict: lookup(STRICT_VAR).map_or(defaults.strict, |value| is_truthy(&value)),
            disabled: lookup(DISABLE_VAR).map_or(defaults.disabled, |value| is_truthy(&value)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, CheckerConfig::default());
        assert_eq!(config.log_filter, "warn");
        assert!(!config.strict);
        assert!(!config.disabled);
    }

    #[test]
    fn test_overrides() {
        let config = CheckerConfig::from_lookup(lookup_from(&[
            (LOG_VAR, "epoll_checker=trace"),
            (STRICT_VAR, "yes"),
            (DISABLE_VAR, "0"),
        ]));
        assert_eq!(config.log_filter, "epoll_checker=trace");
        assert!(config.strict);
        assert!(!config.disabled);
    }

    #[test]
    fn test_blank_filter_falls_back() {
        let config = CheckerConfig::from_lookup(lookup_from(&[(LOG_VAR, "  ")]));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "TRUE", " on ", "Yes"] {
            assert!(is_truthy(value), "{:?}", value);
        }
        for value in ["", "0", "false", "off", "enabled"] {
            assert!(!is_truthy(value), "{:?}", value);
        }
    }
}
