//! Engine configuration.

/// Default capacity of the notification channel.
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 1024;

/// Account ledger engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed the default rate table at startup.
    pub seed_rates: bool,
    /// Capacity of the notification channel.
    pub notification_buffer: usize,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON.
    pub log_json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_rates: true,
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed) = lookup("BANK_SEED_RATES") {
            if let Some(seed) = parse_flag(&seed) {
                config.seed_rates = seed;
            }
        }

        if let Some(buffer) = lookup("BANK_NOTIFICATION_BUFFER") {
            if let Ok(buffer) = buffer.trim().parse() {
                config.notification_buffer = buffer;
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_json = format.trim().eq_ignore_ascii_case("json");
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.notification_buffer == 0 {
            return Err("Notification buffer must be greater than 0".to_string());
        }

        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.seed_rates);
        assert_eq!(config.notification_buffer, DEFAULT_NOTIFICATION_BUFFER);
    }

    #[test]
    fn test_invalid_config() {
        let config = EngineConfig {
            notification_buffer: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BANK_SEED_RATES", "false"),
            ("BANK_NOTIFICATION_BUFFER", "16"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "JSON"),
        ]));

        assert!(!config.seed_rates);
        assert_eq!(config.notification_buffer, 16);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BANK_SEED_RATES", "maybe"),
            ("BANK_NOTIFICATION_BUFFER", "lots"),
        ]));

        assert_eq!(config, EngineConfig::default());
    }
}
