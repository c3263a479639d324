use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::Duration;

use crate::workflows::discounts::EvaluationConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub discounts: DiscountConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let weekly_window_days = env::var("DISCOUNT_WEEKLY_WINDOW_DAYS")
            .unwrap_or_else(|_| DEFAULT_WEEKLY_WINDOW_DAYS.to_string())
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::InvalidWindow)?;

        let evaluation = match env::var("DISCOUNT_RULES_PATH") {
            Ok(path) if !path.trim().is_empty() => load_rules_file(PathBuf::from(path.trim()))?,
            _ => EvaluationConfig::default(),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            discounts: DiscountConfig {
                weekly_window_days,
                evaluation,
            },
        })
    }
}

const DEFAULT_WEEKLY_WINDOW_DAYS: u32 = 7;

fn load_rules_file(path: PathBuf) -> Result<EvaluationConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::RulesFile {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::RulesFormat { path, source })
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Rule thresholds and the rolling window applied to purchases.
#[derive(Debug, Clone)]
pub struct DiscountConfig {
    pub weekly_window_days: u32,
    pub evaluation: EvaluationConfig,
}

impl DiscountConfig {
    pub fn weekly_window(&self) -> Duration {
        Duration::days(i64::from(self.weekly_window_days))
    }
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            weekly_window_days: DEFAULT_WEEKLY_WINDOW_DAYS,
            evaluation: EvaluationConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidWindow,
    RulesFile {
        path: PathBuf,
        source: std::io::Error,
    },
    RulesFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWindow => {
                write!(f, "DISCOUNT_WEEKLY_WINDOW_DAYS must be a positive integer")
            }
            ConfigError::RulesFile { path, .. } => {
                write!(f, "unable to read rules file {}", path.display())
            }
            ConfigError::RulesFormat { path, .. } => {
                write!(f, "rules file {} is not a valid rule configuration", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidWindow => None,
            ConfigError::RulesFile { source, .. } => Some(source),
            ConfigError::RulesFormat { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("DISCOUNT_WEEKLY_WINDOW_DAYS");
        env::remove_var("DISCOUNT_RULES_PATH");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.discounts.weekly_window_days, 7);
        assert_eq!(config.discounts.weekly_window(), Duration::days(7));
        assert_eq!(config.discounts.evaluation, EvaluationConfig::default());
    }

    #[test]
    fn rejects_zero_day_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DISCOUNT_WEEKLY_WINDOW_DAYS", "0");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidWindow)));
    }

    #[test]
    fn reads_production_environment_and_window_override() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("DISCOUNT_WEEKLY_WINDOW_DAYS", "14");
        let config = AppConfig::load().expect("config loads");
        reset_env();
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.discounts.weekly_window(), Duration::days(14));
    }

    #[test]
    fn loads_rules_from_json_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let mut rules = EvaluationConfig::default();
        rules.big_spender_percentage = 25;
        let path =
            env::temp_dir().join(format!("purchase-rewards-rules-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&rules).expect("serialize rules"))
            .expect("write rules file");
        env::set_var("DISCOUNT_RULES_PATH", &path);

        let config = AppConfig::load().expect("config loads");
        reset_env();
        let _ = fs::remove_file(&path);

        assert_eq!(config.discounts.evaluation.big_spender_percentage, 25);
    }

    #[test]
    fn reports_missing_rules_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DISCOUNT_RULES_PATH", "/nonexistent/purchase-rewards/rules.json");
        let result = AppConfig::load();
        reset_env();
        match result {
            Err(ConfigError::RulesFile { path, .. }) => {
                assert!(path.ends_with("rules.json"));
            }
            other => panic!("expected rules file error, got {other:?}"),
        }
    }
}
