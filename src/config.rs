// Run configuration, sourced from the process environment at startup and
// threaded through every component constructor. No module-level state.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::offer::CabinClass;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingToken(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    // Route under scan.
    pub origin: String,
    pub destination: String,

    // Offers in any other currency are ignored; no conversion is attempted.
    pub currency: String,
    pub threshold: f64,

    // Outbound window, expressed in days from today.
    pub start_days_out: i64,
    pub end_days_out: i64,

    // Trip length bounds, in days between outbound and return.
    pub min_trip_days: i64,
    pub max_trip_days: i64,

    // Stop-count preference with graceful degradation.
    pub prefer_nonstop: bool,
    pub max_stops_preferred: u32,
    pub max_stops_fallback: u32,

    pub outbound_cabin: CabinClass,
    pub return_cabin: CabinClass,

    pub duffel_token: String,
    pub slack_webhook_url: Option<String>,

    pub results_path: PathBuf,
    pub offer_limit: u32,
    pub request_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            origin: "ORD".to_string(),
            destination: "LHR".to_string(),
            currency: "USD".to_string(),
            threshold: 2500.0,
            start_days_out: 14,
            end_days_out: 28,
            min_trip_days: 3,
            max_trip_days: 14,
            prefer_nonstop: true,
            max_stops_preferred: 0,
            max_stops_fallback: 1,
            outbound_cabin: CabinClass::Business,
            return_cabin: CabinClass::PremiumEconomy,
            duffel_token: String::new(),
            slack_webhook_url: None,
            results_path: PathBuf::from("latest_results.json"),
            offer_limit: 30,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ScanConfig {
    // Build the run configuration from the environment. DUFFEL_TOKEN is the
    // only required variable; everything else falls back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let duffel_token = env::var("DUFFEL_TOKEN")
            .map_err(|_| ConfigError::MissingToken("DUFFEL_TOKEN"))?;

        let config = Self {
            origin: string_var("ORIGIN", defaults.origin),
            destination: string_var("DEST", defaults.destination),
            currency: string_var("CURRENCY", defaults.currency),
            threshold: parsed_var("THRESHOLD", defaults.threshold)?,
            start_days_out: parsed_var("START_DAYS_OUT", defaults.start_days_out)?,
            end_days_out: parsed_var("END_DAYS_OUT", defaults.end_days_out)?,
            min_trip_days: parsed_var("MIN_TRIP_DAYS", defaults.min_trip_days)?,
            max_trip_days: parsed_var("MAX_TRIP_DAYS", defaults.max_trip_days)?,
            prefer_nonstop: parsed_var("PREFER_NONSTOP", defaults.prefer_nonstop)?,
            max_stops_preferred: parsed_var("MAX_STOPS_PREFERRED", defaults.max_stops_preferred)?,
            max_stops_fallback: parsed_var("MAX_STOPS_FALLBACK", defaults.max_stops_fallback)?,
            outbound_cabin: parsed_var("OUTBOUND_CABIN", defaults.outbound_cabin)?,
            return_cabin: parsed_var("RETURN_CABIN", defaults.return_cabin)?,
            duffel_token,
            slack_webhook_url: env::var("SLACK_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            results_path: env::var("RESULTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_path),
            offer_limit: defaults.offer_limit,
            request_timeout: defaults.request_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    // Window and trip-length invariants. Violations are startup-fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_days_out < 0 {
            return Err(ConfigError::Invalid {
                name: "START_DAYS_OUT",
                reason: "must not be negative".to_string(),
            });
        }
        if self.start_days_out > self.end_days_out {
            return Err(ConfigError::Invalid {
                name: "END_DAYS_OUT",
                reason: format!(
                    "window end {} is before window start {}",
                    self.end_days_out, self.start_days_out
                ),
            });
        }
        if self.min_trip_days < 0 {
            return Err(ConfigError::Invalid {
                name: "MIN_TRIP_DAYS",
                reason: "must not be negative".to_string(),
            });
        }
        if self.min_trip_days > self.max_trip_days {
            return Err(ConfigError::Invalid {
                name: "MAX_TRIP_DAYS",
                reason: format!(
                    "maximum trip length {} is below minimum {}",
                    self.max_trip_days, self.min_trip_days
                ),
            });
        }
        Ok(())
    }
}

fn string_var(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parsed_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let config = ScanConfig::default();
        assert_eq!(config.origin, "ORD");
        assert_eq!(config.destination, "LHR");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.threshold, 2500.0);
        assert_eq!(config.start_days_out, 14);
        assert_eq!(config.end_days_out, 28);
        assert_eq!(config.min_trip_days, 3);
        assert_eq!(config.max_trip_days, 14);
        assert!(config.prefer_nonstop);
        assert_eq!(config.max_stops_preferred, 0);
        assert_eq!(config.max_stops_fallback, 1);
        assert_eq!(config.outbound_cabin, CabinClass::Business);
        assert_eq!(config.return_cabin, CabinClass::PremiumEconomy);
        assert_eq!(config.offer_limit, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let config = ScanConfig {
            start_days_out: 30,
            end_days_out: 14,
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "END_DAYS_OUT", .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_trip_bounds() {
        let config = ScanConfig {
            min_trip_days: 10,
            max_trip_days: 2,
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "MAX_TRIP_DAYS", .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_minimum_trip() {
        let config = ScanConfig {
            min_trip_days: -1,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // Environment access is process-global, so the missing-token and
    // override cases run inside one test to avoid races between threads.
    #[test]
    fn from_env_requires_token_and_applies_overrides() {
        env::remove_var("DUFFEL_TOKEN");
        assert!(matches!(
            ScanConfig::from_env(),
            Err(ConfigError::MissingToken("DUFFEL_TOKEN"))
        ));

        env::set_var("DUFFEL_TOKEN", "duffel_test_token");
        env::set_var("ORIGIN", "JFK");
        env::set_var("DEST", "NRT");
        env::set_var("THRESHOLD", "4000");
        env::set_var("OUTBOUND_CABIN", "first");
        env::set_var("SLACK_WEBHOOK_URL", "");

        let config = ScanConfig::from_env().expect("config should load");
        assert_eq!(config.duffel_token, "duffel_test_token");
        assert_eq!(config.origin, "JFK");
        assert_eq!(config.destination, "NRT");
        assert_eq!(config.threshold, 4000.0);
        assert_eq!(config.outbound_cabin, CabinClass::First);
        assert_eq!(config.slack_webhook_url, None, "empty webhook is unset");

        env::set_var("THRESHOLD", "not-a-number");
        assert!(matches!(
            ScanConfig::from_env(),
            Err(ConfigError::Invalid { name: "THRESHOLD", .. })
        ));

        for name in [
            "DUFFEL_TOKEN",
            "ORIGIN",
            "DEST",
            "THRESHOLD",
            "OUTBOUND_CABIN",
            "SLACK_WEBHOOK_URL",
        ] {
            env::remove_var(name);
        }
    }
}
