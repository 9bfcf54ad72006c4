//! Register configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `REGISTER_HOST` - Bind address (default: 127.0.0.1)
//! - `REGISTER_PORT` - Listen port (default: 3002)
//! - `REGISTER_TAX_RATE` - Default sales tax fraction (default: 0.10)
//! - `REGISTER_STORE_TAX_RATES` - Per-store overrides, e.g. `1=0.08,2=0.0725`
//! - `REGISTER_STORE_ID` - Store this register belongs to
//! - `REGISTER_PAYMENT_METHODS` - `id:Label` pairs, first is the default
//!   (default: `cash:Cash,card:Card,credit:Store Credit`)
//! - `REGISTER_SETTLEMENT_DELAY_MS` - Simulated settlement delay (default: 1500)
//! - `REGISTER_SEED_FILE` - YAML catalog seed loaded at start-up
//! - `REGISTER_STORE_NAME` - Name printed on receipts (default: Tillpoint)
//! - `REGISTER_VOICE_ENABLED` - Accept voice events (default: true)
//! - `REGISTER_LOG_JSON` - Emit JSON logs when set to `true` or `1`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use tillpoint_core::{PaymentMethod, StoreId, TaxRate};

use crate::cart::TaxPolicy;
use crate::checkout::CheckoutConfig;
use crate::payment::PaymentMethods;

const DEFAULT_PAYMENT_METHODS: &str = "cash:Cash,card:Card,credit:Store Credit";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Register application configuration.
#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Tax rates and payment methods for checkout
    pub checkout: CheckoutConfig,
    /// Delay of the simulated payment gateway
    pub settlement_delay: Duration,
    /// YAML catalog seed loaded at start-up
    pub seed_file: Option<PathBuf>,
    /// Name printed on receipts and reports
    pub store_name: String,
    /// Whether voice events are accepted
    pub voice_enabled: bool,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3002,
            checkout: CheckoutConfig::default(),
            settlement_delay: crate::payment::DEFAULT_SETTLEMENT_DELAY,
            seed_file: None,
            store_name: "Tillpoint".to_string(),
            voice_enabled: true,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl RegisterConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("REGISTER_HOST", "127.0.0.1")?;
        let port = parse_env("REGISTER_PORT", "3002")?;

        let default_rate: TaxRate = parse_env("REGISTER_TAX_RATE", "0.10")?;
        let store_rates = get_optional_env("REGISTER_STORE_TAX_RATES")
            .map(|raw| {
                parse_store_rates(&raw).map_err(|e| invalid("REGISTER_STORE_TAX_RATES", e))
            })
            .transpose()?
            .unwrap_or_default();
        let tax_policy = store_rates
            .into_iter()
            .fold(TaxPolicy::new(default_rate), |policy, (store, rate)| {
                policy.with_store_rate(store, rate)
            });

        let store_id = get_optional_env("REGISTER_STORE_ID")
            .map(|raw| {
                raw.trim()
                    .parse::<StoreId>()
                    .map_err(|e| invalid("REGISTER_STORE_ID", e))
            })
            .transpose()?;

        let payment_methods = parse_payment_methods(&get_env_or_default(
            "REGISTER_PAYMENT_METHODS",
            DEFAULT_PAYMENT_METHODS,
        ))
        .map_err(|e| invalid("REGISTER_PAYMENT_METHODS", e))?;

        let delay_ms: u64 = parse_env("REGISTER_SETTLEMENT_DELAY_MS", "1500")?;

        Ok(Self {
            host,
            port,
            checkout: CheckoutConfig {
                payment_methods,
                tax_policy,
                store_id,
            },
            settlement_delay: Duration::from_millis(delay_ms),
            seed_file: get_optional_env("REGISTER_SEED_FILE").map(PathBuf::from),
            store_name: get_env_or_default("REGISTER_STORE_NAME", "Tillpoint"),
            voice_enabled: parse_flag(&get_env_or_default("REGISTER_VOICE_ENABLED", "true")),
            log_json: parse_flag(&get_env_or_default("REGISTER_LOG_JSON", "false")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(key, e))
}

fn invalid(key: &str, error: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), error.to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse `store=rate` pairs separated by commas.
fn parse_store_rates(raw: &str) -> Result<Vec<(StoreId, TaxRate)>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (store, rate) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected store=rate, got '{entry}'"))?;
            let store = store
                .trim()
                .parse::<StoreId>()
                .map_err(|_| format!("invalid store id '{}'", store.trim()))?;
            let rate = rate.parse::<TaxRate>().map_err(|e| e.to_string())?;
            Ok((store, rate))
        })
        .collect()
}

/// Parse `id:Label` pairs separated by commas. A bare id is its own label.
fn parse_payment_methods(raw: &str) -> Result<PaymentMethods, String> {
    let methods = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, label) = entry.split_once(':').unwrap_or((entry, entry));
            let (id, label) = (id.trim(), label.trim());
            if id.is_empty() {
                return Err(format!("missing payment method id in '{entry}'"));
            }
            Ok(PaymentMethod::new(id, if label.is_empty() { id } else { label }))
        })
        .collect::<Result<Vec<_>, String>>()?;
    PaymentMethods::new(methods).ok_or_else(|| "at least one payment method is required".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use tillpoint_core::PaymentMethodId;

    use super::*;

    #[test]
    fn test_parse_store_rates() {
        let rates = parse_store_rates("1=0.08, 2=0.0725,").unwrap();
        assert_eq!(
            rates,
            vec![
                (StoreId::new(1), TaxRate::new(Decimal::new(8, 2)).unwrap()),
                (StoreId::new(2), TaxRate::new(Decimal::new(725, 4)).unwrap()),
            ]
        );
    }

    #[test]
    fn test_parse_store_rates_rejects_bad_entries() {
        assert!(parse_store_rates("1:0.08").is_err());
        assert!(parse_store_rates("x=0.08").is_err());
        assert!(parse_store_rates("1=-0.08").is_err());
    }

    #[test]
    fn test_parse_payment_methods_keeps_order() {
        let methods = parse_payment_methods(DEFAULT_PAYMENT_METHODS).unwrap();
        assert_eq!(methods.default_method().id, PaymentMethodId::new("cash"));
        assert_eq!(
            methods.get(&PaymentMethodId::new("credit")).unwrap().label,
            "Store Credit"
        );
    }

    #[test]
    fn test_parse_payment_methods_bare_id() {
        let methods = parse_payment_methods("voucher").unwrap();
        assert_eq!(methods.default_method().label, "voucher");
    }

    #[test]
    fn test_parse_payment_methods_rejects_empty() {
        assert!(parse_payment_methods(" , ").is_err());
        assert!(parse_payment_methods(":Cash").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_default_socket_addr() {
        let config = RegisterConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3002");
        assert!(config.voice_enabled);
    }
}
