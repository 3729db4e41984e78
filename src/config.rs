use crate::domain::money::{Fare, Rupees};
use crate::domain::payment::CheckoutBranding;
use crate::error::{BookingError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "railbook.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_base_url: String,
    pub gateway_key: String,
    pub currency: String,
    pub unit_price: Decimal,
    pub merchant_name: String,
    pub description: String,
    pub theme_color: String,
    pub request_timeout_secs: u64,
    pub checkout_timeout_secs: u64,
    pub token_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8222".into(),
            gateway_key: String::new(),
            currency: "INR".into(),
            unit_price: dec!(140),
            merchant_name: "Train Ticket Booking".into(),
            description: "Book your train tickets with ease".into(),
            theme_color: "#3399cc".into(),
            request_timeout_secs: 30,
            checkout_timeout_secs: 900,
            token_file: None,
        }
    }
}

impl Settings {
    pub fn fare(&self) -> Result<Fare> {
        Fare::new(Rupees::new(self.unit_price))
    }

    /// Checkout settings. Fails when no gateway key is configured.
    pub fn branding(&self) -> Result<CheckoutBranding> {
        if self.gateway_key.trim().is_empty() {
            return Err(BookingError::ConfigError(
                "gateway_key is not set (RAILBOOK_GATEWAY_KEY)".to_string(),
            ));
        }
        Ok(CheckoutBranding {
            key: self.gateway_key.clone(),
            merchant_name: self.merchant_name.clone(),
            description: self.description.clone(),
            theme_color: self.theme_color.clone(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout_timeout_secs)
    }
}

/// Defaults, then the TOML file, then `RAILBOOK_*` environment variables.
///
/// An explicitly named file must exist; the default `railbook.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn read_file(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path).map_err(|e| {
        BookingError::ConfigError(format!("cannot read {}: {e}", path.display()))
    })?;
    toml::from_str(&raw)
        .map_err(|e| BookingError::ConfigError(format!("invalid {}: {e}", path.display())))
}

pub fn apply_env<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("RAILBOOK_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("RAILBOOK_GATEWAY_KEY") {
        settings.gateway_key = v;
    }
    if let Some(v) = lookup("RAILBOOK_CURRENCY") {
        settings.currency = v;
    }
    if let Some(v) = lookup("RAILBOOK_UNIT_PRICE") {
        settings.unit_price = parse_env("RAILBOOK_UNIT_PRICE", &v)?;
    }
    if let Some(v) = lookup("RAILBOOK_REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_env("RAILBOOK_REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("RAILBOOK_CHECKOUT_TIMEOUT_SECS") {
        settings.checkout_timeout_secs = parse_env("RAILBOOK_CHECKOUT_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("RAILBOOK_TOKEN_FILE") {
        settings.token_file = Some(PathBuf::from(v));
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| BookingError::ConfigError(format!("{key}={raw}: {e}")))
}
