//! # ShipStation Configuration
//!
//! API credentials are loaded from environment variables; the shipment
//! profile comes from an optional TOML file.

use checkout_core::{CheckoutError, ShipmentProfile};
use std::env;
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "https://ssapi.shipstation.com";

/// ShipStation API configuration
#[derive(Debug, Clone)]
pub struct ShipStationConfig {
    /// API key (Basic auth user)
    pub api_key: String,

    /// API secret (Basic auth password)
    pub api_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl ShipStationConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SHIPSTATION_API_KEY`
    /// - `SHIPSTATION_API_SECRET`
    ///
    /// Optional: `SHIPSTATION_API_BASE_URL`
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let api_key = non_empty_var("SHIPSTATION_API_KEY")?;
        let api_secret = non_empty_var("SHIPSTATION_API_SECRET")?;
        let api_base_url = env::var("SHIPSTATION_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        Ok(Self::new(api_key, api_secret).with_api_base_url(api_base_url))
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Rate endpoint URL
    pub fn rates_url(&self) -> String {
        format!("{}/shipments/getrates", self.api_base_url)
    }
}

fn non_empty_var(name: &str) -> Result<String, CheckoutError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CheckoutError::Configuration(format!("{} not set", name))),
    }
}

/// Load the shipment profile from `path`, or the built-in default when the
/// file does not exist.
pub fn load_shipment_profile(path: impl AsRef<Path>) -> Result<ShipmentProfile, CheckoutError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let profile = ShipmentProfile::from_toml(&content).map_err(|e| {
                CheckoutError::Configuration(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    e
                ))
            })?;
            tracing::info!(
                "Loaded shipment profile from {} ({} services)",
                path.display(),
                profile.allowed_services.len()
            );
            Ok(profile)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                "No shipment profile at {}, using built-in overnight profile",
                path.display()
            );
            Ok(ShipmentProfile::default())
        }
        Err(e) => Err(CheckoutError::Configuration(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
