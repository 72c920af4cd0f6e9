//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the rate provider, the payment strategy and configuration.

use anyhow::Context;
use checkout_core::{BoxedPaymentStrategy, BoxedRateProvider, CheckoutUrls};
use checkout_rates::{load_shipment_profile, ShipStationRates};
use checkout_stripe::{LoggingWebhookHandler, StripeCheckoutStrategy, WebhookHandler};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Storefront origin allowed to call the API from a browser
    pub allowed_origin: String,
    /// Line-item name on the hosted payment page
    pub product_name: String,
    /// Path of the TOML shipment profile
    pub shipping_profile_path: String,
    /// Redirect after successful payment
    pub success_url: String,
    /// Redirect when the buyer cancels
    pub cancel_url: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let var = |name: &str, default: String| std::env::var(name).unwrap_or(default);

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            host: var("HOST", defaults.host),
            environment: var("ENVIRONMENT", defaults.environment),
            allowed_origin: var("ALLOWED_ORIGIN", defaults.allowed_origin),
            product_name: var("PRODUCT_NAME", defaults.product_name),
            shipping_profile_path: var("SHIPPING_PROFILE", defaults.shipping_profile_path),
            success_url: var("SUCCESS_URL", defaults.success_url),
            cancel_url: var("CANCEL_URL", defaults.cancel_url),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Redirect targets for the payment page
    pub fn checkout_urls(&self) -> CheckoutUrls {
        CheckoutUrls::new(&self.success_url, &self.cancel_url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let urls = CheckoutUrls::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            allowed_origin: "https://www.thehyun.com".to_string(),
            product_name: "Your Product".to_string(),
            shipping_profile_path: "config/shipping.toml".to_string(),
            success_url: urls.success_url,
            cancel_url: urls.cancel_url,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Carrier rate lookup
    pub rates: BoxedRateProvider,
    /// Hosted payment sessions and webhook verification
    pub payments: BoxedPaymentStrategy,
    /// Receives verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Checkout URLs
    pub urls: CheckoutUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with ShipStation rates and Stripe payments
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let profile = load_shipment_profile(&config.shipping_profile_path)
            .map_err(|e| anyhow::anyhow!("Failed to load shipment profile: {}", e))?;

        let rates = ShipStationRates::from_env(profile)
            .map_err(|e| anyhow::anyhow!("Failed to initialize ShipStation: {}", e))?;

        let payments = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::with_providers(
            config,
            Arc::new(rates),
            Arc::new(payments),
        ))
    }

    /// Assemble state from explicit providers
    pub fn with_providers(
        config: AppConfig,
        rates: BoxedRateProvider,
        payments: BoxedPaymentStrategy,
    ) -> Self {
        Self {
            rates,
            payments,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            urls: config.checkout_urls(),
            config,
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    /// Success URL with session ID placeholder
    pub fn success_url(&self) -> String {
        self.urls.success_url_with_session()
    }

    /// Cancel URL
    pub fn cancel_url(&self) -> &str {
        &self.urls.cancel_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin, "https://www.thehyun.com");
        assert_eq!(config.product_name, "Your Product");
        assert!(!config.is_production());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
