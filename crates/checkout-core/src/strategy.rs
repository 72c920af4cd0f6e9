//! # Provider Traits
//!
//! The two external collaborators of the checkout flow sit behind traits so
//! the HTTP layer can be exercised without network access.
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │  RateProvider (trait)    │      │  PaymentStrategy (trait)     │
//! │  └── get_rates()         │      │  ├── create_checkout()       │
//! └────────────┬─────────────┘      │  ├── verify_webhook()        │
//!              │                    │  └── provider_name()         │
//!     ┌────────┴────────┐           └──────────────┬───────────────┘
//!     │ ShipStationRates│                  ┌───────┴────────┐
//!     └─────────────────┘                  │ StripeCheckout │
//!                                          └────────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::order::{CheckoutOrder, CheckoutSession, WebhookEvent};
use crate::shipping::RateQuote;
use async_trait::async_trait;
use std::sync::Arc;

/// Carrier rate lookup for a destination postal code.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch quotes for the configured shipment profile to `zip`,
    /// already restricted to the offered service levels.
    async fn get_rates(&self, zip: &str) -> CheckoutResult<Vec<RateQuote>>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Hosted payment session provider.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a checkout session and return the redirect URL.
    ///
    /// # Arguments
    /// * `order` - The order to check out
    /// * `success_url` - URL to redirect after successful payment
    /// * `cancel_url` - URL to redirect if the buyer cancels
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> CheckoutResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> CheckoutResult<WebhookEvent>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Shared rate provider (dynamic dispatch)
pub type BoxedRateProvider = Arc<dyn RateProvider>;

/// Shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Redirect targets handed to the payment provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Page shown after successful payment
    pub success_url: String,
    /// Page shown when the buyer abandons the payment page
    pub cancel_url: String,
}

impl CheckoutUrls {
    pub fn new(success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Success URL with the provider's session ID template appended
    pub fn success_url_with_session(&self) -> String {
        let sep = if self.success_url.contains('?') { '&' } else { '?' };
        format!("{}{}session_id={{CHECKOUT_SESSION_ID}}", self.success_url, sep)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new(
            "https://thehyun.com/order-confirmation",
            "https://thehyun.com/checkout",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::default();

        assert_eq!(urls.success_url, "https://thehyun.com/order-confirmation");
        assert_eq!(urls.cancel_url, "https://thehyun.com/checkout");
    }

    #[test]
    fn test_success_url_with_session() {
        let urls = CheckoutUrls::new("https://shop.test/done", "https://shop.test/cart");
        assert_eq!(
            urls.success_url_with_session(),
            "https://shop.test/done?session_id={CHECKOUT_SESSION_ID}"
        );

        let urls = CheckoutUrls::new("https://shop.test/done?ref=mail", "https://shop.test/cart");
        assert_eq!(
            urls.success_url_with_session(),
            "https://shop.test/done?ref=mail&session_id={CHECKOUT_SESSION_ID}"
        );
    }
}
