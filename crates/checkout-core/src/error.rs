//! # Checkout Error Types
//!
//! Typed error handling for the checkout service.
//! Rate lookups, session creation and webhook verification all return
//! `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Negative, NaN or otherwise unusable amount
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Carrier or payment provider answered with a non-2xx status
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The carrier returned no rate for the designated service levels
    #[error("No shipping rates available for {zip}")]
    NoRatesAvailable { zip: String },

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CheckoutError {
    /// Shorthand for a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CheckoutError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by bad caller input
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidPrice { .. } => 400,
            CheckoutError::ProviderError { .. } => 502,
            CheckoutError::NetworkError(_) => 503,
            CheckoutError::NoRatesAvailable { .. } => 500,
            CheckoutError::WebhookVerificationFailed(_) => 400,
            CheckoutError::WebhookParseError(_) => 400,
            CheckoutError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
