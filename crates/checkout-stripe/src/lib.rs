//! # checkout-stripe
//!
//! Stripe payment strategy for the overnight checkout service.
//!
//! `StripeCheckoutStrategy` creates hosted Checkout Sessions charging the
//! product price plus shipping as a single line item, and verifies
//! `Stripe-Signature` headers on incoming webhooks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_stripe::StripeCheckoutStrategy;
//! use checkout_core::PaymentStrategy;
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let session = strategy.create_checkout(&order, success_url, cancel_url).await?;
//! // Redirect the buyer to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use checkout_stripe::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = strategy.verify_webhook(payload, signature).await?;
//! dispatch_webhook_event(&LoggingWebhookHandler, event)?;
//! ```

pub mod checkout;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use checkout::{parse_event, StripeCheckoutStrategy};
pub use config::StripeConfig;
pub use signature::{sign_payload, verify_signature};
pub use webhook::{
    dispatch_webhook_event, CheckoutCompletedData, LoggingWebhookHandler, WebhookHandler,
    REQUIRED_WEBHOOK_EVENTS,
};
