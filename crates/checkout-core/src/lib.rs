//! # checkout-core
//!
//! Core types and traits for the overnight shipping checkout service.
//!
//! This crate provides:
//! - `RateProvider` and `PaymentStrategy` traits for the two external providers
//! - `ShipmentProfile` and `RateQuote` for carrier rate lookups
//! - `CheckoutOrder`, `CheckoutSession` and `WebhookEvent` for the payment flow
//! - `Currency` for decimal-to-cents conversion
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutOrder, Currency, ShippingSelection};
//!
//! let quotes = rates.get_rates("94107").await?;
//! let order = CheckoutOrder::new("Your Product", 49.99, quotes[0].clone().into(), Currency::USD)?;
//!
//! let session = payments.create_checkout(&order, &urls.success_url, &urls.cancel_url).await?;
//! // Redirect the buyer to session.checkout_url
//! ```

pub mod error;
pub mod money;
pub mod order;
pub mod shipping;
pub mod strategy;

// Re-exports for convenience
pub use error::{CheckoutError, CheckoutResult};
pub use money::Currency;
pub use order::{
    CheckoutOrder, CheckoutSession, CheckoutStatus, WebhookEvent, WebhookEventType,
};
pub use shipping::{Dimensions, RateQuote, ShipmentProfile, ShippingSelection, Weight};
pub use strategy::{
    BoxedPaymentStrategy, BoxedRateProvider, CheckoutUrls, PaymentStrategy, RateProvider,
};
