//! # Order Types
//!
//! The single-item order built from a product price and a chosen shipping
//! rate, plus the checkout session and webhook event types exchanged with
//! the payment provider.

use crate::error::CheckoutResult;
use crate::money::{display_amount, validate_amount, Currency};
use crate::shipping::ShippingSelection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// An order to be checked out: one product plus its shipping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    /// Unique order ID (generated)
    pub id: String,

    /// Line-item name shown on the hosted payment page
    pub product_name: String,

    /// Decimal product price
    pub product_price: f64,

    /// Shipping the buyer selected (or the default rate)
    pub shipping: ShippingSelection,

    pub currency: Currency,

    /// Idempotency key (prevents duplicate sessions on client retries)
    pub idempotency_key: String,

    /// Custom metadata forwarded to the provider
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    pub created_at: DateTime<Utc>,
}

impl CheckoutOrder {
    /// Create a new order with a generated ID.
    ///
    /// Fails when either amount, or their sum, is negative or not finite.
    pub fn new(
        product_name: impl Into<String>,
        product_price: f64,
        shipping: ShippingSelection,
        currency: Currency,
    ) -> CheckoutResult<Self> {
        validate_amount("productPrice", product_price)?;
        validate_amount("shippingCost", shipping.cost)?;
        validate_amount("total", product_price + shipping.cost)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            product_name: product_name.into(),
            product_price,
            shipping,
            currency,
            idempotency_key: Uuid::new_v4().to_string(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Charge amount in the smallest currency unit:
    /// `round((product_price + shipping) * 100)` for two-decimal currencies.
    pub fn total_amount(&self) -> i64 {
        self.currency
            .to_smallest_unit(self.product_price + self.shipping.cost)
    }

    /// Total formatted for logs
    pub fn display_total(&self) -> String {
        display_amount(self.total_amount(), self.currency)
    }

    /// Line-item description
    pub fn description(&self) -> &str {
        self.shipping.description()
    }

    /// Set idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Status of a checkout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Session created, awaiting payment
    #[default]
    Open,
    /// Payment completed successfully
    Complete,
    /// Session expired
    Expired,
}

/// A checkout session created by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Our internal order ID
    pub order_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// URL to redirect the buyer to for payment
    pub checkout_url: String,

    #[serde(default)]
    pub status: CheckoutStatus,

    /// Charged amount in the smallest currency unit
    pub amount_total: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(
        session_id: impl Into<String>,
        order_id: impl Into<String>,
        provider: impl Into<String>,
        checkout_url: impl Into<String>,
        amount_total: i64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            order_id: order_id.into(),
            provider: provider.into(),
            checkout_url: checkout_url.into(),
            status: CheckoutStatus::Open,
            amount_total,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if session is still valid
    pub fn is_active(&self) -> bool {
        matches!(self.status, CheckoutStatus::Open)
            && self
                .expires_at
                .map(|exp| exp > Utc::now())
                .unwrap_or(true)
    }
}

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed
    CheckoutCompleted,
    /// Checkout session expired without payment
    CheckoutExpired,
    /// Delayed payment method failed after the session completed
    AsyncPaymentFailed,
    /// Unknown event (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a Stripe event type string
    pub fn from_stripe(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            "checkout.session.expired" => WebhookEventType::CheckoutExpired,
            "checkout.session.async_payment_failed" => WebhookEventType::AsyncPaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Related session ID (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Amount paid (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,

    /// Raw event object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}
