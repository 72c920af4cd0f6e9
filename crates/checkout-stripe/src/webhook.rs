//! # Stripe Webhook Handling
//!
//! Verified events are routed to a `WebhookHandler`. The default handler
//! only logs; fulfilment (order records, emails, shipment creation) would
//! hang off `on_checkout_completed`.

use checkout_core::{
    CheckoutError, CheckoutResult, Currency, WebhookEvent, WebhookEventType,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Parsed checkout.session.completed event data
#[derive(Debug, Clone)]
pub struct CheckoutCompletedData {
    pub session_id: String,
    pub customer_email: Option<String>,
    pub amount_total: i64,
    pub currency: Currency,
    pub payment_status: String,
    pub metadata: HashMap<String, String>,
}

impl CheckoutCompletedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> CheckoutResult<Self> {
        let obj = event
            .raw_data
            .as_ref()
            .and_then(|raw| raw.as_object())
            .ok_or_else(|| {
                CheckoutError::WebhookParseError("Event data is not an object".to_string())
            })?;

        let session_id = event
            .session_id
            .clone()
            .ok_or_else(|| CheckoutError::WebhookParseError("Missing session id".to_string()))?;

        let payment_status = obj
            .get("payment_status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let metadata = obj
            .get("metadata")
            .and_then(|m| m.as_object())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_id,
            customer_email: event.customer_email.clone(),
            amount_total: event.amount_paid.unwrap_or(0),
            currency: event.currency.unwrap_or_default(),
            payment_status,
            metadata,
        })
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// Shipping service the buyer chose, as recorded at session creation
    pub fn shipping_service(&self) -> Option<&str> {
        self.metadata.get("shipping_service").map(|s| s.as_str())
    }
}

/// Webhook event handler trait
///
/// Implement this trait to act on payment events.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    fn on_checkout_completed(&self, data: CheckoutCompletedData) -> CheckoutResult<()> {
        info!(
            "Payment completed: session={}, email={}, amount_total={}, shipping={}",
            data.session_id,
            data.customer_email.as_deref().unwrap_or("unknown"),
            data.amount_total,
            data.shipping_service().unwrap_or("unknown")
        );
        Ok(())
    }

    /// Called when a checkout session expires unpaid
    fn on_checkout_expired(&self, event: &WebhookEvent) -> CheckoutResult<()> {
        info!("Checkout expired: {:?}", event.session_id);
        Ok(())
    }

    /// Called when a delayed payment method fails
    fn on_async_payment_failed(&self, event: &WebhookEvent) -> CheckoutResult<()> {
        warn!("Async payment failed: {:?}", event.session_id);
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> CheckoutResult<()> {
        debug!("Unhandled webhook event: {:?}", event.event_type);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> CheckoutResult<()> {
    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            let data = CheckoutCompletedData::from_event(&event)?;
            handler.on_checkout_completed(data)
        }
        WebhookEventType::CheckoutExpired => handler.on_checkout_expired(&event),
        WebhookEventType::AsyncPaymentFailed => handler.on_async_payment_failed(&event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(&event),
    }
}

/// Events that should be enabled in the Stripe Dashboard for this endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.expired",
    "checkout.session.async_payment_failed",
];
