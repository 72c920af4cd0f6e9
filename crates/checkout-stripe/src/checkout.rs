//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API.
//! Product price and shipping are charged as one line item so the buyer
//! sees a single total on the hosted page.

use crate::config::StripeConfig;
use crate::signature::verify_signature;
use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutOrder, CheckoutResult, CheckoutSession, CheckoutStatus, Currency,
    PaymentStrategy, WebhookEvent, WebhookEventType,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for card payments.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Form parameters for `POST /v1/checkout/sessions`
    fn build_form(order: &CheckoutOrder, success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                order.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                order.total_amount().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                order.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                order.description().to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        form_params.push(("metadata[order_id]".to_string(), order.id.clone()));
        form_params.push((
            "metadata[product_price]".to_string(),
            format!("{:.2}", order.product_price),
        ));
        form_params.push((
            "metadata[shipping_cost]".to_string(),
            format!("{:.2}", order.shipping.cost),
        ));
        form_params.push((
            "metadata[shipping_service]".to_string(),
            order.description().to_string(),
        ));
        let mut extra: Vec<_> = order.metadata.iter().collect();
        extra.sort();
        for (key, value) in extra {
            form_params.push((format!("metadata[{}]", key), value.clone()));
        }

        form_params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> CheckoutResult<CheckoutSession> {
        let form_params = Self::build_form(order, success_url, cancel_url);

        debug!(
            "Creating Stripe checkout session: total={}, shipping={}",
            order.display_total(),
            order.description()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &order.idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(CheckoutError::provider("stripe", error_response.error.message));
            }

            return Err(CheckoutError::provider(
                "stripe",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let session_response: StripeCheckoutSessionResponse =
            serde_json::from_str(&body).map_err(|e| {
                CheckoutError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        let status = session_response.checkout_status();
        let checkout_url = session_response.url.ok_or_else(|| {
            CheckoutError::provider("stripe", "Checkout session has no redirect URL")
        })?;

        info!(
            "Created Stripe checkout session: id={}, total={}",
            session_response.id,
            order.display_total()
        );

        let mut session = CheckoutSession::new(
            session_response.id,
            order.id.clone(),
            "stripe",
            checkout_url,
            session_response.amount_total.unwrap_or_else(|| order.total_amount()),
        );
        session.status = status;
        session.expires_at = session_response
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        Ok(session)
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> CheckoutResult<WebhookEvent> {
        verify_signature(
            &self.config.webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
            self.config.webhook_tolerance_secs,
        )?;

        parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

/// Parse a verified Stripe event body
pub fn parse_event(payload: &[u8]) -> CheckoutResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        CheckoutError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let object = &event.data.object;
    let str_field = |name: &str| object.get(name).and_then(|v| v.as_str()).map(String::from);

    let session_id = str_field("id");
    let currency = str_field("currency").map(|c| Currency::from_code(&c));
    let amount_paid = object.get("amount_total").and_then(|v| v.as_i64());
    let customer_email = object
        .get("customer_details")
        .and_then(|cd| cd.get("email"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(WebhookEvent {
        event_type: WebhookEventType::from_stripe(&event.event_type),
        event_id: event.id,
        provider: "stripe".to_string(),
        session_id,
        customer_email,
        amount_paid,
        currency,
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        raw_data: Some(serde_json::Value::Object(event.data.object)),
    })
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl StripeCheckoutSessionResponse {
    fn checkout_status(&self) -> CheckoutStatus {
        match self.status.as_deref() {
            Some("complete") => CheckoutStatus::Complete,
            Some("expired") => CheckoutStatus::Expired,
            _ => CheckoutStatus::Open,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}
