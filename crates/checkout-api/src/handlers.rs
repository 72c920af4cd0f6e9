//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Inputs are validated before any call to the carrier or payment provider.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use checkout_core::money::validate_amount;
use checkout_core::{CheckoutError, CheckoutOrder, Currency, RateQuote, ShippingSelection};
use checkout_stripe::dispatch_webhook_event;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Shipping rate request
#[derive(Debug, Deserialize)]
pub struct ShippingRatesRequest {
    /// Destination postal code (string or number)
    #[serde(default)]
    pub zip: Option<Value>,
}

/// Create checkout request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Destination postal code
    #[serde(default)]
    pub zip: Option<Value>,
    /// Decimal product price; must be a JSON number
    #[serde(default)]
    pub product_price: Option<Value>,
    /// Chosen rate cost; looked up when absent or not a number
    #[serde(default)]
    pub shipping_cost: Option<Value>,
    /// Chosen service name, shown as the line-item description
    #[serde(default)]
    pub shipping_name: Option<Value>,
}

/// Create checkout response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCheckoutResponse {
    /// Hosted payment page (redirect the buyer here)
    pub url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message, status.as_u16())))
}

/// Client errors keep their message; upstream failures get `public_message`
fn checkout_error_to_response(err: CheckoutError, public_message: &str) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        api_error(status, err.to_string())
    } else {
        api_error(status, public_message)
    }
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection.body_text());
    api_error(StatusCode::BAD_REQUEST, "Invalid JSON body")
}

/// Accept a non-empty string or a bare number as a postal code
pub fn parse_zip(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "overnight-checkout",
        "version": env!("CARGO_PKG_VERSION"),
        "rates": state.rates.provider_name(),
        "payments": state.payments.provider_name(),
    }))
}

/// Fetch the offered overnight rates for a destination
#[instrument(skip(state, payload))]
pub async fn get_shipping_rates(
    State(state): State<AppState>,
    payload: Result<Json<ShippingRatesRequest>, JsonRejection>,
) -> Result<Json<Vec<RateQuote>>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;

    let zip = parse_zip(request.zip.as_ref())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing zip code"))?;

    let rates = state.rates.get_rates(&zip).await.map_err(|e| {
        error!("Shipping rate fetch error: {}", e);
        checkout_error_to_response(e, "Failed to fetch shipping rates")
    })?;

    info!("Returning {} shipping rates for {}", rates.len(), zip);
    Ok(Json(rates))
}

/// Create a hosted checkout session for product price plus shipping
#[instrument(skip(state, payload))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_json)?;

    let zip = parse_zip(request.zip.as_ref());
    let product_price = request.product_price.as_ref().and_then(Value::as_f64);
    let (Some(zip), Some(product_price)) = (zip, product_price) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing or invalid zip/productPrice",
        ));
    };

    validate_amount("productPrice", product_price)
        .map_err(|e| checkout_error_to_response(e, "Invalid order"))?;

    let shipping_name = request
        .shipping_name
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let shipping = match request.shipping_cost.as_ref().and_then(Value::as_f64) {
        Some(cost) => ShippingSelection::new(shipping_name, cost),
        None => {
            let quote = default_rate(&state, &zip).await?;
            ShippingSelection::new(shipping_name.or(Some(quote.service_name)), quote.shipment_cost)
        }
    };

    let order = CheckoutOrder::new(
        state.config.product_name.clone(),
        product_price,
        shipping,
        Currency::USD,
    )
    .map_err(|e| checkout_error_to_response(e, "Invalid order"))?
    .with_metadata("zip", zip.clone());

    info!(
        "Creating checkout: zip={}, total={}, shipping={}",
        zip,
        order.display_total(),
        order.description()
    );

    let session = state
        .payments
        .create_checkout(&order, &state.success_url(), state.cancel_url())
        .await
        .map_err(|e| {
            error!("Stripe session creation failed: {}", e);
            checkout_error_to_response(e, "Failed to create Stripe session")
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CreateCheckoutResponse {
        url: session.checkout_url,
    }))
}

/// First offered rate, used when the client did not pick one
async fn default_rate(state: &AppState, zip: &str) -> Result<RateQuote, ApiError> {
    let rates = state.rates.get_rates(zip).await.map_err(|e| {
        error!("Default shipping rate lookup failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get shipping cost")
    })?;

    rates.into_iter().next().ok_or_else(|| {
        error!("{}", CheckoutError::NoRatesAvailable { zip: zip.to_string() });
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get shipping cost")
    })
}

/// Handle payment provider webhook
#[instrument(skip(state, headers, body))]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Webhook Error: Missing Stripe-Signature header".to_string(),
            )
        })?;

    let event = state
        .payments
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook signature verification failed: {}", e);
            (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", e))
        })?;

    info!(
        "Received webhook: type={:?}, id={}",
        event.event_type, event.event_id
    );

    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), event) {
        error!("Webhook handler error: {}", e);
    }

    Ok(Json(serde_json::json!({ "received": true })))
}

/// Any method other than POST/OPTIONS on an API route
pub async fn method_not_allowed() -> ApiError {
    api_error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Bare OPTIONS request (real preflights are answered by the CORS layer)
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Order confirmation page
pub async fn checkout_success() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; padding: 2rem;">
    <h1>🎉 Payment Successful!</h1>
    <p>Thank you for your order. Your shipment will be processed soon.</p>
</body>
</html>
"#,
    )
}

/// Checkout cancel page
pub async fn checkout_cancel() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Cancelled</title></head>
<body style="font-family: system-ui; padding: 2rem;">
    <h1>Payment Cancelled</h1>
    <p>No charges were made.</p>
</body>
</html>
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Missing zip code", 400);
        assert_eq!(err.message, "Missing zip code");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_parse_zip() {
        assert_eq!(parse_zip(Some(&json!("94107"))), Some("94107".to_string()));
        assert_eq!(parse_zip(Some(&json!(" 10001 "))), Some("10001".to_string()));
        assert_eq!(parse_zip(Some(&json!(30301))), Some("30301".to_string()));
        assert_eq!(parse_zip(Some(&json!(""))), None);
        assert_eq!(parse_zip(Some(&json!(null))), None);
        assert_eq!(parse_zip(Some(&json!(["94107"]))), None);
        assert_eq!(parse_zip(None), None);
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = CheckoutError::InvalidPrice {
            message: "productPrice must not be negative".into(),
        };
        let (status, Json(body)) = checkout_error_to_response(err, "Invalid order");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid price: productPrice must not be negative");
    }

    #[test]
    fn test_upstream_errors_are_generic() {
        let err = CheckoutError::provider("stripe", "sk_test key revoked");
        let (status, Json(body)) =
            checkout_error_to_response(err, "Failed to create Stripe session");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.message, "Failed to create Stripe session");
        assert_eq!(body.code, 502);
    }
}
