//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - API (browser-facing, CORS restricted to the storefront origin):
///   - POST /api/get-shipping-rates - Overnight rates for a ZIP
///   - POST /api/create-checkout-session - Hosted payment page for price + shipping
///
/// - Webhooks (server-to-server, raw body, no CORS):
///   - POST /api/webhook - Payment provider events
///
/// - Pages:
///   - GET /success - Order confirmation
///   - GET /cancel - Payment cancelled
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);

    let api_routes = Router::new()
        .route(
            "/get-shipping-rates",
            post(handlers::get_shipping_rates)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(cors);

    let webhook_routes = Router::new().route(
        "/webhook",
        post(handlers::payment_webhook).fallback(handlers::method_not_allowed),
    );

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/success", get(handlers::checkout_success))
        .route("/cancel", get(handlers::checkout_cancel))
        .nest("/api", api_routes.merge(webhook_routes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the storefront: POST with a JSON body from one origin
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(allowed_origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!("Ignoring invalid ALLOWED_ORIGIN {:?}: {}", allowed_origin, e);
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use checkout_core::{
        CheckoutError, CheckoutOrder, CheckoutResult, CheckoutSession, PaymentStrategy,
        RateProvider, RateQuote, WebhookEvent,
    };
    use checkout_stripe::{
        sign_payload, CheckoutCompletedData, StripeCheckoutStrategy, StripeConfig,
        WebhookHandler,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    struct FakeRates {
        quotes: Vec<RateQuote>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeRates {
        fn with_quotes(quotes: Vec<RateQuote>) -> Arc<Self> {
            Arc::new(Self {
                quotes,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                quotes: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RateProvider for FakeRates {
        async fn get_rates(&self, _zip: &str) -> CheckoutResult<Vec<RateQuote>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CheckoutError::provider("shipstation", "ShipStation error: 500"));
            }
            Ok(self.quotes.clone())
        }

        fn provider_name(&self) -> &'static str {
            "fake-rates"
        }
    }

    /// Records orders; verifies webhooks with the real Stripe scheme
    struct FakePayments {
        orders: Mutex<Vec<CheckoutOrder>>,
        stripe: StripeCheckoutStrategy,
    }

    impl FakePayments {
        fn new() -> Arc<Self> {
            let config = StripeConfig::new("sk_test_fake", WEBHOOK_SECRET)
                .with_api_base_url("http://127.0.0.1:9");
            Arc::new(Self {
                orders: Mutex::new(Vec::new()),
                stripe: StripeCheckoutStrategy::new(config).unwrap(),
            })
        }

        fn calls(&self) -> usize {
            self.orders.lock().unwrap().len()
        }

        fn last_order(&self) -> CheckoutOrder {
            self.orders.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl PaymentStrategy for FakePayments {
        async fn create_checkout(
            &self,
            order: &CheckoutOrder,
            _success_url: &str,
            _cancel_url: &str,
        ) -> CheckoutResult<CheckoutSession> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(CheckoutSession::new(
                "cs_test_fake",
                order.id.clone(),
                "stripe",
                "https://checkout.stripe.com/c/pay/cs_test_fake",
                order.total_amount(),
            ))
        }

        async fn verify_webhook(
            &self,
            payload: &[u8],
            signature: &str,
        ) -> CheckoutResult<WebhookEvent> {
            self.stripe.verify_webhook(payload, signature).await
        }

        fn provider_name(&self) -> &'static str {
            "stripe"
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        completed: AtomicUsize,
    }

    impl WebhookHandler for CountingHandler {
        fn on_checkout_completed(&self, _data: CheckoutCompletedData) -> CheckoutResult<()> {
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn overnight_quotes() -> Vec<RateQuote> {
        vec![
            RateQuote::new("FedEx Priority Overnight", 61.5),
            RateQuote::new("FedEx Standard Overnight", 52.75),
        ]
    }

    fn server(rates: Arc<FakeRates>, payments: Arc<FakePayments>) -> TestServer {
        let state = AppState::with_providers(AppConfig::default(), rates, payments);
        TestServer::new(create_router(state)).unwrap()
    }

    fn signed_event(event_type: &str) -> (Vec<u8>, String) {
        let payload = serde_json::to_vec(&json!({
            "id": "evt_test_1",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": {
                "id": "cs_test_123",
                "amount_total": 11149,
                "currency": "usd",
                "payment_status": "paid",
                "customer_details": { "email": "buyer@example.com" }
            }}
        }))
        .unwrap();
        let header = sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload);
        (payload, header)
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());
        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_shipping_rates_returns_quotes() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let server = server(rates.clone(), FakePayments::new());

        let response = server
            .post("/api/get-shipping-rates")
            .json(&json!({ "zip": "94107" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!([
                { "serviceName": "FedEx Priority Overnight", "shipmentCost": 61.5 },
                { "serviceName": "FedEx Standard Overnight", "shipmentCost": 52.75 }
            ])
        );
        assert_eq!(rates.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shipping_rates_requires_zip() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let server = server(rates.clone(), FakePayments::new());

        for body in [json!({}), json!({ "zip": "" }), json!({ "zip": null })] {
            let response = server.post("/api/get-shipping-rates").json(&body).await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(response.json::<Value>()["message"], "Missing zip code");
        }
        assert_eq!(rates.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shipping_rates_upstream_failure_is_generic() {
        let server = server(FakeRates::failing(), FakePayments::new());

        let response = server
            .post("/api/get-shipping-rates")
            .json(&json!({ "zip": "94107" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.json::<Value>()["message"],
            "Failed to fetch shipping rates"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let server = server(rates.clone(), FakePayments::new());

        let response = server
            .post("/api/get-shipping-rates")
            .content_type("application/json")
            .bytes(Bytes::from_static(b"{\"zip\": "))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(rates.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_checkout_combines_price_and_selected_shipping() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let payments = FakePayments::new();
        let server = server(rates.clone(), payments.clone());

        let response = server
            .post("/api/create-checkout-session")
            .json(&json!({
                "zip": "94107",
                "productPrice": 49.99,
                "shippingCost": 52.75,
                "shippingName": "FedEx Standard Overnight"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>()["url"],
            "https://checkout.stripe.com/c/pay/cs_test_fake"
        );

        let order = payments.last_order();
        assert_eq!(order.total_amount(), 10274);
        assert_eq!(order.description(), "FedEx Standard Overnight");
        assert_eq!(order.product_name, "Your Product");
        // Client picked a rate, so no lookup
        assert_eq!(rates.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_checkout_without_shipping_uses_first_rate() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let payments = FakePayments::new();
        let server = server(rates.clone(), payments.clone());

        let response = server
            .post("/api/create-checkout-session")
            .json(&json!({ "zip": "94107", "productPrice": 49.99, "shippingCost": "52.75" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(rates.calls.load(Ordering::SeqCst), 1);

        let order = payments.last_order();
        assert_eq!(order.total_amount(), 11149);
        assert_eq!(order.description(), "FedEx Priority Overnight");
    }

    #[tokio::test]
    async fn test_checkout_fails_when_no_rates() {
        let payments = FakePayments::new();
        let server = server(FakeRates::with_quotes(vec![]), payments.clone());

        let response = server
            .post("/api/create-checkout-session")
            .json(&json!({ "zip": "99999", "productPrice": 49.99 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>()["message"],
            "Failed to get shipping cost"
        );
        assert_eq!(payments.calls(), 0);
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_inputs_before_any_call() {
        let rates = FakeRates::with_quotes(overnight_quotes());
        let payments = FakePayments::new();
        let server = server(rates.clone(), payments.clone());

        let bodies = [
            json!({ "productPrice": 49.99 }),
            json!({ "zip": "", "productPrice": 49.99 }),
            json!({ "zip": "94107" }),
            json!({ "zip": "94107", "productPrice": "49.99" }),
            json!({ "zip": "94107", "productPrice": null }),
            json!({ "zip": "94107", "productPrice": -5 }),
            json!({ "zip": "94107", "productPrice": 10, "shippingCost": -1 }),
            json!({ "zip": "94107", "productPrice": 1e308, "shippingCost": 1e308 }),
        ];

        for body in bodies {
            let response = server.post("/api/create-checkout-session").json(&body).await;
            assert_eq!(
                response.status_code(),
                StatusCode::BAD_REQUEST,
                "body: {}",
                body
            );
        }

        assert_eq!(rates.calls.load(Ordering::SeqCst), 0);
        assert_eq!(payments.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());

        let response = server.get("/api/create-checkout-session").await;

        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.json::<Value>()["message"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());

        let response = server
            .method(Method::OPTIONS, "/api/create-checkout-session")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://www.thehyun.com"))
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("POST"),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "https://www.thehyun.com"
        );
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_valid_event() {
        let handler = Arc::new(CountingHandler::default());
        let state = AppState::with_providers(
            AppConfig::default(),
            FakeRates::with_quotes(vec![]),
            FakePayments::new(),
        )
        .with_webhook_handler(handler.clone());
        let server = TestServer::new(create_router(state)).unwrap();

        let (payload, signature) = signed_event("checkout.session.completed");
        let response = server
            .post("/api/webhook")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(Bytes::from(payload))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!({ "received": true }));
        assert_eq!(handler.completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_unhandled_event_types() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());

        let (payload, signature) = signed_event("charge.refunded");
        let response = server
            .post("/api/webhook")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(Bytes::from(payload))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!({ "received": true }));
    }

    #[tokio::test]
    async fn test_webhook_rejects_invalid_signature() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());

        let (payload, _) = signed_event("checkout.session.completed");
        let forged = sign_payload("whsec_wrong", chrono::Utc::now().timestamp(), &payload);
        let response = server
            .post("/api/webhook")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                HeaderValue::from_str(&forged).unwrap(),
            )
            .bytes(Bytes::from(payload))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.text(),
            "Webhook Error: Webhook verification failed: Signature mismatch"
        );
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_signature() {
        let server = server(FakeRates::with_quotes(vec![]), FakePayments::new());

        let (payload, _) = signed_event("checkout.session.completed");
        let response = server
            .post("/api/webhook")
            .bytes(Bytes::from(payload))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("Webhook Error:"));
    }
}
