//! # Overnight Checkout
//!
//! ZIP-to-payment checkout service: ShipStation overnight rates plus a
//! Stripe hosted payment page.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SHIPSTATION_API_KEY=...
//! export SHIPSTATION_API_SECRET=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server
//! ship-checkout
//! ```

use checkout_api::{routes, state::AppState};
use checkout_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!(
        "Overnight Checkout v{} ({})",
        env!("CARGO_PKG_VERSION"),
        state.config.environment
    );
    info!("Allowed origin: {}", state.config.allowed_origin);
    info!(
        "Providers: rates={}, payments={}",
        state.rates.provider_name(),
        state.payments.provider_name()
    );

    let app = routes::create_router(state);

    info!("Listening on http://{}", addr);

    if !is_prod {
        info!("Rates:    POST http://{}/api/get-shipping-rates", addr);
        info!("Checkout: POST http://{}/api/create-checkout-session", addr);
        info!(
            "Webhook:  POST http://{}/api/webhook (events: {})",
            addr,
            REQUIRED_WEBHOOK_EVENTS.join(", ")
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
