//! # checkout-api
//!
//! HTTP API layer for the overnight shipping checkout service.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Rate lookup and checkout session endpoints for the storefront
//! - Webhook receiver for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/get-shipping-rates` | Overnight rates for a ZIP |
//! | POST | `/api/create-checkout-session` | Hosted payment page for price + shipping |
//! | POST | `/api/webhook` | Stripe webhook |
//! | GET | `/success`, `/cancel` | Landing pages |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
