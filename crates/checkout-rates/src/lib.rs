//! # checkout-rates
//!
//! Carrier rate lookup for the overnight checkout service.
//!
//! `ShipStationRates` implements `RateProvider`: it posts the fixed
//! shipment profile plus the buyer's postal code to ShipStation's
//! `getrates` endpoint and returns only the offered service levels.
//!
//! ```rust,ignore
//! use checkout_rates::{load_shipment_profile, ShipStationRates};
//! use checkout_core::RateProvider;
//!
//! let profile = load_shipment_profile("config/shipping.toml")?;
//! let rates = ShipStationRates::from_env(profile)?;
//! let quotes = rates.get_rates("94107").await?;
//! ```

pub mod config;
pub mod shipstation;

pub use config::{load_shipment_profile, ShipStationConfig};
pub use shipstation::{filter_rates, ShipStationRates, ShippingOption};
