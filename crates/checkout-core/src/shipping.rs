//! # Shipping Types
//!
//! The fixed shipment profile sent with every rate request, and the rate
//! quotes handed back to the buyer. The profile can be overridden from
//! `config/shipping.toml`; otherwise the built-in overnight FedEx profile
//! applies.

use serde::{Deserialize, Serialize};

/// Package weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub units: String,
}

/// Package dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub units: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything about a shipment except the destination postal code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentProfile {
    /// Carrier code understood by the rate API (e.g., "fedex")
    pub carrier_code: String,

    /// Package code (e.g., "package")
    pub package_code: String,

    /// Origin postal code
    pub from_postal_code: String,

    /// Destination country (ISO 3166 alpha-2)
    pub to_country_code: String,

    pub weight: Weight,

    pub dimensions: Dimensions,

    /// Delivery confirmation option
    #[serde(default = "default_confirmation")]
    pub confirmation: String,

    #[serde(default)]
    pub residential: bool,

    /// Service levels offered to the buyer, matched against the carrier's
    /// `serviceName`
    pub allowed_services: Vec<String>,
}

fn default_confirmation() -> String {
    "none".to_string()
}

impl Default for ShipmentProfile {
    fn default() -> Self {
        Self {
            carrier_code: "fedex".to_string(),
            package_code: "package".to_string(),
            from_postal_code: "10010".to_string(),
            to_country_code: "US".to_string(),
            weight: Weight {
                value: 11.0,
                units: "pounds".to_string(),
            },
            dimensions: Dimensions {
                units: "inches".to_string(),
                length: 17.25,
                width: 14.5,
                height: 8.5,
            },
            confirmation: default_confirmation(),
            residential: false,
            allowed_services: vec![
                "FedEx Standard Overnight".to_string(),
                "FedEx Priority Overnight".to_string(),
            ],
        }
    }
}

impl ShipmentProfile {
    /// Whether a carrier service name is offered to buyers
    pub fn allows(&self, service_name: &str) -> bool {
        self.allowed_services.iter().any(|s| s == service_name)
    }

    /// Load a profile from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// A carrier's price for one service level, as returned to the buyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub service_name: String,
    pub shipment_cost: f64,
}

impl RateQuote {
    pub fn new(service_name: impl Into<String>, shipment_cost: f64) -> Self {
        Self {
            service_name: service_name.into(),
            shipment_cost,
        }
    }
}

/// The shipping option the buyer pays for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingSelection {
    /// Shown as the line-item description
    pub service_name: Option<String>,
    /// Decimal cost in the order currency
    pub cost: f64,
}

impl ShippingSelection {
    pub fn new(service_name: Option<String>, cost: f64) -> Self {
        Self { service_name, cost }
    }

    /// Line-item description; unnamed selections read as standard shipping
    pub fn description(&self) -> &str {
        self.service_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Standard Shipping")
    }
}

impl From<RateQuote> for ShippingSelection {
    fn from(quote: RateQuote) -> Self {
        Self {
            service_name: Some(quote.service_name),
            cost: quote.shipment_cost,
        }
    }
}
