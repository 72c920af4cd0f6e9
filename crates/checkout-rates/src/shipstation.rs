//! # ShipStation Rate Lookup
//!
//! Calls `POST /shipments/getrates` with the fixed shipment profile and the
//! buyer's postal code, then narrows the carrier's answer down to the
//! offered overnight service levels.

use crate::config::ShipStationConfig;
use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult, RateProvider, RateQuote, ShipmentProfile};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// ShipStation-backed rate provider
pub struct ShipStationRates {
    config: ShipStationConfig,
    profile: ShipmentProfile,
    client: Client,
}

impl ShipStationRates {
    /// Create a new rate provider
    pub fn new(config: ShipStationConfig, profile: ShipmentProfile) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            profile,
            client,
        })
    }

    /// Create from environment variables with the given profile
    pub fn from_env(profile: ShipmentProfile) -> CheckoutResult<Self> {
        let config = ShipStationConfig::from_env()?;
        Self::new(config, profile)
    }

    /// Build the rate request body for a destination
    fn build_request<'a>(&'a self, zip: &'a str) -> RateRequest<'a> {
        let profile = &self.profile;
        RateRequest {
            carrier_code: &profile.carrier_code,
            package_code: &profile.package_code,
            from_postal_code: &profile.from_postal_code,
            to_postal_code: zip,
            to_country_code: &profile.to_country_code,
            weight: RateWeight {
                value: profile.weight.value,
                units: &profile.weight.units,
            },
            dimensions: RateDimensions {
                units: &profile.dimensions.units,
                length: profile.dimensions.length,
                width: profile.dimensions.width,
                height: profile.dimensions.height,
            },
            confirmation: &profile.confirmation,
            residential: profile.residential,
        }
    }
}

/// Keep the allowed service levels, in carrier order.
///
/// Allowed entries without a numeric cost are dropped.
pub fn filter_rates(profile: &ShipmentProfile, options: Vec<ShippingOption>) -> Vec<RateQuote> {
    options
        .into_iter()
        .filter_map(|option| {
            let name = option.service_name.filter(|name| profile.allows(name))?;
            match option.shipment_cost {
                Some(cost) => Some(RateQuote::new(name, cost)),
                None => {
                    warn!("Dropping {} rate without a shipment cost", name);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl RateProvider for ShipStationRates {
    #[instrument(skip(self))]
    async fn get_rates(&self, zip: &str) -> CheckoutResult<Vec<RateQuote>> {
        let body = self.build_request(zip);

        debug!(
            "Requesting rates: carrier={}, from={}, to={}",
            body.carrier_code, body.from_postal_code, zip
        );

        let response = self
            .client
            .post(self.config.rates_url())
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("ShipStation API error: status={}, body={}", status, text);
            return Err(CheckoutError::provider(
                "shipstation",
                format!("ShipStation error: {}", text),
            ));
        }

        let parsed: RatesResponse = serde_json::from_str(&text).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse ShipStation response: {}", e))
        })?;

        let options = parsed.into_options();
        let total = options.len();
        let quotes = filter_rates(&self.profile, options);

        info!(
            "ShipStation returned {} options, {} offered for {}",
            total,
            quotes.len(),
            zip
        );

        Ok(quotes)
    }

    fn provider_name(&self) -> &'static str {
        "shipstation"
    }
}

// =============================================================================
// ShipStation API Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RateRequest<'a> {
    carrier_code: &'a str,
    package_code: &'a str,
    from_postal_code: &'a str,
    to_postal_code: &'a str,
    to_country_code: &'a str,
    weight: RateWeight<'a>,
    dimensions: RateDimensions<'a>,
    confirmation: &'a str,
    residential: bool,
}

#[derive(Debug, Serialize)]
struct RateWeight<'a> {
    value: f64,
    units: &'a str,
}

#[derive(Debug, Serialize)]
struct RateDimensions<'a> {
    units: &'a str,
    length: f64,
    width: f64,
    height: f64,
}

/// One service level in the carrier response
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOption {
    pub service_name: Option<String>,
    pub shipment_cost: Option<f64>,
}

impl ShippingOption {
    pub fn new(service_name: impl Into<String>, shipment_cost: f64) -> Self {
        Self {
            service_name: Some(service_name.into()),
            shipment_cost: Some(shipment_cost),
        }
    }

    /// Read one entry field by field so a malformed sibling cannot
    /// invalidate the whole list
    fn from_value(value: &Value) -> Self {
        Self {
            service_name: value
                .get("serviceName")
                .and_then(Value::as_str)
                .map(String::from),
            shipment_cost: value.get("shipmentCost").and_then(Value::as_f64),
        }
    }
}

/// The endpoint answers with a bare list; some accounts wrap it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RatesResponse {
    List(Vec<Value>),
    Wrapped {
        #[serde(rename = "rateResponse")]
        rate_response: WrappedOptions,
    },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct WrappedOptions {
    #[serde(rename = "shippingOptions", default)]
    shipping_options: Vec<Value>,
}

impl RatesResponse {
    fn into_options(self) -> Vec<ShippingOption> {
        let entries = match self {
            RatesResponse::List(entries) => entries,
            RatesResponse::Wrapped { rate_response } => rate_response.shipping_options,
            RatesResponse::Other(value) => {
                debug!("Unrecognised ShipStation response shape: {}", value);
                Vec::new()
            }
        };
        entries.iter().map(ShippingOption::from_value).collect()
    }
}
