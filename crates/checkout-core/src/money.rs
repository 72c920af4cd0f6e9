//! # Money
//!
//! Currency handling for checkout totals. Amounts arrive from the client
//! and the carrier as decimal dollars and leave for the payment provider
//! in the smallest currency unit.

use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};

/// Supported charge currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    CAD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::CAD => "cad",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the rest have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }

    /// Parse a provider currency code, falling back to USD
    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "cad" => Currency::CAD,
            "eur" => Currency::EUR,
            "gbp" => Currency::GBP,
            "jpy" => Currency::JPY,
            _ => Currency::USD,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Reject amounts that cannot be charged
pub fn validate_amount(field: &str, amount: f64) -> CheckoutResult<f64> {
    if !amount.is_finite() {
        return Err(CheckoutError::InvalidPrice {
            message: format!("{} must be a finite number", field),
        });
    }
    if amount < 0.0 {
        return Err(CheckoutError::InvalidPrice {
            message: format!("{} must not be negative", field),
        });
    }
    Ok(amount)
}

/// Format a smallest-unit amount for logs (e.g., "$61.49")
pub fn display_amount(amount: i64, currency: Currency) -> String {
    let symbol = match currency {
        Currency::USD => "$",
        Currency::CAD => "C$",
        Currency::EUR => "€",
        Currency::GBP => "£",
        Currency::JPY => "¥",
    };
    if currency.decimal_places() == 0 {
        format!("{}{}", symbol, amount)
    } else {
        format!("{}{:.2}", symbol, currency.from_smallest_unit(amount))
    }
}
