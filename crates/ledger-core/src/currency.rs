//! Spend-based emission estimates
//!
//! Converts a spend amount to USD with fixed annual-average rates and applies
//! a kg CO2e per USD factor. Codes outside the table are treated as USD.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 currency with a fixed USD rate
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cny,
    Cad,
    Aud,
    Chf,
    Inr,
    Krw,
    Brl,
    Mxn,
    Sgd,
    Hkd,
    Sek,
    Nok,
    Dkk,
    Nzd,
    Zar,
    Aed,
    Pln,
    /// Code without a rate; converts 1:1
    Unknown(String),
}

impl Currency {
    /// Every currency with a published rate
    pub const KNOWN: [Currency; 21] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cny,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
        Currency::Inr,
        Currency::Krw,
        Currency::Brl,
        Currency::Mxn,
        Currency::Sgd,
        Currency::Hkd,
        Currency::Sek,
        Currency::Nok,
        Currency::Dkk,
        Currency::Nzd,
        Currency::Zar,
        Currency::Aed,
        Currency::Pln,
    ];

    /// Parse a code case-insensitively, falling back to [`Currency::Unknown`]
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let upper = code.trim().to_ascii_uppercase();
        Self::KNOWN
            .iter()
            .find(|c| c.code() == upper)
            .cloned()
            .unwrap_or(Currency::Unknown(upper))
    }

    /// Upper-case ISO code
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Inr => "INR",
            Currency::Krw => "KRW",
            Currency::Brl => "BRL",
            Currency::Mxn => "MXN",
            Currency::Sgd => "SGD",
            Currency::Hkd => "HKD",
            Currency::Sek => "SEK",
            Currency::Nok => "NOK",
            Currency::Dkk => "DKK",
            Currency::Nzd => "NZD",
            Currency::Zar => "ZAR",
            Currency::Aed => "AED",
            Currency::Pln => "PLN",
            Currency::Unknown(code) => code,
        }
    }

    /// USD per one unit of this currency, `None` when unpublished
    #[must_use]
    pub fn published_rate(&self) -> Option<f64> {
        let rate = match self {
            Currency::Usd => 1.0,
            Currency::Eur => 1.08,
            Currency::Gbp => 1.27,
            Currency::Jpy => 0.0067,
            Currency::Cny => 0.14,
            Currency::Cad => 0.74,
            Currency::Aud => 0.66,
            Currency::Chf => 1.13,
            Currency::Inr => 0.012,
            Currency::Krw => 0.00075,
            Currency::Brl => 0.20,
            Currency::Mxn => 0.058,
            Currency::Sgd => 0.74,
            Currency::Hkd => 0.128,
            Currency::Sek => 0.095,
            Currency::Nok => 0.094,
            Currency::Dkk => 0.145,
            Currency::Nzd => 0.61,
            Currency::Zar => 0.055,
            Currency::Aed => 0.272,
            Currency::Pln => 0.25,
            Currency::Unknown(_) => return None,
        };
        Some(rate)
    }

    /// USD rate with the 1:1 fallback applied
    #[must_use]
    pub fn usd_rate(&self) -> f64 {
        match self.published_rate() {
            Some(rate) => rate,
            None => {
                tracing::warn!(currency = %self.code(), "no USD rate published, treating as USD");
                1.0
            }
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Currency::from_code(&code)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl FromStr for Currency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Currency::from_code(s))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// USD per unit of `code`; unknown codes yield 1
#[inline]
#[must_use]
pub fn usd_rate(code: &str) -> f64 {
    Currency::from_code(code).usd_rate()
}

/// Convert `amount` of `code` into USD
#[inline]
#[must_use]
pub fn convert_to_usd(amount: f64, code: &str) -> f64 {
    amount * usd_rate(code)
}

/// Result of a spend-based estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendEmissions {
    /// Spend converted to USD (unrounded)
    pub amount_usd: f64,
    /// kg CO2e (unrounded)
    pub co2e: f64,
    /// Audit trail of the calculation
    pub formula: String,
}

/// Estimate emissions for a spend amount
///
/// `ef_per_usd` is kg CO2e per USD. No rounding is applied to the numbers;
/// only `formula` is formatted.
#[must_use]
pub fn calculate_spend_emissions(amount: f64, currency: &str, ef_per_usd: f64) -> SpendEmissions {
    let currency = Currency::from_code(currency);
    let rate = currency.usd_rate();
    let amount_usd = amount * rate;
    let co2e = amount_usd * ef_per_usd;
    let formula = format!(
        "{amount:.2} {code} × {rate:.4} = {amount_usd:.2} USD × {ef_per_usd:.4} kg CO2e/USD = {co2e:.2} kg CO2e",
        code = currency.code(),
    );

    SpendEmissions {
        amount_usd,
        co2e,
        formula,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_identity() {
        let result = calculate_spend_emissions(100.0, "USD", 0.5);
        assert_eq!(result.amount_usd, 100.0);
        assert_eq!(result.co2e, 50.0);
    }

    #[test]
    fn eur_uses_fixed_rate() {
        let result = calculate_spend_emissions(100.0, "EUR", 0.5);
        assert!((result.amount_usd - 108.0).abs() < 1e-9);
        assert!((result.co2e - 54.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_code_falls_back_to_one() {
        let result = calculate_spend_emissions(100.0, "XXX", 0.5);
        assert_eq!(result.amount_usd, 100.0);
        assert_eq!(result.co2e, 50.0);
        assert_eq!(usd_rate("XXX"), 1.0);
        assert_eq!(convert_to_usd(42.0, "???"), 42.0);
    }

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(Currency::from_code("gbp"), Currency::Gbp);
        assert_eq!(usd_rate("eur"), 1.08);
    }

    #[test]
    fn no_rounding_in_numbers() {
        let result = calculate_spend_emissions(1.0, "JPY", 0.333);
        assert_eq!(result.amount_usd, 0.0067);
        assert_eq!(result.co2e, 0.0067 * 0.333);
    }

    #[test]
    fn formula_is_readable() {
        let result = calculate_spend_emissions(100.0, "EUR", 0.5);
        assert_eq!(
            result.formula,
            "100.00 EUR × 1.0800 = 108.00 USD × 0.5000 kg CO2e/USD = 54.00 kg CO2e"
        );
    }

    #[test]
    fn unknown_currency_keeps_code() {
        let currency = Currency::from_code("btc");
        assert_eq!(currency, Currency::Unknown("BTC".to_string()));
        assert_eq!(currency.published_rate(), None);
        assert_eq!(currency.to_string(), "BTC");
    }
}
