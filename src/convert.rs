use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid or currency not found: {field}={code}")]
    UnknownCurrency { field: &'static str, code: String },
}

#[derive(Debug, PartialEq)]
pub struct Conversion {
    pub rate: f64,
    pub amount: f64,
}

/// Converts `amount` from `base` to `symbol` using rates from one snapshot.
///
/// Both codes must appear in `rates`. The snapshot's own base currency cancels
/// out in the division, so `base` does not have to equal it.
pub fn convert(
    rates: &HashMap<String, f64>,
    base: &str,
    symbol: &str,
    amount: f64,
) -> Result<Conversion, ConvertError> {
    let base_rate = rates
        .get(base)
        .ok_or_else(|| ConvertError::UnknownCurrency {
            field: "base",
            code: base.to_string(),
        })?;
    let symbol_rate = rates
        .get(symbol)
        .ok_or_else(|| ConvertError::UnknownCurrency {
            field: "symbol",
            code: symbol.to_string(),
        })?;

    // The rate is rounded to 6 places before the multiplication, matching the
    // rendered value, so rate * amount == amount for identity conversions.
    let rate = round6(symbol_rate / base_rate);

    Ok(Conversion {
        rate,
        amount: rate * amount,
    })
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
