//! Currency conversion over a [`RateTable`]

use crate::core::error::ConversionError;
use crate::core::rates::RateTable;
use tracing::debug;

/// Parses user-supplied amount text into a finite, non-negative number.
pub fn parse_amount(amount: &str) -> Result<f64, ConversionError> {
    let value: f64 = amount
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidAmount(amount.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConversionError::InvalidAmount(amount.to_string()));
    }
    Ok(value)
}

fn rate_for(table: &RateTable, code: &str) -> Result<f64, ConversionError> {
    let rate = table
        .rates
        .get(code)
        .copied()
        .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))?;
    // The base currency is the unit of the table.
    if code == table.base_code {
        return Ok(1.0);
    }
    Ok(rate)
}

/// Converts `amount` of `from` into `to`.
///
/// Rates are relative to the table's base, so the amount is first normalized
/// to the base and then scaled into the target currency.
pub fn convert(
    table: &RateTable,
    from: &str,
    to: &str,
    amount: &str,
) -> Result<f64, ConversionError> {
    let from_rate = rate_for(table, from)?;
    let to_rate = rate_for(table, to)?;
    let value = parse_amount(amount)?;

    let converted = (value / from_rate) * to_rate;
    debug!("Converted {value} {from} to {converted} {to} (rates {from_rate} -> {to_rate})");
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::fixtures::{sample, table};

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_convert_examples() {
        let t = sample();
        let jpy = convert(&t, "USD", "JPY", "10").unwrap();
        assert_eq!(format!("{jpy:.2}"), "1500.00");
        let usd = convert(&t, "EUR", "USD", "9").unwrap();
        assert_eq!(format!("{usd:.2}"), "10.00");
    }

    #[test]
    fn test_convert_to_same_currency_is_identity() {
        let t = table(&[("USD", 1.0), ("EUR", 0.9), ("JPY", 150.0), ("GBP", 0.79)]);
        for code in t.currencies() {
            for amount in ["0", "1", "9.99", "123456.789"] {
                let converted = convert(&t, code, code, amount).unwrap();
                assert!(
                    approx_eq(converted, amount.parse().unwrap()),
                    "{code} {amount} -> {converted}"
                );
            }
        }
    }

    #[test]
    fn test_convert_is_transitive_through_intermediate() {
        let t = table(&[("USD", 1.0), ("EUR", 0.9), ("JPY", 150.0), ("GBP", 0.79)]);
        let codes = t.currencies();
        for a in &codes {
            for b in &codes {
                for c in &codes {
                    let direct = convert(&t, a, c, "42.5").unwrap();
                    let via_b = convert(&t, a, b, "42.5").unwrap();
                    let composed = convert(&t, b, c, &via_b.to_string()).unwrap();
                    assert!(approx_eq(direct, composed), "{a}->{b}->{c}");
                }
            }
        }
    }

    #[test]
    fn test_base_currency_rate_is_one() {
        let mut t = sample();
        // A slightly-off upstream value for the base itself is ignored.
        t.rates.insert("USD".to_string(), 1.0000001);
        assert_eq!(convert(&t, "USD", "JPY", "2").unwrap(), 300.0);
    }

    #[test]
    fn test_unknown_currency() {
        let t = sample();
        assert_eq!(
            convert(&t, "ZZZ", "USD", "10"),
            Err(ConversionError::UnknownCurrency("ZZZ".to_string()))
        );
        assert_eq!(
            convert(&t, "USD", "ZZZ", "10"),
            Err(ConversionError::UnknownCurrency("ZZZ".to_string()))
        );
    }

    #[test]
    fn test_invalid_amount() {
        let t = sample();
        for amount in ["abc", "-5", "", "NaN", "inf", "-inf", "1e400"] {
            assert!(
                matches!(
                    convert(&t, "USD", "EUR", amount),
                    Err(ConversionError::InvalidAmount(_))
                ),
                "{amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_amount_trims_whitespace() {
        assert_eq!(parse_amount(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_amount("0").unwrap(), 0.0);
    }
}
