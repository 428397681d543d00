use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For EUR/USD, 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format a fractional cent value (averages, forecasts) rounded to the nearest cent.
pub fn format_cents_f64(cents: f64) -> String {
    format_cents(cents.round() as Cents)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid money format: {0}")]
    InvalidFormat(String),
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Parse a user-entered decimal amount into cents.
///
/// Accepts "50", "50.5", "50.00" and ".75"; digits past the second decimal
/// place are truncated. Signs are rejected: every amount in the tracker is a
/// magnitude, the transaction type carries the direction.
/// Example: "12.5" -> 1250
pub fn parse_amount(input: &str) -> Result<Cents, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let invalid = || AmountError::InvalidFormat(input.to_string());
    let (units_str, decimal_str) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(units_str) || !all_digits(decimal_str) {
        return Err(invalid());
    }
    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(invalid());
    }

    let units: Cents = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| invalid())?
    };
    let decimals: Cents = match decimal_str.len() {
        0 => 0,
        1 => decimal_str.parse::<Cents>().map_err(|_| invalid())? * 10,
        _ => decimal_str[..2].parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimals))
        .ok_or_else(invalid)?;
    if cents == 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-1), "-0.01");
        assert_eq!(format_cents_f64(1234.6), "12.35");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50"), Ok(5000));
        assert_eq!(parse_amount(" 12.34 "), Ok(1234));
        assert_eq!(parse_amount("12.5"), Ok(1250));
        assert_eq!(parse_amount(".75"), Ok(75));
        assert_eq!(parse_amount("100.999"), Ok(10099));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("0.00"), Err(AmountError::NotPositive));
        assert!(matches!(
            parse_amount("-5"),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_amount("12.3.4"),
            Err(AmountError::InvalidFormat(_))
        ));
        assert!(matches!(parse_amount("."), Err(AmountError::InvalidFormat(_))));
        assert!(matches!(parse_amount("abc"), Err(AmountError::InvalidFormat(_))));
    }
}
