// Kubernetes resource quantity parsing
//
// Converts memory quantities as they appear in container specs and workspace
// attributes into an exact byte count:
// - Plain numbers: "128974848", "1.5"
// - Binary suffixes: "100Ki", "300Mi", "10Gi", "1Ti", "1Pi", "1Ei"
// - Decimal suffixes: "500m", "1k", "1M", "2G", "1T", "1P", "1E"
// - Decimal exponents: "1e3", "12E6"

use std::fmt;

/// Reason a quantity string could not be converted to bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    Empty,
    Negative(String),
    InvalidNumber(String),
    UnknownSuffix { quantity: String, suffix: String },
    TooLarge(String),
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityError::Empty => write!(f, "quantity must not be empty"),
            QuantityError::Negative(q) => write!(f, "quantity '{}' must not be negative", q),
            QuantityError::InvalidNumber(q) => write!(f, "'{}' is not a valid quantity", q),
            QuantityError::UnknownSuffix { quantity, suffix } => write!(
                f,
                "unknown suffix '{}' in quantity '{}' (expected one of Ki, Mi, Gi, Ti, Pi, Ei, n, u, m, k, M, G, T, P, E)",
                suffix, quantity
            ),
            QuantityError::TooLarge(q) => write!(f, "quantity '{}' is too large", q),
        }
    }
}

impl std::error::Error for QuantityError {}

/// Scale applied by a quantity suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    /// Multiply by 1024^n
    Binary(u32),
    /// Multiply by 10^n, n may be negative
    Decimal(i32),
}

fn parse_suffix(quantity: &str, suffix: &str) -> Result<Scale, QuantityError> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "Ki" => Scale::Binary(1),
        "Mi" => Scale::Binary(2),
        "Gi" => Scale::Binary(3),
        "Ti" => Scale::Binary(4),
        "Pi" => Scale::Binary(5),
        "Ei" => Scale::Binary(6),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        other => {
            // "E" on its own is exa; "E" followed by digits is an exponent
            let exponent = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))
                .and_then(|exp| exp.parse::<i32>().ok())
                .ok_or_else(|| QuantityError::UnknownSuffix {
                    quantity: quantity.to_string(),
                    suffix: other.to_string(),
                })?;
            Scale::Decimal(exponent)
        }
    };
    Ok(scale)
}

/// Convert a Kubernetes quantity into a number of bytes.
///
/// The result is exact; fractional byte counts are rounded up the way the
/// Kubernetes API server rounds them.
///
/// # Examples
/// ```
/// # use ws_core::quantity::to_bytes;
/// assert_eq!(to_bytes("100Ki").unwrap(), 102_400);
/// assert_eq!(to_bytes("1M").unwrap(), 1_000_000);
/// assert_eq!(to_bytes("300Mi").unwrap(), 314_572_800);
/// ```
pub fn to_bytes(quantity: &str) -> Result<u64, QuantityError> {
    let s = quantity.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }
    if s.starts_with('-') {
        return Err(QuantityError::Negative(s.to_string()));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let number_end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(number_end);
    let scale = parse_suffix(quantity, suffix)?;

    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(QuantityError::InvalidNumber(quantity.to_string()));
    }
    if fraction.contains('.') {
        return Err(QuantityError::InvalidNumber(quantity.to_string()));
    }

    let too_large = || QuantityError::TooLarge(quantity.to_string());

    let digits = format!("{}{}", whole, fraction);
    let mantissa = digits.parse::<u128>().map_err(|_| too_large())?;
    let fraction_digits = u32::try_from(fraction.len()).map_err(|_| too_large())?;

    let mut numerator = mantissa;
    // None once the denominator no longer fits; the value is then below one byte
    let mut denominator = 10u128.checked_pow(fraction_digits);

    match scale {
        Scale::Binary(power) => {
            let factor = 1024u128.checked_pow(power).ok_or_else(too_large)?;
            numerator = numerator.checked_mul(factor).ok_or_else(too_large)?;
        }
        Scale::Decimal(exponent) if exponent >= 0 => {
            let factor = 10u128
                .checked_pow(exponent.unsigned_abs())
                .ok_or_else(too_large)?;
            numerator = numerator.checked_mul(factor).ok_or_else(too_large)?;
        }
        Scale::Decimal(exponent) => {
            denominator = denominator.and_then(|d| {
                10u128
                    .checked_pow(exponent.unsigned_abs())
                    .and_then(|factor| d.checked_mul(factor))
            });
        }
    }

    let bytes = match denominator {
        Some(denominator) => numerator.div_ceil(denominator),
        None => u128::from(numerator != 0),
    };
    u64::try_from(bytes).map_err(|_| too_large())
}

/// Convert a quantity into its byte count rendered as a decimal string
pub fn to_bytes_string(quantity: &str) -> Result<String, QuantityError> {
    to_bytes(quantity).map(|bytes| bytes.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(to_bytes("128974848").unwrap(), 128_974_848);
        assert_eq!(to_bytes("0").unwrap(), 0);
        assert_eq!(to_bytes("  42  ").unwrap(), 42);
        assert_eq!(to_bytes("+7").unwrap(), 7);
    }

    #[test]
    fn test_binary_suffixes() {
        assert_eq!(to_bytes("100Ki").unwrap(), 102_400);
        assert_eq!(to_bytes("300Mi").unwrap(), 300 * 1024 * 1024);
        assert_eq!(to_bytes("10Gi").unwrap(), 10 * 1024 * 1024 * 1024);
        assert_eq!(to_bytes("1Ti").unwrap(), 1u64 << 40);
        assert_eq!(to_bytes("1Ei").unwrap(), 1u64 << 60);
    }

    #[test]
    fn test_decimal_suffixes() {
        assert_eq!(to_bytes("1k").unwrap(), 1_000);
        assert_eq!(to_bytes("1M").unwrap(), 1_000_000);
        assert_eq!(to_bytes("2G").unwrap(), 2_000_000_000);
        assert_eq!(to_bytes("1T").unwrap(), 1_000_000_000_000);
        assert_eq!(to_bytes("1E").unwrap(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_fractions_round_up() {
        assert_eq!(to_bytes("1.5Gi").unwrap(), 1_610_612_736);
        assert_eq!(to_bytes("0.5Ki").unwrap(), 512);
        assert_eq!(to_bytes("500m").unwrap(), 1);
        assert_eq!(to_bytes("1500m").unwrap(), 2);
        assert_eq!(to_bytes("1.0001").unwrap(), 2);
        assert_eq!(to_bytes(".5k").unwrap(), 500);
    }

    #[test]
    fn test_exponents() {
        assert_eq!(to_bytes("1e3").unwrap(), 1_000);
        assert_eq!(to_bytes("12E6").unwrap(), 12_000_000);
        assert_eq!(to_bytes("5e-1").unwrap(), 1);
    }

    #[test]
    fn test_tiny_values_round_up_to_one_byte() {
        assert_eq!(to_bytes("1e-50").unwrap(), 1);
        assert_eq!(to_bytes("3n").unwrap(), 1);
        assert_eq!(to_bytes("0e-50").unwrap(), 0);
        assert_eq!(to_bytes("0.0000000000000000000000000000000000000001").unwrap(), 1);
    }

    #[test]
    fn test_to_bytes_string() {
        assert_eq!(to_bytes_string("300Mi").unwrap(), "314572800");
    }

    #[test]
    fn test_invalid_quantities() {
        assert_eq!(to_bytes(""), Err(QuantityError::Empty));
        assert_eq!(to_bytes("   "), Err(QuantityError::Empty));
        assert!(matches!(to_bytes("-1Gi"), Err(QuantityError::Negative(_))));
        assert!(matches!(to_bytes("Gi"), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(to_bytes("1.2.3"), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(
            to_bytes("10Xi"),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            to_bytes("10gb"),
            Err(QuantityError::UnknownSuffix { .. })
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(to_bytes("100Ei"), Err(QuantityError::TooLarge(_))));
        assert!(matches!(
            to_bytes("1e40"),
            Err(QuantityError::TooLarge(_))
        ));
    }
}
