use num_bigint::BigUint;

use crate::error::Error;

/// Convert a decimal amount such as `"1.5"` into base units for a token with
/// `decimals` fractional digits. Fractional digits beyond `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<String, Error> {
    parse_units(amount, decimals).map(|n| n.to_string())
}

/// Convert an integer base-unit amount into a decimal string rounded (half-up)
/// to exactly `display_precision` fractional digits.
pub fn from_base_units(amount: &str, decimals: u8, display_precision: u8) -> Result<String, Error> {
    let raw = parse_integer(amount)?;
    Ok(format_units(&raw, decimals, display_precision))
}

/// Whether `amount` is a well-formed decimal strictly greater than zero.
pub fn is_positive_amount(amount: &str) -> bool {
    match split_decimal(amount) {
        Ok((integer_part, fraction_part)) => integer_part
            .bytes()
            .chain(fraction_part.bytes())
            .any(|b| b != b'0'),
        Err(_) => false,
    }
}

/// Parse a decimal amount into base units.
pub(crate) fn parse_units(amount: &str, decimals: u8) -> Result<BigUint, Error> {
    let (integer_part, fraction_part) = split_decimal(amount)?;
    let decimals = decimals as usize;

    let kept = &fraction_part[..fraction_part.len().min(decimals)];
    let mut digits = String::with_capacity(integer_part.len() + decimals);
    digits.push_str(integer_part);
    digits.push_str(kept);
    digits.extend(std::iter::repeat_n('0', decimals - kept.len()));

    if digits.is_empty() {
        return Ok(BigUint::from(0u32));
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

/// Parse an integer base-unit string.
pub(crate) fn parse_integer(amount: &str) -> Result<BigUint, Error> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    BigUint::parse_bytes(amount.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

/// Format base units with a fixed number of fractional digits.
pub(crate) fn format_units(amount: &BigUint, decimals: u8, display_precision: u8) -> String {
    let scaled = if display_precision >= decimals {
        amount * pow10(display_precision - decimals)
    } else {
        let divisor = pow10(decimals - display_precision);
        let quotient = amount / &divisor;
        let remainder = amount % &divisor;
        if remainder * 2u32 >= divisor {
            quotient + 1u32
        } else {
            quotient
        }
    };

    let s = scaled.to_string();
    let precision = display_precision as usize;
    if precision == 0 {
        return s;
    }

    let mut padded = String::with_capacity(precision + 1);
    if s.len() <= precision {
        padded.extend(std::iter::repeat_n('0', precision + 1 - s.len()));
    }
    padded.push_str(&s);

    let (integer_part, fraction_part) = padded.split_at(padded.len() - precision);
    format!("{integer_part}.{fraction_part}")
}

/// Split `"12.34"` into `("12", "34")`, rejecting anything that is not a
/// plain non-negative decimal.
fn split_decimal(amount: &str) -> Result<(&str, &str), Error> {
    let (integer_part, fraction_part) = amount.split_once('.').unwrap_or((amount, ""));

    let well_formed = !(integer_part.is_empty() && fraction_part.is_empty())
        && integer_part.bytes().all(|b| b.is_ascii_digit())
        && fraction_part.bytes().all(|b| b.is_ascii_digit());

    if well_formed {
        Ok((integer_part, fraction_part))
    } else {
        Err(Error::InvalidAmount(amount.to_string()))
    }
}

fn pow10(exp: u8) -> BigUint {
    BigUint::from(10u32).pow(exp as u32)
}
