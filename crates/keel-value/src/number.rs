//! Arbitrary-precision decimal numbers.
//!
//! JSON numbers are decimal literals of unbounded size and precision, and
//! schema keywords like `multipleOf` are defined over their exact values.
//! `Number` stores an integer mantissa together with a decimal scale
//! (`value = mantissa * 10^-scale`), so `1`, `1.0` and `1e0` are one and
//! the same value, and divisibility checks never round trip through
//! floating point.

use core::cmp::Ordering;
use core::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

/// Exponents beyond this magnitude would force materializing astronomically
/// large mantissas when the scale is folded away.
const MAX_EXPONENT: i64 = 32_768;

/// An exact decimal number.
///
/// The representation is normalized: the fractional part carries no
/// trailing zeros, and zero is always stored with scale 0. Two `Number`s
/// are equal iff they denote the same mathematical value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    mantissa: BigInt,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberParseError {
    #[error("invalid decimal literal: {0:?}")]
    InvalidLiteral(String),

    #[error("exponent out of range in literal: {0:?}")]
    ExponentOutOfRange(String),
}

impl Number {
    fn from_parts(mut mantissa: BigInt, mut scale: i64) -> Number {
        if scale < 0 {
            mantissa *= pow10(-scale as u32);
            scale = 0;
        }
        let ten = BigInt::from(10);
        while scale > 0 && !mantissa.is_zero() && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }
        if mantissa.is_zero() {
            scale = 0;
        }
        Number {
            mantissa,
            scale: scale as u32,
        }
    }

    /// Parse a decimal literal (JSON number grammar, with a permissive
    /// leading `+` so that programmatic inputs round-trip too).
    pub fn parse(input: &str) -> Result<Number, NumberParseError> {
        let invalid = || NumberParseError::InvalidLiteral(input.to_string());

        let (mantissa_part, exponent) = match input.find(['e', 'E']) {
            Some(pos) => {
                let exp_str = &input[pos + 1..];
                let exp = i64::from_str(exp_str).map_err(|_| invalid())?;
                (&input[..pos], exp)
            }
            None => (input, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return Err(NumberParseError::ExponentOutOfRange(input.to_string()));
        }

        let (int_part, frac_part) = match mantissa_part.find('.') {
            Some(pos) => (&mantissa_part[..pos], &mantissa_part[pos + 1..]),
            None => (mantissa_part, ""),
        };
        let unsigned_int = int_part.strip_prefix(['-', '+']).unwrap_or(int_part);
        if unsigned_int.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !unsigned_int.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let mantissa = BigInt::from_str(&digits).map_err(|_| invalid())?;
        let scale = frac_part.len() as i64 - exponent;
        if scale.abs() > 2 * MAX_EXPONENT {
            return Err(NumberParseError::ExponentOutOfRange(input.to_string()));
        }
        Ok(Number::from_parts(mantissa, scale))
    }

    /// Convert a finite `f64` through its shortest decimal rendering.
    ///
    /// Returns `None` for NaN and infinities, which have no decimal value.
    pub fn from_f64(value: f64) -> Option<Number> {
        if !value.is_finite() {
            return None;
        }
        Number::parse(&format!("{value}")).ok()
    }

    /// Whether the value has no fractional part. `10.0` is an integer.
    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// The value as a `u64`, if it is an integer in range.
    pub fn as_u64(&self) -> Option<u64> {
        if self.scale == 0 {
            self.mantissa.to_u64()
        } else {
            None
        }
    }

    /// The value as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        if self.scale == 0 {
            self.mantissa.to_i64()
        } else {
            None
        }
    }

    /// A lossy `f64` approximation, for boundaries that cannot carry exact
    /// decimals. `None` when the mantissa itself overflows `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        let m = self.mantissa.to_f64()?;
        let approx = m * 10f64.powi(-(self.scale as i32));
        approx.is_finite().then_some(approx)
    }

    /// Exact divisibility: whether `self` is an integer multiple of
    /// `divisor`. A zero divisor divides nothing.
    pub fn is_multiple_of(&self, divisor: &Number) -> bool {
        if divisor.is_zero() {
            return false;
        }
        let scale = self.scale.max(divisor.scale);
        let a = &self.mantissa * pow10(scale - self.scale);
        let b = &divisor.mantissa * pow10(scale - divisor.scale);
        (a % b).is_zero()
    }
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10).pow(exp)
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.mantissa.cmp(&other.mantissa);
        }
        let scale = self.scale.max(other.scale);
        let a = &self.mantissa * pow10(scale - self.scale);
        let b = &other.mantissa * pow10(scale - other.scale);
        a.cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.abs().to_string();
        let scale = self.scale as usize;
        if self.mantissa.is_negative() {
            write!(f, "-")?;
        }
        if digits.len() <= scale {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number {
            mantissa: BigInt::from(value),
            scale: 0,
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number {
            mantissa: BigInt::from(value),
            scale: 0,
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from(value as i64)
    }
}

impl From<BigInt> for Number {
    fn from(mantissa: BigInt) -> Self {
        Number { mantissa, scale: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Number {
        Number::parse(s).unwrap()
    }

    #[test]
    fn integer_and_real_forms_are_equal() {
        assert_eq!(num("1"), num("1.0"));
        assert_eq!(num("100"), num("1e2"));
        assert_eq!(num("0"), num("0.000"));
        assert_eq!(num("-2.50"), num("-2.5"));
        assert_eq!(num("0.001"), num("1e-3"));
    }

    #[test]
    fn integrality_follows_the_value_not_the_literal() {
        assert!(num("10").is_integer());
        assert!(num("10.0").is_integer());
        assert!(num("1e3").is_integer());
        assert!(!num("10.5").is_integer());
        assert!(!num("1e-2").is_integer());
    }

    #[test]
    fn ordering_aligns_scales() {
        assert!(num("0.5") < num("1"));
        assert!(num("-5") < num("0.0"));
        assert!(num("2.10") > num("2.09"));
        assert_eq!(num("3.0").cmp(&num("3")), Ordering::Equal);
    }

    #[test]
    fn exact_divisibility() {
        assert!(num("10").is_multiple_of(&num("0.1")));
        assert!(num("9").is_multiple_of(&num("3")));
        assert!(num("0.0075").is_multiple_of(&num("0.0001")));
        assert!(!num("0.1").is_multiple_of(&num("0.03")));
        assert!(!num("7").is_multiple_of(&num("2")));
        assert!(!num("1").is_multiple_of(&num("0")));
    }

    #[test]
    fn display_round_trips() {
        for literal in ["0", "-5", "0.05", "-1.5", "123.456", "1000"] {
            assert_eq!(num(literal).to_string(), literal);
        }
        assert_eq!(num("1.50").to_string(), "1.5");
        assert_eq!(num("1e2").to_string(), "100");
    }

    #[test]
    fn narrowing_accessors() {
        assert_eq!(num("42").as_u64(), Some(42));
        assert_eq!(num("42.0").as_u64(), Some(42));
        assert_eq!(num("-1").as_u64(), None);
        assert_eq!(num("-1").as_i64(), Some(-1));
        assert_eq!(num("1.5").as_u64(), None);
        assert_eq!(num("18446744073709551615").as_u64(), Some(u64::MAX));
    }

    #[test]
    fn float_conversion_is_exact_on_the_rendering() {
        assert_eq!(Number::from_f64(0.5).unwrap(), num("0.5"));
        assert_eq!(Number::from_f64(-0.0).unwrap(), num("0"));
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn rejects_malformed_literals() {
        for bad in ["", ".", "1.2.3", "1e", "abc", "0x10", "1e999999999"] {
            assert!(Number::parse(bad).is_err(), "accepted {bad:?}");
        }
    }
}
