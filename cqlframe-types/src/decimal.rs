//! Arbitrary-precision decimal as carried by the wire `decimal` kind.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};

/// Decimal stored as an unscaled big integer and a base-10 scale:
/// the value is `unscaled * 10^-scale`. Negative scales are legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    unscaled: BigInt,
    scale: i32,
}

impl DecimalValue {
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Lossy conversion through the decimal string form.
    pub fn to_f64(&self) -> Option<f64> {
        f64::from_str(&self.to_string()).ok()
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        if self.unscaled.sign() == Sign::Minus {
            f.write_str("-")?;
        }

        if self.scale <= 0 {
            f.write_str(&digits)?;
            if digits != "0" {
                for _ in 0..self.scale.unsigned_abs() {
                    f.write_str("0")?;
                }
            }
            return Ok(());
        }

        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
