//! Purpose: Sum a tagged numeric array with variant-appropriate arithmetic.
//! Exports: `Precision`, `SumResult`, `sum_array`.
//! Role: Pure summation core behind the `/sum` endpoint.
//! Invariants: Integer arrays accumulate in i64 (wrapping), real arrays in f64.
//! Invariants: Results are rounded half away from zero at the configured grain.
//! Invariants: Never fails; overflow and precision loss are numeric behavior, not errors.

use super::error::{Error, ErrorKind};
use super::numeric::NumericArray;

const INTEGRAL_THRESHOLD: f64 = 4_503_599_627_370_496.0;

/// Number of decimal places kept in a sum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Precision {
    decimals: u32,
}

impl Precision {
    pub const WHOLE: Precision = Precision { decimals: 0 };
    pub const CENTS: Precision = Precision { decimals: 2 };
    pub const MAX_DECIMALS: u32 = 6;

    pub fn new(decimals: u32) -> Result<Self, Error> {
        if decimals > Self::MAX_DECIMALS {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("decimals must be at most {}", Self::MAX_DECIMALS))
                .with_hint("Use a value between 0 and 6."));
        }
        Ok(Self { decimals })
    }

    pub fn decimals(self) -> u32 {
        self.decimals
    }

    /// Values at or beyond 2^52 are already integral and are returned as is,
    /// which also keeps the scaled intermediate finite.
    pub fn round(self, value: f64) -> f64 {
        if value.abs() >= INTEGRAL_THRESHOLD {
            return value;
        }
        let scale = 10f64.powi(self.decimals as i32);
        let scaled = value * scale;
        if !scaled.is_finite() {
            return value;
        }
        scaled.round() / scale
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::WHOLE
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SumResult(f64);

impl SumResult {
    pub fn value(self) -> f64 {
        self.0
    }
}

pub fn sum_array(array: &NumericArray, precision: Precision) -> SumResult {
    let total = match array {
        NumericArray::Integer(values) => values
            .iter()
            .fold(0i64, |acc, value| acc.wrapping_add(*value)) as f64,
        NumericArray::Real(values) => values.iter().fold(0.0f64, |acc, value| acc + value),
    };
    SumResult(precision.round(total))
}
