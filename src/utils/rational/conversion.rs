//! Numeric conversions.

use malachite::num::arithmetic::traits::PowerOf2;
use malachite::{Integer, Rational};

use super::RoundBinary;
use crate::format::Format;

/// Converts a finite `f64` to the rational number it denotes, without error.
pub fn exact(value: f64) -> Option<Rational> {
    Rational::try_from(value).ok()
}

/// A trait for converting to fixed-point representation.
pub trait FixedPoint {
    /// Rounds `self` to the nearest representable value of `format` and
    /// returns the raw scaled integer, or `None` if it does not fit.
    fn to_fixed_point(&self, format: &Format) -> Option<i64>;
}

impl FixedPoint for Rational {
    fn to_fixed_point(&self, format: &Format) -> Option<i64> {
        let value = to_scaled_integer(self, format.scale)?;
        let (min, max) = format.bounds();

        if value < min || value > max {
            return None;
        }

        i64::try_from(&value).ok()
    }
}

impl FixedPoint for f64 {
    fn to_fixed_point(&self, format: &Format) -> Option<i64> {
        exact(*self)?.to_fixed_point(format)
    }
}

fn to_scaled_integer(value: &Rational, scale: i32) -> Option<Integer> {
    let scale = i64::from(scale);
    let rounded = value.round_nearest(scale);

    Integer::try_from(rounded * Rational::power_of_2(-scale)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: f64, format: &Format) -> Option<i64> {
        value.to_fixed_point(format)
    }

    #[test]
    fn signed_fixed_point_conversion() {
        let q16 = Format::q(16, 16, true);

        assert_eq!(fixed(42.125, &q16), Some(2760704));
        assert_eq!(fixed(-1.0, &q16), Some(-65536));
        assert_eq!(fixed(0.0, &q16), Some(0));
        assert_eq!(fixed(1.0 / 3.0, &q16), Some(21845));
        assert_eq!(fixed(-1.0 / 3.0, &q16), Some(-21845));
    }

    #[test]
    fn signed_fixed_point_conversion_widths() {
        let q3 = Format::q(3, 0, true);

        assert_eq!(fixed(-4.0, &q3), Some(-4));
        assert_eq!(fixed(3.0, &q3), Some(3));
        assert_eq!(fixed(4.0, &q3), None);
        assert_eq!(fixed(-5.0, &q3), None);
        assert_eq!(fixed(f64::NAN, &q3), None);
        assert_eq!(fixed(f64::INFINITY, &q3), None);
    }

    #[test]
    fn unsigned_fixed_point_conversion() {
        let uq = Format::q(1, 31, false);

        assert_eq!(fixed(1.14404296875, &uq), Some(2456813568));
        assert_eq!(fixed(-0.5, &uq), None);
        assert_eq!(fixed(2.0, &uq), None);
        assert_eq!(
            exact(0.5).unwrap().to_fixed_point(&Format::q(0, 1, false)),
            Some(1)
        );
    }
}
