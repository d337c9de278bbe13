//! Rounding to binary positions.

use malachite::num::arithmetic::traits::RoundToMultipleOfPowerOf2;
use malachite::rounding_modes::RoundingMode;

/// Rounds a value to a multiple of 2^`position`.
pub trait RoundBinary: Sized {
    type Output;

    fn round(self, position: i64, mode: RoundingMode) -> Self::Output;

    /// Rounds to the nearest multiple, with ties going to the even multiple.
    #[inline]
    fn round_nearest(self, position: i64) -> Self::Output {
        self.round(position, RoundingMode::Nearest)
    }
}

impl<T> RoundBinary for T
where
    T: RoundToMultipleOfPowerOf2<i64>,
{
    type Output = T::Output;

    fn round(self, position: i64, mode: RoundingMode) -> Self::Output {
        self.round_to_multiple_of_power_of_2(position, mode).0
    }
}

#[cfg(test)]
mod tests {
    use malachite::Rational;

    use super::*;

    #[test]
    fn rounding() {
        let five_quarters = Rational::from_signeds(5, 4);

        assert_eq!(
            (&five_quarters).round(-1, RoundingMode::Floor),
            Rational::from(1)
        );
        assert_eq!(
            Rational::from_signeds(-5, 4).round(0, RoundingMode::Ceiling),
            Rational::from(-1)
        );
        assert_eq!(
            (&five_quarters).round_nearest(-1),
            Rational::from(1)
        );
        assert_eq!(
            Rational::from_signeds(7, 4).round_nearest(-1),
            Rational::from(2)
        );
        assert_eq!(
            Rational::from_signeds(-11, 8).round_nearest(-2),
            Rational::from_signeds(-3, 2)
        );
    }
}
