//! Fixed-point formats.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use itertools::PeekingNext;
use malachite::num::arithmetic::traits::PowerOf2;
use malachite::num::basic::traits::{One, Zero};
use malachite::Integer;

/// A fixed-point number format with `width` total bits and a scaling factor of
/// 2^`scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format {
    pub scale: i32,
    pub width: u32,
    pub is_signed: bool,
}

impl Format {
    /// Creates a Qm.n format.
    pub fn q(int_bits: u32, frac_bits: u32, is_signed: bool) -> Format {
        Format {
            scale: -(frac_bits as i32),
            width: int_bits + frac_bits,
            is_signed,
        }
    }

    /// Computes the widths of the integer and fractional parts of the format,
    /// returning `None` if either part contains implicit zero bits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use minimax_tables::format::Format;
    /// #
    /// let format = Format { scale: -16, width: 32, is_signed: true };
    ///
    /// assert_eq!(format.parts(), Some((16, 16)));
    /// assert_eq!(Format { scale: 1, ..format }.parts(), None);
    /// assert_eq!(Format { scale: -40, ..format }.parts(), None);
    /// ```
    pub fn parts(&self) -> Option<(u32, u32)> {
        let frac_width = self.scale.unsigned_abs();
        let int_width = self.width.checked_sub(frac_width)?;

        (self.scale <= 0).then_some((int_width, frac_width))
    }

    /// Number of fractional bits, or zero for formats without a fraction.
    pub fn frac_bits(&self) -> u32 {
        if self.scale < 0 {
            self.scale.unsigned_abs()
        } else {
            0
        }
    }

    /// The weight of the least-significant bit.
    pub fn ulp(&self) -> f64 {
        2f64.powi(self.scale)
    }

    /// The smallest and largest raw integers representable in the format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use minimax_tables::format::Format;
    /// # use malachite::Integer;
    /// #
    /// let (min, max) = "Q1.7".parse::<Format>().ok().unwrap().bounds();
    ///
    /// assert_eq!((min, max), (Integer::from(-128), Integer::from(127)));
    /// ```
    pub fn bounds(&self) -> (Integer, Integer) {
        if self.is_signed {
            let half = Integer::power_of_2(u64::from(self.width) - 1);

            (-&half, half - Integer::ONE)
        } else {
            let full = Integer::power_of_2(u64::from(self.width));

            (Integer::ZERO, full - Integer::ONE)
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format {
            scale: -16,
            width: 32,
            is_signed: true,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let prefix = if self.is_signed { "" } else { "U" };

        match self.parts() {
            Some((int, frac)) => write!(f, "{prefix}Q{int}.{frac}"),
            None => write!(f, "{prefix}fix<{}, {}>", self.width, self.scale),
        }
    }
}

impl FromStr for Format {
    type Err = ParseFormatError;

    /// Parses a fixed-point format in ARM-style Q notation.
    #[allow(clippy::from_str_radix_10)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut iter = s.chars();
        let is_signed = iter.peeking_next(|&x| x == 'U').is_none();

        if !matches!(iter.next(), Some('Q')) {
            return Err(ParseFormatError);
        }

        let rest = iter.as_str();
        let split = rest.find('.').ok_or(ParseFormatError)?;

        let int_width = u16::from_str_radix(&rest[..split], 10)?;
        let frac_width = u16::from_str_radix(&rest[split + 1..], 10)?;

        let width = u32::from(int_width) + u32::from(frac_width);

        if width == 0 || width > 64 {
            return Err(ParseFormatError);
        }

        Ok(Format {
            scale: -i32::from(frac_width),
            width,
            is_signed,
        })
    }
}

#[derive(Debug)]
pub struct ParseFormatError;

impl From<ParseIntError> for ParseFormatError {
    fn from(_: ParseIntError) -> Self {
        ParseFormatError
    }
}

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_notation() {
        let format: Format = "Q16.16".parse().unwrap();

        assert_eq!(format, Format::q(16, 16, true));
        assert_eq!(format.frac_bits(), 16);
        assert_eq!(format.to_string(), "Q16.16");

        let format: Format = "UQ1.23".parse().unwrap();

        assert!(!format.is_signed);
        assert_eq!(format.width, 24);
        assert_eq!(format.to_string(), "UQ1.23");

        assert!("Q16".parse::<Format>().is_err());
        assert!("X1.2".parse::<Format>().is_err());
        assert!("Q40.40".parse::<Format>().is_err());
    }

    #[test]
    fn unsigned_bounds() {
        let (min, max) = Format::q(4, 4, false).bounds();

        assert_eq!(min, Integer::ZERO);
        assert_eq!(max, Integer::from(255));
        assert_eq!(Format::q(4, 4, false).ulp(), 0.0625);
    }
}
