//! Fixed-point coefficients.

use std::cmp;
use std::fmt;

use smallvec::SmallVec;

use super::chebyshev::Coeffs;
use crate::format::Format;
use crate::utils::rational::FixedPoint;

/// Raw fixed-point coefficients, constant term first.
pub type Quantized = SmallVec<[i64; 16]>;

/// Rounds each coefficient to the nearest value representable in `format`.
///
/// Rounding is carried out exactly, so the result differs from each input by
/// at most half an ulp of the format.
pub fn quantize(
    coeffs: &[f64],
    format: &Format,
) -> Result<Quantized, QuantizationOverflow> {
    coeffs
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            value.to_fixed_point(format).ok_or(QuantizationOverflow {
                index,
                value,
                format: *format,
            })
        })
        .collect()
}

pub fn dequantize(values: &[i64], format: &Format) -> Coeffs {
    let ulp = format.ulp();

    values.iter().map(|&raw| raw as f64 * ulp).collect()
}

/// Minimal two's complement width of every coefficient column in a table.
pub fn column_widths<'a, I>(rows: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a [i64]>,
{
    let mut widths: Vec<u32> = Vec::new();

    for row in rows {
        if widths.len() < row.len() {
            widths.resize(row.len(), 1);
        }

        for (&value, max_width) in row.iter().zip(&mut widths) {
            *max_width = cmp::max(*max_width, signed_width(value));
        }
    }

    widths
}

/// Number of bits needed to hold `value` in two's complement.
pub fn signed_width(value: i64) -> u32 {
    let magnitude = if value < 0 { !value } else { value };

    64 - magnitude.leading_zeros() + 1
}

/// A coefficient does not fit the destination format.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantizationOverflow {
    pub index: usize,
    pub value: f64,
    pub format: Format,
}

impl fmt::Display for QuantizationOverflow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "coefficient {} ({:e}) is not representable in {}",
            self.index, self.value, self.format
        )
    }
}

impl std::error::Error for QuantizationOverflow {}
