//! Scaling integers by single-precision floats.

use super::{evaluate, require_complete};
use crate::approx::{DomainError, Table};

/// Explicit mantissa bits of an IEEE-754 single.
pub const MANTISSA_BITS: u32 = 23;

/// Splits a single-precision float into its unbiased exponent and its
/// mantissa with the implicit leading one restored.
///
/// # Examples
///
/// ```
/// # use minimax_tables::runtime::ring::decompose;
/// #
/// assert_eq!(decompose(1.5), (0, 0xC00000));
/// assert_eq!(decompose(0.25), (-2, 0x800000));
/// ```
pub fn decompose(f: f32) -> (i32, u32) {
    let bits = f.to_bits();

    let exponent = ((bits >> 23) & 0xFF) as i32 - 127;
    let mantissa = (bits & 0x7FFFFF) | 0x800000;

    (exponent, mantissa)
}

/// A table of the mantissa value over `[1, 2)`, addressed by the explicit
/// mantissa bits.
#[derive(Clone, Debug)]
pub struct RingTable {
    table: Table,
}

impl RingTable {
    pub fn new(table: Table) -> Result<RingTable, DomainError> {
        require_complete(&table, Some(MANTISSA_BITS))?;

        Ok(RingTable { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Computes `floor(a * f)`, saturating at `u32::MAX`.
    ///
    /// Zero, negative, and non-finite factors yield zero.
    pub fn mul_u32_by_float(&self, a: u32, f: f32) -> u32 {
        if a == 0 || !f.is_finite() || f <= 0.0 {
            return 0;
        }

        let (exponent, mantissa) = decompose(f);

        let scale = evaluate(&self.table, u64::from(mantissa & 0x7FFFFF))
            .unwrap_or(0);

        if scale <= 0 {
            return 0;
        }

        let product = u128::from(a) * scale as u128;
        let shift = exponent - self.table.format.frac_bits() as i32;

        let value = if shift >= 0 {
            let width = 128 - product.leading_zeros();

            if width + shift.unsigned_abs() > 32 {
                return u32::MAX;
            }

            product << shift
        } else {
            product.checked_shr(shift.unsigned_abs()).unwrap_or(0)
        };

        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::tests::table;

    fn ring() -> RingTable {
        RingTable::new(table((1.0, 2.0), 32, 1, 23, |m| m)).unwrap()
    }

    #[test]
    fn exact_products() {
        let ring = ring();

        assert_eq!(ring.mul_u32_by_float(1000, 1.5), 1500);
        assert_eq!(ring.mul_u32_by_float(1000, 3.0), 3000);
        assert_eq!(ring.mul_u32_by_float(1000, 0.25), 250);
        assert_eq!(ring.mul_u32_by_float(7, 1.0), 7);
    }

    #[test]
    fn inexact_products() {
        let ring = ring();

        let product = ring.mul_u32_by_float(1000, 1.1);

        assert!(product.abs_diff(1100) <= 1, "{product}");

        let product = ring.mul_u32_by_float(123456, 0.7);

        assert!(product.abs_diff(86419) <= 1, "{product}");
    }

    #[test]
    fn edge_cases() {
        let ring = ring();

        assert_eq!(ring.mul_u32_by_float(0, 2.0), 0);
        assert_eq!(ring.mul_u32_by_float(5, 0.0), 0);
        assert_eq!(ring.mul_u32_by_float(5, -1.0), 0);
        assert_eq!(ring.mul_u32_by_float(5, f32::NAN), 0);
        assert_eq!(ring.mul_u32_by_float(5, f32::INFINITY), 0);
        assert_eq!(ring.mul_u32_by_float(u32::MAX, 2.0), u32::MAX);
        assert_eq!(ring.mul_u32_by_float(3, 1e30), u32::MAX);
        assert_eq!(ring.mul_u32_by_float(3, 1e-30), 0);
    }
}
