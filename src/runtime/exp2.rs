//! Fixed-point base-2 exponentials.
//!
//! The counterpart of [`log2`](super::log2): a product of two integers is
//! `exp2_fixed(log2(a) + log2(b))` when both tables share a format.

use super::{evaluate, require_complete};
use crate::approx::{DomainError, Table};

/// A table of `2^t` over `[0, 1)`.
#[derive(Clone, Debug)]
pub struct Exp2Table {
    table: Table,
}

impl Exp2Table {
    pub fn new(table: Table) -> Result<Exp2Table, DomainError> {
        require_complete(&table, None)?;

        Ok(Exp2Table { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Computes `floor(2^y)` for `y` in the table's format, saturating at
    /// `u32::MAX`.
    ///
    /// The integer part of `y` becomes a shift. The fractional part,
    /// aligned to the table's address width, selects the table value.
    pub fn exp2_fixed(&self, y: i64) -> u32 {
        let frac_bits = self.table.format.frac_bits();
        let bits = self.table.layout.index_bits;

        let whole = y >> frac_bits;
        let fraction = (y & ((1 << frac_bits) - 1)) as u64;

        let raw = if frac_bits >= bits {
            fraction >> (frac_bits - bits)
        } else {
            fraction << (bits - frac_bits)
        };

        // Every address below 2^index_bits decodes into a present segment.
        let scale = evaluate(&self.table, raw).unwrap_or(0).max(0) as u128;

        if scale == 0 {
            return 0;
        }

        let shift = whole - i64::from(frac_bits);

        let value = if shift >= 0 {
            if shift >= 64 {
                return u32::MAX;
            }

            scale << shift
        } else {
            if shift <= -64 {
                return 0;
            }

            scale >> -shift
        };

        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::log2::Log2Table;
    use crate::runtime::tests::table;

    fn exp2() -> Exp2Table {
        Exp2Table::new(table((0.0, 1.0), 16, 3, 16, f64::exp2)).unwrap()
    }

    #[test]
    fn tracks_exp2() {
        let exp2 = exp2();

        for whole in -3..=30 {
            for fraction in [0, 12345, 1 << 15, 60000] {
                let y = (whole << 16) + fraction;
                let expected = (y as f64 / 65536.0).exp2();
                let value = f64::from(exp2.exp2_fixed(y));

                assert!(
                    (value - expected).abs() <= expected * 1e-3 + 1.0,
                    "2^({y} / 2^16) = {value}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn saturation() {
        let exp2 = exp2();

        assert_eq!(exp2.exp2_fixed((32 << 16) + (1 << 15)), u32::MAX);
        assert_eq!(exp2.exp2_fixed(40 << 16), u32::MAX);
        assert_eq!(exp2.exp2_fixed(i64::MAX), u32::MAX);
        assert_eq!(exp2.exp2_fixed(-40 << 16), 0);
        assert_eq!(exp2.exp2_fixed(i64::MIN), 0);
    }

    #[test]
    fn products_through_logarithms() {
        let exp2 = exp2();
        let log2 =
            Log2Table::new(table((1.0, 2.0), 16, 3, 16, f64::log2)).unwrap();

        for (a, b) in [(3u32, 7u32), (1000, 1000), (12345, 17)] {
            let sum = log2.log2_fixed(a).unwrap() + log2.log2_fixed(b).unwrap();
            let product = f64::from(exp2.exp2_fixed(sum));
            let expected = f64::from(a) * f64::from(b);

            assert!(
                (product - expected).abs() <= expected * 1e-2,
                "{a} * {b} = {product}"
            );
        }
    }

    #[test]
    fn layout_is_checked() {
        let mut table = table((0.0, 1.0), 4, 2, 12, f64::exp2);
        table.entries.pop();

        assert_eq!(
            Exp2Table::new(table).unwrap_err(),
            DomainError::MissingSegments(1)
        );
    }
}
