//! Fixed-point base-2 logarithms of integers.

use super::{evaluate, require_complete};
use crate::approx::{DomainError, Table};

/// A table of `log2(m)` over `[1, 2)`.
#[derive(Clone, Debug)]
pub struct Log2Table {
    table: Table,
}

impl Log2Table {
    pub fn new(table: Table) -> Result<Log2Table, DomainError> {
        require_complete(&table, None)?;

        Ok(Log2Table { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Computes `log2(x)` in the table's format, or `None` for zero.
    ///
    /// The leading one gives the integer part. The bits below it, aligned to
    /// the table's address width, select the fractional part.
    pub fn log2_fixed(&self, x: u32) -> Option<i64> {
        if x == 0 {
            return None;
        }

        let msb = 31 - x.leading_zeros();
        let bits = self.table.layout.index_bits;
        let normalized = u64::from(x) ^ (1 << msb);

        let raw = if msb >= bits {
            normalized >> (msb - bits)
        } else {
            normalized << (bits - msb)
        };

        let frac_bits = self.table.format.frac_bits();
        let fraction = evaluate(&self.table, raw)?;

        Some((i64::from(msb) << frac_bits) + fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::tests::table;

    fn log2() -> Log2Table {
        Log2Table::new(table((1.0, 2.0), 16, 3, 16, f64::log2)).unwrap()
    }

    fn approx(value: Option<i64>) -> f64 {
        value.unwrap() as f64 / 65536.0
    }

    #[test]
    fn powers_of_two() {
        let log2 = log2();

        for k in 0..32 {
            let value = approx(log2.log2_fixed(1 << k));

            assert!((value - f64::from(k)).abs() < 1e-3, "log2(2^{k})");
        }
    }

    #[test]
    fn other_values() {
        let log2 = log2();

        assert!((approx(log2.log2_fixed(3)) - 1.5849625).abs() < 1e-3);
        assert!((approx(log2.log2_fixed(1000)) - 9.9657843).abs() < 1e-3);
        assert!((approx(log2.log2_fixed(u32::MAX)) - 32.0).abs() < 1e-3);
        assert_eq!(log2.log2_fixed(0), None);
    }
}
