//! Sine and cosine of binary angles.
//!
//! A binary angle divides the full turn into 2^16 steps. The top two bits
//! select the quadrant and the low 14 bits the position within it, so a
//! single table over the first quadrant serves every angle.

use super::{evaluate, require_complete};
use crate::approx::{DomainError, Table};

/// Address width of a quarter turn.
pub const QUADRANT_BITS: u32 = 14;

const QUADRANT: u16 = 1 << QUADRANT_BITS;

/// A sine table over `[0, π/2)`.
#[derive(Clone, Debug)]
pub struct AngleTable {
    table: Table,
}

impl AngleTable {
    pub fn new(table: Table) -> Result<AngleTable, DomainError> {
        require_complete(&table, Some(QUADRANT_BITS))?;

        Ok(AngleTable { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Sine of `angle * 2π / 2^16` in the table's format.
    pub fn sin_from_angle(&self, angle: u16) -> i64 {
        let quadrant = angle >> QUADRANT_BITS;
        let position = angle & (QUADRANT - 1);

        // Odd quadrants run backwards through the table. A zero position
        // there reads the one-past-the-end address, the right edge of the
        // last segment.
        let position = if quadrant & 1 == 1 {
            QUADRANT - position
        } else {
            position
        };

        // Every address up to a full quadrant is valid and every segment is
        // present.
        let value = evaluate(&self.table, u64::from(position)).unwrap_or(0);

        if quadrant >= 2 {
            -value
        } else {
            value
        }
    }

    pub fn cos_from_angle(&self, angle: u16) -> i64 {
        self.sin_from_angle(angle.wrapping_add(QUADRANT))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, TAU};

    use super::*;
    use crate::runtime::tests::{segment_bound, table};

    fn sine() -> AngleTable {
        AngleTable::new(table((0.0, FRAC_PI_2), 16, 4, 14, f64::sin)).unwrap()
    }

    /// Bound on the error of `sin_from_angle(angle)`, from the segment the
    /// angle reads.
    fn bound(angles: &AngleTable, angle: u16) -> f64 {
        let position = angle & (QUADRANT - 1);
        let raw = if (angle >> QUADRANT_BITS) & 1 == 1 {
            QUADRANT - position
        } else {
            position
        };

        segment_bound(angles.table(), u64::from(raw)) + 1e-12
    }

    #[test]
    fn full_turn() {
        let angles = sine();

        for angle in 0..=u16::MAX {
            let theta = f64::from(angle) * TAU / 65536.0;

            let sin = angles.sin_from_angle(angle) as f64 / 65536.0;
            let cos = angles.cos_from_angle(angle) as f64 / 65536.0;

            let sin_bound = bound(&angles, angle);
            let cos_bound = bound(&angles, angle.wrapping_add(QUADRANT));

            assert!((sin - theta.sin()).abs() <= sin_bound, "sin({angle})");
            assert!((cos - theta.cos()).abs() <= cos_bound, "cos({angle})");
        }
    }

    #[test]
    fn quadrant_edges() {
        let angles = sine();
        let one = 1 << 16;
        let close = |value: i64, expected: i64| (value - expected).abs() <= 8;

        assert!(close(angles.sin_from_angle(0), 0));
        assert!(close(angles.sin_from_angle(0x4000), one));
        assert!(close(angles.sin_from_angle(0x8000), 0));
        assert!(close(angles.sin_from_angle(0xC000), -one));
        assert!(close(angles.cos_from_angle(0), one));
    }

    #[test]
    fn layout_is_checked() {
        let table = table((0.0, FRAC_PI_2), 4, 2, 12, f64::sin);

        assert_eq!(
            AngleTable::new(table).unwrap_err(),
            DomainError::LayoutMismatch {
                expected: 14,
                found: 12
            }
        );
    }
}
