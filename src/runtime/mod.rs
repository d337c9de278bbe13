//! Integer-only evaluation of quantized tables.
//!
//! These routines reproduce, bit for bit, what a firmware evaluator computes
//! from a [`Table`]: addresses are split by the table's [`BitLayout`], the
//! offset is turned into a fixed-point `u` in `[-1, 1]`, and the segment's
//! Chebyshev series is summed with the integer Clenshaw recurrence. Every
//! product is truncated by an arithmetic shift.
//!
//! [`BitLayout`]: crate::approx::BitLayout

pub mod angle;
pub mod exp2;
pub mod log2;
pub mod ring;

use crate::approx::{DomainError, Table};

/// Evaluates a quantized Chebyshev series at a fixed-point `u` with `u_bits`
/// fractional bits.
///
/// The result has the same fixed-point format as the coefficients. Tables
/// keep coefficients within [`MAX_FORMAT_WIDTH`] bits, which leaves the
/// accumulators ample headroom.
///
/// [`MAX_FORMAT_WIDTH`]: crate::approx::segment::MAX_FORMAT_WIDTH
///
/// # Examples
///
/// ```
/// # use minimax_tables::runtime::clenshaw;
/// #
/// // 1 + u/2 in Q16.16, evaluated at u = 1 with 16 fractional bits.
/// assert_eq!(clenshaw(&[1 << 16, 1 << 15], 1 << 16, 16), 98304);
/// ```
pub fn clenshaw(coeffs: &[i64], u: i64, u_bits: u32) -> i64 {
    let scaled = |a: i64, b: i64| {
        ((i128::from(a) * i128::from(b)) >> u_bits) as i64
    };

    let mut b1 = 0;
    let mut b2 = 0;

    for &c in coeffs.iter().rev() {
        let b0 = c + scaled(2 * u, b1) - b2;

        b2 = b1;
        b1 = b0;
    }

    b1 - scaled(u, b2)
}

/// Maps an offset in `[0, 2^delta_bits]` to `u = 2 delta / 2^delta_bits - 1`,
/// with `delta_bits` fractional bits.
pub fn delta_to_u(delta: i64, delta_bits: u32) -> i64 {
    (delta << 1) - (1 << delta_bits)
}

/// Bound on `|clenshaw(q, u) - p(u)|` for a series `p` of the given degree
/// and its quantization `q` with `frac_bits` fractional bits.
///
/// Rounding the coefficients contributes half an ulp per term, and each of
/// the `degree + 1` truncated products in the recurrence contributes less
/// than one ulp. Both enter the result with weight at most `|T_k(u)| <= 1`.
pub fn quantization_bound(degree: u32, frac_bits: u32) -> f64 {
    3.0 * f64::from(degree + 1) * 2f64.powi(-(frac_bits as i32) - 1)
}

/// Evaluates `table` at a raw address.
///
/// Returns `None` if the address is out of range or its segment is missing.
pub fn evaluate(table: &Table, raw: u64) -> Option<i64> {
    let layout = &table.layout;
    let address = layout.decode(raw)?;
    let entry = table.entry(address.index)?;

    let u = delta_to_u(address.delta, layout.delta_bits);

    Some(clenshaw(&entry.coeffs, u, layout.delta_bits))
}

/// Evaluates `table` at `x`, or `None` outside its domain.
pub fn evaluate_at(table: &Table, x: f64) -> Option<i64> {
    let raw = table.layout.encode(&table.domain, x)?;

    evaluate(table, raw)
}

/// Checks that every segment of `table` is present, and optionally that it
/// is addressed with the given number of bits.
fn require_complete(
    table: &Table,
    index_bits: Option<u32>,
) -> Result<(), DomainError> {
    if let Some(expected) = index_bits {
        if table.layout.index_bits != expected {
            return Err(DomainError::LayoutMismatch {
                expected,
                found: table.layout.index_bits,
            });
        }
    }

    let missing = table.layout.segments().saturating_sub(table.entries.len());

    if missing > 0 {
        return Err(DomainError::MissingSegments(missing));
    }

    Ok(())
}
