//! Dense linear systems.

use std::fmt;

use nalgebra::{DMatrix, DVector};

/// Pivots smaller than this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-30;

/// Solves `a x = b` by LU decomposition with partial pivoting.
///
/// `a` must be square with as many rows as `b`. The inputs are left untouched;
/// the decomposition works on a copy.
pub fn solve<R>(a: &[R], b: &[f64]) -> Result<Vec<f64>, SingularMatrixError>
where
    R: AsRef<[f64]>,
{
    let n = b.len();

    if let Some(row) = a.iter().find(|row| row.as_ref().len() != n) {
        return Err(SingularMatrixError::Shape {
            rows: a.len(),
            cols: row.as_ref().len(),
            rhs: n,
        });
    }

    if a.len() != n {
        return Err(SingularMatrixError::Shape {
            rows: a.len(),
            cols: n,
            rhs: n,
        });
    }

    let lu = DMatrix::from_fn(n, n, |i, j| a[i].as_ref()[j]).lu();

    // NaN pivots fail this test as well.
    let weak = lu
        .u()
        .diagonal()
        .iter()
        .position(|pivot| !(pivot.abs() >= PIVOT_EPSILON));

    if let Some(column) = weak {
        return Err(SingularMatrixError::Pivot {
            column,
            pivot: lu.u()[(column, column)].abs(),
        });
    }

    let x = lu
        .solve(&DVector::from_column_slice(b))
        .ok_or(SingularMatrixError::Pivot {
            column: 0,
            pivot: 0.0,
        })?;

    Ok(x.iter().copied().collect())
}

/// The system has no unique solution, or is not a square system at all.
#[derive(Clone, Debug, PartialEq)]
pub enum SingularMatrixError {
    /// The decomposition ran out of usable pivots.
    Pivot { column: usize, pivot: f64 },
    Shape { rows: usize, cols: usize, rhs: usize },
}

impl fmt::Display for SingularMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SingularMatrixError::Pivot { column, pivot } => write!(
                f,
                "matrix is singular: pivot in column {column} is {pivot:e}"
            ),
            SingularMatrixError::Shape { rows, cols, rhs } => write!(
                f,
                "expected a square system, found a {rows}x{cols} matrix \
                 and {rhs} right-hand values"
            ),
        }
    }
}

impl std::error::Error for SingularMatrixError {}
