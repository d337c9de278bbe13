//! Minimax polynomial approximation.

pub mod chebyshev;
pub mod grid;
pub mod linalg;
pub mod quantize;
pub mod remez;
pub mod segment;

use std::fmt;

pub use grid::{Domain, DomainError, Grid};
pub use linalg::SingularMatrixError;
pub use quantize::QuantizationOverflow;
pub use remez::{Fit, FitStatus, Remez};
pub use segment::{build_table, BitLayout, Table, TableError, TableSpec};

/// Parameters of a single fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FitOptions {
    pub degree: u32,
    pub grid_size: usize,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            degree: 5,
            grid_size: 8192,
            max_iter: 60,
            tol: 1e-12,
        }
    }
}

/// Computes the minimax polynomial of `f` over `domain` on a uniform grid.
pub fn fit<F>(
    domain: &Domain,
    f: F,
    options: &FitOptions,
) -> Result<Fit, FitError>
where
    F: Fn(f64) -> f64,
{
    let grid = Grid::sample(domain, options.grid_size, options.degree, f)?;

    fit_grid(&grid, options)
}

/// Computes the minimax polynomial over an existing grid.
pub fn fit_grid(grid: &Grid, options: &FitOptions) -> Result<Fit, FitError> {
    Remez::new(grid, options.degree)?.run(options.max_iter, options.tol)
}

#[derive(Clone, Debug, PartialEq)]
pub enum FitError {
    Domain(DomainError),
    Singular(SingularMatrixError),
}

impl From<DomainError> for FitError {
    fn from(err: DomainError) -> Self {
        FitError::Domain(err)
    }
}

impl From<SingularMatrixError> for FitError {
    fn from(err: SingularMatrixError) -> Self {
        FitError::Singular(err)
    }
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FitError::Domain(err) => write!(f, "{err}"),
            FitError::Singular(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FitError::Domain(err) => Some(err),
            FitError::Singular(err) => Some(err),
        }
    }
}
