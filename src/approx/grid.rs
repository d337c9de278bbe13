//! Sample grids over canonical intervals.

use std::fmt;

/// A right-open interval `[lo, hi)` of the target function's argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub lo: f64,
    pub hi: f64,
}

impl Domain {
    pub fn new(lo: f64, hi: f64) -> Result<Domain, DomainError> {
        if !lo.is_finite() {
            return Err(DomainError::NonFiniteBound(lo));
        }

        if !hi.is_finite() {
            return Err(DomainError::NonFiniteBound(hi));
        }

        if lo < hi {
            Ok(Domain { lo, hi })
        } else {
            Err(DomainError::EmptyInterval { lo, hi })
        }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lo <= x && x < self.hi
    }

    /// Maps `x` onto the canonical interval `[-1, 1]`.
    pub fn map(&self, x: f64) -> f64 {
        (2.0 * x - (self.lo + self.hi)) / self.width()
    }

    /// Inverse of [`Domain::map`].
    pub fn unmap(&self, u: f64) -> f64 {
        0.5 * (self.lo + self.hi) + 0.5 * self.width() * u
    }
}

/// A dense, strictly increasing set of canonical points and target values.
#[derive(Clone, Debug)]
pub struct Grid {
    points: Vec<f64>,
    values: Vec<f64>,
}

impl Grid {
    /// Samples `f` at `size` evenly spaced canonical points, including both
    /// endpoints of `[-1, 1]`.
    pub fn sample<F>(
        domain: &Domain,
        size: usize,
        degree: u32,
        f: F,
    ) -> Result<Grid, DomainError>
    where
        F: Fn(f64) -> f64,
    {
        let domain = Domain::new(domain.lo, domain.hi)?;
        let required = min_points(degree);

        if size < required {
            return Err(DomainError::TooFewSamples { size, required });
        }

        let step = 2.0 / (size - 1) as f64;

        let points: Vec<f64> = (0..size)
            .map(|i| if i + 1 == size { 1.0 } else { -1.0 + step * i as f64 })
            .collect();

        let values = points
            .iter()
            .map(|&u| {
                let x = domain.unmap(u);
                let y = f(x);

                if y.is_finite() {
                    Ok(y)
                } else {
                    Err(DomainError::NonFiniteValue { x })
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Grid { points, values })
    }

    /// Validates an externally supplied set of samples.
    pub fn from_points(
        points: Vec<f64>,
        values: Vec<f64>,
        degree: u32,
    ) -> Result<Grid, DomainError> {
        let required = min_points(degree);

        if points.len() != values.len() {
            return Err(DomainError::LengthMismatch {
                points: points.len(),
                values: values.len(),
            });
        }

        if points.len() < required {
            return Err(DomainError::TooFewSamples {
                size: points.len(),
                required,
            });
        }

        for (index, &u) in points.iter().enumerate() {
            if !(-1.0..=1.0).contains(&u) {
                return Err(DomainError::PointOutOfRange { index, u });
            }

            if index > 0 && points[index - 1] >= u {
                return Err(DomainError::UnorderedPoints { index });
            }
        }

        if let Some(&u) = points
            .iter()
            .zip(&values)
            .find_map(|(u, y)| (!y.is_finite()).then_some(u))
        {
            return Err(DomainError::NonFiniteValue { x: u });
        }

        Ok(Grid { points, values })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the grid point closest to `u`.
    pub fn nearest(&self, u: f64) -> usize {
        let i = self.points.partition_point(|&p| p < u);

        if i == 0 {
            0
        } else if i >= self.points.len() {
            self.points.len() - 1
        } else if self.points[i] - u < u - self.points[i - 1] {
            i
        } else {
            i - 1
        }
    }
}

/// Number of samples needed for a fit of the given degree.
pub fn min_points(degree: u32) -> usize {
    degree as usize + 2
}

#[derive(Clone, Debug, PartialEq)]
pub enum DomainError {
    EmptyInterval { lo: f64, hi: f64 },
    NonFiniteBound(f64),
    TooFewSamples { size: usize, required: usize },
    LengthMismatch { points: usize, values: usize },
    NonFiniteValue { x: f64 },
    PointOutOfRange { index: usize, u: f64 },
    UnorderedPoints { index: usize },
    SegmentCount(usize),
    IndexBits { index_bits: u32, top_bits: u32 },
    DeltaBits(u32),
    LayoutMismatch { expected: u32, found: u32 },
    MissingSegments(usize),
    FormatWidth(u32),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainError::EmptyInterval { lo, hi } => {
                write!(f, "interval [{lo}, {hi}) is empty")
            }
            DomainError::NonFiniteBound(bound) => {
                write!(f, "bound {bound} is not finite")
            }
            DomainError::TooFewSamples { size, required } => {
                write!(f, "{size} samples given, at least {required} needed")
            }
            DomainError::LengthMismatch { points, values } => {
                write!(f, "{points} sample points but {values} values")
            }
            DomainError::NonFiniteValue { x } => {
                write!(f, "target is not finite at {x}")
            }
            DomainError::PointOutOfRange { index, u } => {
                write!(f, "sample {index} at {u} lies outside [-1, 1]")
            }
            DomainError::UnorderedPoints { index } => {
                write!(f, "sample {index} is not strictly increasing")
            }
            DomainError::SegmentCount(count) => {
                write!(f, "segment count {count} is not a power of two")
            }
            DomainError::IndexBits {
                index_bits,
                top_bits,
            } => {
                write!(
                    f,
                    "{index_bits} index bits cannot hold {top_bits} segment bits"
                )
            }
            DomainError::DeltaBits(bits) => {
                write!(f, "{bits} offset bits are outside 1..=32")
            }
            DomainError::LayoutMismatch { expected, found } => {
                write!(f, "expected {expected} index bits, found {found}")
            }
            DomainError::MissingSegments(count) => {
                write!(f, "table is missing {count} segments")
            }
            DomainError::FormatWidth(width) => {
                write!(f, "{width}-bit coefficients are wider than 32 bits")
            }
        }
    }
}

impl std::error::Error for DomainError {}
