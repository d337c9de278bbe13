//! Segmented tables.
//!
//! A domain is split into a power-of-two number of segments so that the
//! runtime can extract the segment index from the top bits of a raw input and
//! use the remaining bits as the offset within the segment.

use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;

use super::chebyshev::Coeffs;
use super::grid::{Domain, DomainError};
use super::linalg::SingularMatrixError;
use super::quantize::{self, QuantizationOverflow, Quantized};
use super::remez::FitStatus;
use super::{FitError, FitOptions};
use crate::format::Format;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub domain: Domain,
}

/// Splits `domain` into `count` contiguous right-open segments of equal
/// width. Neighboring segments share their boundary value exactly, and the
/// last segment ends at `domain.hi`.
pub fn partition(
    domain: &Domain,
    count: usize,
) -> Result<Vec<Segment>, DomainError> {
    if !count.is_power_of_two() {
        return Err(DomainError::SegmentCount(count));
    }

    let boundary = |i: usize| {
        if i == count {
            domain.hi
        } else {
            domain.lo + domain.width() * i as f64 / count as f64
        }
    };

    (0..count)
        .map(|index| {
            Ok(Segment {
                index,
                domain: Domain::new(boundary(index), boundary(index + 1))?,
            })
        })
        .collect()
}

/// The split of a raw table address into segment index and offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitLayout {
    /// Width of a raw address.
    pub index_bits: u32,
    /// Leading address bits that select the segment.
    pub top_bits: u32,
    /// Remaining address bits, the position within a segment.
    pub frac_bits: u32,
    /// Resolution of the offset handed to the evaluator.
    pub delta_bits: u32,
}

/// A decoded raw address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Address {
    pub index: usize,
    /// Offset within the segment in units of 2^-`delta_bits`.
    pub delta: i64,
}

impl BitLayout {
    pub fn new(
        index_bits: u32,
        segments: usize,
        delta_bits: u32,
    ) -> Result<BitLayout, DomainError> {
        if !segments.is_power_of_two() {
            return Err(DomainError::SegmentCount(segments));
        }

        let top_bits = segments.trailing_zeros();

        if top_bits > index_bits || index_bits > 63 {
            return Err(DomainError::IndexBits {
                index_bits,
                top_bits,
            });
        }

        if !(1..=32).contains(&delta_bits) {
            return Err(DomainError::DeltaBits(delta_bits));
        }

        Ok(BitLayout {
            index_bits,
            top_bits,
            frac_bits: index_bits - top_bits,
            delta_bits,
        })
    }

    pub fn segments(&self) -> usize {
        1 << self.top_bits
    }

    /// Splits a raw address in `[0, 2^index_bits]`.
    ///
    /// The one-past-the-end address decodes to the right edge of the last
    /// segment, which mirrored lookups rely on.
    pub fn decode(&self, raw: u64) -> Option<Address> {
        let end = 1u64 << self.index_bits;

        if raw > end {
            return None;
        }

        if raw == end {
            return Some(Address {
                index: self.segments() - 1,
                delta: 1 << self.delta_bits,
            });
        }

        let offset = raw & ((1 << self.frac_bits) - 1);

        let delta = if self.frac_bits >= self.delta_bits {
            offset >> (self.frac_bits - self.delta_bits)
        } else {
            offset << (self.delta_bits - self.frac_bits)
        };

        Some(Address {
            index: (raw >> self.frac_bits) as usize,
            delta: delta as i64,
        })
    }

    /// The point of `domain` at raw address `raw`.
    ///
    /// Segment starts land exactly on the boundaries `partition` produces.
    pub fn position(&self, domain: &Domain, raw: u64) -> f64 {
        let end = 1u64 << self.index_bits;

        if raw >= end {
            domain.hi
        } else {
            domain.lo + domain.width() * raw as f64 / end as f64
        }
    }

    /// The raw address of the largest grid position not exceeding `x`.
    pub fn encode(&self, domain: &Domain, x: f64) -> Option<u64> {
        if !domain.contains(x) {
            return None;
        }

        let last = (1u64 << self.index_bits) - 1;
        let scale = (1u64 << self.index_bits) as f64;
        let estimate = ((x - domain.lo) / domain.width() * scale).floor();
        let mut raw = (estimate.max(0.0) as u64).min(last);

        // The estimate can be off by one near grid positions.
        while raw > 0 && self.position(domain, raw) > x {
            raw -= 1;
        }

        while raw < last && self.position(domain, raw + 1) <= x {
            raw += 1;
        }

        Some(raw)
    }
}

/// Widest coefficient format the integer evaluator can sum without
/// overflowing its 64-bit accumulators.
pub const MAX_FORMAT_WIDTH: u32 = 32;

/// Parameters of one table generation run.
#[derive(Clone, Debug)]
pub struct TableSpec {
    pub domain: Domain,
    pub segments: usize,
    pub index_bits: u32,
    pub delta_bits: u32,
    pub format: Format,
    pub fit: FitOptions,
    /// Keep the segments that succeeded when others fail.
    pub accept_partial: bool,
}

/// One fitted and quantized segment.
#[derive(Clone, Debug)]
pub struct TableEntry {
    pub segment: Segment,
    pub coeffs: Quantized,
    pub float_coeffs: Coeffs,
    pub level: f64,
    pub max_error: f64,
    pub rms_error: f64,
    pub iterations: usize,
    pub status: FitStatus,
}

#[derive(Clone, Debug)]
pub struct Table {
    pub domain: Domain,
    pub layout: BitLayout,
    pub format: Format,
    pub degree: u32,
    /// Entries in segment order. Failed segments are missing.
    pub entries: Vec<TableEntry>,
    pub issues: Vec<SegmentError>,
}

impl Table {
    pub fn entry(&self, index: usize) -> Option<&TableEntry> {
        self.entries
            .binary_search_by_key(&index, |entry| entry.segment.index)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Largest leveled error over all entries.
    pub fn max_level(&self) -> f64 {
        self.entries.iter().fold(0.0_f64, |acc, e| acc.max(e.level))
    }

    pub fn coefficient_widths(&self) -> Vec<u32> {
        quantize::column_widths(self.entries.iter().map(|e| &e.coeffs[..]))
    }
}

/// Fits, quantizes, and collects every segment of `spec`.
///
/// Segments are fitted in parallel and independently of one another. Unless
/// `spec.accept_partial` is set, any failed, non-converged, or degraded
/// segment fails the whole table. Formats wider than [`MAX_FORMAT_WIDTH`]
/// are rejected up front.
pub fn build_table<F>(spec: &TableSpec, f: F) -> Result<Table, TableError>
where
    F: Fn(f64) -> f64 + Sync,
{
    if spec.format.width > MAX_FORMAT_WIDTH {
        return Err(DomainError::FormatWidth(spec.format.width).into());
    }

    let layout =
        BitLayout::new(spec.index_bits, spec.segments, spec.delta_bits)?;
    let segments = partition(&spec.domain, spec.segments)?;

    log::info!(
        "fitting {} segments of degree {} over [{}, {})",
        segments.len(),
        spec.fit.degree,
        spec.domain.lo,
        spec.domain.hi
    );

    let outcomes: Vec<_> = segments
        .into_par_iter()
        .map(|segment| fit_segment(segment, spec, &f))
        .collect();

    let (entries, issues) = aggregate(outcomes, spec.accept_partial)?;

    for issue in &issues {
        log::warn!("{issue}");
    }

    Ok(Table {
        domain: spec.domain,
        layout,
        format: spec.format,
        degree: spec.fit.degree,
        entries,
        issues,
    })
}

/// Splits per-segment outcomes into kept entries and reported issues.
///
/// Non-converged and degraded fits are kept but reported. Unless
/// `accept_partial` is set, any issue fails the table.
fn aggregate(
    outcomes: Vec<Result<TableEntry, SegmentError>>,
    accept_partial: bool,
) -> Result<(Vec<TableEntry>, Vec<SegmentError>), TableError> {
    let mut entries = Vec::with_capacity(outcomes.len());
    let mut issues = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(entry) => {
                issues.extend(SegmentError::from_status(
                    entry.segment.index,
                    entry.iterations,
                    entry.level,
                    entry.status,
                ));

                entries.push(entry);
            }
            Err(err) => issues.push(err),
        }
    }

    if !issues.is_empty() && !accept_partial {
        return Err(TableError::Segments(issues));
    }

    Ok((entries, issues))
}

fn fit_segment<F>(
    segment: Segment,
    spec: &TableSpec,
    f: &F,
) -> Result<TableEntry, SegmentError>
where
    F: Fn(f64) -> f64,
{
    let error = |kind: SegmentErrorKind| SegmentError {
        index: segment.index,
        kind,
    };

    let fit = super::fit(&segment.domain, f, &spec.fit)
        .map_err(|err| error(err.into()))?;

    let coeffs = quantize::quantize(&fit.coeffs, &spec.format)
        .map_err(|err| error(SegmentErrorKind::Overflow(err)))?;

    log::debug!(
        "segment {}: E = {:.3e} after {} iterations",
        segment.index,
        fit.level,
        fit.iterations
    );

    Ok(TableEntry {
        segment,
        max_error: fit.max_error(),
        rms_error: fit.rms_error(),
        coeffs,
        float_coeffs: fit.coeffs,
        level: fit.level,
        iterations: fit.iterations,
        status: fit.status,
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentError {
    pub index: usize,
    pub kind: SegmentErrorKind,
}

impl SegmentError {
    /// The issues a fit with `status` raises: one for running out of
    /// iterations and one for a degraded alternation set.
    pub fn from_status(
        index: usize,
        iterations: usize,
        level: f64,
        status: FitStatus,
    ) -> Vec<SegmentError> {
        let mut issues = Vec::new();

        if !status.converged {
            issues.push(SegmentError {
                index,
                kind: SegmentErrorKind::NonConvergence { iterations, level },
            });
        }

        if status.degraded {
            issues.push(SegmentError {
                index,
                kind: SegmentErrorKind::DegradedAlternation,
            });
        }

        issues
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SegmentErrorKind {
    Domain(DomainError),
    Singular(SingularMatrixError),
    NonConvergence { iterations: usize, level: f64 },
    DegradedAlternation,
    Overflow(QuantizationOverflow),
}

impl From<FitError> for SegmentErrorKind {
    fn from(err: FitError) -> Self {
        match err {
            FitError::Domain(err) => SegmentErrorKind::Domain(err),
            FitError::Singular(err) => SegmentErrorKind::Singular(err),
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "segment {}: ", self.index)?;

        match &self.kind {
            SegmentErrorKind::Domain(err) => write!(f, "{err}"),
            SegmentErrorKind::Singular(err) => write!(f, "{err}"),
            SegmentErrorKind::NonConvergence { iterations, level } => write!(
                f,
                "no convergence after {iterations} iterations (E = {level:e})"
            ),
            SegmentErrorKind::DegradedAlternation => {
                write!(f, "alternation set does not alternate in sign")
            }
            SegmentErrorKind::Overflow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SegmentError {}

#[derive(Debug)]
pub enum TableError {
    Domain(DomainError),
    Segments(Vec<SegmentError>),
}

impl From<DomainError> for TableError {
    fn from(err: DomainError) -> Self {
        TableError::Domain(err)
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::Domain(err) => write!(f, "{err}"),
            TableError::Segments(errors) => {
                write!(f, "{}", errors.iter().join("\n"))
            }
        }
    }
}

impl std::error::Error for TableError {}
