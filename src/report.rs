//! Human-readable summaries of generated tables.

use std::fmt;

use itertools::Itertools;

use crate::approx::quantize::{self, QuantizationOverflow, Quantized};
use crate::approx::remez::{Fit, FitStatus};
use crate::approx::segment::{BitLayout, SegmentError, Table};
use crate::approx::{Domain, Grid};
use crate::format::Format;
use crate::runtime;

pub struct SegmentReport {
    pub index: usize,
    pub domain: Domain,
    pub level: f64,
    pub max_error: f64,
    pub rms_error: f64,
    /// Largest error of the integer evaluator against the target or the
    /// samples.
    pub fixed_error: Option<f64>,
    pub coeffs: Quantized,
    pub iterations: usize,
    pub status: FitStatus,
}

pub struct Report {
    pub degree: u32,
    pub format: Format,
    pub layout: Option<BitLayout>,
    pub segments: Vec<SegmentReport>,
    pub issues: Vec<String>,
}

impl Report {
    /// Summarizes `table`, checking the integer evaluator against `f` at
    /// `points` evenly spaced points per segment.
    pub fn from_table<F>(table: &Table, f: F, points: usize) -> Report
    where
        F: Fn(f64) -> f64,
    {
        let ulp = table.format.ulp();

        let segments = table
            .entries
            .iter()
            .map(|entry| {
                let domain = entry.segment.domain;

                let fixed_error = (0..points)
                    .filter_map(|j| {
                        let x = domain.lo
                            + domain.width() * j as f64 / points as f64;
                        let value = runtime::evaluate_at(table, x)?;

                        Some((value as f64 * ulp - f(x)).abs())
                    })
                    .reduce(f64::max);

                SegmentReport {
                    index: entry.segment.index,
                    domain,
                    level: entry.level,
                    max_error: entry.max_error,
                    rms_error: entry.rms_error,
                    fixed_error,
                    coeffs: entry.coeffs.clone(),
                    iterations: entry.iterations,
                    status: entry.status,
                }
            })
            .collect();

        Report {
            degree: table.degree,
            format: table.format,
            layout: Some(table.layout),
            segments,
            issues: table.issues.iter().map(ToString::to_string).collect(),
        }
    }

    /// Summarizes a single fit over `grid` without a segment layout.
    ///
    /// The fit is quantized to `format` and the integer evaluator is run at
    /// every grid point, with `u` rounded to `u_bits` fractional bits.
    pub fn from_fit(
        domain: Domain,
        fit: &Fit,
        grid: &Grid,
        format: Format,
        u_bits: u32,
    ) -> Result<Report, QuantizationOverflow> {
        let degree = fit.coeffs.len().saturating_sub(1) as u32;
        let coeffs = quantize::quantize(&fit.coeffs, &format)?;

        let ulp = format.ulp();
        let one = (1u64 << u_bits) as f64;

        let fixed_error = grid
            .points()
            .iter()
            .zip(grid.values())
            .map(|(&u, &y)| {
                let u = (u * one).round() as i64;
                let value = runtime::clenshaw(&coeffs, u, u_bits);

                (value as f64 * ulp - y).abs()
            })
            .reduce(f64::max);

        let issues =
            SegmentError::from_status(0, fit.iterations, fit.level, fit.status)
                .iter()
                .map(ToString::to_string)
                .collect();

        let segment = SegmentReport {
            index: 0,
            domain,
            level: fit.level,
            max_error: fit.max_error(),
            rms_error: fit.rms_error(),
            fixed_error,
            coeffs,
            iterations: fit.iterations,
            status: fit.status,
        };

        Ok(Report {
            degree,
            format,
            layout: None,
            segments: vec![segment],
            issues,
        })
    }

    /// Worst-case error of the integer evaluator on any segment.
    pub fn bound(&self) -> f64 {
        let level = self
            .segments
            .iter()
            .fold(0.0_f64, |acc, s| acc.max(s.level));
        let frac_bits = self.format.frac_bits();

        level + runtime::quantization_bound(self.degree, frac_bits)
    }
}

fn status(status: &FitStatus) -> &'static str {
    match (status.converged, status.degraded) {
        (true, false) => "ok",
        (true, true) => "degraded",
        (false, false) => "not converged",
        (false, true) => "not converged, degraded",
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "degree {}, {}", self.degree, self.format)?;

        if let Some(layout) = &self.layout {
            write!(
                f,
                ", {} segments ({} index bits: {} top, {} offset)",
                layout.segments(),
                layout.index_bits,
                layout.top_bits,
                layout.frac_bits
            )?;
        }

        writeln!(f)?;

        for s in &self.segments {
            write!(
                f,
                "{:>4} [{:.6}, {:.6})  E {:.3e}  max {:.3e}  rms {:.3e}",
                s.index,
                s.domain.lo,
                s.domain.hi,
                s.level,
                s.max_error,
                s.rms_error
            )?;

            if let Some(error) = s.fixed_error {
                write!(f, "  fixed {error:.3e}")?;
            }

            writeln!(
                f,
                "  {} iter  {}  [{}]",
                s.iterations,
                status(&s.status),
                s.coeffs.iter().join(", ")
            )?;
        }

        writeln!(f, "bound {:.3e}", self.bound())?;

        for issue in &self.issues {
            writeln!(f, "warning: {issue}")?;
        }

        Ok(())
    }
}
