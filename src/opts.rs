use std::path::PathBuf;

use argh::FromArgs;
use log::LevelFilter;

use crate::approx::{DomainError, FitOptions, TableSpec};
use crate::format::Format;
use crate::targets::Target;

/// Minimax polynomial tables for integer-only evaluators.
#[derive(FromArgs)]
pub struct Opts {
    /// built-in target (sin, cos, log2, exp2, mantissa)
    #[argh(positional)]
    pub target: Option<Target>,

    /// fit `x,y` samples from a file instead of a target
    #[argh(option)]
    pub samples: Option<PathBuf>,

    /// polynomial degree
    #[argh(option, short = 'd')]
    pub degree: Option<u32>,

    /// number of segments, a power of two
    #[argh(option, short = 's')]
    pub segments: Option<usize>,

    /// sample grid size per segment
    #[argh(option)]
    pub grid: Option<usize>,

    /// coefficient format
    #[argh(option, default = "Default::default()")]
    pub format: Format,

    /// width of a raw table address
    #[argh(option)]
    pub index_bits: Option<u32>,

    /// resolution of the offset within a segment
    #[argh(option, default = "16")]
    pub delta_bits: u32,

    /// iteration cap per segment
    #[argh(option, default = "60")]
    pub max_iter: usize,

    /// convergence tolerance on the leveled error
    #[argh(option, default = "1e-12")]
    pub tol: f64,

    /// keep the table when some segments fail
    #[argh(switch)]
    pub accept_partial: bool,

    /// logging level
    #[argh(option, long = "log", default = "LevelFilter::Warn")]
    pub log_level: LevelFilter,
}

impl Opts {
    /// Parse options from `env::args`.
    pub fn parse() -> Opts {
        argh::from_env()
    }

    /// Fit parameters, falling back to `degree` and `grid_size` where no
    /// option overrides them.
    pub fn fit_options(&self, degree: u32, grid_size: usize) -> FitOptions {
        FitOptions {
            degree: self.degree.unwrap_or(degree),
            grid_size: self.grid.unwrap_or(grid_size),
            max_iter: self.max_iter,
            tol: self.tol,
        }
    }

    /// The table to generate for `target`.
    pub fn table_spec(
        &self,
        target: Target,
    ) -> Result<TableSpec, DomainError> {
        let defaults = target.defaults();
        let base = target.spec(self.format)?;

        Ok(TableSpec {
            segments: self.segments.unwrap_or(defaults.segments),
            index_bits: self.index_bits.unwrap_or(defaults.index_bits),
            delta_bits: self.delta_bits,
            fit: self.fit_options(defaults.degree, defaults.grid_size),
            accept_partial: self.accept_partial,
            ..base
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opts {
        Opts::from_args(&["minimax-tables"], args).unwrap()
    }

    #[test]
    fn defaults_follow_target() {
        let opts = parse(&["log2"]);
        let spec = opts.table_spec(opts.target.unwrap()).unwrap();

        assert_eq!(spec.segments, 16);
        assert_eq!(spec.fit.degree, 3);
        assert_eq!(spec.fit.max_iter, 60);
        assert_eq!(spec.format, Format::q(16, 16, true));
        assert!(!spec.accept_partial);
    }

    #[test]
    fn overrides() {
        let opts = parse(&[
            "sin",
            "-d",
            "4",
            "--segments",
            "8",
            "--format",
            "Q2.14",
            "--tol",
            "1e-9",
            "--accept-partial",
            "--log",
            "debug",
        ]);
        let spec = opts.table_spec(Target::Sin).unwrap();

        assert_eq!(spec.segments, 8);
        assert_eq!(spec.index_bits, 14);
        assert_eq!(spec.fit.degree, 4);
        assert_eq!(spec.fit.tol, 1e-9);
        assert_eq!(spec.format, Format::q(2, 14, true));
        assert!(spec.accept_partial);
        assert_eq!(opts.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_unknown_targets() {
        assert!(Opts::from_args(&["minimax-tables"], &["tan"]).is_err());
    }
}
