use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

use minimax_tables::approx::segment::{SegmentError, MAX_FORMAT_WIDTH};
use minimax_tables::approx::{self, build_table, Domain, DomainError, Grid};
use minimax_tables::approx::TableError;
use minimax_tables::opts::Opts;
use minimax_tables::report::Report;
use minimax_tables::targets::Target;
use minimax_tables::utils::samples;

/// Evaluator test points per segment when measuring fixed-point error.
const POINTS_PER_SEGMENT: usize = 1024;

fn run_target(opts: &Opts, target: Target) -> Result<Report, Box<dyn Error>> {
    let spec = opts.table_spec(target)?;
    let table = build_table(&spec, |x| target.eval(x))?;

    Ok(Report::from_table(&table, |x| target.eval(x), POINTS_PER_SEGMENT))
}

fn run_samples(opts: &Opts, path: &Path) -> Result<Report, Box<dyn Error>> {
    let samples = samples::load_csv(path)?;
    let options = opts.fit_options(5, samples.points.len());

    if opts.format.width > MAX_FORMAT_WIDTH {
        return Err(DomainError::FormatWidth(opts.format.width).into());
    }

    if !(1..=32).contains(&opts.delta_bits) {
        return Err(DomainError::DeltaBits(opts.delta_bits).into());
    }

    let grid =
        Grid::from_points(samples.points, samples.values, options.degree)?;
    let fit = approx::fit_grid(&grid, &options)?;

    let issues =
        SegmentError::from_status(0, fit.iterations, fit.level, fit.status);

    if !issues.is_empty() && !opts.accept_partial {
        return Err(TableError::Segments(issues).into());
    }

    let canonical = Domain::new(-1.0, 1.0)?;
    let report =
        Report::from_fit(canonical, &fit, &grid, opts.format, opts.delta_bits)?;

    Ok(report)
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(opts.log_level)
        .init();

    let result = match (&opts.samples, opts.target) {
        (Some(path), _) => run_samples(&opts, path),
        (None, Some(target)) => run_target(&opts, target),
        (None, None) => {
            eprintln!(
                "error: expected a target ({}) or --samples",
                Target::NAMES.join(", ")
            );

            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(report) => {
            print!("{report}");

            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");

            ExitCode::FAILURE
        }
    }
}
