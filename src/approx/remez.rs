//! Minimax approximations by discrete Remez exchange.
//!
//! The engine works on a [`Grid`] in canonical coordinates. Each iteration
//! solves the leveled system
//!
//! ```text
//! sum_j c_j T_j(u_k) + (-1)^k E = y_k,    k = 0, ..., degree + 1
//! ```
//!
//! over the current alternation set, scans the residual on the full grid, and
//! exchanges the alternation set for the largest alternating extrema. The
//! iteration state is an immutable [`State`]; [`Remez::scan`] and
//! [`Remez::step`] can be driven one iteration at a time.

use std::f64::consts::PI;

use itertools::Itertools;
use smallvec::SmallVec;

use super::chebyshev::{self, Coeffs};
use super::grid::{min_points, DomainError, Grid};
use super::linalg::{self, SingularMatrixError};
use super::FitError;

/// Grid indices, strictly increasing.
pub type Indices = SmallVec<[usize; 16]>;

/// Solution of the leveled system over one alternation set.
#[derive(Clone, Debug)]
pub struct State {
    pub alternation: Indices,
    pub coeffs: Coeffs,
    /// Magnitude of the leveled error.
    pub level: f64,
}

/// Residual information gathered from one state.
#[derive(Clone, Debug)]
pub struct Scan {
    pub residuals: Vec<f64>,
    pub selection: Selection,
    /// Smallest residual magnitude over the newly selected set.
    pub level: f64,
    pub max_error: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub indices: Indices,
    /// Whether some slots had to be filled without alternating sign.
    pub degraded: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FitStatus {
    pub converged: bool,
    pub degraded: bool,
}

impl FitStatus {
    pub fn is_clean(&self) -> bool {
        self.converged && !self.degraded
    }
}

/// A finished fit.
#[derive(Clone, Debug)]
pub struct Fit {
    pub coeffs: Coeffs,
    pub level: f64,
    pub residuals: Vec<f64>,
    pub alternation: Indices,
    pub iterations: usize,
    pub status: FitStatus,
}

impl Fit {
    pub fn max_error(&self) -> f64 {
        self.residuals
            .iter()
            .fold(0.0_f64, |acc, e| acc.max(e.abs()))
    }

    pub fn rms_error(&self) -> f64 {
        if self.residuals.is_empty() {
            return 0.0;
        }

        let sum: f64 = self.residuals.iter().map(|e| e * e).sum();

        (sum / self.residuals.len() as f64).sqrt()
    }
}

pub struct Remez<'a> {
    grid: &'a Grid,
    degree: usize,
}

impl<'a> Remez<'a> {
    pub fn new(grid: &'a Grid, degree: u32) -> Result<Remez<'a>, DomainError> {
        let required = min_points(degree);

        if grid.len() < required {
            return Err(DomainError::TooFewSamples {
                size: grid.len(),
                required,
            });
        }

        Ok(Remez {
            grid,
            degree: degree as usize,
        })
    }

    fn size(&self) -> usize {
        self.degree + 2
    }

    /// Seeds the alternation set with the grid points nearest to the
    /// Chebyshev nodes, padding with evenly spaced indices after collisions.
    pub fn seed(&self) -> Indices {
        let m = self.size();
        let n = self.grid.len();

        let mut indices: Indices = (0..m)
            .map(|k| {
                let node = (PI * (2 * k + 1) as f64 / (2 * m) as f64).cos();

                self.grid.nearest(node)
            })
            .collect();

        indices.sort_unstable();
        indices.dedup();

        if indices.len() < m {
            log::debug!(
                "remez: {} of {m} seed points collided, padding",
                m - indices.len()
            );

            let evenly_spaced = (0..m).map(|i| {
                ((i * (n - 1)) as f64 / (m - 1) as f64).round() as usize
            });

            for i in evenly_spaced.chain(0..n) {
                if indices.len() == m {
                    break;
                }

                if let Err(pos) = indices.binary_search(&i) {
                    indices.insert(pos, i);
                }
            }
        }

        indices
    }

    /// Solves the leveled system over `alternation`.
    pub fn solve(
        &self,
        alternation: Indices,
    ) -> Result<State, SingularMatrixError> {
        let points = self.grid.points();
        let values = self.grid.values();

        let rows: Vec<Coeffs> = alternation
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                let mut row = chebyshev::basis(points[i], self.degree);
                row.push(if k % 2 == 0 { 1.0 } else { -1.0 });
                row
            })
            .collect();

        let rhs: Vec<f64> = alternation.iter().map(|&i| values[i]).collect();

        let mut solution = linalg::solve(&rows, &rhs)?;
        let level = solution.pop().map_or(0.0, f64::abs);

        Ok(State {
            alternation,
            coeffs: solution.into_iter().collect(),
            level,
        })
    }

    pub fn initial_state(&self) -> Result<State, SingularMatrixError> {
        self.solve(self.seed())
    }

    /// Signed residuals `p(u_i) - y_i` over the whole grid.
    pub fn residuals(&self, coeffs: &[f64]) -> Vec<f64> {
        self.grid
            .points()
            .iter()
            .zip(self.grid.values())
            .map(|(&u, &y)| chebyshev::clenshaw(coeffs, u) - y)
            .collect()
    }

    /// Scans the residual of `state` and selects the next alternation set.
    pub fn scan(&self, state: &State) -> Scan {
        let want = self.size();
        let residuals = self.residuals(&state.coeffs);
        let candidates = extremum_candidates(&residuals, want);
        let selection = select_alternating(&candidates, &residuals, want);

        let level = selection
            .indices
            .iter()
            .map(|&i| residuals[i].abs())
            .fold(f64::INFINITY, f64::min);

        let max_error = residuals
            .iter()
            .fold(0.0_f64, |acc, e| acc.max(e.abs()));

        Scan {
            residuals,
            selection,
            level,
            max_error,
        }
    }

    /// Performs one full exchange.
    pub fn step(
        &self,
        state: &State,
    ) -> Result<(State, Scan), SingularMatrixError> {
        let scan = self.scan(state);
        let next = self.solve(scan.selection.indices.clone())?;

        Ok((next, scan))
    }

    /// Iterates until the leveled error settles or `max_iter` is reached.
    ///
    /// The returned coefficients always come from solving the leveled system
    /// over the final alternation set. Running out of iterations is reported
    /// through [`FitStatus::converged`], not as an error.
    pub fn run(&self, max_iter: usize, tol: f64) -> Result<Fit, FitError> {
        let tolerance = |reference: f64| tol * reference.abs().max(1.0);

        let mut state = self.initial_state()?;
        let mut degraded = false;
        let mut previous: Option<f64> = None;

        for iteration in 1..=max_iter {
            let scan = self.scan(&state);

            log::debug!(
                "remez iteration {iteration}: E = {:.6e}, level = {:.6e}, \
                 max = {:.6e}",
                state.level,
                scan.level,
                scan.max_error
            );

            // The residual already peaks at the leveled error, so no exchange
            // can improve on the current state.
            if scan.max_error - state.level <= tolerance(state.level) {
                let status = FitStatus {
                    converged: true,
                    degraded,
                };

                return Ok(self.finish(state, scan.residuals, iteration, status));
            }

            let next = self.solve(scan.selection.indices)?;

            if previous.is_some_and(|p| (scan.level - p).abs() <= tolerance(p))
            {
                let status = FitStatus {
                    converged: true,
                    degraded: scan.selection.degraded,
                };
                let residuals = self.residuals(&next.coeffs);

                return Ok(self.finish(next, residuals, iteration, status));
            }

            previous = Some(scan.level);
            degraded = scan.selection.degraded;
            state = next;
        }

        log::warn!(
            "remez: no convergence after {max_iter} iterations \
             (E = {:.6e})",
            state.level
        );

        let residuals = self.residuals(&state.coeffs);
        let status = FitStatus {
            converged: false,
            degraded,
        };

        Ok(self.finish(state, residuals, max_iter, status))
    }

    fn finish(
        &self,
        state: State,
        residuals: Vec<f64>,
        iterations: usize,
        status: FitStatus,
    ) -> Fit {
        if status.degraded {
            log::warn!(
                "remez: final alternation set of degree {} fit does not \
                 alternate in sign",
                self.degree
            );
        }

        Fit {
            coeffs: state.coeffs,
            level: state.level,
            residuals,
            alternation: state.alternation,
            iterations,
            status,
        }
    }
}

/// Indices where `|e|` is at least as large as both neighbors, endpoints
/// included. If there are fewer than `want`, the globally largest remaining
/// residuals are added. The result is sorted.
pub fn extremum_candidates(residuals: &[f64], want: usize) -> Vec<usize> {
    let n = residuals.len();
    let mag = |i: usize| residuals[i].abs();

    let mut candidates: Vec<usize> = (0..n)
        .filter(|&i| {
            (i == 0 || mag(i) >= mag(i - 1))
                && (i + 1 == n || mag(i) >= mag(i + 1))
        })
        .collect();

    if candidates.len() < want {
        let by_magnitude =
            (0..n).sorted_by(|&a, &b| mag(b).total_cmp(&mag(a)));

        for i in by_magnitude {
            if candidates.len() >= want {
                break;
            }

            if let Err(pos) = candidates.binary_search(&i) {
                candidates.insert(pos, i);
            }
        }
    }

    candidates
}

/// Chooses `want` strictly increasing indices from `candidates` whose
/// residuals alternate in sign, preferring large magnitudes.
///
/// Candidates are visited in order of decreasing `|e|` and accepted whenever
/// the accepted set still alternates in index order; passes repeat until no
/// candidate fits. If that leaves slots open while the candidates do contain
/// enough alternating runs, the runs are pruned down to `want` instead. Only
/// when no alternating subset of the required size exists are the remaining
/// slots filled regardless of sign, and the selection is marked degraded.
///
/// The result has `min(want, candidates.len())` indices.
pub fn select_alternating(
    candidates: &[usize],
    residuals: &[f64],
    want: usize,
) -> Selection {
    let positive = |i: usize| residuals[i] >= 0.0;

    let order: Vec<usize> = candidates
        .iter()
        .copied()
        .sorted_by(|&a, &b| residuals[b].abs().total_cmp(&residuals[a].abs()))
        .collect();

    let mut chosen = Indices::new();

    loop {
        let before = chosen.len();

        for &i in &order {
            if chosen.len() == want {
                break;
            }

            let Err(pos) = chosen.binary_search(&i) else {
                continue;
            };

            let fits_left = pos == 0 || positive(chosen[pos - 1]) != positive(i);
            let fits_right =
                pos == chosen.len() || positive(chosen[pos]) != positive(i);

            if fits_left && fits_right {
                chosen.insert(pos, i);
            }
        }

        if chosen.len() == want || chosen.len() == before {
            break;
        }
    }

    if chosen.len() == want {
        return Selection {
            indices: chosen,
            degraded: false,
        };
    }

    let mut runs = alternating_runs(candidates, residuals);

    if runs.len() >= want {
        prune_runs(&mut runs, residuals, want);

        return Selection {
            indices: runs,
            degraded: false,
        };
    }

    for &i in &order {
        if runs.len() == want {
            break;
        }

        if let Err(pos) = runs.binary_search(&i) {
            runs.insert(pos, i);
        }
    }

    Selection {
        indices: runs,
        degraded: true,
    }
}

/// Collapses each run of same-signed candidates to its largest member.
fn alternating_runs(candidates: &[usize], residuals: &[f64]) -> Indices {
    let groups = candidates
        .iter()
        .copied()
        .group_by(|&i| residuals[i] >= 0.0);

    let runs = groups
        .into_iter()
        .filter_map(|(_, run)| {
            run.max_by(|&a, &b| residuals[a].abs().total_cmp(&residuals[b].abs()))
        })
        .collect();

    runs
}

/// Drops the weakest extrema of an alternating sequence while keeping it
/// alternating.
fn prune_runs(runs: &mut Indices, residuals: &[f64], want: usize) {
    let mag = |i: usize| residuals[i].abs();

    while runs.len() > want {
        let last = runs.len() - 1;

        if runs.len() == want + 1 {
            let drop = if mag(runs[0]) < mag(runs[last]) { 0 } else { last };
            runs.remove(drop);
            continue;
        }

        let Some(weakest) = (0..runs.len()).min_by(|&a, &b| {
            mag(runs[a]).total_cmp(&mag(runs[b]))
        }) else {
            return;
        };

        if weakest == 0 || weakest == last {
            runs.remove(weakest);
        } else {
            // Removing a neighbor too keeps the signs alternating.
            let neighbor = if mag(runs[weakest - 1]) < mag(runs[weakest + 1]) {
                weakest - 1
            } else {
                weakest + 1
            };

            runs.remove(weakest.max(neighbor));
            runs.remove(weakest.min(neighbor));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use super::*;
    use crate::approx::grid::Domain;

    fn sine_grid(size: usize, degree: u32) -> Grid {
        let domain = Domain::new(0.0, FRAC_PI_2).unwrap();

        Grid::sample(&domain, size, degree, f64::sin).unwrap()
    }

    #[test]
    fn equioscillation() {
        let grid = sine_grid(8192, 5);
        let fit = Remez::new(&grid, 5).unwrap().run(60, 1e-12).unwrap();

        assert!(fit.status.is_clean());
        assert_eq!(fit.alternation.len(), 7);

        let errors: Vec<f64> =
            fit.alternation.iter().map(|&i| fit.residuals[i]).collect();

        for e in &errors {
            assert!((e.abs() - fit.level).abs() < 1e-12);
        }

        for (a, b) in errors.iter().tuple_windows() {
            assert!(a * b < 0.0, "residuals {a} and {b} do not alternate");
        }

        assert!(fit.max_error() <= fit.level * 1.05);
    }

    #[test]
    fn sine_single_segment() {
        let grid = sine_grid(8192, 5);
        let fit = Remez::new(&grid, 5).unwrap().run(60, 1e-12).unwrap();

        assert!(fit.status.converged);
        assert!(fit.level < 1e-5, "E = {}", fit.level);

        // theta = pi/4 is the midpoint of the domain.
        let value = chebyshev::clenshaw(&fit.coeffs, 0.0);

        assert!((value - FRAC_PI_4.sin()).abs() < 1e-5);
        assert!((value - 0.70710678).abs() < 1e-5);

        let grid = sine_grid(8192, 6);
        let fit = Remez::new(&grid, 6).unwrap().run(60, 1e-12).unwrap();

        assert!(fit.level < 1e-6, "E = {}", fit.level);
    }

    #[test]
    fn constant_is_exact() {
        let domain = Domain::new(-3.0, 5.0).unwrap();
        let grid = Grid::sample(&domain, 64, 0, |_| 2.5).unwrap();

        let fit = Remez::new(&grid, 0).unwrap().run(60, 1e-12).unwrap();

        assert_eq!(fit.coeffs.as_slice(), &[2.5]);
        assert_eq!(fit.level, 0.0);
        assert_eq!(fit.iterations, 1);
        assert!(fit.status.is_clean());
    }

    #[test]
    fn polynomial_is_reproduced() {
        let domain = Domain::new(-1.0, 1.0).unwrap();
        let grid = Grid::sample(&domain, 257, 3, |x| x * x * x - x).unwrap();

        let fit = Remez::new(&grid, 3).unwrap().run(60, 1e-12).unwrap();

        assert!(fit.status.converged);
        assert!(fit.max_error() < 1e-12);

        for (c, expected) in fit.coeffs.iter().zip([0.0, -0.25, 0.0, 0.25]) {
            assert!((c - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn iteration_cap_is_reported() {
        let grid = sine_grid(4096, 5);
        let fit = Remez::new(&grid, 5).unwrap().run(1, 1e-12).unwrap();

        assert!(!fit.status.converged);
        assert_eq!(fit.iterations, 1);
        assert_eq!(fit.coeffs.len(), 6);
    }

    #[test]
    fn steps_shrink_the_error() {
        let grid = sine_grid(2048, 4);
        let remez = Remez::new(&grid, 4).unwrap();

        let first = remez.initial_state().unwrap();
        let (second, scan) = remez.step(&first).unwrap();

        assert_eq!(second.alternation, scan.selection.indices);
        assert!(scan.max_error >= first.level);

        // The leveled error on an alternating set lies between the smallest
        // residual on that set and the largest residual anywhere.
        assert!(second.level >= scan.level * (1.0 - 1e-9));
        assert!(second.level <= scan.max_error * (1.0 + 1e-9));
    }

    #[test]
    fn seed_is_padded_on_coarse_grids() {
        let domain = Domain::new(0.0, 1.0).unwrap();
        let grid = Grid::sample(&domain, 10, 8, f64::exp).unwrap();

        let seed = Remez::new(&grid, 8).unwrap().seed();

        assert_eq!(seed.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn too_few_samples() {
        let grid = sine_grid(6, 4);

        assert!(Remez::new(&grid, 5).is_err());
    }

    #[test]
    fn candidates_include_endpoints() {
        let residuals = [0.5, 0.1, -0.3, 0.2, 0.4];

        assert_eq!(extremum_candidates(&residuals, 3), vec![0, 2, 4]);
        assert_eq!(extremum_candidates(&residuals, 4), vec![0, 2, 3, 4]);
    }

    #[test]
    fn selection_alternates() {
        let residuals = [0.9, 0.8, -0.2, 0.7, -0.6, 0.1, -0.5];
        let candidates: Vec<usize> = (0..residuals.len()).collect();

        let selection = select_alternating(&candidates, &residuals, 4);

        assert!(!selection.degraded);
        assert_eq!(selection.indices.as_slice(), &[0, 4, 5, 6]);

        let selection = select_alternating(&candidates, &residuals, 6);

        assert!(!selection.degraded);
        assert_eq!(selection.indices.as_slice(), &[0, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn selection_prunes_runs() {
        // The greedy pass pairs +0.9 with -0.8 and cannot fit a single point
        // between them.
        let residuals = [0.9, -0.1, 0.2, -0.8];
        let candidates = [0, 1, 2, 3];

        let selection = select_alternating(&candidates, &residuals, 4);

        assert!(!selection.degraded);
        assert_eq!(selection.indices.as_slice(), &[0, 1, 2, 3]);

        let residuals = [0.9, -0.1, 0.2, -0.8, 0.7];
        let mut runs: Indices = (0..5).collect();

        prune_runs(&mut runs, &residuals, 3);

        assert_eq!(runs.as_slice(), &[0, 3, 4]);
    }

    #[test]
    fn selection_degrades_without_sign_changes() {
        let residuals = [0.3, 0.1, 0.2, 0.4];
        let candidates = [0, 1, 2, 3];

        let selection = select_alternating(&candidates, &residuals, 3);

        assert!(selection.degraded);
        assert_eq!(selection.indices.as_slice(), &[0, 2, 3]);
    }

    #[test]
    fn degraded_selection_reaches_the_status() {
        // The seed interpolates, leaving a residual of a single sign.
        let grid = Grid::from_points(
            vec![-1.0, -0.5, 0.0, 0.5, 1.0],
            vec![0.0, -1.0, 0.0, -1.0, 0.0],
            1,
        )
        .unwrap();
        let remez = Remez::new(&grid, 1).unwrap();

        let state = remez.initial_state().unwrap();

        assert_eq!(state.alternation.as_slice(), &[0, 2, 4]);
        assert_eq!(state.level, 0.0);
        assert!(remez.scan(&state).selection.degraded);

        let fit = remez.run(1, 1e-12).unwrap();

        assert!(fit.status.degraded);
        assert!(!fit.status.converged);
        assert!(!fit.status.is_clean());
    }
}
