//! Chebyshev series.

use smallvec::{smallvec, SmallVec};

/// Coefficients of a Chebyshev series, constant term first.
pub type Coeffs = SmallVec<[f64; 16]>;

/// Computes `[T_0(u), ..., T_degree(u)]` by the three-term recurrence.
pub fn basis(u: f64, degree: usize) -> Coeffs {
    let mut values: Coeffs = smallvec![1.0; degree + 1];

    if degree >= 1 {
        values[1] = u;
    }

    for k in 2..=degree {
        values[k] = 2.0 * u * values[k - 1] - values[k - 2];
    }

    values
}

/// Evaluates `sum c_k T_k(u)` by the Clenshaw recurrence.
pub fn clenshaw(coeffs: &[f64], u: f64) -> f64 {
    let mut b1 = 0.0;
    let mut b2 = 0.0;

    for &c in coeffs.iter().rev() {
        let b0 = 2.0 * u * b1 - b2 + c;

        b2 = b1;
        b1 = b0;
    }

    b1 - u * b2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence() {
        assert_eq!(basis(0.5, 0).as_slice(), &[1.0]);
        assert_eq!(basis(0.5, 4).as_slice(), &[1.0, 0.5, -0.5, -1.0, -0.5]);

        // T_k(cos t) = cos(k t)
        let t: f64 = 0.3;

        for (k, value) in basis(t.cos(), 9).into_iter().enumerate() {
            assert!((value - (k as f64 * t).cos()).abs() < 1e-12);
        }
    }

    #[test]
    fn clenshaw_matches_direct_sum() {
        let coeffs = [0.25, -1.5, 0.75, 2.0, -0.125, 0.5];

        for i in 0..=40 {
            let u = -1.0 + i as f64 / 20.0;

            let direct: f64 = basis(u, coeffs.len() - 1)
                .iter()
                .zip(&coeffs)
                .map(|(t, c)| t * c)
                .sum();

            assert!((clenshaw(&coeffs, u) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn degenerate_series() {
        assert_eq!(clenshaw(&[], 0.7), 0.0);
        assert_eq!(clenshaw(&[3.5], 0.7), 3.5);
        assert_eq!(clenshaw(&[1.0, 2.0], -0.25), 0.5);
    }
}
