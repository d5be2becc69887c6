use ndarray::{Array2, Axis};
use num_traits::Float;
use std::f64::consts::SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Cholesky pivots at or below this fraction of the largest variance count as zero
const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-12;

/// Maps a non-finite value onto a finite stand-in so that downstream comparisons and
/// serialisation never see NaN or infinity: NaN becomes zero, positive infinity the
/// largest finite value and negative infinity the most negative finite value.
pub(crate) fn finite_or_sentinel<T: Float>(value: T) -> T {
    if value.is_nan() {
        T::zero()
    } else if value == T::infinity() {
        T::max_value()
    } else if value == T::neg_infinity() {
        T::min_value()
    } else {
        value
    }
}

/// A normal distribution fitted to a sample of distances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalDistribution {
    mean: f64,
    std_dev: f64,
}

impl NormalDistribution {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Fits the sample mean and the sample (n - 1) standard deviation. Fewer than two values
    /// give a standard deviation of zero.
    pub fn fit(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::new(0.0, 0.0);
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_dev = if n < 2 {
            0.0
        } else {
            let squares: f64 = samples.iter().map(|x| (x - mean) * (x - mean)).sum();
            (squares / (n - 1) as f64).sqrt()
        };
        Self::new(finite_or_sentinel(mean), finite_or_sentinel(std_dev))
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Cumulative probability of `x`. A distribution with no spread is a step at its mean.
    pub fn cdf(&self, x: f64) -> f64 {
        if self.std_dev <= 0.0 {
            return if x < self.mean { 0.0 } else { 1.0 };
        }
        let z = (x - self.mean) / (self.std_dev * SQRT_2);
        finite_or_sentinel(0.5 * (1.0 + erf(z)))
    }
}

/// Error function, Abramowitz and Stegun 7.1.26 (absolute error below 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Distribution of member distances within a cluster, used to decide whether a point lies
/// outside it and how far outside.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceDistribution {
    pub normal: NormalDistribution,
    pub largest_distance: f64,
}

impl DistanceDistribution {
    pub fn fit(distances: &[f64]) -> Self {
        let largest = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            normal: NormalDistribution::fit(distances),
            largest_distance: finite_or_sentinel(largest),
        }
    }
}

/// Sample covariance matrix (n - 1 normalisation) of the given rows. `None` when there are
/// fewer than two rows.
pub(crate) fn covariance_matrix(rows: &[&[f64]]) -> Option<Array2<f64>> {
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let n_dims = rows[0].len();
    let flat: Vec<f64> = rows.iter().flat_map(|row| row.iter().copied()).collect();
    let matrix = Array2::from_shape_vec((n, n_dims), flat).ok()?;
    let mean = matrix.mean_axis(Axis(0))?;
    let centered = &matrix - &mean;
    Some(centered.t().dot(&centered) / (n - 1) as f64)
}

/// Natural log of the determinant of a symmetric matrix via Cholesky factorisation.
/// `None` when the matrix is not positive definite within tolerance.
pub(crate) fn log_determinant(matrix: &Array2<f64>) -> Option<f64> {
    let n_dims = matrix.nrows();
    let largest_variance = matrix.diag().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = SINGULAR_PIVOT_TOLERANCE * largest_variance;

    let mut lower = Array2::<f64>::zeros((n_dims, n_dims));
    let mut log_det = 0.0;
    for j in 0..n_dims {
        let mut pivot = matrix[[j, j]];
        for k in 0..j {
            pivot -= lower[[j, k]] * lower[[j, k]];
        }
        // negated so that NaN pivots are rejected too
        if !(pivot > tolerance) {
            return None;
        }
        let root = pivot.sqrt();
        lower[[j, j]] = root;
        log_det += pivot.ln();
        for i in (j + 1)..n_dims {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= lower[[i, k]] * lower[[j, k]];
            }
            lower[[i, j]] = sum / root;
        }
    }
    Some(log_det)
}

/// Absolute log determinant of the rows' covariance. Degenerate groups (a single row, or rows
/// lying in a lower dimensional subspace) have no measurable volume and return zero.
pub(crate) fn generalized_variance(rows: &[&[f64]]) -> f64 {
    match covariance_matrix(rows).and_then(|cov| log_determinant(&cov)) {
        Some(log_det) => finite_or_sentinel(log_det.abs()),
        None => 0.0,
    }
}
