//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::Rule;
use std::f64::consts::PI;

/// Evaluates the Legendre polynomial `p_n` and its derivative at `x`.
///
/// Uses the three-term recurrence `m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)`
/// and the derivative identity `p_n'(x) = n (x p_n(x) - p_{n - 1}(x)) / (x^2 - 1)`.
/// The derivative formula breaks down at `|x| == 1`, so this is only suitable for
/// evaluation in the open interval `(-1, 1)`.
fn legendre_value_and_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut current = 1.0;
    let mut previous = 0.0;
    for m in 1..=n {
        let m = m as f64;
        let next = ((2.0 * m - 1.0) * x * current - (m - 1.0) * previous) / m;
        previous = current;
        current = next;
    }
    let derivative = (n as f64) * (x * current - previous) / (x * x - 1.0);
    (current, derivative)
}

/// Gauss quadrature for the reference interval `[-1, 1]`.
///
/// Returns the [Gauss quadrature rule] with the given number of points. Given `n` points,
/// the rule integrates polynomials of degree up to `2 n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
///
/// [Gauss quadrature rule]: https://en.wikipedia.org/wiki/Gaussian_quadrature
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "number of points must be positive");

    // Loosely based on the procedure used in
    // Numerical Recipes, The art of Scientific Computing, Third Edition (2007)
    let m = (n + 1) / 2;

    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    // Only find the first m roots. The remaining roots follow by symmetry
    for i in 0..m {
        // Fairly accurate initial guess for the i-th root
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();

        // Newton's method. The initial guess is good enough that this converges
        // in a handful of iterations for any practical point count
        loop {
            let (p, dp) = legendre_value_and_derivative(n, x);
            let dx = -p / dp;
            x += dx;
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        // Once a root is known, its weight is given by a standard closed formula
        let (_, dp) = legendre_value_and_derivative(n, x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        points.push([x]);
        weights.push(w);
    }

    for i in m..n {
        let mirror_idx = n - i - 1;
        points.push([-points[mirror_idx][0]]);
        weights.push(weights[mirror_idx]);
    }

    assert_eq!(points.len(), n, "Internal error: incorrect number of points produced");

    (weights, points)
}

/// A composite Gauss rule for the reference interval `[-1, 1]`.
///
/// Partitions the interval into `num_intervals` equal subintervals and maps a
/// `num_points`-point Gauss rule into each of them. The composite rule has the same
/// polynomial exactness as the base rule but a much smaller error constant, which
/// makes it useful for integrands that are only piecewise smooth.
///
/// Points are ordered subinterval by subinterval, from left to right.
///
/// # Panics
///
/// Panics if zero points or zero subintervals are requested.
pub fn composite_gauss(num_points: usize, num_intervals: usize) -> Rule<1> {
    assert!(num_intervals > 0, "number of subintervals must be positive");
    let (base_weights, base_points) = gauss(num_points);

    let k = num_intervals as f64;
    let interval_length = 2.0 / k;

    let mut weights = Vec::with_capacity(num_points * num_intervals);
    let mut points = Vec::with_capacity(num_points * num_intervals);

    for j in 0..num_intervals {
        let left = -1.0 + (j as f64) * interval_length;
        for (w, &[xi]) in base_weights.iter().zip(&base_points) {
            // Affine map from [-1, 1] onto the j-th subinterval
            points.push([left + 0.5 * (xi + 1.0) * interval_length]);
            weights.push(w * 0.5 * interval_length);
        }
    }

    (weights, points)
}
