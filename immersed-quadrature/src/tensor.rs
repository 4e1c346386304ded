//! Quadrature rules formed by tensor product formulations.
//!
//! For quadrilaterals, quadrature rules can be constructed as tensor products of 1D rules.

use crate::univariate::gauss;
use crate::Rule;

/// A Gauss quadrature rule for the reference quadrilateral `[-1, 1]^2`.
///
/// The rule is constructed as a tensor product from 1D rules, with the provided number of
/// points per dimension. It integrates polynomials of degree up to `2 n - 1`
/// *in each variable separately* exactly.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    let n = num_points_per_dim;
    let (weights1d, points1d) = gauss(n);

    let mut weights2d = Vec::with_capacity(n * n);
    let mut points2d = Vec::with_capacity(n * n);

    for (&wx, &[x]) in weights1d.iter().zip(&points1d) {
        for (&wy, &[y]) in weights1d.iter().zip(&points1d) {
            weights2d.push(wx * wy);
            points2d.push([x, y]);
        }
    }

    (weights2d, points2d)
}
