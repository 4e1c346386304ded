//! Quadrature rules for the reference triangle.
//!
//! The reference triangle has vertices `(-1, -1)`, `(1, -1)` and `(-1, 1)` and area 2,
//! consistent with it being half of the reference quadrilateral `[-1, 1]^2`.

use crate::univariate::gauss;
use crate::Rule;

/// A Gauss-type quadrature rule for the reference triangle.
///
/// Returns a rule that integrates polynomials of total degree up to `strength` exactly.
/// The rule is constructed by collapsing a tensor-product Gauss rule on the reference
/// quadrilateral onto the triangle (a Duffy-type transformation), so its points lie
/// strictly inside the triangle, its weights are positive, and the weights sum to the
/// reference area 2 up to machine precision.
///
/// The point count grows quadratically in `strength`.
pub fn triangle_gauss(strength: usize) -> Rule<2> {
    // The collapse below maps a polynomial of total degree `strength` on the triangle
    // to a polynomial of degree at most `strength` in u and, after multiplying by the
    // Jacobian, `strength + 1` in v. The 1D rules must therefore integrate degree
    // `strength + 1` exactly.
    let n = (strength + 1) / 2 + 1;
    let (weights1d, points1d) = gauss(n);

    let mut weights = Vec::with_capacity(n * n);
    let mut points = Vec::with_capacity(n * n);

    // Collapse the square [-1, 1]^2 onto the triangle by contracting the edge v = 1
    // to the vertex (-1, 1):
    //   x = (1 + u)(1 - v)/2 - 1,    y = v
    // which has Jacobian determinant (1 - v)/2.
    for (&wu, &[u]) in weights1d.iter().zip(&points1d) {
        for (&wv, &[v]) in weights1d.iter().zip(&points1d) {
            let x = 0.5 * (1.0 + u) * (1.0 - v) - 1.0;
            let y = v;
            let jacobian = 0.5 * (1.0 - v);
            weights.push(wu * wv * jacobian);
            points.push([x, y]);
        }
    }

    (weights, points)
}
