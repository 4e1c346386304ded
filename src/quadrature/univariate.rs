use crate::quadrature::{convert_quadrature_rule_from_1d_f64, QuadraturePair1d};
use crate::Real;
use immersed_quadrature::univariate;

/// Gauss quadrature on the reference interval `[-1, 1]`, exact for polynomials of
/// degree `2 * num_points - 1`.
pub fn gauss<T: Real>(num_points: usize) -> QuadraturePair1d<T> {
    convert_quadrature_rule_from_1d_f64(univariate::gauss(num_points))
}
