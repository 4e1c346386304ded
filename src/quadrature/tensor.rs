use crate::quadrature::{convert_quadrature_rule_from_2d_f64, QuadraturePair2d};
use crate::Real;
use immersed_quadrature::tensor;

/// Gauss quadrature on the reference quadrilateral `[-1, 1]^2`, exact for
/// polynomials of degree `2 * num_points_per_dim - 1` in each variable.
pub fn quadrilateral_gauss<T: Real>(num_points_per_dim: usize) -> QuadraturePair2d<T> {
    convert_quadrature_rule_from_2d_f64(tensor::quadrilateral_gauss(num_points_per_dim))
}
