use crate::quadrature::{convert_quadrature_rule_from_2d_f64, QuadraturePair2d};
use crate::Real;
use immersed_quadrature::simplex;

/// Gauss quadrature on the reference triangle with corners `(-1, -1)`, `(1, -1)` and
/// `(-1, 1)`, exact for polynomials of total degree up to `strength`.
pub fn triangle_gauss<T: Real>(strength: usize) -> QuadraturePair2d<T> {
    convert_quadrature_rule_from_2d_f64(simplex::triangle_gauss(strength))
}
