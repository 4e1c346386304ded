//! Quadrature rules for finite element reference domains.
//!
//! The main purpose of this crate is to support the `immersed` coupling library,
//! which integrates over intersections of finite element cells. The rules here are
//! nevertheless self-contained and may be used independently.
//!
//! # Reference domains
//!
//! - The reference interval is `[-1, 1]`.
//! - The reference quadrilateral is `[-1, 1]^2`.
//! - The reference triangle has vertices `(-1, -1)`, `(1, -1)` and `(-1, 1)`,
//!   i.e. it is half of the reference quadrilateral and has area 2.
//!
//! The weights of every rule sum to the measure of its reference domain.

pub mod simplex;
pub mod tensor;
pub mod univariate;

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A two-dimensional point.
pub type Point2 = Point<2>;

/// A D-dimensional rule, represented as a pair of weights and points.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A one-dimensional quadrature rule.
pub type Rule1d = Rule<1>;

/// A two-dimensional quadrature rule.
pub type Rule2d = Rule<2>;

/// Approximates the integral of `f` over the rule's reference domain.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    assert_eq!(weights.len(), points.len(), "rule must have matching weights and points");
    weights.iter().zip(points).map(|(w, x)| w * f(x)).sum()
}
