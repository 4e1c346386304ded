use crate::geometry::{LineSegment2d, Triangle2d};
use crate::nalgebra::{convert, Point1, Point2};
use crate::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, Scalar, U1, U2};
use num::Zero;
use numeric_literals::replace_float_literals;
use std::ops::{Add, AddAssign, Mul};

pub mod simplex;
pub mod tensor;
pub mod univariate;

pub type QuadraturePair<T, D> = (Vec<T>, Vec<OPoint<T, D>>);
pub type QuadraturePair1d<T> = QuadraturePair<T, U1>;
pub type QuadraturePair2d<T> = QuadraturePair<T, U2>;

/// A quadrature rule consisting of weights and points.
pub trait Quadrature<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T];
    fn points(&self) -> &[OPoint<T, D>];

    /// Approximates the integral of the given function using this quadrature rule.
    fn integrate<U, Function>(&self, f: Function) -> U
    where
        Function: Fn(&OPoint<T, D>) -> U,
        U: Zero + Mul<T, Output = U> + Add<T, Output = U> + AddAssign<U>,
    {
        let mut integral = U::zero();
        for (w, p) in self.weights().iter().zip(self.points()) {
            integral += f(p) * w.clone();
        }
        integral
    }
}

/// Trait alias for 1D quadrature rules.
pub trait Quadrature1d<T>: Quadrature<T, U1>
where
    T: Scalar,
{
}

/// Trait alias for 2D quadrature rules.
pub trait Quadrature2d<T>: Quadrature<T, U2>
where
    T: Scalar,
{
}

impl<T, X> Quadrature1d<T> for X
where
    T: Scalar,
    X: Quadrature<T, U1>,
{
}

impl<T, X> Quadrature2d<T> for X
where
    T: Scalar,
    X: Quadrature<T, U2>,
{
}

impl<T, D, A, B> Quadrature<T, D> for (A, B)
where
    T: Scalar,
    D: DimName,
    A: AsRef<[T]>,
    B: AsRef<[OPoint<T, D>]>,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T] {
        self.0.as_ref()
    }

    fn points(&self) -> &[OPoint<T, D>] {
        self.1.as_ref()
    }
}

impl<T, D, X> Quadrature<T, D> for &X
where
    T: Scalar,
    D: DimName,
    X: Quadrature<T, D>,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T] {
        X::weights(self)
    }

    fn points(&self) -> &[OPoint<T, D>] {
        X::points(self)
    }
}

/// The minimum number of Gauss points needed to exactly integrate univariate
/// polynomials of the given degree.
///
/// An `n`-point Gauss rule is exact for polynomials of degree `2n - 1`.
pub fn gauss_num_points_for_strength(strength: usize) -> usize {
    strength / 2 + 1
}

pub fn convert_quadrature_rule_from_1d_f64<T>(quadrature: immersed_quadrature::Rule1d) -> QuadraturePair1d<T>
where
    T: Real,
{
    let (weights, points) = quadrature;
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().map(Point1::from).map(convert).collect();
    (weights, points)
}

pub fn convert_quadrature_rule_from_2d_f64<T>(quadrature: immersed_quadrature::Rule2d) -> QuadraturePair2d<T>
where
    T: Real,
{
    let (weights, points) = quadrature;
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().map(Point2::from).map(convert).collect();
    (weights, points)
}

/// Maps a quadrature rule for the reference triangle onto the given physical triangle.
///
/// The reference triangle has corners `(-1, -1)`, `(1, -1)` and `(-1, 1)`. The map is
/// affine, so weights are scaled by the constant Jacobian determinant and the mapped
/// rule has the same polynomial strength as the reference rule.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn map_rule_to_triangle<T>(
    triangle: &Triangle2d<T>,
    (weights, points): &QuadraturePair2d<T>,
) -> QuadraturePair2d<T>
where
    T: Real,
{
    let [a, b, c] = &triangle.0;
    // The reference triangle has area 2, so the Jacobian determinant of the affine map
    // is half the signed area of the physical triangle
    let weight_scale = (triangle.signed_area() / 2.0).abs();

    let weights = weights.iter().map(|w| *w * weight_scale).collect();
    let points = points
        .iter()
        .map(|xi| {
            let phi_a = -0.5 * (xi.x + xi.y);
            let phi_b = 0.5 * (1.0 + xi.x);
            let phi_c = 0.5 * (1.0 + xi.y);
            Point2::from(&a.coords * phi_a + &b.coords * phi_b + &c.coords * phi_c)
        })
        .collect();

    (weights, points)
}

/// Maps a univariate quadrature rule for the reference interval `[-1, 1]` onto the
/// given segment in the plane.
///
/// Weights are scaled by half the segment length, so that they sum to the length of
/// the segment.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn map_univariate_rule_to_segment<T>(
    segment: &LineSegment2d<T>,
    (weights, points): &QuadraturePair1d<T>,
) -> QuadraturePair2d<T>
where
    T: Real,
{
    let weight_scale = segment.length() / 2.0;

    let weights = weights.iter().map(|w| *w * weight_scale).collect();
    let points = points
        .iter()
        // Map from [-1, 1] to the [0, 1] parametrization of the segment
        .map(|xi| segment.point_from_parameter((xi.x + 1.0) / 2.0))
        .collect();

    (weights, points)
}
