use crate::allocators::{BiDimAllocator, DimAllocator};
use crate::connectivity::{Connectivity, Quad4d2Connectivity, Segment2d2Connectivity, Tri3d2Connectivity};
use crate::geometry::{LineSegment2d, Triangle2d};
use crate::{Real, SmallDim};
use itertools::Itertools;
use log::warn;
use nalgebra::allocator::Allocator;
use nalgebra::{
    distance, DefaultAllocator, DimName, Matrix1x3, Matrix1x4, Matrix2, Matrix2x3, Matrix2x4, OMatrix, OPoint,
    OVector, Point1, Point2, Scalar, Vector2, U1, U2, U3, U4,
};
use numeric_literals::replace_float_literals;
use std::fmt;
use std::fmt::{Display, Formatter};

/// A finite element whose basis is defined on a reference domain.
pub trait ReferenceFiniteElement<T>
where
    T: Scalar,
    DefaultAllocator: DimAllocator<T, Self::ReferenceDim>,
{
    type ReferenceDim: SmallDim;

    fn num_nodes(&self) -> usize;

    /// Evaluates each basis function at the given reference coordinates and stores
    /// the result in the provided buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer does not have length `num_nodes()`.
    fn populate_basis(&self, basis_values: &mut [T], reference_coords: &OPoint<T, Self::ReferenceDim>);
}

/// A reference finite element with a number of nodes fixed at compile time.
pub trait FixedNodesReferenceFiniteElement<T>
where
    T: Scalar,
    DefaultAllocator: DimAllocator<T, Self::ReferenceDim>
        + Allocator<T, U1, Self::NodalDim>
        + Allocator<T, Self::ReferenceDim, Self::NodalDim>,
{
    type ReferenceDim: SmallDim;
    type NodalDim: DimName;

    fn evaluate_basis(&self, reference_coords: &OPoint<T, Self::ReferenceDim>) -> OMatrix<T, U1, Self::NodalDim>;

    fn gradients(
        &self,
        reference_coords: &OPoint<T, Self::ReferenceDim>,
    ) -> OMatrix<T, Self::ReferenceDim, Self::NodalDim>;
}

macro_rules! impl_reference_finite_element_for_fixed {
    ($element:ident) => {
        impl<T> ReferenceFiniteElement<T> for $element<T>
        where
            T: Real,
        {
            type ReferenceDim = <$element<T> as FixedNodesReferenceFiniteElement<T>>::ReferenceDim;

            fn num_nodes(&self) -> usize {
                <$element<T> as FixedNodesReferenceFiniteElement<T>>::NodalDim::dim()
            }

            fn populate_basis(&self, basis_values: &mut [T], reference_coords: &OPoint<T, Self::ReferenceDim>) {
                assert_eq!(
                    basis_values.len(),
                    self.num_nodes(),
                    "Basis values buffer must have length equal to the number of nodes"
                );
                let values = self.evaluate_basis(reference_coords);
                basis_values.copy_from_slice(values.as_slice());
            }
        }
    };
}

/// A finite element with a mapping from its reference domain into physical space.
pub trait FiniteElement<T>: ReferenceFiniteElement<T>
where
    T: Scalar,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
    type GeometryDim: SmallDim;

    /// Maps the given reference coordinates to physical space.
    fn map_reference_coords(&self, reference_coords: &OPoint<T, Self::ReferenceDim>) -> OPoint<T, Self::GeometryDim>;

    /// The Jacobian of the reference-to-physical map at the given reference coordinates.
    fn reference_jacobian(
        &self,
        reference_coords: &OPoint<T, Self::ReferenceDim>,
    ) -> OMatrix<T, Self::GeometryDim, Self::ReferenceDim>;

    /// The diameter of the element, defined as the largest distance between any
    /// pair of its vertices.
    fn diameter(&self) -> T;
}

/// A finite element whose geometry dimension and reference dimension coincide.
pub trait VolumetricFiniteElement<T>:
    FiniteElement<T, ReferenceDim = <Self as FiniteElement<T>>::GeometryDim>
where
    T: Scalar,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
}

impl<T, E> VolumetricFiniteElement<T> for E
where
    T: Scalar,
    E: FiniteElement<T, ReferenceDim = <Self as FiniteElement<T>>::GeometryDim>,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
}

/// A finite element of codimension 1, such as a segment embedded in the plane.
pub trait SurfaceFiniteElement<T>: FiniteElement<T>
where
    T: Scalar,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
    /// Computes the normal at the point associated with the provided reference coordinate.
    fn normal(&self, reference_coords: &OPoint<T, Self::ReferenceDim>) -> OVector<T, Self::GeometryDim>;
}

/// A connectivity that can produce a finite element from mesh vertices.
pub trait ElementConnectivity<T>: Connectivity
where
    T: Scalar,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
    type Element: FiniteElement<T, GeometryDim = Self::GeometryDim, ReferenceDim = Self::ReferenceDim>;
    type GeometryDim: SmallDim;
    type ReferenceDim: SmallDim;

    /// Returns the finite element associated with this connectivity.
    ///
    /// The vertices passed in should be the collection of *all* vertices in the mesh.
    fn element(&self, vertices: &[OPoint<T, Self::GeometryDim>]) -> Option<Self::Element>;
}

pub type ConnectivityGeometryDim<T, Conn> = <Conn as ElementConnectivity<T>>::GeometryDim;
pub type ConnectivityReferenceDim<T, Conn> = <Conn as ElementConnectivity<T>>::ReferenceDim;

/// Error produced when the reference-to-physical map of an element cannot be inverted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InverseMappingError {
    /// The Jacobian of the element map is singular at an iterate.
    SingularJacobian,
    /// Newton iteration did not converge within the allotted number of iterations.
    MaximumIterationsReached(usize),
}

impl Display for InverseMappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingularJacobian => {
                write!(f, "The Jacobian of the element map is singular")
            }
            Self::MaximumIterationsReached(max_iter) => {
                write!(
                    f,
                    "Inverting the element map did not converge within {} iterations",
                    max_iter
                )
            }
        }
    }
}

impl std::error::Error for InverseMappingError {}

const MAX_NEWTON_ITERATIONS: usize = 30;

/// Computes reference coordinates for the given physical coordinates by Newton
/// iteration on the element map.
///
/// Only applicable to volumetric elements, whose Jacobians are square. The result
/// may lie outside the reference domain if `x` is outside the element's image.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn map_physical_coordinates<T, Element>(
    element: &Element,
    x: &OPoint<T, Element::GeometryDim>,
) -> Result<OPoint<T, Element::ReferenceDim>, InverseMappingError>
where
    T: Real,
    Element: VolumetricFiniteElement<T>,
    DefaultAllocator: BiDimAllocator<T, Element::GeometryDim, Element::ReferenceDim>,
{
    let tolerance = 1e-12 * element.diameter().max(1.0);
    let mut xi = OPoint::<T, Element::ReferenceDim>::origin();
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = element.map_reference_coords(&xi) - x;
        if residual.norm() <= tolerance {
            return Ok(xi);
        }
        let jacobian = element.reference_jacobian(&xi);
        let inv_jacobian = jacobian
            .try_inverse()
            .ok_or(InverseMappingError::SingularJacobian)?;
        xi -= inv_jacobian * residual;
    }
    Err(InverseMappingError::MaximumIterationsReached(MAX_NEWTON_ITERATIONS))
}

/// Computes reference coordinates of the point on the element closest to the given
/// physical coordinates, by Gauss-Newton iteration on the squared distance.
///
/// This is the appropriate inverse map for elements whose reference dimension is
/// smaller than their geometry dimension, where `x` generally does not lie exactly
/// on the element's image.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn project_physical_coordinates<T, Element>(
    element: &Element,
    x: &OPoint<T, Element::GeometryDim>,
) -> Result<OPoint<T, Element::ReferenceDim>, InverseMappingError>
where
    T: Real,
    Element: FiniteElement<T>,
    DefaultAllocator: BiDimAllocator<T, Element::GeometryDim, Element::ReferenceDim>,
{
    // The gradient of the squared distance scales with the element size squared
    let scale = element.diameter().max(1.0);
    let gradient_tolerance = 1e-12 * scale * scale;
    let mut xi = OPoint::<T, Element::ReferenceDim>::origin();
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = element.map_reference_coords(&xi) - x;
        let jacobian = element.reference_jacobian(&xi);
        let gradient = jacobian.transpose() * &residual;
        if gradient.norm() <= gradient_tolerance {
            return Ok(xi);
        }
        let normal_matrix = jacobian.transpose() * &jacobian;
        let inv_normal_matrix = normal_matrix
            .try_inverse()
            .ok_or(InverseMappingError::SingularJacobian)?;
        xi -= inv_normal_matrix * gradient;
    }
    warn!(
        "Projection of physical coordinates onto element did not converge within {} iterations",
        MAX_NEWTON_ITERATIONS
    );
    Err(InverseMappingError::MaximumIterationsReached(MAX_NEWTON_ITERATIONS))
}

/// Inversion of the reference-to-physical map of an element.
///
/// Volumetric elements invert the map directly by Newton iteration. Elements of
/// lower reference dimension instead project the physical point onto the element,
/// so that quadrature points that lie on the element's image up to floating-point
/// error are mapped robustly.
pub trait MapPhysicalCoordinates<T>: FiniteElement<T>
where
    T: Scalar,
    DefaultAllocator: BiDimAllocator<T, Self::GeometryDim, Self::ReferenceDim>,
{
    fn map_physical_coords(
        &self,
        x: &OPoint<T, Self::GeometryDim>,
    ) -> Result<OPoint<T, Self::ReferenceDim>, InverseMappingError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quad4d2Element<T>
where
    T: Scalar,
{
    vertices: [Point2<T>; 4],
}

impl<T> Quad4d2Element<T>
where
    T: Scalar,
{
    pub fn from_vertices(vertices: [Point2<T>; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 4] {
        &self.vertices
    }
}

impl<T> Quad4d2Element<T>
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn reference() -> Self {
        Self::from_vertices([
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ])
    }
}

impl<T> FixedNodesReferenceFiniteElement<T> for Quad4d2Element<T>
where
    T: Real,
{
    type ReferenceDim = U2;
    type NodalDim = U4;

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_basis(&self, xi: &Point2<T>) -> Matrix1x4<T> {
        // We define the shape functions as N_{alpha, beta} evaluated at xi such that
        //  N_{alpha, beta}([alpha, beta]) = 1
        // with alpha, beta = 1 or -1
        let phi = |alpha, beta, xi: &Point2<T>| (1.0 + alpha * xi[0]) * (1.0 + beta * xi[1]) / 4.0;
        Matrix1x4::from_row_slice(&[
            phi(-1.0, -1.0, xi),
            phi( 1.0, -1.0, xi),
            phi( 1.0,  1.0, xi),
            phi(-1.0,  1.0, xi),
        ])
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn gradients(&self, xi: &Point2<T>) -> Matrix2x4<T> {
        let phi_grad = |alpha, beta, xi: &Point2<T>|
            Vector2::new(
                alpha * (1.0 + beta * xi[1]) / 4.0,
                beta * (1.0 + alpha * xi[0]) / 4.0,
            );

        Matrix2x4::from_columns(&[
            phi_grad(-1.0, -1.0, xi),
            phi_grad( 1.0, -1.0, xi),
            phi_grad( 1.0,  1.0, xi),
            phi_grad(-1.0,  1.0, xi),
        ])
    }
}

impl_reference_finite_element_for_fixed!(Quad4d2Element);

impl<T> FiniteElement<T> for Quad4d2Element<T>
where
    T: Real,
{
    type GeometryDim = U2;

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point2<T>) -> Point2<T> {
        let X: Matrix2x4<T> = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        let N = self.evaluate_basis(xi);
        OPoint::from(&X * &N.transpose())
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point2<T>) -> Matrix2<T> {
        let X: Matrix2x4<T> = Matrix2x4::from_fn(|i, j| self.vertices[j][i]);
        let G = self.gradients(xi);
        X * G.transpose()
    }

    fn diameter(&self) -> T {
        self.vertices
            .iter()
            .tuple_combinations()
            .map(|(x, y)| distance(x, y))
            .fold(T::zero(), T::max)
    }
}

impl<T> MapPhysicalCoordinates<T> for Quad4d2Element<T>
where
    T: Real,
{
    fn map_physical_coords(&self, x: &Point2<T>) -> Result<Point2<T>, InverseMappingError> {
        map_physical_coordinates(self, x)
    }
}

impl<T> ElementConnectivity<T> for Quad4d2Connectivity
where
    T: Real,
{
    type Element = Quad4d2Element<T>;
    type GeometryDim = U2;
    type ReferenceDim = U2;

    fn element(&self, vertices: &[Point2<T>]) -> Option<Self::Element> {
        let Self(indices) = self;
        let lookup_vertex = |local_index| vertices.get(indices[local_index]).cloned();

        Some(Quad4d2Element::from_vertices([
            lookup_vertex(0)?,
            lookup_vertex(1)?,
            lookup_vertex(2)?,
            lookup_vertex(3)?,
        ]))
    }
}

/// A finite element representing linear basis functions on a triangle, in two dimensions.
///
/// The reference element is chosen to be the triangle defined by the corners
/// (-1, -1), (1, -1), (-1, 1). This perhaps unorthodox choice is due to the quadrature rules
/// we employ.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tri3d2Element<T>
where
    T: Scalar,
{
    vertices: [Point2<T>; 3],
}

impl<T> Tri3d2Element<T>
where
    T: Scalar,
{
    pub fn from_vertices(vertices: [Point2<T>; 3]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 3] {
        &self.vertices
    }
}

impl<T> From<Triangle2d<T>> for Tri3d2Element<T>
where
    T: Scalar,
{
    fn from(triangle: Triangle2d<T>) -> Self {
        Self::from_vertices(triangle.0)
    }
}

impl<T> Tri3d2Element<T>
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn reference() -> Self {
        Self::from_vertices([
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(-1.0, 1.0),
        ])
    }
}

impl<T> FixedNodesReferenceFiniteElement<T> for Tri3d2Element<T>
where
    T: Real,
{
    type ReferenceDim = U2;
    type NodalDim = U3;

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_basis(&self, xi: &Point2<T>) -> Matrix1x3<T> {
        Matrix1x3::from_row_slice(&[
            -0.5 * xi.x - 0.5 * xi.y,
            0.5 * xi.x + 0.5,
            0.5 * xi.y + 0.5
        ])
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn gradients(&self, _xi: &Point2<T>) -> Matrix2x3<T> {
        Matrix2x3::from_columns(&[
            Vector2::new(-0.5, -0.5),
            Vector2::new(0.5, 0.0),
            Vector2::new(0.0, 0.5)
        ])
    }
}

impl_reference_finite_element_for_fixed!(Tri3d2Element);

impl<T> FiniteElement<T> for Tri3d2Element<T>
where
    T: Real,
{
    type GeometryDim = U2;

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point2<T>) -> Point2<T> {
        let X: Matrix2x3<T> = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        let N = self.evaluate_basis(xi);
        OPoint::from(&X * &N.transpose())
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point2<T>) -> Matrix2<T> {
        let X: Matrix2x3<T> = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        let G = self.gradients(xi);
        X * G.transpose()
    }

    fn diameter(&self) -> T {
        self.vertices
            .iter()
            .tuple_combinations()
            .map(|(x, y)| distance(x, y))
            .fold(T::zero(), T::max)
    }
}

impl<T> MapPhysicalCoordinates<T> for Tri3d2Element<T>
where
    T: Real,
{
    fn map_physical_coords(&self, x: &Point2<T>) -> Result<Point2<T>, InverseMappingError> {
        // The element map is affine, so Newton converges in a single step
        map_physical_coordinates(self, x)
    }
}

impl<T> ElementConnectivity<T> for Tri3d2Connectivity
where
    T: Real,
{
    type Element = Tri3d2Element<T>;
    type GeometryDim = U2;
    type ReferenceDim = U2;

    fn element(&self, vertices: &[Point2<T>]) -> Option<Self::Element> {
        let Self(indices) = self;
        let lookup_vertex = |local_index| vertices.get(indices[local_index]).cloned();

        Some(Tri3d2Element::from_vertices([
            lookup_vertex(0)?,
            lookup_vertex(1)?,
            lookup_vertex(2)?,
        ]))
    }
}

/// A surface element with linear basis functions, embedded in two dimensions.
///
/// The reference element is the interval [-1, 1].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Segment2d2Element<T>
where
    T: Scalar,
{
    vertices: [Point2<T>; 2],
}

impl<T: Scalar> Segment2d2Element<T> {
    pub fn from_vertices(vertices: [Point2<T>; 2]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>; 2] {
        &self.vertices
    }

    pub fn to_line_segment(&self) -> LineSegment2d<T> {
        self.into()
    }
}

impl<T> From<LineSegment2d<T>> for Segment2d2Element<T>
where
    T: Scalar,
{
    fn from(segment: LineSegment2d<T>) -> Self {
        Self::from(&segment)
    }
}

impl<'a, T> From<&'a LineSegment2d<T>> for Segment2d2Element<T>
where
    T: Scalar,
{
    fn from(segment: &'a LineSegment2d<T>) -> Self {
        Self {
            vertices: [segment.start().clone(), segment.end().clone()],
        }
    }
}

impl<'a, T: Scalar> From<&'a Segment2d2Element<T>> for LineSegment2d<T> {
    fn from(element: &'a Segment2d2Element<T>) -> Self {
        LineSegment2d::from_end_points(element.vertices()[0].clone(), element.vertices()[1].clone())
    }
}

impl<T> FixedNodesReferenceFiniteElement<T> for Segment2d2Element<T>
where
    T: Real,
{
    type ReferenceDim = U1;
    type NodalDim = U2;

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_basis(&self, xi: &Point1<T>) -> OMatrix<T, U1, U2> {
        let phi_1 = (1.0 - xi[0]) / 2.0;
        let phi_2 = (1.0 + xi[0]) / 2.0;
        OMatrix::<_, U1, U2>::new(phi_1, phi_2)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn gradients(&self, _xi: &Point1<T>) -> OMatrix<T, U1, U2> {
        OMatrix::<_, U1, U2>::new(-0.5, 0.5)
    }
}

impl_reference_finite_element_for_fixed!(Segment2d2Element);

impl<T> FiniteElement<T> for Segment2d2Element<T>
where
    T: Real,
{
    type GeometryDim = U2;

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn reference_jacobian(&self, _xi: &Point1<T>) -> Vector2<T> {
        let a = &self.vertices[0].coords;
        let b = &self.vertices[1].coords;
        (b - a) / 2.0
    }

    fn map_reference_coords(&self, xi: &Point1<T>) -> Point2<T> {
        let a = &self.vertices[0].coords;
        let b = &self.vertices[1].coords;
        let phi = self.evaluate_basis(xi);
        OPoint::from(a * phi[0] + b * phi[1])
    }

    fn diameter(&self) -> T {
        self.to_line_segment().length()
    }
}

impl<T> SurfaceFiniteElement<T> for Segment2d2Element<T>
where
    T: Real,
{
    fn normal(&self, _xi: &Point1<T>) -> Vector2<T> {
        self.to_line_segment().normal_dir().normalize()
    }
}

impl<T> MapPhysicalCoordinates<T> for Segment2d2Element<T>
where
    T: Real,
{
    fn map_physical_coords(&self, x: &Point2<T>) -> Result<Point1<T>, InverseMappingError> {
        project_physical_coordinates(self, x)
    }
}

impl<T> ElementConnectivity<T> for Segment2d2Connectivity
where
    T: Real,
{
    type Element = Segment2d2Element<T>;
    type GeometryDim = U2;
    type ReferenceDim = U1;

    fn element(&self, vertices: &[Point2<T>]) -> Option<Self::Element> {
        let a = vertices.get(self.0[0]).cloned()?;
        let b = vertices.get(self.0[1]).cloned()?;
        Some(Segment2d2Element::from_vertices([a, b]))
    }
}
