use crate::{Triangle, Triangle2d};
use immersed_traits::Real;
use itertools::Itertools;
use nalgebra::{clamp, Matrix2, Point2, Scalar, Unit, Vector2};
use numeric_literals::replace_float_literals;

/// A convex polygon in the plane.
///
/// Vertices are stored in counter-clockwise order, with edges implicitly represented
/// as `(i, i + 1)`. A polygon with fewer than three vertices is *degenerate*: it
/// represents a point, a line segment or the empty set, and has zero area. Degenerate
/// polygons arise naturally when clipping nearly-touching cells against each other,
/// and all operations here accept them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvexPolygon<T>
where
    T: Scalar,
{
    vertices: Vec<Point2<T>>,
}

/// A closed half-plane, described by a point on its boundary line and an
/// *outward-facing* unit normal.
#[derive(Debug, Clone)]
pub struct HalfPlane<T>
where
    T: Scalar,
{
    point: Point2<T>,
    normal: Unit<Vector2<T>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineSegment2d<T>
where
    T: Scalar,
{
    start: Point2<T>,
    end: Point2<T>,
}

impl<T> LineSegment2d<T>
where
    T: Scalar,
{
    pub fn from_end_points(start: Point2<T>, end: Point2<T>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> &Point2<T> {
        &self.start
    }

    pub fn end(&self) -> &Point2<T> {
        &self.end
    }
}

impl<T> LineSegment2d<T>
where
    T: Real,
{
    pub fn to_line(&self) -> Line2d<T> {
        let dir = &self.end - &self.start;
        Line2d::from_point_and_dir(self.start.clone(), dir)
    }

    /// Returns a vector tangent to the line segment.
    ///
    /// Note that the vector is **not** normalized.
    pub fn tangent_dir(&self) -> Vector2<T> {
        self.end().coords - self.start().coords
    }

    /// Returns a vector normal to the line segment, in the direction consistent with a
    /// counter-clockwise winding order when the edge is part of a polygon.
    ///
    /// Note that the vector is **not** normalized.
    pub fn normal_dir(&self) -> Vector2<T> {
        let tangent = self.tangent_dir();
        Vector2::new(tangent.y, -tangent.x)
    }

    pub fn length(&self) -> T {
        self.tangent_dir().norm()
    }

    pub fn midpoint(&self) -> Point2<T> {
        Point2::from((self.start.coords + self.end.coords) / (T::one() + T::one()))
    }

    pub fn point_from_parameter(&self, t: T) -> Point2<T> {
        Point2::from(self.start().coords + (self.end() - self.start()) * t)
    }

    pub fn segment_from_parameters(&self, t_begin: &T, t_end: &T) -> Self {
        let begin = self.point_from_parameter(t_begin.clone());
        let end = self.point_from_parameter(t_end.clone());
        Self::from_end_points(begin, end)
    }

    pub fn intersect_line_parametric(&self, line: &Line2d<T>) -> Option<T> {
        self.to_line()
            .intersect_line_parametric(line)
            .map(|(t1, _)| t1)
    }

    /// Computes the intersection of two line segments (if any), but returns the result as a
    /// parameter.
    ///
    /// Let all points on this line segment be defined by the relation `x = a + t * (b - a)`
    /// for `0 <= t <= 1`. Then, if the two line segments intersect, `t` is returned.
    /// Otherwise, `None` is returned.
    pub fn intersect_segment_parametric(&self, other: &LineSegment2d<T>) -> Option<T> {
        let d1 = &self.end - &self.start;
        let d2 = &other.end - &other.start;

        let line1 = Line2d::from_point_and_dir(self.start.clone(), d1);
        let line2 = Line2d::from_point_and_dir(other.start.clone(), d2);

        line1.intersect_line_parametric(&line2).and_then(|(t1, t2)| {
            if t2 < T::zero() || t2 > T::one() {
                None
            } else if t1 < T::zero() || t1 > T::one() {
                None
            } else {
                Some(t1)
            }
        })
    }

    /// Clips the segment against the given (closed) half-plane.
    ///
    /// Returns the part of the segment contained in the half-plane, or `None` if the
    /// segment lies entirely outside.
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn intersect_half_plane(&self, half_plane: &HalfPlane<T>) -> Option<Self> {
        let contains_start = half_plane.contains_point(self.start());
        let contains_end = half_plane.contains_point(self.end());

        match (contains_start, contains_end) {
            (true, true) => Some(self.clone()),
            (false, false) => None,
            (true, false) | (false, true) => {
                let t_intersect = self
                    .intersect_line_parametric(&half_plane.surface())
                    // Technically the intersection parameter should lie in [0, 1] already,
                    // but numerical errors may produce values slightly outside, or, for
                    // very nearly parallel lines, far outside
                    .map(|t| clamp(t, 0.0, 1.0));

                // The parametric intersection only fails when the half-plane boundary and
                // the segment are (numerically) parallel, in which case the crossing is
                // ill-determined anyway and we fall back to keeping the contained endpoint
                let (t_start, t_end);
                if contains_start {
                    t_start = 0.0;
                    t_end = t_intersect.unwrap_or(0.0);
                } else {
                    t_start = t_intersect.unwrap_or(1.0);
                    t_end = 1.0;
                }

                Some(self.segment_from_parameters(&t_start, &t_end))
            }
        }
    }

    /// Clips the segment against a convex polygon.
    ///
    /// The result is the (possibly degenerate) sub-segment contained in the polygon,
    /// determined by intersecting the parameter intervals obtained from containment of
    /// the endpoints and from crossings with the polygon edges.
    pub fn intersect_polygon(&self, other: &ConvexPolygon<T>) -> Option<LineSegment2d<T>> {
        let contains_start = other.contains_point(self.start());
        let contains_end = other.contains_point(self.end());

        let mut t_min = if contains_start { Some(T::zero()) } else { None };
        let mut t_max = if contains_end { Some(T::one()) } else { None };

        // If both endpoints are inside, the segment is contained and no edge test is needed
        if !(contains_start && contains_end) {
            for edge in other.edges() {
                let edge_segment = LineSegment2d::from_end_points(edge.0.clone(), edge.1.clone());
                if let Some(t) = self.intersect_segment_parametric(&edge_segment) {
                    if t < *t_min.get_or_insert(t) {
                        t_min = Some(t);
                    }
                    if t > *t_max.get_or_insert(t) {
                        t_max = Some(t);
                    }
                }
            }
        }

        match (t_min, t_max) {
            (Some(t_min), Some(t_max)) => {
                debug_assert!(t_min <= t_max);
                Some(self.segment_from_parameters(&t_min, &t_max))
            }
            // A single parameter can occur when one endpoint is (numerically) on the
            // polygon boundary and no edge crossing is detected; the overlap is then a
            // single point
            (Some(t), None) | (None, Some(t)) => Some(self.segment_from_parameters(&t, &t)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Line2d<T>
where
    T: Scalar,
{
    point: Point2<T>,
    dir: Vector2<T>,
}

impl<T> Line2d<T>
where
    T: Scalar,
{
    pub fn from_point_and_dir(point: Point2<T>, dir: Vector2<T>) -> Self {
        Self { point, dir }
    }
}

impl<T> Line2d<T>
where
    T: Real,
{
    pub fn point_from_parameter(&self, t: T) -> Point2<T> {
        &self.point + &self.dir * t
    }

    pub fn intersect(&self, other: &Line2d<T>) -> Option<Point2<T>> {
        self.intersect_line_parametric(other)
            .map(|(t1, _)| self.point_from_parameter(t1))
    }

    /// Computes the intersection of two lines, if any.
    ///
    /// Each line is described parametrically as `x_i = a_i + t_i * d_i`. If the lines are
    /// not parallel, the parameter pair `(t1, t2)` of the intersection point is returned,
    /// with `t1` associated with `self` and `t2` with `other`.
    pub fn intersect_line_parametric(&self, other: &Line2d<T>) -> Option<(T, T)> {
        // The intersection is the solution of the 2x2 system
        //  [ d1  -d2 ] t = a2 - a1
        let rhs = &other.point - &self.point;
        let matrix = Matrix2::from_columns(&[self.dir, -other.dir]);

        matrix.try_inverse().map(|inv| inv * rhs).map(|t| (t.x, t.y))
    }
}

impl<T> HalfPlane<T>
where
    T: Real,
{
    /// Construct a half plane from a point on its boundary and an *outward-facing*
    /// normal vector.
    pub fn from_point_and_normal(point: Point2<T>, normal: Unit<Vector2<T>>) -> Self {
        Self { point, normal }
    }

    /// Determines if the point belongs to the half-plane, treated as a closed set.
    pub fn contains_point(&self, point: &Point2<T>) -> bool {
        self.signed_distance_to_point(point) <= T::zero()
    }

    /// The signed distance from the point to the boundary line, negative inside the
    /// half-plane.
    pub fn signed_distance_to_point(&self, point: &Point2<T>) -> T {
        let d = point - &self.point;
        self.normal.dot(&d)
    }

    pub fn point(&self) -> &Point2<T> {
        &self.point
    }

    /// Returns the outwards-facing normal vector for the half-plane.
    ///
    /// This vector is normalized.
    pub fn normal(&self) -> &Vector2<T> {
        &self.normal
    }

    /// Returns a line representing the boundary of the half plane.
    pub fn surface(&self) -> Line2d<T> {
        let tangent = Vector2::new(self.normal.y, -self.normal.x);
        Line2d::from_point_and_dir(self.point.clone(), tangent)
    }
}

impl<T> From<Triangle2d<T>> for ConvexPolygon<T>
where
    T: Scalar,
{
    fn from(triangle: Triangle2d<T>) -> Self {
        let [a, b, c] = triangle.0;
        ConvexPolygon::from_vertices(vec![a, b, c])
    }
}

impl<T> ConvexPolygon<T>
where
    T: Scalar,
{
    /// Construct a new convex polygon from the given vertices, assumed to be ordered in a
    /// counter-clockwise way such that `(i, i + 1)` forms an edge between vertex `i` and
    /// `i + 1`.
    ///
    /// It is assumed that the polygon is convex.
    pub fn from_vertices(vertices: Vec<Point2<T>>) -> ConvexPolygon<T> {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<T>] {
        &self.vertices
    }

    /// Returns the number of edges in the polygon.
    ///
    /// Note that a single point has 1 edge, pointing from itself to itself, a line
    /// segment has two edges, and in general the number of edges is equal to the number
    /// of vertices.
    pub fn num_edges(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&Point2<T>, &Point2<T>)> {
        let num_vertices = self.vertices.len();
        self.vertices.iter().cycle().take(num_vertices + 1).tuple_windows()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_point(&self) -> bool {
        self.vertices.len() == 1
    }

    pub fn is_line_segment(&self) -> bool {
        self.vertices.len() == 2
    }

    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }
}

impl<T> ConvexPolygon<T>
where
    T: Real,
{
    /// Iterates over the half planes that define the polygon.
    ///
    /// Every non-degenerate polygon can be represented by the intersection of a finite
    /// number of closed half-planes. If the polygon is degenerate, the intersection of
    /// the half planes returned by this method is in general a superset of the polygon.
    pub fn half_planes<'a>(&'a self) -> impl Iterator<Item = HalfPlane<T>> + 'a {
        self.edges().filter_map(|(v1, v2)| {
            if v1 != v2 {
                let edge_dir = v2 - v1;
                let edge_normal = Vector2::new(edge_dir.y, -edge_dir.x);
                Some(HalfPlane::from_point_and_normal(
                    v1.clone(),
                    Unit::new_normalize(edge_normal),
                ))
            } else {
                None
            }
        })
    }

    /// Determines if the (closed) convex polygon contains the given point.
    pub fn contains_point(&self, point: &Point2<T>) -> bool {
        if self.is_empty() {
            false
        } else if self.is_point() {
            self.vertices.first().unwrap() == point
        } else if self.is_line_segment() {
            let a = &self.vertices[0];
            let b = &self.vertices[1];
            let ab = b - a;
            let ap = point - a;
            let along = ap.dot(&ab);
            ap.perp(&ab) == T::zero() && along >= T::zero() && along <= ab.magnitude_squared()
        } else {
            self.half_planes().all(|half_plane| half_plane.contains_point(point))
        }
    }

    /// Computes the intersection of the polygon with the given (closed) half plane,
    /// and returns a new polygon that holds the result.
    ///
    /// This is one clipping step of the Sutherland-Hodgman algorithm. The result of
    /// clipping a degenerate polygon is again degenerate. No steps have been taken to
    /// make this routine numerically robust, but it never panics: edges that graze the
    /// clip boundary at a (numerically) parallel angle simply contribute no crossing
    /// vertex.
    pub fn intersect_halfplane(&self, half_plane: &HalfPlane<T>) -> ConvexPolygon<T> {
        let mut new_vertices = Vec::new();

        // A single vertex has a single self-referential edge, which the edge loop below
        // would count twice
        if self.is_point() {
            let first = self.vertices.first().unwrap();
            if half_plane.contains_point(first) {
                new_vertices.push(first.clone());
            }
        } else {
            for (v1, v2) in self.edges() {
                let d1 = half_plane.signed_distance_to_point(v1);
                let d2 = half_plane.signed_distance_to_point(v2);
                let v1_contained = d1 <= T::zero();
                let v2_contained = d2 <= T::zero();

                if v1_contained {
                    new_vertices.push(v1.clone());
                }

                if v1_contained != v2_contained {
                    // The edge crosses the boundary line. The signed distances have
                    // strictly opposite signs, so the denominator cannot vanish
                    let t = d1 / (d1 - d2);
                    let crossing = Point2::from(&v1.coords + (&v2.coords - &v1.coords) * t);
                    new_vertices.push(crossing);
                }
            }
        }

        ConvexPolygon::from_vertices(new_vertices)
    }

    /// Computes the intersection of this polygon and the given convex polygon.
    ///
    /// Both polygons may be degenerate, in which case the result is degenerate or empty.
    pub fn intersect_polygon(&self, other: &ConvexPolygon<T>) -> Self {
        if self.is_empty() || other.is_empty() {
            ConvexPolygon::from_vertices(Vec::new())
        } else if self.is_point() {
            let vertex = self.vertices.first().unwrap();
            if other.contains_point(vertex) {
                self.clone()
            } else {
                ConvexPolygon::from_vertices(Vec::new())
            }
        } else if other.is_point() {
            other.intersect_polygon(self)
        } else if self.is_line_segment() {
            let segment = LineSegment2d::from_end_points(self.vertices[0].clone(), self.vertices[1].clone());
            segment
                .intersect_polygon(other)
                .map(|segment| ConvexPolygon::from_vertices(vec![segment.start().clone(), segment.end().clone()]))
                .unwrap_or_else(|| ConvexPolygon::from_vertices(Vec::new()))
        } else if other.is_line_segment() {
            other.intersect_polygon(self)
        } else {
            let mut result = self.clone();
            for half_plane in other.half_planes() {
                result = result.intersect_halfplane(&half_plane);
            }
            result
        }
    }

    /// Splits the convex polygon into a fan of triangles that exactly cover the area of
    /// the polygon.
    ///
    /// Degenerate polygons produce an empty iterator.
    pub fn triangulate<'a>(&'a self) -> impl Iterator<Item = Triangle2d<T>> + 'a {
        self.edges()
            // Use saturating subtraction so that we don't overflow and get an empty
            // iterator in the case that the polygon has no vertices
            .take(self.num_edges().saturating_sub(1))
            .skip(1)
            .map(move |(a, b)| Triangle([self.vertices.first().unwrap().clone(), a.clone(), b.clone()]))
    }

    pub fn triangulate_into_vec(&self) -> Vec<Triangle2d<T>> {
        self.triangulate().collect()
    }

    /// The signed area of the polygon, positive for the assumed counter-clockwise
    /// winding order.
    ///
    /// Degenerate polygons have zero area.
    pub fn signed_area(&self) -> T {
        if self.is_degenerate() {
            return T::zero();
        }
        let two = T::one() + T::one();
        let mut twice_area = T::zero();
        for (a, b) in self.edges() {
            twice_area += a.coords.perp(&b.coords);
        }
        twice_area / two
    }

    pub fn area(&self) -> T {
        self.signed_area().abs()
    }
}
