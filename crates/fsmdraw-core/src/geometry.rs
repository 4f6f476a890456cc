//! Geometric primitives and the computational-geometry kernel.
//!
//! This module provides the planar types used by the entity model and the
//! rendering backends, together with the handful of algorithms the diagram
//! relies on for curve construction and hit-testing.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions (used for text extents)
//! - [`Circle`] - A circle, including the circle through three points
//! - [`Arc`] - A circular arc with canvas-style direction semantics
//! - [`Segment`] - A straight segment with a padded hit test
//! - [`normalize_angle`] - Reduce any angle into `(-π, π]`
//!
//! # Coordinate System
//!
//! Coordinates follow the screen convention used by every backend:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are measured in radians from the +X axis and grow clockwise on
//! screen, because the Y axis points down.

use std::f64::consts::{PI, TAU};

/// Determinants with a magnitude below this are treated as collinear input.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// Tolerance used when deciding whether an arc spans a full turn.
const FULL_TURN_EPSILON: f64 = 1e-9;

/// A 2D point representing a position in diagram coordinate space.
///
/// Coordinates are `f64` so that positions survive a serialization round
/// trip without loss.
///
/// # Examples
///
/// ```
/// # use fsmdraw_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates the point at `radius` from `center` in the direction of `angle`.
    pub fn from_polar(center: Point, radius: f64, angle: f64) -> Self {
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        other.sub_point(self).hypot()
    }

    /// Angle of the vector from this point towards `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fsmdraw_core::geometry::Point;
    /// let origin = Point::new(0.0, 0.0);
    /// assert_eq!(origin.angle_to(Point::new(10.0, 0.0)), 0.0);
    /// assert_eq!(origin.angle_to(Point::new(0.0, 10.0)), std::f64::consts::FRAC_PI_2);
    /// ```
    pub fn angle_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns `true` if both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Reduces any angle into the half-open range `(-π, π]`.
///
/// # Examples
///
/// ```
/// # use fsmdraw_core::geometry::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert_eq!(normalize_angle(-PI), PI);
/// assert_eq!(normalize_angle(PI), PI);
/// assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
/// ```
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// A circle described by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Solves for the circle passing through three points.
    ///
    /// Uses the 3×3 determinant formulation of the circumcircle. Returns
    /// `None` when the points are (numerically) collinear, where the circle
    /// degenerates into a line and the radius would not be finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fsmdraw_core::geometry::{Circle, Point};
    /// let circle = Circle::through(
    ///     Point::new(-1.0, 0.0),
    ///     Point::new(1.0, 0.0),
    ///     Point::new(0.0, 1.0),
    /// )
    /// .unwrap();
    /// assert!(circle.center().hypot() < 1e-12);
    /// assert!((circle.radius() - 1.0).abs() < 1e-12);
    ///
    /// let line = Circle::through(
    ///     Point::new(0.0, 0.0),
    ///     Point::new(1.0, 1.0),
    ///     Point::new(2.0, 2.0),
    /// );
    /// assert!(line.is_none());
    /// ```
    pub fn through(p1: Point, p2: Point, p3: Point) -> Option<Self> {
        let (x1, y1) = (p1.x, p1.y);
        let (x2, y2) = (p2.x, p2.y);
        let (x3, y3) = (p3.x, p3.y);
        let s1 = x1 * x1 + y1 * y1;
        let s2 = x2 * x2 + y2 * y2;
        let s3 = x3 * x3 + y3 * y3;

        let a = det([x1, y1, 1.0], [x2, y2, 1.0], [x3, y3, 1.0]);
        if a.abs() < COLLINEAR_EPSILON {
            return None;
        }

        let bx = -det([s1, y1, 1.0], [s2, y2, 1.0], [s3, y3, 1.0]);
        let by = det([s1, x1, 1.0], [s2, x2, 1.0], [s3, x3, 1.0]);
        let c = -det([s1, x1, y1], [s2, x2, y2], [s3, x3, y3]);

        let circle = Self {
            center: Point::new(-bx / (2.0 * a), -by / (2.0 * a)),
            radius: (bx * bx + by * by - 4.0 * a * c).sqrt() / (2.0 * a.abs()),
        };

        (circle.center.is_finite() && circle.radius.is_finite()).then_some(circle)
    }

    /// Returns the center of the circle
    pub fn center(self) -> Point {
        self.center
    }

    /// Returns the radius of the circle
    pub fn radius(self) -> f64 {
        self.radius
    }

    /// Point on the circle closest to `toward`.
    ///
    /// Undefined (non-finite) when `toward` coincides with the center.
    pub fn closest_point(self, toward: Point) -> Point {
        let delta = toward.sub_point(self.center);
        self.center
            .add_point(delta.scale(self.radius / delta.hypot()))
    }

    /// Point on the circle at the given angle
    pub fn point_at(self, angle: f64) -> Point {
        Point::from_polar(self.center, self.radius, angle)
    }

    /// Angle of `point` as seen from the center
    pub fn angle_of(self, point: Point) -> f64 {
        self.center.angle_to(point)
    }

    /// Returns `true` if `point` lies strictly inside the circle.
    pub fn contains(self, point: Point) -> bool {
        let delta = point.sub_point(self.center);
        delta.x * delta.x + delta.y * delta.y < self.radius * self.radius
    }
}

/// Determinant of the 3×3 matrix given by rows.
fn det(r1: [f64; 3], r2: [f64; 3], r3: [f64; 3]) -> f64 {
    let [a, b, c] = r1;
    let [d, e, f] = r2;
    let [g, h, i] = r3;
    a * e * i + b * f * g + c * d * h - a * f * h - b * d * i - c * e * g
}

/// A circular arc.
///
/// The direction follows the usual 2D canvas convention: the arc runs from
/// `start_angle` to `end_angle` with increasing angle, or with decreasing
/// angle when `anticlockwise` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    circle: Circle,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
}

impl Arc {
    pub fn new(circle: Circle, start_angle: f64, end_angle: f64, anticlockwise: bool) -> Self {
        Self {
            circle,
            start_angle,
            end_angle,
            anticlockwise,
        }
    }

    /// A closed circle expressed as an arc from `0` to `2π`.
    pub fn full_circle(center: Point, radius: f64) -> Self {
        Self::new(Circle::new(center, radius), 0.0, TAU, false)
    }

    pub fn circle(self) -> Circle {
        self.circle
    }

    pub fn start_angle(self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(self) -> f64 {
        self.end_angle
    }

    pub fn is_anticlockwise(self) -> bool {
        self.anticlockwise
    }

    /// Returns `true` if the arc was requested as a whole turn.
    pub fn is_full_circle(self) -> bool {
        (self.end_angle - self.start_angle - TAU).abs() < FULL_TURN_EPSILON
    }

    pub fn start_point(self) -> Point {
        self.circle.point_at(self.start_angle)
    }

    pub fn end_point(self) -> Point {
        self.circle.point_at(self.end_angle)
    }

    /// Signed angular distance travelled from the start angle.
    ///
    /// Positive sweeps increase the angle, negative ones decrease it. A
    /// request spanning a turn or more is clamped to exactly one turn.
    pub fn sweep(self) -> f64 {
        if self.anticlockwise {
            let delta = self.start_angle - self.end_angle;
            if delta >= TAU { -TAU } else { -delta.rem_euclid(TAU) }
        } else {
            let delta = self.end_angle - self.start_angle;
            if delta >= TAU { TAU } else { delta.rem_euclid(TAU) }
        }
    }

    /// The covered angular range as an increasing `(low, high)` pair.
    ///
    /// Anticlockwise arcs swap their endpoints first; `high` is lifted by a
    /// full turn when the range wraps through `±π`.
    pub fn increasing_span(self) -> (f64, f64) {
        let (start, mut end) = if self.anticlockwise {
            (self.end_angle, self.start_angle)
        } else {
            (self.start_angle, self.end_angle)
        };
        if end < start {
            end += TAU;
        }
        (start, end)
    }

    /// Returns `true` if `angle` (as produced by `atan2`) lies strictly
    /// inside the covered range.
    pub fn contains_angle(self, angle: f64) -> bool {
        let (start, end) = self.increasing_span();
        let mut angle = angle;
        if angle < start {
            angle += TAU;
        } else if angle > end {
            angle -= TAU;
        }
        angle > start && angle < end
    }

    /// Padded hit test: the point must be within `padding` of the circle and
    /// inside the angular span.
    pub fn hit_test(self, point: Point, padding: f64) -> bool {
        let distance = self.circle.center.distance(point) - self.circle.radius;
        distance.abs() < padding && self.contains_angle(self.circle.angle_of(point))
    }
}

/// A straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> Point {
        self.start
    }

    pub fn end(self) -> Point {
        self.end
    }

    pub fn midpoint(self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Direction of travel from start to end
    pub fn angle(self) -> f64 {
        self.start.angle_to(self.end)
    }

    /// Padded hit test against the segment.
    ///
    /// The projection of `point` onto the segment must fall strictly between
    /// the endpoints, and the perpendicular distance to the supporting line
    /// must be below `padding`. A zero-length segment never matches.
    pub fn hit_test(self, point: Point, padding: f64) -> bool {
        let delta = self.end.sub_point(self.start);
        let length = delta.hypot();
        if length == 0.0 {
            return false;
        }
        let rel = point.sub_point(self.start);
        let percent = (delta.x * rel.x + delta.y * rel.y) / (length * length);
        let distance = (delta.x * rel.y - delta.y * rel.x) / length;
        percent > 0.0 && percent < 1.0 && distance.abs() < padding
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(10.0, 20.0);
        assert_eq!(point.x(), 10.0);
        assert_eq!(point.y(), 20.0);
    }

    #[test]
    fn test_point_default() {
        assert!(Point::default().is_zero());
    }

    #[test]
    fn test_point_sub_and_distance() {
        let p1 = Point::new(4.0, 6.0);
        let p2 = Point::new(1.0, 2.0);
        let diff = p1.sub_point(p2);
        assert_eq!(diff, Point::new(3.0, 4.0));
        assert_approx_eq!(f64, p1.distance(p2), 5.0);
    }

    #[test]
    fn test_point_from_polar() {
        let p = Point::from_polar(Point::new(10.0, 10.0), 5.0, FRAC_PI_2);
        assert_approx_eq!(f64, p.x(), 10.0, epsilon = 1e-12);
        assert_approx_eq!(f64, p.y(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_angle_boundaries() {
        assert_approx_eq!(f64, normalize_angle(PI), PI);
        assert_approx_eq!(f64, normalize_angle(-PI), PI);
        assert_approx_eq!(f64, normalize_angle(0.0), 0.0);
        assert_approx_eq!(f64, normalize_angle(-FRAC_PI_2), -FRAC_PI_2);
        assert_approx_eq!(f64, normalize_angle(1.5 * PI), -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_circle_through_three_points() {
        let circle = Circle::through(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, 50.0),
        )
        .unwrap();
        assert_approx_eq!(f64, circle.center().x(), 50.0, epsilon = 1e-9);
        assert_approx_eq!(f64, circle.center().y(), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, circle.radius(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_through_collinear_points_is_none() {
        let circle = Circle::through(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, 0.0),
        );
        assert!(circle.is_none());
    }

    #[test]
    fn test_circle_closest_point() {
        let circle = Circle::new(Point::new(100.0, 100.0), 30.0);
        let closest = circle.closest_point(Point::new(200.0, 100.0));
        assert_approx_eq!(f64, closest.x(), 130.0);
        assert_approx_eq!(f64, closest.y(), 100.0);
    }

    #[test]
    fn test_circle_contains_is_strict() {
        let circle = Circle::new(Point::new(100.0, 100.0), 30.0);
        assert!(circle.contains(Point::new(100.0, 100.0)));
        assert!(!circle.contains(Point::new(130.0, 100.0)));
        assert!(!circle.contains(Point::new(200.0, 100.0)));
    }

    #[test]
    fn test_arc_sweep_directions() {
        let circle = Circle::new(Point::default(), 10.0);
        let clockwise = Arc::new(circle, 0.0, FRAC_PI_2, false);
        assert_approx_eq!(f64, clockwise.sweep(), FRAC_PI_2);

        let anticlockwise = Arc::new(circle, 0.0, FRAC_PI_2, true);
        assert_approx_eq!(f64, anticlockwise.sweep(), -1.5 * PI, epsilon = 1e-12);

        let full = Arc::full_circle(Point::default(), 10.0);
        assert!(full.is_full_circle());
        assert_approx_eq!(f64, full.sweep(), TAU);
    }

    #[test]
    fn test_arc_contains_angle_wraps_through_pi() {
        let circle = Circle::new(Point::default(), 10.0);
        // Covers the left half of the circle, crossing ±π.
        let arc = Arc::new(circle, 0.75 * PI, -0.75 * PI, false);
        assert!(arc.contains_angle(PI));
        assert!(arc.contains_angle(-0.9 * PI));
        assert!(!arc.contains_angle(0.0));

        // The same endpoints drawn anticlockwise cover the right half.
        let reversed = Arc::new(circle, 0.75 * PI, -0.75 * PI, true);
        assert!(reversed.contains_angle(0.0));
        assert!(!reversed.contains_angle(PI));
    }

    #[test]
    fn test_arc_hit_test() {
        let arc = Arc::new(Circle::new(Point::default(), 50.0), 0.0, PI, false);
        assert!(arc.hit_test(Point::new(0.0, 52.0), 6.0));
        assert!(!arc.hit_test(Point::new(0.0, 60.0), 6.0));
        assert!(!arc.hit_test(Point::new(0.0, -50.0), 6.0));
    }

    #[test]
    fn test_segment_hit_test() {
        let segment = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(segment.hit_test(Point::new(50.0, 0.0), 6.0));
        assert!(segment.hit_test(Point::new(50.0, -5.0), 6.0));
        assert!(!segment.hit_test(Point::new(50.0, 50.0), 6.0));
        assert!(!segment.hit_test(Point::new(-1.0, 0.0), 6.0));
        assert!(!segment.hit_test(Point::new(101.0, 0.0), 6.0));
    }

    #[test]
    fn test_zero_length_segment_never_hits() {
        let segment = Segment::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert!(!segment.hit_test(Point::new(5.0, 5.0), 6.0));
    }

    proptest! {
        #[test]
        fn normalize_angle_is_half_open(angle in -1.0e4f64..1.0e4) {
            let normalized = normalize_angle(angle);
            prop_assert!(normalized > -PI && normalized <= PI);
            let turns = (angle - normalized) / TAU;
            prop_assert!((turns - turns.round()).abs() < 1e-6);
        }

        #[test]
        fn circle_through_passes_through_inputs(
            ax in -500.0f64..500.0, ay in -500.0f64..500.0,
            bx in -500.0f64..500.0, by in -500.0f64..500.0,
            cx in -500.0f64..500.0, cy in -500.0f64..500.0,
        ) {
            let (a, b, c) = (Point::new(ax, ay), Point::new(bx, by), Point::new(cx, cy));
            if let Some(circle) = Circle::through(a, b, c) {
                prop_assume!(circle.radius() < 1e4);
                let tolerance = 1e-6 * circle.radius().max(100.0);
                for p in [a, b, c] {
                    prop_assert!((circle.center().distance(p) - circle.radius()).abs() < tolerance);
                }
            }
        }
    }
}
