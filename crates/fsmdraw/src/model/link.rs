//! The four link variants and the geometry they derive.
//!
//! Every variant turns a raw pointer position into canonical anchor state
//! (`set_anchor`) and turns that state back into a drawable [`LinkGeometry`].
//! Links refer to nodes by [`NodeId`] only; positions are resolved against
//! the diagram's node list each time geometry is derived.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use fsmdraw_core::{
    geometry::{Arc, Circle, Point, Segment, normalize_angle},
    identifier::NodeId,
};

use super::{HIT_PADDING, NODE_RADIUS, Node, SNAP_PADDING};

/// Allowed perpendicular offsets, scanned in this order when snapping.
pub const SNAP_VALUES: [f64; 7] = [0.0, 30.0, 60.0, 100.0, -30.0, -60.0, -100.0];

const SNAP_MIN: f64 = -100.0;
const SNAP_MAX: f64 = 100.0;

/// Distance of a self-loop's circle center from the node center, in node radii
const SELF_LOOP_DISTANCE: f64 = 1.5;
/// Radius of a self-loop's circle, in node radii
const SELF_LOOP_RADIUS: f64 = 0.75;
/// Half of the angular span covered by a self-loop, in turns of π
const SELF_LOOP_HALF_SPAN: f64 = 0.8;

/// Clamps `offset` to `[-100, 100]` and returns the first closest of
/// [`SNAP_VALUES`].
pub fn snap_perpendicular(offset: f64) -> f64 {
    let clamped = offset.clamp(SNAP_MIN, SNAP_MAX);
    SNAP_VALUES
        .into_iter()
        .fold(SNAP_VALUES[0], |best, candidate| {
            if (candidate - clamped).abs() < (best - clamped).abs() {
                candidate
            } else {
                best
            }
        })
}

/// Rounds `angle` to the nearest quarter turn, normalized to `(-π, π]`.
pub fn snap_quarter_turn(angle: f64) -> f64 {
    normalize_angle((angle / FRAC_PI_2).round() * FRAC_PI_2)
}

fn find_node(nodes: &[Node], id: NodeId) -> Option<&Node> {
    nodes.iter().find(|node| node.id() == id)
}

/// The stroked part of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkPath {
    Straight(Segment),
    Curved(Arc),
}

impl LinkPath {
    pub fn start_point(&self) -> Point {
        match self {
            Self::Straight(segment) => segment.start(),
            Self::Curved(arc) => arc.start_point(),
        }
    }

    pub fn end_point(&self) -> Point {
        match self {
            Self::Straight(segment) => segment.end(),
            Self::Curved(arc) => arc.end_point(),
        }
    }

    /// Padded hit test against the stroked path.
    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Self::Straight(segment) => segment.hit_test(point, HIT_PADDING),
            Self::Curved(arc) => arc.hit_test(point, HIT_PADDING),
        }
    }
}

/// Where a link's label goes: the reference point and the direction the
/// label is pushed away from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    point: Point,
    angle: f64,
}

impl LabelAnchor {
    pub fn point(&self) -> Point {
        self.point
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

/// Everything needed to draw or hit-test a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkGeometry {
    path: LinkPath,
    arrow_angle: f64,
    label: Option<LabelAnchor>,
}

impl LinkGeometry {
    fn new(path: LinkPath, arrow_angle: f64, label: Option<(Point, f64)>) -> Option<Self> {
        let geometry = Self {
            path,
            arrow_angle,
            label: label.map(|(point, angle)| LabelAnchor { point, angle }),
        };
        geometry.is_finite().then_some(geometry)
    }

    fn is_finite(&self) -> bool {
        self.path.start_point().is_finite()
            && self.path.end_point().is_finite()
            && self.arrow_angle.is_finite()
    }

    pub fn path(&self) -> &LinkPath {
        &self.path
    }

    pub fn start_point(&self) -> Point {
        self.path.start_point()
    }

    /// The arrowhead tip
    pub fn end_point(&self) -> Point {
        self.path.end_point()
    }

    /// Direction the arrowhead points in.
    pub fn arrow_angle(&self) -> f64 {
        self.arrow_angle
    }

    pub fn label(&self) -> Option<LabelAnchor> {
        self.label
    }
}

/// A link between two distinct nodes, straight or bent along a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainLink {
    node_a: NodeId,
    node_b: NodeId,
    text: String,
    parallel_part: f64,
    perpendicular_part: f64,
    line_angle_adjust: f64,
}

impl PlainLink {
    /// A straight link from `node_a` to `node_b`.
    pub fn new(node_a: NodeId, node_b: NodeId) -> Self {
        Self {
            node_a,
            node_b,
            text: String::new(),
            parallel_part: 0.5,
            perpendicular_part: 0.0,
            line_angle_adjust: 0.0,
        }
    }

    /// Sets the anchor parameters verbatim, without snapping.
    pub fn with_anchor_parts(
        mut self,
        parallel_part: f64,
        perpendicular_part: f64,
        line_angle_adjust: f64,
    ) -> Self {
        self.parallel_part = parallel_part;
        self.perpendicular_part = perpendicular_part;
        self.line_angle_adjust = line_angle_adjust;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn node_a(&self) -> NodeId {
        self.node_a
    }

    pub fn node_b(&self) -> NodeId {
        self.node_b
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position along the A→B axis the bend is measured from, in `[0, 1]`
    pub fn parallel_part(&self) -> f64 {
        self.parallel_part
    }

    /// Signed bend offset in pixels; always one of [`SNAP_VALUES`] once anchored
    pub fn perpendicular_part(&self) -> f64 {
        self.perpendicular_part
    }

    /// `0` or `π`: flips the label side of a straight link.
    pub fn line_angle_adjust(&self) -> f64 {
        self.line_angle_adjust
    }

    /// The bend control point in diagram space.
    pub fn anchor_point(&self, a: &Node, b: &Node) -> Point {
        let delta = b.position().sub_point(a.position());
        let scale = delta.hypot();
        Point::new(
            a.position().x() + delta.x() * self.parallel_part
                - delta.y() * self.perpendicular_part / scale,
            a.position().y()
                + delta.y() * self.parallel_part
                + delta.x() * self.perpendicular_part / scale,
        )
    }

    /// Re-anchors the link so its bend passes near `point`.
    ///
    /// The signed distance from `point` to the A–B axis is clamped into
    /// `[-100, 100]` and snapped to the first closest of [`SNAP_VALUES`].
    /// A straight result records which side of the axis the pointer was on in
    /// `line_angle_adjust`, so the label follows it.
    pub fn set_anchor(&mut self, a: &Node, b: &Node, point: Point) {
        let delta = b.position().sub_point(a.position());
        let scale = delta.hypot();
        self.parallel_part = 0.5;
        if scale == 0.0 {
            // Coincident nodes have no axis to measure from.
            self.perpendicular_part = 0.0;
            return;
        }

        let rel = point.sub_point(a.position());
        let unsnapped = (delta.x() * rel.y() - delta.y() * rel.x()) / scale;
        self.perpendicular_part = snap_perpendicular(unsnapped);
        if self.parallel_part > 0.0
            && self.parallel_part < 1.0
            && self.perpendicular_part.abs() < SNAP_PADDING
        {
            self.line_angle_adjust = if unsnapped < 0.0 { PI } else { 0.0 };
            self.perpendicular_part = 0.0;
        }
    }

    /// Derives the drawable path between the two node outlines.
    ///
    /// Returns `None` when the nodes coincide.
    pub fn geometry(&self, a: &Node, b: &Node) -> Option<LinkGeometry> {
        if self.perpendicular_part != 0.0 {
            let anchor = self.anchor_point(a, b);
            if let Some(circle) = Circle::through(a.position(), b.position(), anchor) {
                return self.curved_geometry(a, b, circle);
            }
        }
        self.straight_geometry(a, b)
    }

    fn straight_geometry(&self, a: &Node, b: &Node) -> Option<LinkGeometry> {
        let mid = a.position().midpoint(b.position());
        let start = a.closest_point(mid);
        let end = b.closest_point(mid);
        let segment = Segment::new(start, end);
        let text_angle = (end.x() - start.x()).atan2(start.y() - end.y());
        LinkGeometry::new(
            LinkPath::Straight(segment),
            segment.angle(),
            Some((segment.midpoint(), text_angle + self.line_angle_adjust)),
        )
    }

    fn curved_geometry(&self, a: &Node, b: &Node, circle: Circle) -> Option<LinkGeometry> {
        let is_reversed = self.perpendicular_part > 0.0;
        let reverse_scale = if is_reversed { 1.0 } else { -1.0 };
        // Angle subtended by a chord of one node radius, so the arc ends on
        // the node outline.
        let chord = (NODE_RADIUS / (2.0 * circle.radius())).min(1.0);
        let inset = reverse_scale * 2.0 * chord.asin();
        let start_angle = circle.angle_of(a.position()) - inset;
        let end_angle = circle.angle_of(b.position()) + inset;
        let arc = Arc::new(circle, start_angle, end_angle, is_reversed);

        let mut label_end = end_angle;
        if label_end < start_angle {
            label_end += TAU;
        }
        let mut text_angle = (start_angle + label_end) / 2.0;
        if is_reversed {
            text_angle += PI;
        }

        LinkGeometry::new(
            LinkPath::Curved(arc),
            end_angle - reverse_scale * FRAC_PI_2,
            Some((circle.point_at(text_angle), text_angle)),
        )
    }
}

/// A loop from a node back to itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfLink {
    node: NodeId,
    text: String,
    anchor_angle: f64,
}

impl SelfLink {
    /// A loop on the right-hand side of `node`.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            text: String::new(),
            anchor_angle: 0.0,
        }
    }

    /// Sets the anchor angle verbatim, without snapping.
    pub fn with_anchor_angle(mut self, anchor_angle: f64) -> Self {
        self.anchor_angle = anchor_angle;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direction of the loop from the node center, in `(-π, π]`
    pub fn anchor_angle(&self) -> f64 {
        self.anchor_angle
    }

    /// Offset between the current anchor and the direction of `point`.
    ///
    /// Passing the result back to [`set_anchor`](Self::set_anchor) while
    /// dragging keeps the loop from jumping to the pointer.
    pub fn angle_offset(&self, node: &Node, point: Point) -> f64 {
        self.anchor_angle - node.position().angle_to(point)
    }

    /// Points the loop towards `point`, snapped to a multiple of 90°.
    pub fn set_anchor(&mut self, node: &Node, point: Point, angle_offset: f64) {
        self.anchor_angle = snap_quarter_turn(node.position().angle_to(point) + angle_offset);
    }

    /// The C-shaped loop circle opening towards the node.
    pub fn geometry(&self, node: &Node) -> Option<LinkGeometry> {
        let center = Point::from_polar(
            node.position(),
            SELF_LOOP_DISTANCE * NODE_RADIUS,
            self.anchor_angle,
        );
        let circle = Circle::new(center, SELF_LOOP_RADIUS * NODE_RADIUS);
        let start_angle = self.anchor_angle - PI * SELF_LOOP_HALF_SPAN;
        let end_angle = self.anchor_angle + PI * SELF_LOOP_HALF_SPAN;
        let arc = Arc::new(circle, start_angle, end_angle, false);

        LinkGeometry::new(
            LinkPath::Curved(arc),
            end_angle + PI * 0.4,
            Some((circle.point_at(self.anchor_angle), self.anchor_angle)),
        )
    }
}

/// The incoming marker of an initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct StartLink {
    node: NodeId,
    text: String,
    delta: Point,
}

impl StartLink {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            text: String::new(),
            delta: Point::default(),
        }
    }

    /// Sets the marker origin offset verbatim, without snapping.
    pub fn with_delta(mut self, delta: Point) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Offset of the marker origin from the node center.
    pub fn delta(&self) -> Point {
        self.delta
    }

    /// Moves the marker origin to `point`, snapping each axis onto the node
    /// center when it is within a few pixels of it.
    pub fn set_anchor(&mut self, node: &Node, point: Point) {
        let delta = point.sub_point(node.position());
        let snap = |value: f64| if value.abs() < SNAP_PADDING { 0.0 } else { value };
        self.delta = Point::new(snap(delta.x()), snap(delta.y()));
    }

    /// A segment from the marker origin to the node outline.
    ///
    /// Returns `None` when the origin sits on the node center.
    pub fn geometry(&self, node: &Node) -> Option<LinkGeometry> {
        if self.delta.is_zero() {
            return None;
        }
        let start = node.position().add_point(self.delta);
        let end = node.closest_point(start);
        LinkGeometry::new(
            LinkPath::Straight(Segment::new(start, end)),
            (-self.delta.y()).atan2(-self.delta.x()),
            Some((start, end.angle_to(start))),
        )
    }
}

/// The live preview of a link that has no target yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryLink {
    from: Point,
    to: Point,
}

impl TemporaryLink {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> Point {
        self.from
    }

    pub fn to(&self) -> Point {
        self.to
    }

    pub fn set_anchor(&mut self, point: Point) {
        self.to = point;
    }

    pub fn geometry(&self) -> Option<LinkGeometry> {
        let segment = Segment::new(self.from, self.to);
        LinkGeometry::new(LinkPath::Straight(segment), segment.angle(), None)
    }
}

/// Any link of a diagram.
///
/// Diagrams only ever store the first three variants; [`Link::Temporary`]
/// exists as the in-progress preview and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Plain(PlainLink),
    SelfLoop(SelfLink),
    Start(StartLink),
    Temporary(TemporaryLink),
}

impl Link {
    /// Variant tag, as used by the persisted record
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "PlainLink",
            Self::SelfLoop(_) => "SelfLink",
            Self::Start(_) => "StartLink",
            Self::Temporary(_) => "TemporaryLink",
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// The label, empty for previews.
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(link) => link.text(),
            Self::SelfLoop(link) => link.text(),
            Self::Start(link) => link.text(),
            Self::Temporary(_) => "",
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Plain(link) => Some(&mut link.text),
            Self::SelfLoop(link) => Some(&mut link.text),
            Self::Start(link) => Some(&mut link.text),
            Self::Temporary(_) => None,
        }
    }

    /// Returns `true` if the link is attached to the node `id`.
    pub fn references(&self, id: NodeId) -> bool {
        match self {
            Self::Plain(link) => link.node_a == id || link.node_b == id,
            Self::SelfLoop(link) => link.node == id,
            Self::Start(link) => link.node == id,
            Self::Temporary(_) => false,
        }
    }

    /// Derives the drawable geometry against `nodes`.
    ///
    /// Returns `None` if a referenced node is missing or the geometry
    /// degenerates (coincident nodes, a marker origin on the node center).
    pub fn geometry(&self, nodes: &[Node]) -> Option<LinkGeometry> {
        match self {
            Self::Plain(link) => {
                let a = find_node(nodes, link.node_a)?;
                let b = find_node(nodes, link.node_b)?;
                link.geometry(a, b)
            }
            Self::SelfLoop(link) => link.geometry(find_node(nodes, link.node)?),
            Self::Start(link) => link.geometry(find_node(nodes, link.node)?),
            Self::Temporary(link) => link.geometry(),
        }
    }

    /// Padded hit test against the link's path.
    pub fn contains_point(&self, nodes: &[Node], point: Point) -> bool {
        self.geometry(nodes)
            .is_some_and(|geometry| geometry.path().hit_test(point))
    }

    /// Re-anchors the link from a raw pointer position.
    pub fn set_anchor(&mut self, nodes: &[Node], point: Point) {
        match self {
            Self::Plain(link) => {
                if let (Some(a), Some(b)) =
                    (find_node(nodes, link.node_a), find_node(nodes, link.node_b))
                {
                    link.set_anchor(a, b, point);
                }
            }
            Self::SelfLoop(link) => {
                if let Some(node) = find_node(nodes, link.node) {
                    link.set_anchor(node, point, 0.0);
                }
            }
            Self::Start(link) => {
                if let Some(node) = find_node(nodes, link.node) {
                    link.set_anchor(node, point);
                }
            }
            Self::Temporary(link) => link.set_anchor(point),
        }
    }
}
