use fsmdraw_core::{
    geometry::{Circle, Point},
    identifier::NodeId,
};

use super::NODE_RADIUS;

/// A state of the machine: a labelled circle of fixed radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    position: Point,
    text: String,
    is_initial: bool,
    is_accept_state: bool,
}

impl Node {
    pub fn new(id: NodeId, position: Point) -> Self {
        Self {
            id,
            position,
            text: String::new(),
            is_initial: false,
            is_accept_state: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_initial(mut self, is_initial: bool) -> Self {
        self.is_initial = is_initial;
        self
    }

    pub fn with_accept_state(mut self, is_accept_state: bool) -> Self {
        self.is_accept_state = is_accept_state;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    pub fn is_accept_state(&self) -> bool {
        self.is_accept_state
    }

    /// The outline of the node.
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, NODE_RADIUS)
    }

    /// Point on the node's outline closest to `toward`.
    pub fn closest_point(&self, toward: Point) -> Point {
        self.circle().closest_point(toward)
    }

    /// Returns `true` if `point` lies strictly inside the node.
    pub fn contains_point(&self, point: Point) -> bool {
        self.circle().contains(point)
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub(crate) fn toggle_initial(&mut self) {
        self.is_initial = !self.is_initial;
    }

    pub(crate) fn toggle_accept_state(&mut self) {
        self.is_accept_state = !self.is_accept_state;
    }
}
