//! A drawing context that records the operation stream.
//!
//! Useful for inspecting what a scene renderer issued without committing to
//! an output format.

use crate::{
    color::Color,
    draw::{DrawContext, Entity, Label},
    geometry::{Arc, Point},
    identifier::NodeId,
};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Arc(Arc),
    Stroke,
    Fill,
    Text {
        text: String,
        anchor: Point,
        angle: Option<f64>,
        caret: bool,
    },
    StrokeColor(Color),
    FillColor(Color),
    Translate(Point),
    Save,
    Restore,
    BeginState(NodeId),
    BeginTransition(NodeId, NodeId),
    BeginSelfLoop(NodeId),
    EndEntity,
}

/// Collects every operation it receives, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every arc appended so far, in order.
    pub fn arcs(&self) -> Vec<Arc> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Arc(arc) => Some(*arc),
                _ => None,
            })
            .collect()
    }
}

impl DrawContext for Recorder {
    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        self.ops.push(DrawOp::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.ops.push(DrawOp::LineTo(point));
    }

    fn arc(&mut self, arc: Arc) {
        self.ops.push(DrawOp::Arc(arc));
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn draw_text(&mut self, label: &Label<'_>) {
        self.ops.push(DrawOp::Text {
            text: label.text().to_string(),
            anchor: label.anchor(),
            angle: label.angle(),
            caret: label.caret(),
        });
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.ops.push(DrawOp::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ops.push(DrawOp::FillColor(color));
    }

    fn translate(&mut self, offset: Point) {
        self.ops.push(DrawOp::Translate(offset));
    }

    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn begin_entity(&mut self, entity: &Entity<'_>) {
        self.ops.push(match *entity {
            Entity::State { id, .. } => DrawOp::BeginState(id),
            Entity::Transition { from, to, .. } => DrawOp::BeginTransition(from, to),
            Entity::SelfLoop { node, .. } => DrawOp::BeginSelfLoop(node),
        });
    }

    fn end_entity(&mut self) {
        self.ops.push(DrawOp::EndEntity);
    }
}
