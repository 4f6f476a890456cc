//! The drawing-context contract shared by every rendering backend.
//!
//! A scene is drawn by replaying a stream of path, arc and text operations
//! against a [`DrawContext`]. Backends decide what the stream becomes: pixels,
//! vector markup or typesetting commands. Nothing that issues operations
//! ever needs to know which backend it is talking to.
//!
//! # Overview
//!
//! - [`DrawContext`] - The operation vocabulary
//! - [`Label`] - A text request with optional side placement
//! - [`Entity`] - Optional semantic annotation around an entity's operations
//! - [`draw_arrow`] - Filled arrowhead built purely from contract operations
//! - [`Recorder`] - A context that records the operation stream
//! - [`text`] - Label placement, shortcut conversion and text measurement

mod arrow;
mod recorder;
pub mod text;

pub use arrow::draw_arrow;
pub use recorder::{DrawOp, Recorder};

use crate::{
    color::Color,
    geometry::{Arc, Point},
    identifier::NodeId,
};

/// A request to draw a text label.
///
/// `anchor` is the reference point the label belongs to. With an `angle`,
/// the label is pushed beside the anchor in that direction instead of being
/// centered on it (see [`text::place_label`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label<'a> {
    text: &'a str,
    anchor: Point,
    angle: Option<f64>,
    caret: bool,
}

impl<'a> Label<'a> {
    /// A label centered on `anchor`.
    pub fn centered(text: &'a str, anchor: Point) -> Self {
        Self {
            text,
            anchor,
            angle: None,
            caret: false,
        }
    }

    /// A label pushed to the side of `anchor` given by `angle`.
    pub fn beside(text: &'a str, anchor: Point, angle: f64) -> Self {
        Self {
            text,
            anchor,
            angle: Some(angle),
            caret: false,
        }
    }

    /// Requests a text-insertion caret after the label (interactive backends only).
    pub fn with_caret(mut self, caret: bool) -> Self {
        self.caret = caret;
        self
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    pub fn caret(&self) -> bool {
        self.caret
    }
}

/// Semantic description of the entity whose operations follow.
///
/// Scene renderers wrap each node and node-to-node link in
/// [`DrawContext::begin_entity`] / [`DrawContext::end_entity`]. Backends that
/// have a native primitive for the entity (TikZ automata states and edges)
/// can emit it and skip the geometric operations; all other backends ignore
/// the annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    State {
        id: NodeId,
        center: Point,
        text: &'a str,
        is_initial: bool,
        is_accept_state: bool,
    },
    Transition {
        from: NodeId,
        to: NodeId,
        /// Signed perpendicular offset of the bend in pixels, `0` when straight
        perpendicular_part: f64,
        text: &'a str,
    },
    SelfLoop {
        node: NodeId,
        anchor_angle: f64,
        text: &'a str,
    },
}

/// Abstract drawing surface.
///
/// Paths accumulate through [`move_to`](Self::move_to),
/// [`line_to`](Self::line_to) and [`arc`](Self::arc) until they are
/// [`stroke`](Self::stroke)d or [`fill`](Self::fill)ed. The coordinate-frame
/// operations default to no-ops for backends without affine state.
pub trait DrawContext {
    /// Discards the accumulated path.
    fn begin_path(&mut self);

    /// Starts a new sub-path at `point`.
    fn move_to(&mut self, point: Point);

    /// Extends the current sub-path to `point`.
    fn line_to(&mut self, point: Point);

    /// Appends a circular arc to the current path.
    fn arc(&mut self, arc: Arc);

    /// Outlines the accumulated path.
    fn stroke(&mut self);

    /// Paints the accumulated path as a closed region.
    fn fill(&mut self);

    /// Draws a text label.
    fn draw_text(&mut self, label: &Label<'_>);

    /// Sets the color used by [`stroke`](Self::stroke).
    fn set_stroke_color(&mut self, color: Color);

    /// Sets the color used by [`fill`](Self::fill) and text.
    fn set_fill_color(&mut self, color: Color);

    /// Moves the origin by `offset`.
    fn translate(&mut self, _offset: Point) {}

    /// Pushes the current coordinate frame and colors.
    fn save(&mut self) {}

    /// Pops the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self) {}

    /// Announces the entity whose operations follow.
    fn begin_entity(&mut self, _entity: &Entity<'_>) {}

    /// Closes the scope opened by [`begin_entity`](Self::begin_entity).
    fn end_entity(&mut self) {}
}

/// Formats `number` with `digits` decimals, trimming trailing zeros and a
/// dangling decimal point.
///
/// # Examples
///
/// ```
/// # use fsmdraw_core::draw::fixed;
/// assert_eq!(fixed(12.5, 3), "12.5");
/// assert_eq!(fixed(3.0, 2), "3");
/// assert_eq!(fixed(0.123456, 3), "0.123");
/// assert_eq!(fixed(-4.2, 2), "-4.2");
/// ```
pub fn fixed(number: f64, digits: usize) -> String {
    let formatted = format!("{number:.digits$}");
    if !formatted.contains('.') {
        return formatted;
    }
    match formatted.trim_end_matches('0').trim_end_matches('.') {
        "-0" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}
