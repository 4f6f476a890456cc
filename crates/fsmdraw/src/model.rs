//! The entity model: nodes, the four link variants and the diagram that
//! owns them.
//!
//! # Overview
//!
//! - [`Node`] - A labelled state circle
//! - [`Link`] - Sum type over [`PlainLink`], [`SelfLink`], [`StartLink`]
//!   and [`TemporaryLink`]
//! - [`LinkGeometry`] - The path, arrowhead and label placement of a link
//! - [`Diagram`] - Nodes, links, selection and the interaction operations

mod diagram;
mod link;
mod node;

pub use diagram::{Diagram, Selection};
pub use link::{
    LabelAnchor, Link, LinkGeometry, LinkPath, PlainLink, SNAP_VALUES, SelfLink, StartLink,
    TemporaryLink, snap_perpendicular, snap_quarter_turn,
};
pub use node::Node;

/// Radius of every node in pixels
pub const NODE_RADIUS: f64 = 30.0;

/// Distance under which positions and offsets snap, in pixels
pub const SNAP_PADDING: f64 = 6.0;

/// Tolerance of link hit tests, in pixels
pub const HIT_PADDING: f64 = 6.0;
