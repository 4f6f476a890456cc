//! fsmdraw Core Types and Definitions
//!
//! This crate provides the foundational types for finite-state-machine
//! diagrams. It includes:
//!
//! - **Geometry**: Points, circles, arcs and the hit-test kernel ([`geometry`] module)
//! - **Identifiers**: String-interned node identifiers ([`identifier::NodeId`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Styles**: The three built-in color palettes ([`style::Style`])
//! - **Draw**: The backend-agnostic drawing-context contract and the helpers
//!   every backend shares ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod style;
