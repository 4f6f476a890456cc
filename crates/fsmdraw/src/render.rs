//! The backend-agnostic scene renderer.
//!
//! [`render_scene`] replays a whole [`Diagram`] against any [`DrawContext`]:
//! nodes first, then committed links, then the link being drawn. It never
//! inspects which backend it is driving; backends with native primitives for
//! states and transitions pick them up from the [`Entity`] annotations.

use std::f64::consts::TAU;

use log::{debug, trace, warn};

use fsmdraw_core::{
    draw::{DrawContext, Entity, Label, draw_arrow},
    geometry::{Arc, Point},
    style::{Style, ink_color, selection_color},
};

use crate::model::{Diagram, Link, LinkPath, NODE_RADIUS, Node};

/// Inset of the inner outline that marks accept states
const ACCEPT_RING_INSET: f64 = 6.0;
/// Horizontal offset of the `start` caption drawn beside initial states
const INITIAL_CAPTION_OFFSET: f64 = 55.0;
const INITIAL_CAPTION: &str = "start \u{203A}";

/// Per-pass rendering choices that are not part of the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    style: Option<Style>,
    caret_visible: bool,
    selection_visible: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: None,
            caret_visible: false,
            selection_visible: true,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the palette stored in the diagram.
    pub fn with_style(mut self, style: Option<Style>) -> Self {
        self.style = style;
        self
    }

    /// Shows the text caret on the selected entity's label.
    pub fn with_caret_visible(mut self, caret_visible: bool) -> Self {
        self.caret_visible = caret_visible;
        self
    }

    /// Draws the selected entity in the selection color. Exports turn this off.
    pub fn with_selection_visible(mut self, selection_visible: bool) -> Self {
        self.selection_visible = selection_visible;
        self
    }

    /// The palette used for `diagram`.
    pub fn style_for(&self, diagram: &Diagram) -> Style {
        self.style.unwrap_or(diagram.style())
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn selection_visible(&self) -> bool {
        self.selection_visible
    }
}

/// Draws every entity of `diagram` onto `ctx`.
pub fn render_scene<C: DrawContext + ?Sized>(
    ctx: &mut C,
    diagram: &Diagram,
    options: &RenderOptions,
) {
    let style = options.style_for(diagram);
    debug!(
        nodes = diagram.nodes().len(),
        links = diagram.links().len(),
        style:% = style;
        "Rendering scene"
    );

    ctx.save();
    ctx.translate(Point::new(0.5, 0.5));

    for node in diagram.nodes() {
        let selected = options.selection_visible() && diagram.is_node_selected(node.id());
        set_ink(ctx, selected);
        draw_node(ctx, node, style, selected && options.caret_visible());
    }

    for (index, link) in diagram.links().iter().enumerate() {
        let selected = options.selection_visible() && diagram.is_link_selected(index);
        set_ink(ctx, selected);
        draw_link(ctx, diagram, link, selected && options.caret_visible());
    }

    if let Some(link) = diagram.pending_link() {
        set_ink(ctx, false);
        draw_link(ctx, diagram, link, false);
    }

    ctx.restore();
}

fn set_ink<C: DrawContext + ?Sized>(ctx: &mut C, selected: bool) {
    let color = if selected {
        selection_color()
    } else {
        ink_color()
    };
    ctx.set_stroke_color(color);
    ctx.set_fill_color(color);
}

fn draw_node<C: DrawContext + ?Sized>(ctx: &mut C, node: &Node, style: Style, caret: bool) {
    ctx.begin_entity(&Entity::State {
        id: node.id(),
        center: node.position(),
        text: node.text(),
        is_initial: node.is_initial(),
        is_accept_state: node.is_accept_state(),
    });

    let palette = style.palette();
    let body = palette.node_fill(node.is_accept_state(), node.is_initial());
    ctx.set_fill_color(body);
    ctx.begin_path();
    if style.is_filled() {
        ctx.set_stroke_color(body);
    }
    ctx.arc(Arc::full_circle(node.position(), NODE_RADIUS));
    ctx.fill();
    ctx.stroke();

    ctx.set_fill_color(palette.text());
    ctx.draw_text(&Label::centered(node.text(), node.position()).with_caret(caret));

    if node.is_accept_state() && !style.is_filled() {
        ctx.begin_path();
        ctx.arc(Arc::full_circle(
            node.position(),
            NODE_RADIUS - ACCEPT_RING_INSET,
        ));
        ctx.stroke();
    }

    if node.is_initial() {
        ctx.set_fill_color(ink_color());
        let caption_anchor = node.position().with_x(node.position().x() - INITIAL_CAPTION_OFFSET);
        ctx.draw_text(&Label::centered(INITIAL_CAPTION, caption_anchor));
    }

    ctx.end_entity();
}

fn link_entity<'a>(link: &'a Link) -> Option<Entity<'a>> {
    match link {
        Link::Plain(link) => Some(Entity::Transition {
            from: link.node_a(),
            to: link.node_b(),
            perpendicular_part: link.perpendicular_part(),
            text: link.text(),
        }),
        Link::SelfLoop(link) => Some(Entity::SelfLoop {
            node: link.node(),
            anchor_angle: link.anchor_angle(),
            text: link.text(),
        }),
        Link::Start(_) | Link::Temporary(_) => None,
    }
}

fn draw_link<C: DrawContext + ?Sized>(ctx: &mut C, diagram: &Diagram, link: &Link, caret: bool) {
    let Some(geometry) = link.geometry(diagram.nodes()) else {
        if link.is_temporary() {
            trace!("Skipping degenerate link preview");
        } else {
            warn!(kind = link.kind(); "Skipping link without drawable geometry");
        }
        return;
    };

    let entity = link_entity(link);
    if let Some(entity) = &entity {
        ctx.begin_entity(entity);
    }

    ctx.begin_path();
    match geometry.path() {
        LinkPath::Straight(segment) => {
            ctx.move_to(segment.start());
            ctx.line_to(segment.end());
        }
        LinkPath::Curved(arc) => ctx.arc(*arc),
    }
    ctx.stroke();

    draw_arrow(ctx, geometry.end_point(), geometry.arrow_angle());

    if let Some(label) = geometry.label() {
        // Keep the label angle in a canonical range for the backends.
        let angle = label.angle().rem_euclid(TAU);
        ctx.draw_text(&Label::beside(link.text(), label.point(), angle).with_caret(caret));
    }

    if entity.is_some() {
        ctx.end_entity();
    }
}
