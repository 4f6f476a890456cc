//! TikZ / LaTeX backend.
//!
//! States, transitions and self-loops are emitted as TikZ `automata`
//! primitives from the [`Entity`] annotations the scene renderer wraps around
//! them; the geometric operations inside those scopes are ignored. Anything
//! drawn outside an entity scope (start markers, the live link preview) falls
//! back to raw `\draw` and `\fill` commands built from the operation stream.
//!
//! Coordinates are scaled from pixels into document units and the y axis is
//! flipped, because TikZ grows upwards.

use std::{
    f64::consts::{FRAC_PI_4, PI, TAU},
    fmt::Write as _,
};

use log::{debug, trace};

use fsmdraw_core::{
    color::Color,
    draw::{
        DrawContext, Entity, Label, fixed,
        text::{PlacedLabel, TextStyle},
    },
    geometry::{Arc, Point},
    style::Style,
};

use super::{Error, Exporter};

/// Pixels to document units
const SCALE: f64 = 0.1;
/// Vertical distance from a label's center to its edge, in pixels
const LABEL_HALF_HEIGHT: f64 = 10.0;

const HEADER: &str = "\\documentclass[12pt]{article}\n\
\\usepackage{tikz}\n\
\\usetikzlibrary{automata, positioning}\n\
\\begin{document}\n\
\\begin{tikzpicture}[shorten >=1pt,node distance=2cm,on grid,auto,scale=0.17";

const FOOTER: &str = "\\end{tikzpicture}\n\\end{document}\n";

/// Escapes `text` for LaTeX math mode.
///
/// Backslashes that do not start a command become `\backslash`, the
/// characters `$ # % &` are escaped, spaces become non-breaking and the
/// `\epsilon` and `\blank` shorthands map to `\varepsilon` and
/// `\textvisiblespace`.
///
/// # Examples
///
/// ```
/// # use fsmdraw::export::tikz::escape_latex;
/// assert_eq!(escape_latex("a b"), "a~b");
/// assert_eq!(escape_latex("50%"), "50\\%");
/// assert_eq!(escape_latex("\\epsilon"), "\\varepsilon");
/// assert_eq!(escape_latex("x\\ y"), "x\\backslash~y");
/// ```
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let starts_command = chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphanumeric() || *next == '_');
                escaped.push_str(if starts_command { "\\" } else { "\\backslash" });
            }
            '$' | '#' | '%' | '&' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' ' => escaped.push('~'),
            _ => escaped.push(c),
        }
    }
    escaped
        .replace("\\epsilon", "\\varepsilon")
        .replace("\\blank", "\\textvisiblespace")
}

/// Cardinal side a self-loop leaves its state from.
///
/// Angles are screen angles, so a positive angle points down.
pub fn loop_direction(anchor_angle: f64) -> &'static str {
    if anchor_angle > FRAC_PI_4 && anchor_angle < 3.0 * FRAC_PI_4 {
        "below"
    } else if anchor_angle > -3.0 * FRAC_PI_4 && anchor_angle < -FRAC_PI_4 {
        "above"
    } else if anchor_angle > -FRAC_PI_4 && anchor_angle < FRAC_PI_4 {
        "right"
    } else {
        "left"
    }
}

/// Bend angle used for a transition with the given perpendicular offset.
pub fn bend_amount(perpendicular_part: f64) -> u32 {
    match perpendicular_part.abs() {
        offset if offset >= 90.0 => 80,
        offset if offset >= 60.0 => 50,
        _ => 25,
    }
}

fn label_or_space(text: &str) -> String {
    if text.is_empty() {
        " ".to_string()
    } else {
        escape_latex(text)
    }
}

/// TikZ color expression for `color`: the name when it has one, an explicit
/// RGB triple otherwise.
fn tikz_color(color: Color) -> String {
    let name = color.to_string();
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()) {
        return name;
    }
    let [r, g, b, _] = color.to_srgba().map(|c| (c * 255.0).round() as u8);
    format!("{{rgb,255:red,{r};green,{g};blue,{b}}}")
}

fn coordinate(point: Point, digits: usize) -> String {
    format!(
        "({},{})",
        fixed(point.x() * SCALE, digits),
        fixed(-point.y() * SCALE, digits)
    )
}

/// A [`DrawContext`] that builds a LaTeX document using TikZ.
pub struct TikzContext {
    style: Style,
    text_style: TextStyle,
    body: String,
    entity_depth: usize,
    points: Vec<Point>,
    stroke_color: Color,
    fill_color: Color,
    saved: Vec<(Color, Color)>,
}

impl TikzContext {
    /// Creates an empty document styled with `style`.
    pub fn new(style: Style, text_style: TextStyle) -> Self {
        Self {
            style,
            text_style,
            body: String::new(),
            entity_depth: 0,
            points: Vec::new(),
            stroke_color: Color::default(),
            fill_color: Color::default(),
            saved: Vec::new(),
        }
    }

    fn header(&self) -> String {
        let mut header = HEADER.to_string();
        match self.style {
            Style::Style1 => header.push_str(
                ", every state/.style={fill,draw=none,blue,text=white}, \
                 accepting/.style ={green!50!black,text=white}]",
            ),
            Style::Style2 => header.push_str(
                ", every state/.style={fill,draw=none,red,text=white}, \
                 accepting/.style ={orange!80,text=white}]",
            ),
            Style::Default => {}
        }
        header.push_str("]\n");
        if self.style == Style::Default {
            header.push_str("\\tikzset{accepting/.style={double distance=1mm}}\n");
        }
        header
    }

    fn in_entity(&self) -> bool {
        self.entity_depth > 0
    }

    fn write_entity(&mut self, entity: &Entity<'_>) {
        // Writing into a String cannot fail.
        let _ = match *entity {
            Entity::State {
                id,
                center,
                text,
                is_initial,
                is_accept_state,
            } => {
                let mut options = String::new();
                if is_initial {
                    options.push_str(",initial");
                }
                if is_accept_state {
                    options.push_str(",accepting");
                }
                writeln!(
                    self.body,
                    "\\node[state{options}, label=center:{{${}$}}] ({id}) at {} {{}};",
                    label_or_space(text),
                    coordinate(center, 2),
                )
            }
            Entity::Transition {
                from,
                to,
                perpendicular_part,
                text,
            } => {
                let label = label_or_space(text);
                if perpendicular_part == 0.0 {
                    writeln!(
                        self.body,
                        "\\path[->] ({from}) edge node [swap] {{${label}$}} ({to});"
                    )
                } else {
                    let (direction, swap) = if perpendicular_part > 0.0 {
                        ("bend right", ", swap")
                    } else {
                        ("bend left", "")
                    };
                    writeln!(
                        self.body,
                        "\\path[->] ({from}) edge[{direction}={} {swap}] node {{${label}$}} ({to});",
                        bend_amount(perpendicular_part),
                    )
                }
            }
            Entity::SelfLoop {
                node,
                anchor_angle,
                text,
            } => writeln!(
                self.body,
                "\\path[->] ({node}) edge[loop {}] node {{${}$}} ();",
                loop_direction(anchor_angle),
                label_or_space(text),
            ),
        };
    }

    fn write_points(&mut self, command: &str, color: Color) {
        if self.points.is_empty() {
            return;
        }
        let path = self
            .points
            .iter()
            .map(|point| coordinate(*point, 2))
            .collect::<Vec<_>>()
            .join(" -- ");
        let _ = writeln!(self.body, "\\{command} [{}] {path};", tikz_color(color));
    }
}

impl DrawContext for TikzContext {
    fn begin_path(&mut self) {
        self.points.clear();
    }

    fn move_to(&mut self, point: Point) {
        if !self.in_entity() {
            self.points.push(point);
        }
    }

    fn line_to(&mut self, point: Point) {
        if !self.in_entity() {
            self.points.push(point);
        }
    }

    fn arc(&mut self, arc: Arc) {
        if self.in_entity() {
            return;
        }
        let color = tikz_color(self.stroke_color);
        let circle = arc.circle();
        let center = circle.center();
        let radius = circle.radius() * SCALE;

        if arc.is_full_circle() {
            let _ = writeln!(
                self.body,
                "\\draw [{color}] {} circle ({});",
                coordinate(center, 3),
                fixed(radius, 3)
            );
            return;
        }

        let (mut start, mut end) = if arc.is_anticlockwise() {
            (arc.end_angle(), arc.start_angle())
        } else {
            (arc.start_angle(), arc.end_angle())
        };
        if end < start {
            end += TAU;
        }
        // TikZ rejects angles beyond a full turn in either direction.
        if start.min(end) < -TAU {
            start += TAU;
            end += TAU;
        } else if start.max(end) > TAU {
            start -= TAU;
            end -= TAU;
        }
        let (start, end) = (-start, -end);

        let x = center.x() * SCALE;
        let y = -center.y() * SCALE;
        let _ = writeln!(
            self.body,
            "\\draw [{color}] ({},{}) arc ({}:{}:{});",
            fixed(x + radius * start.cos(), 3),
            fixed(y + radius * start.sin(), 3),
            fixed(start * 180.0 / PI, 5),
            fixed(end * 180.0 / PI, 5),
            fixed(radius, 3),
        );
    }

    fn stroke(&mut self) {
        if !self.in_entity() {
            self.write_points("draw", self.stroke_color);
        }
    }

    fn fill(&mut self) {
        if !self.in_entity() {
            // Raw fills use the stroke color so arrowheads match their lines.
            self.write_points("fill", self.stroke_color);
        }
    }

    fn draw_text(&mut self, label: &Label<'_>) {
        if self.in_entity() {
            return;
        }
        let placed = PlacedLabel::new(label, &self.text_style);
        if placed.is_blank() {
            trace!("Skipping blank label");
            return;
        }

        let mut position = placed.center();
        let mut side = "";
        if let Some(angle) = label.angle() {
            let (dy, dx) = angle.sin_cos();
            let half_width = placed.width() / 2.0;
            if dx.abs() > dy.abs() {
                if dx > 0.0 {
                    side = "[right] ";
                    position = position.with_x(position.x() - half_width);
                } else {
                    side = "[left] ";
                    position = position.with_x(position.x() + half_width);
                }
            } else if dy > 0.0 {
                side = "[below] ";
                position = position.with_y(position.y() - LABEL_HALF_HEIGHT);
            } else {
                side = "[above] ";
                position = position.with_y(position.y() + LABEL_HALF_HEIGHT);
            }
        }

        let _ = writeln!(
            self.body,
            "\\draw {} node {side}{{${}$}};",
            coordinate(position, 2),
            escape_latex(label.text()),
        );
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn save(&mut self) {
        self.saved.push((self.stroke_color, self.fill_color));
    }

    fn restore(&mut self) {
        if let Some((stroke, fill)) = self.saved.pop() {
            self.stroke_color = stroke;
            self.fill_color = fill;
        }
    }

    fn begin_entity(&mut self, entity: &Entity<'_>) {
        if !self.in_entity() {
            self.write_entity(entity);
        }
        self.entity_depth += 1;
    }

    fn end_entity(&mut self) {
        self.entity_depth = self.entity_depth.saturating_sub(1);
    }
}

impl Exporter for TikzContext {
    type Output = String;

    fn finish(self) -> Result<String, Error> {
        debug!(style:% = self.style, bytes = self.body.len(); "Finishing TikZ document");
        Ok(format!("{}{}{FOOTER}", self.header(), self.body))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use fsmdraw_core::{geometry::Circle, identifier::NodeId};

    use super::*;
    use crate::{
        model::{Diagram, Link, StartLink},
        render::{RenderOptions, render_scene},
    };

    fn context(style: Style) -> TikzContext {
        TikzContext::new(style, TextStyle::default())
    }

    #[test]
    fn test_default_header_and_footer() {
        let document = context(Style::Default).finish().unwrap();
        assert!(document.starts_with("\\documentclass[12pt]{article}\n\\usepackage{tikz}\n"));
        assert!(document.contains("scale=0.17]\n\\tikzset{accepting/.style={double distance=1mm}}\n"));
        assert!(document.ends_with("\\end{tikzpicture}\n\\end{document}\n"));
    }

    #[test]
    fn test_filled_palette_header() {
        let document = context(Style::Style2).finish().unwrap();
        assert!(document.contains("every state/.style={fill,draw=none,red,text=white}"));
        assert!(document.contains("accepting/.style ={orange!80,text=white}]]\n"));
        assert!(!document.contains("double distance"));
    }

    #[test]
    fn test_state_primitive() {
        let mut ctx = context(Style::Default);
        ctx.begin_entity(&Entity::State {
            id: NodeId::new("q0"),
            center: Point::new(100.0, 250.0),
            text: "q_0",
            is_initial: true,
            is_accept_state: true,
        });
        // Geometry inside the scope is not emitted.
        ctx.begin_path();
        ctx.arc(Arc::full_circle(Point::new(100.0, 250.0), 30.0));
        ctx.stroke();
        ctx.end_entity();

        let document = ctx.finish().unwrap();
        assert!(document.contains(
            "\\node[state,initial,accepting, label=center:{$q_0$}] (q0) at (10,-25) {};\n"
        ));
        assert!(!document.contains("circle"));
    }

    #[test]
    fn test_empty_state_label_is_a_space() {
        let mut ctx = context(Style::Default);
        ctx.begin_entity(&Entity::State {
            id: NodeId::new("7"),
            center: Point::new(0.0, 0.0),
            text: "",
            is_initial: false,
            is_accept_state: false,
        });
        ctx.end_entity();
        assert!(ctx.finish().unwrap().contains("\\node[state, label=center:{$ $}] (7) at (0,0) {};"));
    }

    #[test]
    fn test_transition_primitives() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let mut ctx = context(Style::Default);
        for (perpendicular_part, text) in [(0.0, "x"), (100.0, "y"), (-30.0, "")] {
            ctx.begin_entity(&Entity::Transition {
                from: a,
                to: b,
                perpendicular_part,
                text,
            });
            ctx.end_entity();
        }

        let document = ctx.finish().unwrap();
        assert!(document.contains("\\path[->] (a) edge node [swap] {$x$} (b);\n"));
        assert!(document.contains("\\path[->] (a) edge[bend right=80 , swap] node {$y$} (b);\n"));
        assert!(document.contains("\\path[->] (a) edge[bend left=25 ] node {$ $} (b);\n"));
    }

    #[test]
    fn test_self_loop_primitive() {
        let mut ctx = context(Style::Default);
        ctx.begin_entity(&Entity::SelfLoop {
            node: NodeId::new("s"),
            anchor_angle: -FRAC_PI_2,
            text: "a b",
        });
        ctx.end_entity();
        assert!(ctx.finish().unwrap().contains("\\path[->] (s) edge[loop above] node {$a~b$} ();"));
    }

    #[test]
    fn test_loop_direction_quadrants() {
        assert_eq!(loop_direction(FRAC_PI_2), "below");
        assert_eq!(loop_direction(-FRAC_PI_2), "above");
        assert_eq!(loop_direction(0.0), "right");
        assert_eq!(loop_direction(PI), "left");
        assert_eq!(loop_direction(FRAC_PI_4), "left");
    }

    #[test]
    fn test_bend_buckets() {
        assert_eq!(bend_amount(100.0), 80);
        assert_eq!(bend_amount(-60.0), 50);
        assert_eq!(bend_amount(30.0), 25);
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("\\blank"), "\\textvisiblespace");
        assert_eq!(escape_latex("#1 & $2"), "\\#1~\\&~\\$2");
        assert_eq!(escape_latex("q_0\\"), "q_0\\backslash");
        assert_eq!(escape_latex("\\alpha"), "\\alpha");
    }

    #[test]
    fn test_raw_fallback_outside_entities() {
        let mut ctx = context(Style::Default);
        ctx.begin_path();
        ctx.move_to(Point::new(10.0, 20.0));
        ctx.line_to(Point::new(30.0, 20.0));
        ctx.stroke();
        ctx.fill();

        let document = ctx.finish().unwrap();
        assert!(document.contains("\\draw [black] (1,-2) -- (3,-2);\n"));
        assert!(document.contains("\\fill [black] (1,-2) -- (3,-2);\n"));
    }

    #[test]
    fn test_raw_arcs() {
        let mut ctx = context(Style::Default);
        ctx.begin_path();
        ctx.arc(Arc::full_circle(Point::new(10.0, 10.0), 10.0));
        ctx.arc(Arc::new(
            Circle::new(Point::new(0.0, 0.0), 10.0),
            0.0,
            FRAC_PI_2,
            false,
        ));

        let document = ctx.finish().unwrap();
        assert!(document.contains("\\draw [black] (1,-1) circle (1);\n"));
        assert!(document.contains("\\draw [black] (1,0) arc (0:-90:1);\n"));
    }

    #[test]
    fn test_raw_text_sides() {
        let mut ctx = context(Style::Default);
        ctx.draw_text(&Label::beside("a b", Point::new(100.0, 100.0), 0.0));
        ctx.draw_text(&Label::beside("c", Point::new(100.0, 100.0), FRAC_PI_2));
        ctx.draw_text(&Label::centered(" ", Point::new(0.0, 0.0)));

        let document = ctx.finish().unwrap();
        assert!(document.contains("node [right] {$a~b$};"));
        assert!(document.contains("node [below] {$c$};"));
        assert_eq!(document.matches("\\draw (").count(), 2);
    }

    #[test]
    fn test_start_marker_label_is_escaped() {
        let mut diagram = Diagram::new();
        let node = diagram.create_node(Point::new(100.0, 100.0));
        diagram.add_link(Link::Start(
            StartLink::new(node)
                .with_delta(Point::new(-60.0, 0.0))
                .with_text("50% a&b"),
        ));

        let mut ctx = context(Style::Default);
        render_scene(&mut ctx, &diagram, &RenderOptions::new());
        let document = ctx.finish().unwrap();

        assert!(document.contains("{$50\\%~a\\&b$};"), "{document}");
        assert!(!document.contains("50% "));
    }

    #[test]
    fn test_tikz_color() {
        assert_eq!(tikz_color(Color::new("blue").unwrap()), "blue");
        assert_eq!(
            tikz_color(Color::new("#ff8000").unwrap()),
            "{rgb,255:red,255;green,128;blue,0}"
        );
    }
}
