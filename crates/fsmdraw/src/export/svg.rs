//! SVG backend.
//!
//! [`SvgContext`] collects one SVG primitive per stroke, fill and label.
//! Straight paths become `<polyline>` (stroked) or `<polygon>` (filled)
//! elements, whole circles become `<circle>` elements and partial arcs
//! become `<path>` elements with an elliptical-arc command. Label text is
//! escaped so that everything outside printable ASCII is written as a
//! numeric character reference.

use std::f64::consts::{PI, TAU};

use log::{debug, trace};
use svg::{self, node::element as svg_element};

use fsmdraw_core::{
    color::Color,
    draw::{
        DrawContext, Label, fixed,
        text::{PlacedLabel, TextStyle},
    },
    geometry::{Arc, Circle, Point, Size},
};

use super::{Error, Exporter};

const XML_PROLOGUE: &str = "<?xml version=\"1.0\" standalone=\"no\"?>\n\
<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
\"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\n";

/// Offset from the vertical center of a label to its baseline
const BASELINE_OFFSET: f64 = 6.0;
/// Half the height of the text caret
const CARET_HALF_HEIGHT: f64 = 10.0;
const LINE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
enum PathPart {
    Polyline(Vec<Point>),
    Arc(Arc),
}

/// A [`DrawContext`] that builds an SVG document.
///
/// # Examples
///
/// ```
/// # use fsmdraw::export::{Exporter, svg::SvgContext};
/// # use fsmdraw::draw::{DrawContext, text::TextStyle};
/// # use fsmdraw::geometry::{Arc, Point, Size};
/// let mut ctx = SvgContext::new(Size::new(800.0, 600.0), TextStyle::default());
/// ctx.begin_path();
/// ctx.arc(Arc::full_circle(Point::new(100.0, 100.0), 30.0));
/// ctx.stroke();
///
/// let document = ctx.finish().unwrap();
/// assert!(document.contains("<circle"));
/// ```
pub struct SvgContext {
    size: Size,
    text_style: TextStyle,
    stroke_color: Color,
    fill_color: Color,
    offset: Point,
    saved: Vec<(Point, Color, Color)>,
    path: Vec<PathPart>,
    elements: Vec<Box<dyn svg::Node>>,
}

impl SvgContext {
    /// Creates an empty document of the given canvas size.
    pub fn new(size: Size, text_style: TextStyle) -> Self {
        Self {
            size,
            text_style,
            stroke_color: Color::default(),
            fill_color: Color::default(),
            offset: Point::default(),
            saved: Vec::new(),
            path: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Number of primitives emitted so far.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn push(&mut self, element: impl Into<Box<dyn svg::Node>>) {
        self.elements.push(element.into());
    }

    /// Builds the primitive for `arc` with the given paint attributes.
    fn arc_element(arc: Arc, paint: &[(&'static str, &str)]) -> Box<dyn svg::Node> {
        let circle = arc.circle();
        let center = circle.center();
        let radius = fixed(circle.radius(), 3);

        if arc.is_full_circle() {
            let mut element = svg_element::Circle::new();
            for (name, value) in paint {
                element = element.set(*name, *value);
            }
            return Box::new(
                element
                    .set("cx", fixed(center.x(), 3))
                    .set("cy", fixed(center.y(), 3))
                    .set("r", radius),
            );
        }

        // Always sweep in the positive direction; reversed arcs swap ends.
        let (start, mut end) = if arc.is_anticlockwise() {
            (arc.end_angle(), arc.start_angle())
        } else {
            (arc.start_angle(), arc.end_angle())
        };
        if end < start {
            end += TAU;
        }
        let large_arc = u8::from((end - start).abs() > PI);
        let from = circle.point_at(start);
        let to = circle.point_at(end);

        let data = format!(
            "M {},{} A {radius},{radius} 0 {large_arc} 1 {},{}",
            fixed(from.x(), 3),
            fixed(from.y(), 3),
            fixed(to.x(), 3),
            fixed(to.y(), 3),
        );
        let mut path = svg_element::Path::new();
        for (name, value) in paint {
            path = path.set(*name, *value);
        }
        Box::new(path.set("d", data))
    }

    fn points_attribute(points: &[Point]) -> String {
        points
            .iter()
            .map(|point| format!("{},{}", fixed(point.x(), 3), fixed(point.y(), 3)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escapes `text` for use as SVG character data.
///
/// `&`, `<` and `>` become entity references; every character outside
/// printable ASCII becomes a numeric character reference.
///
/// # Examples
///
/// ```
/// # use fsmdraw::export::svg::escape_text;
/// assert_eq!(escape_text("a<b & c"), "a&lt;b &amp; c");
/// assert_eq!(escape_text("q₀"), "q&#8320;");
/// ```
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            ' '..='~' => escaped.push(c),
            _ => escaped.push_str(&format!("&#{};", u32::from(c))),
        }
    }
    escaped
}

impl DrawContext for SvgContext {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Point) {
        self.path
            .push(PathPart::Polyline(vec![point.add_point(self.offset)]));
    }

    fn line_to(&mut self, point: Point) {
        let point = point.add_point(self.offset);
        match self.path.last_mut() {
            Some(PathPart::Polyline(points)) => points.push(point),
            _ => self.path.push(PathPart::Polyline(vec![point])),
        }
    }

    fn arc(&mut self, arc: Arc) {
        let circle = arc.circle();
        let moved = Circle::new(circle.center().add_point(self.offset), circle.radius());
        self.path.push(PathPart::Arc(Arc::new(
            moved,
            arc.start_angle(),
            arc.end_angle(),
            arc.is_anticlockwise(),
        )));
    }

    fn stroke(&mut self) {
        if self.stroke_color.is_transparent() {
            return;
        }
        let stroke = self.stroke_color.to_string();
        for part in std::mem::take(&mut self.path) {
            let element: Box<dyn svg::Node> = match &part {
                PathPart::Polyline(points) => Box::new(
                    svg_element::Polyline::new()
                        .set("points", Self::points_attribute(points))
                        .set("stroke", stroke.as_str())
                        .set("stroke-width", LINE_WIDTH)
                        .set("fill", "none"),
                ),
                PathPart::Arc(arc) => Self::arc_element(
                    *arc,
                    &[
                        ("stroke", stroke.as_str()),
                        ("stroke-width", "1"),
                        ("fill", "none"),
                    ],
                ),
            };
            self.elements.push(element);
            self.path.push(part);
        }
    }

    fn fill(&mut self) {
        if self.fill_color.is_transparent() {
            return;
        }
        let fill = self.fill_color.to_string();
        for part in std::mem::take(&mut self.path) {
            let element: Box<dyn svg::Node> = match &part {
                PathPart::Polyline(points) => Box::new(
                    svg_element::Polygon::new()
                        .set("points", Self::points_attribute(points))
                        .set("fill", fill.as_str())
                        .set("stroke-width", LINE_WIDTH),
                ),
                PathPart::Arc(arc) => {
                    Self::arc_element(*arc, &[("fill", fill.as_str()), ("stroke", "none")])
                }
            };
            self.elements.push(element);
            self.path.push(part);
        }
    }

    fn draw_text(&mut self, label: &Label<'_>) {
        let placed = PlacedLabel::new(label, &self.text_style);
        let x = placed.origin().x().round() + self.offset.x();
        let y = placed.origin().y().round() + self.offset.y();

        if placed.is_blank() {
            trace!("Skipping blank label");
        } else {
            let text = svg_element::Text::new("")
                .set("x", fixed(x, 3))
                .set("y", fixed(y + BASELINE_OFFSET, 3))
                .set("font-family", self.text_style.font_family())
                .set("font-size", self.text_style.font_size())
                .set("fill", self.fill_color.to_string())
                .add(svg::node::Blob::new(escape_text(placed.text())));
            self.push(text);
        }

        if label.caret() {
            let caret_x = x + placed.width();
            let caret = svg_element::Line::new()
                .set("x1", fixed(caret_x, 3))
                .set("y1", fixed(y - CARET_HALF_HEIGHT, 3))
                .set("x2", fixed(caret_x, 3))
                .set("y2", fixed(y + CARET_HALF_HEIGHT, 3))
                .set("stroke", self.stroke_color.to_string())
                .set("stroke-width", LINE_WIDTH);
            self.push(caret);
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn translate(&mut self, offset: Point) {
        self.offset = self.offset.add_point(offset);
    }

    fn save(&mut self) {
        self.saved
            .push((self.offset, self.stroke_color, self.fill_color));
    }

    fn restore(&mut self) {
        if let Some((offset, stroke, fill)) = self.saved.pop() {
            self.offset = offset;
            self.stroke_color = stroke;
            self.fill_color = fill;
        }
    }
}

impl Exporter for SvgContext {
    type Output = String;

    fn finish(self) -> Result<String, Error> {
        debug!(elements = self.elements.len(); "Finishing SVG document");

        let mut document = svg::Document::new()
            .set("width", self.size.width())
            .set("height", self.size.height())
            .set("version", "1.1")
            .set("xmlns", "http://www.w3.org/2000/svg");
        for element in self.elements {
            document = document.add(element);
        }

        Ok(format!("{XML_PROLOGUE}{document}\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn context() -> SvgContext {
        SvgContext::new(Size::new(800.0, 600.0), TextStyle::default())
    }

    #[test]
    fn test_document_prologue() {
        let document = context().finish().unwrap();
        assert!(document.starts_with("<?xml version=\"1.0\" standalone=\"no\"?>\n<!DOCTYPE svg"));
        assert!(document.contains("width=\"800\""));
        assert!(document.contains("height=\"600\""));
        assert!(document.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(document.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_full_circle_becomes_circle() {
        let mut ctx = context();
        ctx.translate(Point::new(0.5, 0.5));
        ctx.begin_path();
        ctx.arc(Arc::full_circle(Point::new(50.0, 50.0), 30.0));
        ctx.stroke();

        let document = ctx.finish().unwrap();
        assert!(document.contains("<circle"));
        assert!(!document.contains("<ellipse"));
        assert!(document.contains("cx=\"50.5\""));
        assert!(document.contains("r=\"30\""));
        assert!(document.contains("fill=\"none\""));
    }

    #[test]
    fn test_partial_arc_becomes_path() {
        let mut ctx = context();
        let arc = Arc::new(
            Circle::new(Point::new(0.0, 0.0), 10.0),
            0.0,
            FRAC_PI_2,
            false,
        );
        ctx.begin_path();
        ctx.arc(arc);
        ctx.stroke();

        let document = ctx.finish().unwrap();
        assert!(document.contains("M 10,0 A 10,10 0 0 1 0,10"));
    }

    #[test]
    fn test_reversed_arc_swaps_ends_and_sets_large_flag() {
        let mut ctx = context();
        // Anticlockwise from 0 to π/2 covers three quarters of the circle.
        let arc = Arc::new(
            Circle::new(Point::new(0.0, 0.0), 10.0),
            0.0,
            FRAC_PI_2,
            true,
        );
        ctx.begin_path();
        ctx.arc(arc);
        ctx.stroke();

        let document = ctx.finish().unwrap();
        assert!(document.contains("M 0,10 A 10,10 0 1 1 10,0"));
    }

    #[test]
    fn test_stroke_is_polyline_and_fill_is_polygon() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.move_to(Point::new(0.0, 0.0));
        ctx.line_to(Point::new(10.0, 0.0));
        ctx.line_to(Point::new(10.0, 10.0));
        ctx.stroke();
        ctx.fill();

        let document = ctx.finish().unwrap();
        assert!(document.contains("<polyline"));
        assert!(document.contains("<polygon"));
        assert!(document.contains("points=\"0,0 10,0 10,10\""));
    }

    #[test]
    fn test_transparent_paint_is_skipped() {
        let mut ctx = context();
        ctx.set_fill_color(Color::new("transparent").unwrap());
        ctx.begin_path();
        ctx.arc(Arc::full_circle(Point::new(0.0, 0.0), 30.0));
        ctx.fill();
        assert_eq!(ctx.element_count(), 0);
    }

    #[test]
    fn test_text_is_escaped_and_blank_text_skipped() {
        let mut ctx = context();
        ctx.draw_text(&Label::centered("a<b", Point::new(100.0, 100.0)));
        ctx.draw_text(&Label::centered("q_0", Point::new(100.0, 200.0)));
        ctx.draw_text(&Label::centered("   ", Point::new(100.0, 300.0)));
        assert_eq!(ctx.element_count(), 2);

        let document = ctx.finish().unwrap();
        assert!(document.contains("a&lt;b"));
        assert!(document.contains("q&#8320;"));
        assert!(document.contains("y=\"106\""));
        assert!(document.contains("font-family=\"Times New Roman\""));
    }

    #[test]
    fn test_caret_is_drawn_when_requested() {
        let mut ctx = context();
        ctx.draw_text(&Label::centered("", Point::new(100.0, 100.0)).with_caret(true));
        assert_eq!(ctx.element_count(), 1);
        assert!(ctx.finish().unwrap().contains("<line"));
    }

    #[test]
    fn test_restore_pops_translation() {
        let mut ctx = context();
        ctx.save();
        ctx.translate(Point::new(10.0, 10.0));
        ctx.restore();
        ctx.begin_path();
        ctx.move_to(Point::new(1.0, 1.0));
        ctx.line_to(Point::new(2.0, 2.0));
        ctx.stroke();
        assert!(ctx.finish().unwrap().contains("points=\"1,1 2,2\""));
    }

    #[test]
    fn test_escape_text_passes_printable_ascii() {
        assert_eq!(escape_text("abc ~!"), "abc ~!");
        assert_eq!(escape_text("→"), "&#8594;");
        assert_eq!(escape_text("\t"), "&#9;");
    }
}
