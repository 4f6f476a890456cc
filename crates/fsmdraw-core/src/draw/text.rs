//! Text support shared by the rendering backends.
//!
//! - [`TextStyle`] - Font family and pixel size used for labels
//! - [`place_label`] - Slides a label around its anchor so it sits beside it
//! - [`convert_shortcuts`] - Turns LaTeX-like shorthands into Unicode
//! - [`measure_width`] - Shaped text width through `cosmic-text`
//! - [`PlacedLabel`] - A label converted, measured and placed in one step

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::{draw::Label, geometry::Point};

/// Half the nominal height of a label line in pixels
const LABEL_HALF_HEIGHT: f64 = 10.0;
/// Gap between a side-placed label and its anchor
const LABEL_GAP: f64 = 5.0;

const GREEK_LETTER_NAMES: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

const SYMBOLS: [(&str, char); 9] = [
    ("\\rightarrow", '\u{2192}'),
    ("\\leftarrow", '\u{2190}'),
    ("\\emptyset", '\u{2205}'),
    ("\\sqcup", '\u{2294}'),
    ("\\textvisiblespace", '\u{2423}'),
    ("\\infty", '\u{221E}'),
    ("\\vdash", '\u{22A2}'),
    ("\\dashv", '\u{22A3}'),
    ("\\blank", '\u{2423}'),
];

/// Font settings for labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    font_family: String,
    font_size: f64,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: f64) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Font size in pixels
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    fn line_height(&self) -> f64 {
        self.font_size * 1.15
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new("Times New Roman", 20.0)
    }
}

/// A label after shortcut conversion, measurement and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    text: String,
    origin: Point,
    width: f64,
}

impl PlacedLabel {
    pub fn new(label: &Label<'_>, style: &TextStyle) -> Self {
        let text = convert_shortcuts(label.text());
        let width = measure_width(&text, style);
        let origin = place_label(label.anchor(), width, label.angle());
        Self {
            text,
            origin,
            width,
        }
    }

    /// The converted text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Left edge and vertical center of the label.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Horizontal center and vertical center of the label.
    pub fn center(&self) -> Point {
        self.origin.with_x(self.origin.x() + self.width / 2.0)
    }

    /// Returns `true` if there is nothing visible to draw.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Computes where a label of the given `width` starts.
///
/// Returns the left edge and vertical center of the label. Without an
/// `angle` the label is centered on `anchor`. With one, the label is moved
/// to the side of `anchor` that `angle` points to: mostly horizontally when
/// the angle is near horizontal, mostly vertically otherwise, sliding
/// smoothly between the two through high powers of sine and cosine.
///
/// # Examples
///
/// ```
/// # use fsmdraw_core::{draw::text::place_label, geometry::Point};
/// let centered = place_label(Point::new(100.0, 100.0), 40.0, None);
/// assert_eq!(centered, Point::new(80.0, 100.0));
///
/// // Pointing right: the label starts just right of the anchor.
/// let right = place_label(Point::new(100.0, 100.0), 40.0, Some(0.0));
/// assert!((right.x() - 105.0).abs() < 1e-9);
/// assert!((right.y() - 100.0).abs() < 1e-9);
/// ```
pub fn place_label(anchor: Point, width: f64, angle: Option<f64>) -> Point {
    let mut x = anchor.x() - width / 2.0;
    let mut y = anchor.y();

    if let Some(angle) = angle {
        let (sin, cos) = angle.sin_cos();
        let corner_x = (width / 2.0 + LABEL_GAP) * if cos > 0.0 { 1.0 } else { -1.0 };
        let corner_y = (LABEL_HALF_HEIGHT + LABEL_GAP) * if sin > 0.0 { 1.0 } else { -1.0 };
        let slide =
            sin * sin.abs().powi(40) * corner_x - cos * cos.abs().powi(10) * corner_y;
        x += corner_x - sin * slide;
        y += corner_y + cos * slide;
    }

    Point::new(x, y)
}

/// Converts LaTeX-style shorthands into the characters they stand for.
///
/// Handles Greek letter names (`\alpha`, `\Omega`, ...), numeric subscripts
/// (`q_0`, `q_{12}`) and a few symbols such as `\rightarrow` and `\blank`.
///
/// # Examples
///
/// ```
/// # use fsmdraw_core::draw::text::convert_shortcuts;
/// assert_eq!(convert_shortcuts("q_0"), "q₀");
/// assert_eq!(convert_shortcuts("q_{12}"), "q₁₂");
/// assert_eq!(convert_shortcuts("\\alpha\\rightarrow\\Omega"), "α→Ω");
/// ```
pub fn convert_shortcuts(text: &str) -> String {
    let mut converted = text.to_string();

    for (index, name) in GREEK_LETTER_NAMES.iter().enumerate() {
        // The Greek block has a final-sigma code point after rho that has no
        // uppercase counterpart; skip it for Sigma onwards.
        let offset = index as u32 + u32::from(index > 16);
        let upper = char::from_u32(0x391 + offset).unwrap_or_default();
        let lower = char::from_u32(0x3B1 + offset).unwrap_or_default();
        converted = converted.replace(&format!("\\{name}"), &upper.to_string());
        converted = converted.replace(
            &format!("\\{}", name.to_lowercase()),
            &lower.to_string(),
        );
    }

    converted = convert_braced_subscripts(&converted);
    converted = convert_digit_subscripts(&converted);

    for (shortcut, symbol) in SYMBOLS {
        converted = converted.replace(shortcut, &symbol.to_string());
    }

    converted
}

fn subscript_digit(digit: char) -> Option<char> {
    digit
        .to_digit(10)
        .and_then(|d| char::from_u32(0x2080 + d))
}

/// `_{...}` becomes its content with every digit lowered.
fn convert_braced_subscripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("_{") {
        let after = &rest[pos + 2..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..pos]);
        out.extend(
            after[..close]
                .chars()
                .map(|c| subscript_digit(c).unwrap_or(c)),
        );
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// `_d` for a single digit `d` becomes the subscript digit.
fn convert_digit_subscripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(sub) = chars.peek().copied().and_then(subscript_digit) {
                chars.next();
                out.push(sub);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Measures the advance width of `text` in pixels.
pub fn measure_width(text: &str, style: &TextStyle) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    with_font_system(|font_system| {
        let buffer = shape(font_system, text, style);
        let width = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .fold(0.0f32, f32::max);

        if width > 0.0 {
            f64::from(width)
        } else {
            // No usable font: approximate from the character count.
            text.chars().count() as f64 * style.font_size() * 0.55
        }
    })
}

/// Lays out `text` into a single-line buffer ready for measuring or drawing.
pub fn shape(font_system: &mut FontSystem, text: &str, style: &TextStyle) -> Buffer {
    let metrics = Metrics::new(style.font_size() as f32, style.line_height() as f32);
    let mut buffer = Buffer::new(font_system, metrics);
    {
        let mut buffer = buffer.borrow_with(font_system);
        let attrs = Attrs::new().family(Family::Name(style.font_family()));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);
    }
    buffer
}

/// Runs `f` with the process-wide font system.
///
/// Loading system fonts is expensive, so one `FontSystem` is created on first
/// use and shared afterwards.
pub fn with_font_system<R>(f: impl FnOnce(&mut FontSystem) -> R) -> R {
    let mut font_system = FONT_SYSTEM
        .get_or_init(|| {
            info!("Initializing FontSystem");
            Mutex::new(FontSystem::new())
        })
        .lock()
        .expect("failed to lock FontSystem");
    f(&mut font_system)
}

static FONT_SYSTEM: OnceLock<Mutex<FontSystem>> = OnceLock::new();
