//! Raster backend.
//!
//! [`RasterContext`] draws straight into a `tiny-skia` pixmap at a device
//! pixel ratio (2x by default) and encodes it as PNG when finished. Arcs are
//! flattened into cubic Bézier segments, labels are shaped and rasterized
//! through `cosmic-text`.
//!
//! This is also the backend an interactive host draws with, which is why it
//! alone honors the text caret; [`CaretBlink`] drives its visibility.

use std::{
    f64::consts::FRAC_PI_2,
    time::{Duration, Instant},
};

use cosmic_text::SwashCache;
use log::{debug, trace};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use fsmdraw_core::{
    color::Color,
    draw::{
        DrawContext, Label,
        text::{self, PlacedLabel, TextStyle},
    },
    geometry::{Arc, Point, Size},
};

use super::{Error, Exporter};

/// Offset from the vertical center of a label to its baseline
const BASELINE_OFFSET: f64 = 6.0;
/// Half the height of the text caret
const CARET_HALF_HEIGHT: f64 = 10.0;
const LINE_WIDTH: f32 = 1.0;

/// Caller-driven blink state of the text caret.
///
/// The host calls [`tick`](Self::tick) from its event loop and
/// [`reset`](Self::reset) whenever the user types or selects something, then
/// passes [`visible`](Self::visible) to the scene renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretBlink {
    visible: bool,
    last_toggle: Instant,
    period: Duration,
}

impl CaretBlink {
    /// Time between two visibility flips
    pub const PERIOD: Duration = Duration::from_millis(500);

    /// A visible caret whose period starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            visible: true,
            last_toggle: now,
            period: Self::PERIOD,
        }
    }

    /// Shows the caret and restarts the period.
    pub fn reset(&mut self, now: Instant) {
        self.visible = true;
        self.last_toggle = now;
    }

    /// Advances the blink to `now`.
    ///
    /// Returns `true` if the visibility changed, i.e. the host should redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_toggle);
        let flips = elapsed.as_nanos() / self.period.as_nanos();
        if flips == 0 {
            return false;
        }

        // Whole periods only; the remainder carries over to the next tick.
        let whole = u32::try_from(flips).unwrap_or(u32::MAX);
        self.last_toggle += self.period.saturating_mul(whole);

        let changed = flips % 2 == 1;
        if changed {
            self.visible = !self.visible;
        }
        changed
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Transform,
    stroke_color: Color,
    fill_color: Color,
}

/// A [`DrawContext`] backed by a pixmap.
pub struct RasterContext {
    pixmap: Pixmap,
    scale: f64,
    text_style: TextStyle,
    state: State,
    saved: Vec<State>,
    path: PathBuilder,
    has_current_point: bool,
    swash_cache: SwashCache,
}

impl RasterContext {
    /// Creates a transparent canvas of logical `size` rendered at `scale`
    /// device pixels per unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the scale is not a positive finite number
    /// or the scaled surface cannot be allocated.
    pub fn new(size: Size, scale: f64, text_style: TextStyle) -> Result<Self, Error> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Render(format!(
                "raster scale must be a positive number, got {scale}"
            )));
        }

        let width = (size.width() * scale).ceil();
        let height = (size.height() * scale).ceil();
        if !(1.0..=f64::from(u32::MAX)).contains(&width)
            || !(1.0..=f64::from(u32::MAX)).contains(&height)
        {
            return Err(Error::Render(format!(
                "scaled canvas {width}x{height} is outside the supported range"
            )));
        }
        let (width, height) = (width as u32, height as u32);

        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::Render(format!("failed to allocate {width}x{height} surface"))
        })?;
        debug!(width = width, height = height, scale = scale; "Raster surface allocated");

        Ok(Self {
            pixmap,
            scale,
            text_style,
            state: State {
                transform: Transform::from_scale(scale as f32, scale as f32),
                stroke_color: Color::default(),
                fill_color: Color::default(),
            },
            saved: Vec::new(),
            path: PathBuilder::new(),
            has_current_point: false,
            swash_cache: SwashCache::new(),
        })
    }

    /// The surface drawn so far.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn paint(color: Color) -> Paint<'static> {
        let [r, g, b, a] = color.to_srgba().map(|c| (c * 255.0).round() as u8);
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }

    /// Maps a logical point to device pixels under the current transform.
    fn to_device(&self, point: Point) -> (f32, f32) {
        let ts = self.state.transform;
        let (x, y) = (point.x() as f32, point.y() as f32);
        (
            ts.sx * x + ts.kx * y + ts.tx,
            ts.ky * x + ts.sy * y + ts.ty,
        )
    }

    fn stroke_builder(&mut self, builder: PathBuilder) {
        if self.state.stroke_color.is_transparent() {
            return;
        }
        let Some(path) = builder.finish() else {
            return;
        };
        let stroke = Stroke {
            width: LINE_WIDTH,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::paint(self.state.stroke_color),
            &stroke,
            self.state.transform,
            None,
        );
    }

    fn draw_caret(&mut self, top: Point, bottom: Point) {
        let mut builder = PathBuilder::new();
        builder.move_to(top.x() as f32, top.y() as f32);
        builder.line_to(bottom.x() as f32, bottom.y() as f32);
        self.stroke_builder(builder);
    }

    fn draw_glyphs(&mut self, text: &str, baseline: Point) {
        let color = self.state.fill_color;
        if color.is_transparent() {
            return;
        }
        let device_style = TextStyle::new(
            self.text_style.font_family(),
            self.text_style.font_size() * self.scale,
        );
        let (origin_x, baseline_y) = self.to_device(baseline);
        let [r, g, b, a] = color.to_srgba().map(|c| (c * 255.0).round() as u8);
        let text_color = cosmic_text::Color::rgba(r, g, b, a);

        let Self {
            pixmap,
            swash_cache,
            ..
        } = self;
        text::with_font_system(|font_system| {
            let buffer = text::shape(font_system, text, &device_style);
            let Some(line_y) = buffer.layout_runs().next().map(|run| run.line_y) else {
                return;
            };
            let top = baseline_y - line_y;

            buffer.draw(font_system, swash_cache, text_color, |x, y, w, h, color| {
                let Some(rect) =
                    Rect::from_xywh(origin_x + x as f32, top + y as f32, w as f32, h as f32)
                else {
                    return;
                };
                let mut paint = Paint::default();
                paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            });
        });
    }
}

impl DrawContext for RasterContext {
    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
        self.has_current_point = false;
    }

    fn move_to(&mut self, point: Point) {
        self.path.move_to(point.x() as f32, point.y() as f32);
        self.has_current_point = true;
    }

    fn line_to(&mut self, point: Point) {
        if self.has_current_point {
            self.path.line_to(point.x() as f32, point.y() as f32);
        } else {
            self.move_to(point);
        }
    }

    fn arc(&mut self, arc: Arc) {
        let circle = arc.circle();
        let sweep = arc.sweep();
        let start = arc.start_point();
        if self.has_current_point {
            self.path.line_to(start.x() as f32, start.y() as f32);
        } else {
            self.path.move_to(start.x() as f32, start.y() as f32);
            self.has_current_point = true;
        }
        if sweep == 0.0 {
            return;
        }

        // Split into pieces of at most a quarter turn for a tight cubic fit.
        let pieces = (sweep.abs() / FRAC_PI_2).ceil().max(1.0);
        let step = sweep / pieces;
        let handle = 4.0 / 3.0 * (step / 4.0).tan() * circle.radius();
        let mut angle = arc.start_angle();
        for _ in 0..pieces as usize {
            let next = angle + step;
            let from = circle.point_at(angle);
            let to = circle.point_at(next);
            let (sin_from, cos_from) = angle.sin_cos();
            let (sin_to, cos_to) = next.sin_cos();
            self.path.cubic_to(
                (from.x() - handle * sin_from) as f32,
                (from.y() + handle * cos_from) as f32,
                (to.x() + handle * sin_to) as f32,
                (to.y() - handle * cos_to) as f32,
                to.x() as f32,
                to.y() as f32,
            );
            angle = next;
        }
    }

    fn stroke(&mut self) {
        self.stroke_builder(self.path.clone());
    }

    fn fill(&mut self) {
        if self.state.fill_color.is_transparent() {
            return;
        }
        let Some(path) = self.path.clone().finish() else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &Self::paint(self.state.fill_color),
            FillRule::Winding,
            self.state.transform,
            None,
        );
    }

    fn draw_text(&mut self, label: &Label<'_>) {
        let placed = PlacedLabel::new(label, &self.text_style);
        let x = placed.origin().x().round();
        let y = placed.origin().y().round();

        if placed.is_blank() {
            trace!("Skipping blank label");
        } else {
            self.draw_glyphs(placed.text(), Point::new(x, y + BASELINE_OFFSET));
        }

        if label.caret() {
            let caret_x = x + placed.width();
            self.draw_caret(
                Point::new(caret_x, y - CARET_HALF_HEIGHT),
                Point::new(caret_x, y + CARET_HALF_HEIGHT),
            );
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    fn translate(&mut self, offset: Point) {
        self.state.transform = self
            .state
            .transform
            .pre_translate(offset.x() as f32, offset.y() as f32);
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }
}

impl Exporter for RasterContext {
    type Output = Vec<u8>;

    fn finish(self) -> Result<Vec<u8>, Error> {
        debug!(
            width = self.pixmap.width(),
            height = self.pixmap.height();
            "Encoding PNG"
        );
        self.pixmap
            .encode_png()
            .map_err(|err| Error::Render(format!("failed to encode PNG output: {err}")))
    }
}
