//! Freehand signature pad
//!
//! Pointer input is recorded as vector strokes and rasterized incrementally
//! onto a transparent pixmap, one round-capped segment per `extend_stroke`.

use tiny_skia::{self as skia, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

use crate::config::PenStyle;
use crate::errors::CaptureError;
use crate::log::debug;
use crate::types::{BBox, Point, Rect, Size};

/// Whether the ink on the surface has been accepted by the encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing drawn since creation or the last clear
    Empty,
    /// Ink present that has not been saved, or was edited after a save
    Dirty,
    /// Current ink was successfully encoded
    Saved,
}

/// One continuous pointer-down to pointer-up path
#[derive(Clone, Debug, PartialEq, Default)]
pub struct InkStroke {
    points: Vec<Point>,
}

impl InkStroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// A stroke with a single point never reached the raster
    pub fn is_visible(&self) -> bool {
        self.points.len() > 1
    }
}

pub struct StrokeCaptureSurface {
    size: Size,
    pen: PenStyle,
    pixmap: Pixmap,
    strokes: Vec<InkStroke>,
    drawing: bool,
    has_content: bool,
    state: CaptureState,
}

impl StrokeCaptureSurface {
    pub fn new(size: Size, pen: PenStyle) -> Result<Self, CaptureError> {
        let invalid = || CaptureError::InvalidCanvas { width: size.w, height: size.h };
        let (w, h) = size.to_pixels().ok_or_else(invalid)?;
        let pixmap = Pixmap::new(w, h).ok_or_else(invalid)?;
        Ok(Self {
            size,
            pen,
            pixmap,
            strokes: Vec::new(),
            drawing: false,
            has_content: false,
            state: CaptureState::Empty,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// A stroke is in progress
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn strokes(&self) -> &[InkStroke] {
        &self.strokes
    }

    /// Start a new path at `point`. Nothing is drawn until the path is
    /// extended. Starting while mid-stroke begins a disconnected path.
    pub fn begin_stroke(&mut self, point: Point) {
        self.invalidate_save();
        self.strokes.push(InkStroke { points: vec![point] });
        self.drawing = true;
    }

    /// Draw a segment from the last recorded point to `point`.
    /// Ignored when no stroke is in progress.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.drawing {
            debug!(x = point.x, y = point.y, "extend_stroke without begin_stroke ignored");
            return;
        }
        let Some(last) = self.strokes.last().and_then(|s| s.points.last()).copied() else {
            return;
        };
        self.draw_segment(last, point);
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.points.push(point);
        }
        self.has_content = true;
        self.state = CaptureState::Dirty;
    }

    /// Close the current path. The raster is not touched.
    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Wipe the raster back to fully transparent and forget all strokes
    pub fn clear(&mut self) {
        self.pixmap.fill(skia::Color::TRANSPARENT);
        self.strokes.clear();
        self.drawing = false;
        self.has_content = false;
        self.state = CaptureState::Empty;
    }

    /// Bounds of the visible ink including the pen radius
    pub fn ink_bounds(&self) -> Option<Rect> {
        let mut bounds = BBox::new();
        for stroke in self.strokes.iter().filter(|s| s.is_visible()) {
            for point in &stroke.points {
                bounds.expand_point(*point);
            }
        }
        bounds.inflate(f64::from(self.pen.width) / 2.0);
        bounds.to_rect()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn mark_saved(&mut self) {
        self.state = CaptureState::Saved;
    }

    fn invalidate_save(&mut self) {
        if self.state == CaptureState::Saved {
            debug!("stroke after save, signature is unsaved again");
            self.state = CaptureState::Dirty;
        }
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let mut paint = Paint::default();
        let [r, g, b, a] = self.pen.color;
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        // A zero-length segment is a tap: stamp a dot the size of the pen tip.
        if from == to {
            let radius = self.pen.width / 2.0;
            if let Some(dot) = PathBuilder::from_circle(to.x as f32, to.y as f32, radius) {
                self.pixmap.fill_path(
                    &dot,
                    &paint,
                    skia::FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = skia::Stroke {
            width: self.pen.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..skia::Stroke::default()
        };
        self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

impl std::fmt::Debug for StrokeCaptureSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeCaptureSurface")
            .field("size", &self.size)
            .field("strokes", &self.strokes.len())
            .field("drawing", &self.drawing)
            .field("has_content", &self.has_content)
            .field("state", &self.state)
            .finish()
    }
}
