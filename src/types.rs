//! Strongly-typed geometric primitives for signpad.
//!
//! All coordinates are document-local pixels: origin at the top-left of the
//! surface, x grows right, y grows down.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

fn check_positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// A position on a document or capture surface
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.x, self.y)
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point { x: v.x, y: v.y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A displacement/offset vector (not an absolute position).
/// `Point - Point = Offset`, `Point + Offset = Point`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Offset { dx, dy }
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.dx, self.dy)
    }
}

impl From<DVec2> for Offset {
    fn from(v: DVec2) -> Self {
        Offset { dx: v.x, dy: v.y }
    }
}

impl Add<Offset> for Point {
    type Output = Point;
    fn add(self, rhs: Offset) -> Point { Point { x: self.x + rhs.dx, y: self.y + rhs.dy } }
}

impl Sub<Offset> for Point {
    type Output = Point;
    fn sub(self, rhs: Offset) -> Point { Point { x: self.x - rhs.dx, y: self.y - rhs.dy } }
}

impl Sub<Point> for Point {
    type Output = Offset;
    fn sub(self, rhs: Point) -> Offset { Offset { dx: self.x - rhs.x, dy: self.y - rhs.y } }
}

impl AddAssign<Offset> for Point {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.dx;
        self.y += rhs.dy;
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub const fn new(w: f64, h: f64) -> Self {
        Size { w, h }
    }

    /// Create a Size with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(w: f64, h: f64) -> Result<Self, NumericError> {
        Ok(Size { w: check_positive(w)?, h: check_positive(h)? })
    }

    /// Pixel dimensions for a raster surface, rounded up.
    /// Returns None when either side rounds to zero.
    pub fn to_pixels(self) -> Option<(u32, u32)> {
        if !(self.w.is_finite() && self.h.is_finite()) || self.w <= 0.0 || self.h <= 0.0 {
            return None;
        }
        let w = self.w.ceil().min(u32::MAX as f64) as u32;
        let h = self.h.ceil().min(u32::MAX as f64) as u32;
        Some((w, h))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Create a Rect with validation: finite origin, positive size
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, NumericError> {
        Ok(Rect {
            x: check_finite(x)?,
            y: check_finite(y)?,
            width: check_positive(width)?,
            height: check_positive(height)?,
        })
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Rect { x: origin.x, y: origin.y, width: size.w, height: size.h }
    }

    pub fn top_left(&self) -> Point { Point::new(self.x, self.y) }

    pub fn bottom_right(&self) -> Point { Point::new(self.right(), self.bottom()) }

    pub fn right(&self) -> f64 { self.x + self.width }

    pub fn bottom(&self) -> f64 { self.y + self.height }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Same size, new top-left corner
    pub fn with_origin(self, origin: Point) -> Self {
        Rect { x: origin.x, y: origin.y, ..self }
    }

    /// Same top-left corner, new size
    pub fn with_size(self, size: Size) -> Self {
        Rect { width: size.w, height: size.h, ..self }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Running bounding box over a set of points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox { min: DVec2::splat(f64::MAX), max: DVec2::splat(f64::MIN) }
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point) {
        let v = p.to_dvec2();
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    /// Grow outward on every side
    pub fn inflate(&mut self, amount: f64) {
        if !self.is_empty() {
            self.min -= DVec2::splat(amount);
            self.max += DVec2::splat(amount);
        }
    }

    /// Convert to a Rect; None while empty
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let size = self.max - self.min;
        Some(Rect::new(self.min.x, self.min.y, size.x, size.y))
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}
