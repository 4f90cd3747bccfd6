//! Drawn strategy: an owned stroke-accumulation buffer
//!
//! The drawing surface is modeled as a buffer of completed point sequences.
//! Event handling appends to the buffer; rasterization to an image payload
//! is a pure function of it (see `raster`), so "is there a signature yet"
//! stays testable without a real rendering surface.

use crate::raster::{encode_bmp_data_url, rasterize};
use crate::strategy::{CaptureError, CaptureStrategy};
use esign_types::{SignatureMethod, SignaturePayload};
use serde::{Deserialize, Serialize};

/// A point on the logical drawing surface, in pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One continuous ink stroke, pointer-down to pointer-up
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Default logical canvas size, matching the embedding surface's signature box
pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 150;

/// Drawn strategy: wraps a continuous-stroke capture surface.
///
/// Only completed strokes count toward `is_empty()`; an open stroke does not
/// become part of the signature until `end_stroke()`. Resizing the surface
/// clears all ink, because coordinate scaling would silently corrupt the
/// signature's visual fidelity.
#[derive(Clone, Debug)]
pub struct DrawnCapture {
    width: u32,
    height: u32,
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
}

impl DrawnCapture {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            strokes: Vec::new(),
            current: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Completed strokes accumulated so far
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Start a new stroke at `point`. An already-open stroke is committed
    /// first, as if the pointer had been lifted.
    pub fn begin_stroke(&mut self, point: Point) {
        self.end_stroke();
        self.current = Some(Stroke {
            points: vec![point],
        });
    }

    /// Extend the open stroke with a sequence of points. Ignored when no
    /// stroke is open.
    pub fn extend_stroke(&mut self, points: &[Point]) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.points.extend_from_slice(points);
        }
    }

    /// Commit the open stroke. A stroke with at least one point counts as
    /// completed ink, so a single tap leaves a dot.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.current.take() {
            if !stroke.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    /// Discard all ink, completed and in-progress
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
    }

    /// Resize the drawing surface. Existing strokes are cleared; partially
    /// preserved ink after a resize is disallowed.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.clear();
    }
}

impl Default for DrawnCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureStrategy for DrawnCapture {
    fn method(&self) -> SignatureMethod {
        SignatureMethod::Drawn
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    fn serialize(&self) -> Result<SignaturePayload, CaptureError> {
        if self.strokes.is_empty() {
            return Err(CaptureError::EmptyCanvas);
        }
        let bitmap = rasterize(&self.strokes, self.width, self.height);
        Ok(SignaturePayload::Drawn {
            image: encode_bmp_data_url(&bitmap, self.width, self.height),
        })
    }
}
