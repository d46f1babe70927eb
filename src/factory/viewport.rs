use serde::{Serialize, Deserialize};
use crate::error::ValidationError;
use crate::graph::Position;

/// Pointer position in client (screen) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps a client-space pointer position into canvas (flow) coordinates.
pub trait Projection {
    fn project(&self, point: ScreenPoint) -> Position;
}

/// Pan/zoom transform of the canvas plus the canvas element's on-screen origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Top-left corner of the canvas element in client pixels
    pub offset_x: f64,
    pub offset_y: f64,
    /// Pan translation applied by the canvas
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(offset: (f64, f64), pan: (f64, f64), zoom: f64) -> Result<Self, ValidationError> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "zoom",
                reason: format!("must be a positive number, got {}", zoom),
            });
        }
        Ok(Self {
            offset_x: offset.0,
            offset_y: offset.1,
            pan_x: pan.0,
            pan_y: pan.1,
            zoom,
        })
    }
}

impl Projection for Viewport {
    fn project(&self, point: ScreenPoint) -> Position {
        Position {
            x: (point.x - self.offset_x - self.pan_x) / self.zoom,
            y: (point.y - self.offset_y - self.pan_y) / self.zoom,
        }
    }
}
