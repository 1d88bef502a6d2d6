use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates: `(x_min, y_min, x_max, y_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Builds a box from COCO's `[x, y, width, height]` layout.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// A box is well-formed when every coordinate is finite and the max
    /// corner does not precede the min corner on either axis.
    pub fn is_well_formed(&self) -> bool {
        [self.x_min, self.y_min, self.x_max, self.y_max]
            .iter()
            .all(|v| v.is_finite())
            && self.x_max >= self.x_min
            && self.y_max >= self.y_min
    }

    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).abs()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point rounded to whole pixels, ties to even.
    ///
    /// Coordinates beyond the `i64` range saturate to `i64::MIN`/`i64::MAX`.
    /// Pixel coordinates never get there, so no error is raised.
    pub fn midpoint(&self) -> (i64, i64) {
        let x = ((self.x_min + self.x_max) / 2.0).round_ties_even() as i64;
        let y = ((self.y_min + self.y_max) / 2.0).round_ties_even() as i64;
        (x, y)
    }

    /// Integer pixel rectangle clamped to a `width` x `height` frame.
    ///
    /// Returns `None` when nothing of the box lies inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x_min.floor().max(0.0);
        let y1 = self.y_min.floor().max(0.0);
        let x2 = self.x_max.ceil().min(width as f64);
        let y2 = self.y_max.ceil().min(height as f64);
        if !(x2 > x1 && y2 > y1) {
            return None;
        }
        Some((x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
    }
}
