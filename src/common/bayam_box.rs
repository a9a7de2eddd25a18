use serde::{Deserialize, Serialize};

/// Added to the IoU denominator so zero-area boxes never divide by zero.
pub const IOU_EPS: f32 = 1e-6;

/// Axis-aligned box in corner form `(x1, y1, x2, y2)`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct BayamBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BayamBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds a box from center form `(cx, cy, w, h)`.
    pub fn from_cxcy_wh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.,
            y1: cy - h / 2.,
            x2: cx + w / 2.,
            y2: cy + h / 2.,
        }
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Returns the center coordinates and size of the bounding box as `(cx, cy, w, h)`.
    pub fn cxcy_wh(&self) -> (f32, f32, f32, f32) {
        (
            self.x1 + self.width() / 2.,
            self.y1 + self.height() / 2.,
            self.width(),
            self.height(),
        )
    }

    /// Returns the bounding box coordinates as `(x1, y1, x2, y2)`.
    pub fn xy1_xy2(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Computes the area of the bounding box. Inverted boxes have zero area.
    pub fn area(&self) -> f32 {
        self.width().max(0.) * self.height().max(0.)
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &BayamBox) -> f32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        let top = self.y1.max(other.y1);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &BayamBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Computes the intersection over union (IoU) between this bounding box and another.
    pub fn iou(&self, other: &BayamBox) -> f32 {
        self.intersect(other) / (self.union(other) + IOU_EPS)
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Moves the box from letterboxed canvas space back into source image space.
    pub fn unletterbox(&self, scale: f32, pad_x: f32, pad_y: f32) -> Self {
        Self {
            x1: (self.x1 - pad_x) / scale,
            y1: (self.y1 - pad_y) / scale,
            x2: (self.x2 - pad_x) / scale,
            y2: (self.y2 - pad_y) / scale,
        }
    }

    /// Inverse of [`BayamBox::unletterbox`].
    pub fn letterbox(&self, scale: f32, pad_x: f32, pad_y: f32) -> Self {
        Self {
            x1: self.x1 * scale + pad_x,
            y1: self.y1 * scale + pad_y,
            x2: self.x2 * scale + pad_x,
            y2: self.y2 * scale + pad_y,
        }
    }
}
