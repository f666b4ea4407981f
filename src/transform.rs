//! Coordinate conversion between screen space and original-image pixels.
//!
//! The image origin is drawn at `pan` and scaled by `zoom`, so
//! `screen = orig * zoom + pan` and `orig = (screen - pan) / zoom`.

/// Convert a screen (canvas) point to original-image pixel coordinates.
pub fn to_original(screen_x: f64, screen_y: f64, pan: (f64, f64), zoom: f64) -> (f64, f64) {
    ((screen_x - pan.0) / zoom, (screen_y - pan.1) / zoom)
}

/// Convert an original-image pixel to its position on the zoomed canvas.
///
/// The result is relative to the image origin; add the pan offset to get
/// window coordinates (see [`Transform::image_to_screen`]).
pub fn to_screen(orig_x: f64, orig_y: f64, zoom: f64) -> (f64, f64) {
    (orig_x * zoom, orig_y * zoom)
}

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Transform {
    /// Create a new transform with the given zoom and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Pan offset as a tuple.
    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    /// Original-image pixel under a screen point.
    pub fn screen_to_image(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        to_original(screen_x, screen_y, self.pan(), self.zoom)
    }

    /// Screen position of an original-image pixel.
    pub fn image_to_screen(&self, img_x: f64, img_y: f64) -> (f64, f64) {
        let (cx, cy) = to_screen(img_x, img_y, self.zoom);
        (cx + self.pan_x, cy + self.pan_y)
    }

    /// Change zoom while keeping the image point under `cursor` at `anchor`.
    ///
    /// 1. Find the image-space point under the cursor
    /// 2. Scale it to the new zoom level
    /// 3. Choose the pan that puts it at `anchor`
    ///
    /// With `anchor == cursor` the point does not move on screen.
    pub fn zoom_about(&self, new_zoom: f64, cursor: (f64, f64), anchor: (f64, f64)) -> Transform {
        let (img_x, img_y) = self.screen_to_image(cursor.0, cursor.1);
        let (canvas_x, canvas_y) = to_screen(img_x, img_y, new_zoom);

        Transform {
            zoom: new_zoom,
            pan_x: anchor.0 - canvas_x,
            pan_y: anchor.1 - canvas_y,
        }
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Transform {
        Transform {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
