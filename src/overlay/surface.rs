//! Drawing targets for the keypoint overlay
//!
//! [`DisplaySurface`] is the minimal 2D API the renderer needs. Two
//! implementations ship with the crate: an RGBA raster buffer and a
//! recorder of draw operations that can be replayed on a web canvas.

use image::{Rgba, RgbaImage};
use serde::{Serialize, Serializer};

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS hex form, e.g. `#ff0000`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 0xff])
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// 2D drawing target sized to match the camera frame
pub trait DisplaySurface: Send {
    /// Current width and height in pixels
    fn size(&self) -> (u32, u32);

    /// Resize the surface; like a canvas, this discards its contents
    fn resize(&mut self, width: u32, height: u32);

    /// Clear a rectangular region
    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Fill a circle centered at (x, y)
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color);

    /// Outline a circle centered at (x, y)
    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, color: Color, line_width: f64);

    /// Called once a full redraw has been issued
    fn present(&mut self) {}
}

/// A single recorded drawing operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Resize {
        width: u32,
        height: u32,
    },
    Clear {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    FillCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },
    StrokeCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        #[serde(rename = "lineWidth")]
        line_width: f64,
    },
}

type Presenter = Box<dyn FnMut(&[DrawOp]) + Send>;

/// Surface that records draw operations and hands them to a presenter
///
/// Operations accumulate until [`DisplaySurface::present`], which passes the
/// batch to the presenter (if any) and starts a new one.
pub struct CommandSurface {
    width: u32,
    height: u32,
    pending: Vec<DrawOp>,
    presenter: Option<Presenter>,
    frames_presented: u64,
}

impl Default for CommandSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSurface {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            pending: Vec::new(),
            presenter: None,
            frames_presented: 0,
        }
    }

    pub fn with_presenter<F>(presenter: F) -> Self
    where
        F: FnMut(&[DrawOp]) + Send + 'static,
    {
        Self {
            presenter: Some(Box::new(presenter)),
            ..Self::new()
        }
    }

    /// Operations issued since the last present
    pub fn pending(&self) -> &[DrawOp] {
        &self.pending
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl DisplaySurface for CommandSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pending.push(DrawOp::Resize { width, height });
    }

    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.pending.push(DrawOp::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
        self.pending.push(DrawOp::FillCircle {
            x,
            y,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, color: Color, line_width: f64) {
        self.pending.push(DrawOp::StrokeCircle {
            x,
            y,
            radius,
            color,
            line_width,
        });
    }

    fn present(&mut self) {
        let batch = std::mem::take(&mut self.pending);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter(&batch);
        }
        self.frames_presented += 1;
    }
}

/// Surface backed by an RGBA pixel buffer
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.image.width() && y < self.image.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    fn paint_ring(&mut self, cx: f64, cy: f64, inner: f64, outer: f64, color: Color) {
        let rgba = color.to_rgba();
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);
        let min_x = ((cx - outer).floor() as i64).max(0);
        let max_x = ((cx + outer).ceil() as i64).min(width - 1);
        let min_y = ((cy - outer).floor() as i64).max(0);
        let max_y = ((cy + outer).ceil() as i64).min(height - 1);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance >= inner && distance <= outer {
                    self.image.put_pixel(px as u32, py as u32, rgba);
                }
            }
        }
    }
}

impl DisplaySurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (surface_w, surface_h) = self.image.dimensions();
        let x0 = x.max(0.0).floor() as u32;
        let y0 = y.max(0.0).floor() as u32;
        let x1 = ((x + width).ceil().max(0.0) as u32).min(surface_w);
        let y1 = ((y + height).ceil().max(0.0) as u32).min(surface_h);

        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
        self.paint_ring(x, y, 0.0, radius, color);
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, color: Color, line_width: f64) {
        let half = line_width / 2.0;
        self.paint_ring(x, y, (radius - half).max(0.0), radius + half, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const RED: Color = Color::rgb(0xff, 0, 0);
    const BLACK: Color = Color::rgb(0, 0, 0);

    #[test]
    fn test_color_hex() {
        assert_eq!(RED.to_hex(), "#ff0000");
        assert_eq!(serde_json::to_string(&BLACK).unwrap(), "\"#000000\"");
    }

    #[test]
    fn test_draw_op_serialization() {
        let op = DrawOp::StrokeCircle {
            x: 1.0,
            y: 2.0,
            radius: 5.0,
            color: BLACK,
            line_width: 2.0,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "strokeCircle");
        assert_eq!(json["lineWidth"], 2.0);
        assert_eq!(json["color"], "#000000");
    }

    #[test]
    fn test_command_surface_presents_batches() {
        let batches = Arc::new(Mutex::new(Vec::new()));
        let sink = batches.clone();
        let mut surface = CommandSurface::with_presenter(move |ops| sink.lock().push(ops.to_vec()));

        surface.resize(640, 480);
        surface.clear(0.0, 0.0, 640.0, 480.0);
        surface.fill_circle(10.0, 10.0, 5.0, RED);
        surface.present();

        assert!(surface.pending().is_empty());
        assert_eq!(surface.size(), (640, 480));
        assert_eq!(surface.frames_presented(), 1);

        let batches = batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[0][0], DrawOp::Resize { width: 640, height: 480 });
    }

    #[test]
    fn test_raster_fill_and_stroke() {
        let mut surface = RasterSurface::new(40, 40);
        surface.fill_circle(20.0, 20.0, 5.0, RED);
        surface.stroke_circle(20.0, 20.0, 5.0, BLACK, 2.0);

        // Center keeps the fill, the rim gets the outline, far pixels stay empty
        assert_eq!(surface.pixel(20, 20), Some([0xff, 0, 0, 0xff]));
        assert_eq!(surface.pixel(24, 19), Some([0, 0, 0, 0xff]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_raster_clips_at_edges() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_circle(0.0, 0.0, 5.0, RED);
        surface.fill_circle(-50.0, -50.0, 5.0, RED);
        assert_eq!(surface.pixel(0, 0), Some([0xff, 0, 0, 0xff]));
        assert_eq!(surface.pixel(9, 9), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_raster_clear_and_resize() {
        let mut surface = RasterSurface::new(10, 10);
        surface.fill_circle(5.0, 5.0, 3.0, RED);
        surface.clear(0.0, 0.0, 10.0, 10.0);
        assert!(surface.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));

        surface.fill_circle(5.0, 5.0, 3.0, RED);
        surface.resize(20, 15);
        assert_eq!(surface.size(), (20, 15));
        assert!(surface.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
