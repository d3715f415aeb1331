//! Per-session drawing surface.
//!
//! # Responsibilities
//! - Load a canvas from the PNG template
//! - Draw antialiased line segments between pointer positions
//! - Draw a small filled disc for click marks
//! - Encode the canvas to an in-memory PNG
//!
//! # Design Decisions
//! - Backed by an RGBA `image` buffer; the draw color is allocated once at
//!   canvas creation and never changes
//! - Antialiasing uses Xiaolin Wu coverage blending
//! - Out-of-bounds pixels are silently clipped, never an error

use std::io::Cursor;
use std::mem;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

/// Diameter of the disc drawn for a click event, in pixels.
pub const CLICK_MARK_DIAMETER: i32 = 5;

/// Canvas failures. Template problems are tolerated by the caller (the event
/// is still recorded); encode problems surface as the generic image-fetch
/// error.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("canvas image operation failed: {0}")]
    Image(#[from] image::ImageError),
}

/// One session's drawable surface plus its allocated draw color.
pub struct Canvas {
    img: RgbaImage,
    color: Rgba<u8>,
}

impl Canvas {
    /// Load a canvas from the template PNG and allocate the draw color.
    pub fn from_template(path: &Path) -> Result<Self, CanvasError> {
        let img = image::open(path)?.to_rgba8();
        Ok(Self::from_image(img))
    }

    fn from_image(img: RgbaImage) -> Self {
        Self {
            img,
            color: Rgba([0, 0, 0, 255]),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Draw an antialiased line segment using Xiaolin Wu coverage blending.
    pub fn draw_line_aa(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let (mut x0, mut y0) = (x0 as f64, y0 as f64);
        let (mut x1, mut y1) = (x1 as f64, y1 as f64);

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            mem::swap(&mut x0, &mut y0);
            mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            mem::swap(&mut x0, &mut x1);
            mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let gradient = if dx == 0.0 { 1.0 } else { (y1 - y0) / dx };

        // First endpoint.
        let xend = x0.round();
        let yend = y0 + gradient * (xend - x0);
        let xgap = 1.0 - (x0 + 0.5).fract();
        let xpxl1 = xend as i64;
        let ypxl1 = yend.floor() as i64;
        self.plot(steep, xpxl1, ypxl1, (1.0 - yend.fract()) * xgap);
        self.plot(steep, xpxl1, ypxl1 + 1, yend.fract() * xgap);
        let mut intery = yend + gradient;

        // Second endpoint.
        let xend = x1.round();
        let yend = y1 + gradient * (xend - x1);
        let xgap = (x1 + 0.5).fract();
        let xpxl2 = xend as i64;
        let ypxl2 = yend.floor() as i64;
        self.plot(steep, xpxl2, ypxl2, (1.0 - yend.fract()) * xgap);
        self.plot(steep, xpxl2, ypxl2 + 1, yend.fract() * xgap);

        for x in (xpxl1 + 1)..xpxl2 {
            self.plot(steep, x, intery.floor() as i64, 1.0 - intery.fract());
            self.plot(steep, x, intery.floor() as i64 + 1, intery.fract());
            intery += gradient;
        }
    }

    /// Draw a filled disc of the given diameter centered at (cx, cy).
    pub fn fill_disc(&mut self, cx: i32, cy: i32, diameter: i32) {
        let radius = diameter as f64 / 2.0;
        let reach = diameter / 2 + 1;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if ((dx * dx + dy * dy) as f64) <= radius * radius {
                    self.plot(false, (cx + dx) as i64, (cy + dy) as i64, 1.0);
                }
            }
        }
    }

    /// Encode the current canvas to an in-memory PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, CanvasError> {
        let mut buf = Vec::new();
        self.img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Blend the draw color into one pixel at the given coverage, clipping
    /// silently when the pixel is outside the canvas. `steep` transposes the
    /// coordinates, matching the Wu algorithm's axis swap.
    fn plot(&mut self, steep: bool, x: i64, y: i64, coverage: f64) {
        let (px, py) = if steep { (y, x) } else { (x, y) };
        if px < 0 || py < 0 || px >= self.img.width() as i64 || py >= self.img.height() as i64 {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0) as f32;
        if alpha == 0.0 {
            return;
        }
        let dst = self.img.get_pixel_mut(px as u32, py as u32);
        for channel in 0..3 {
            let blended =
                dst.0[channel] as f32 * (1.0 - alpha) + self.color.0[channel] as f32 * alpha;
            dst.0[channel] = blended.round() as u8;
        }
        dst.0[3] = 255;
    }
}
