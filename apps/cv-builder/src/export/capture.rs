//! Raster capture of the rendered preview.

use std::ops::Range;
use std::path::Path;

use image::{imageops, RgbImage};
use tracing::debug;

use crate::export::ExportError;

/// A pixel snapshot of the rendered page. Produced fresh for each export, never cached.
#[derive(Debug, Clone)]
pub struct RasterCapture {
    image: RgbImage,
}

impl RasterCapture {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Copies the full-width band of `rows`.
    pub fn crop_rows(&self, rows: Range<u32>) -> RgbImage {
        let start = rows.start.min(self.height());
        let end = rows.end.clamp(start, self.height());
        imageops::crop_imm(&self.image, 0, start, self.width(), end - start).to_image()
    }
}

/// The capture capability boundary: surface handle in, raster out.
pub trait SurfaceCapture: Send + Sync {
    fn capture(&self, surface: &Path) -> Result<RasterCapture, ExportError>;
}

/// Reads a raster of the preview (PNG or JPEG) that the browser or a headless renderer
/// wrote to disk. The surface handle is that file's path.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileCapture;

impl SurfaceCapture for ImageFileCapture {
    fn capture(&self, surface: &Path) -> Result<RasterCapture, ExportError> {
        if !surface.is_file() {
            return Err(ExportError::CaptureUnavailable(surface.display().to_string()));
        }

        let decoded = image::open(surface).map_err(|e| {
            ExportError::ExportFailed(format!("could not decode {}: {e}", surface.display()))
        })?;
        let image = decoded.to_rgb8();
        debug!(
            "Captured {}x{} raster from {}",
            image.width(),
            image.height(),
            surface.display()
        );

        Ok(RasterCapture::new(image))
    }
}
