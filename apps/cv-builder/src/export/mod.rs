// Export: capture → paginate → assemble → save.
// Capture decoding and PDF assembly are CPU-bound; callers run `export_to_file`
// inside tokio::task::spawn_blocking.

pub mod capture;
pub mod handlers;
pub mod pagination;
pub mod pdf;

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use capture::{ImageFileCapture, RasterCapture, SurfaceCapture};
pub use pagination::{export_filename, paginate, PageFormat, PaginationPlan};
pub use pdf::{DocumentWriter, PdfWriter, PlacedArea};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: no rendered preview at {0}")]
    CaptureUnavailable(String),

    #[error("Failed to create PDF: {0}")]
    ExportFailed(String),

    #[error("An export is already in progress")]
    InProgress,
}

/// Places each page's slice of `capture` into `writer`, following `plan`.
///
/// Slices are cropped explicitly and drawn at the top of their page; nothing relies on the
/// page boundary to clip an oversized image.
pub fn assemble<W: DocumentWriter>(
    capture: &RasterCapture,
    plan: &PaginationPlan,
    writer: &mut W,
) -> Result<(), ExportError> {
    for placement in &plan.pages {
        if placement.page_index > 0 {
            writer.new_page();
        }
        let slice = capture.crop_rows(placement.source_rows.clone());
        writer.add_image(
            &slice,
            PlacedArea {
                x_mm: 0.0,
                y_mm: 0.0,
                width_mm: plan.page.width_mm,
                height_mm: placement.slice_height_mm,
            },
        )?;
    }
    Ok(())
}

/// Full blocking pipeline. Returns the number of pages written.
pub fn export_to_file(
    capturer: &dyn SurfaceCapture,
    surface: &Path,
    format: PageFormat,
    output: &Path,
) -> Result<usize, ExportError> {
    let capture = capturer.capture(surface)?;
    let plan = paginate(capture.width(), capture.height(), format.geometry())
        .map_err(|e| ExportError::ExportFailed(e.to_string()))?;

    info!(
        "Paginating {}x{} capture into {} page(s) ({:.1} mm tall)",
        capture.width(),
        capture.height(),
        plan.page_count(),
        plan.scaled_height_mm
    );

    let mut writer = PdfWriter::new(plan.page);
    assemble(&capture, &plan, &mut writer)?;
    writer.save(output)?;
    Ok(plan.page_count())
}
