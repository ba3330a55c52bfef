//! Pagination: slices one tall capture into fixed-height pages.
//!
//! The capture is scaled so its width fills the page width. The scaled image is one
//! continuous strip; page `k` is a `page_height`-tall window onto it starting at
//! `k * page_height`. Each placement also records the capture pixel rows visible in its
//! window, so the writer can crop the slice instead of relying on the page to clip.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported output page sizes, portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    pub fn geometry(&self) -> PageGeometry {
        match self {
            PageFormat::A4 => PageGeometry {
                width_mm: 210.0,
                height_mm: 297.0,
            },
            PageFormat::Letter => PageGeometry {
                width_mm: 215.9,
                height_mm: 279.4,
            },
        }
    }
}

impl std::str::FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            other => Err(format!("unknown page format '{other}' (expected a4 or letter)")),
        }
    }
}

/// Page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// One page's window onto the scaled strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlacement {
    pub page_index: usize,
    /// Distance from the strip origin to the top of this page's window, in mm.
    pub offset_mm: f64,
    /// Where the full strip would sit on this page if placed whole (`-offset_mm`).
    pub strip_y_mm: f64,
    /// Capture rows visible in this window.
    pub source_rows: Range<u32>,
    /// Height of the cropped slice once scaled onto the page, in mm.
    pub slice_height_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationPlan {
    pub page: PageGeometry,
    pub scaled_height_mm: f64,
    pub pages: Vec<PagePlacement>,
}

impl PaginationPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PaginationError {
    #[error("capture has zero size ({width}x{height})")]
    EmptyCapture { width: u32, height: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Core function
// ────────────────────────────────────────────────────────────────────────────

/// Plans the pages for a `width` × `height` pixel capture on `page`.
///
/// Scaled height `Sh = page.width * height / width`. Page 1 always exists; a further page
/// is added while the height not yet covered stays above zero, giving `ceil(Sh / Ph)` pages.
pub fn paginate(
    width: u32,
    height: u32,
    page: PageGeometry,
) -> Result<PaginationPlan, PaginationError> {
    if width == 0 || height == 0 {
        return Err(PaginationError::EmptyCapture { width, height });
    }

    let mm_per_px = page.width_mm / width as f64;
    let scaled_height_mm = height as f64 * mm_per_px;

    let mut pages = vec![place(0, 0.0, height, page, mm_per_px)];
    let mut height_left = scaled_height_mm - page.height_mm;
    let mut offset = 0.0;

    while height_left > 0.0 {
        offset += page.height_mm;
        pages.push(place(pages.len(), offset, height, page, mm_per_px));
        height_left -= page.height_mm;
    }

    Ok(PaginationPlan {
        page,
        scaled_height_mm,
        pages,
    })
}

fn place(
    page_index: usize,
    offset_mm: f64,
    capture_height: u32,
    page: PageGeometry,
    mm_per_px: f64,
) -> PagePlacement {
    // Edges round to the nearest pixel row. An overflow under half a row still earns its page
    // (page count is ceil(Sh / Ph)) but gets an empty row range, so that page is left blank.
    let row_at = |mm: f64| ((mm / mm_per_px).round() as u32).min(capture_height);
    let start = row_at(offset_mm);
    let end = row_at(offset_mm + page.height_mm).max(start);

    PagePlacement {
        page_index,
        offset_mm,
        strip_y_mm: -offset_mm,
        source_rows: start..end,
        slice_height_mm: (end - start) as f64 * mm_per_px,
    }
}

/// Characters that cannot appear in a file name on at least one supported platform.
const RESERVED_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Output file name: whitespace, path separators and other reserved characters in `name`
/// become `_`; an empty name falls back to `CV`. The result is always a single path
/// component.
pub fn export_filename(name: &str) -> String {
    let base: String = name
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || RESERVED_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    if base.is_empty() {
        "CV.pdf".to_string()
    } else {
        format!("{base}.pdf")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_short_capture_is_one_page() {
        let plan = paginate(1000, 1000, A4).unwrap();
        assert!(approx(plan.scaled_height_mm, 210.0));
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.pages[0].offset_mm, 0.0);
        assert_eq!(plan.pages[0].source_rows, 0..1000);
    }

    #[test]
    fn test_tall_capture_spans_three_pages() {
        let plan = paginate(1000, 4000, A4).unwrap();
        assert!(approx(plan.scaled_height_mm, 840.0));
        assert_eq!(plan.page_count(), 3);

        let offsets: Vec<f64> = plan.pages.iter().map(|p| p.offset_mm).collect();
        assert!(approx(offsets[0], 0.0));
        assert!(approx(offsets[1], 297.0));
        assert!(approx(offsets[2], 594.0));
        assert!(approx(plan.pages[2].strip_y_mm, -594.0));
    }

    #[test]
    fn test_exact_multiple_does_not_add_blank_page() {
        // 1 mm per px keeps the arithmetic exact.
        let page = PageGeometry {
            width_mm: 100.0,
            height_mm: 200.0,
        };
        let plan = paginate(100, 400, page).unwrap();
        assert!(approx(plan.scaled_height_mm, 400.0));
        assert_eq!(plan.page_count(), 2);
    }

    #[test]
    fn test_exactly_one_page_height() {
        let page = PageGeometry {
            width_mm: 100.0,
            height_mm: 200.0,
        };
        assert_eq!(paginate(100, 200, page).unwrap().page_count(), 1);
        assert_eq!(paginate(100, 201, page).unwrap().page_count(), 2);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for height in [1u32, 500, 1414, 1415, 3000, 9999] {
            let plan = paginate(1000, height, A4).unwrap();
            let expected = (plan.scaled_height_mm / A4.height_mm).ceil().max(1.0) as usize;
            assert_eq!(plan.page_count(), expected, "height {height}");
        }
    }

    #[test]
    fn test_sub_pixel_overflow_gives_blank_last_page() {
        // 1416 px at 210/1001 mm/px is 297.06 mm: just over one A4 page.
        let plan = paginate(1001, 1416, A4).unwrap();
        assert_eq!(plan.page_count(), 2);
        assert_eq!(plan.pages[0].source_rows, 0..1416);
        assert!(plan.pages[1].source_rows.is_empty());
        assert_eq!(plan.pages[1].slice_height_mm, 0.0);
    }

    #[test]
    fn test_source_rows_tile_the_capture() {
        let plan = paginate(1000, 4000, A4).unwrap();
        let mut next = 0;
        for placement in &plan.pages {
            assert_eq!(placement.source_rows.start, next, "gap before page");
            next = placement.source_rows.end;
        }
        assert_eq!(next, 4000);

        // 297 mm at 0.21 mm/px ≈ 1414 rows per full page.
        assert_eq!(plan.pages[0].source_rows, 0..1414);
        assert!(plan.pages[2].slice_height_mm < A4.height_mm);
    }

    #[test]
    fn test_zero_size_capture_is_rejected() {
        assert_eq!(
            paginate(0, 100, A4),
            Err(PaginationError::EmptyCapture {
                width: 0,
                height: 100
            })
        );
        assert!(paginate(100, 0, A4).is_err());
    }

    #[test]
    fn test_filename_from_name() {
        assert_eq!(export_filename("Jane Doe"), "Jane_Doe.pdf");
        assert_eq!(export_filename("Mary Ann  Lee"), "Mary_Ann__Lee.pdf");
        assert_eq!(export_filename(""), "CV.pdf");
    }

    #[test]
    fn test_filename_never_leaves_export_dir() {
        assert_eq!(export_filename("AC/DC"), "AC_DC.pdf");
        assert_eq!(export_filename("/tmp/escaped"), "_tmp_escaped.pdf");
        assert_eq!(export_filename(r"C:\Users\x"), "C__Users_x.pdf");
        assert_eq!(export_filename("a<b>?*|\"c"), "a_b_____c.pdf");

        let dir = std::path::Path::new("exports");
        for name in ["AC/DC", "/tmp/escaped", "../up", ".."] {
            let path = dir.join(export_filename(name));
            assert_eq!(path.parent(), Some(dir), "{name}");
        }
    }

    #[test]
    fn test_page_format_parse() {
        assert_eq!("A4".parse::<PageFormat>(), Ok(PageFormat::A4));
        assert_eq!("letter".parse::<PageFormat>(), Ok(PageFormat::Letter));
        assert!("legal".parse::<PageFormat>().is_err());
    }
}
