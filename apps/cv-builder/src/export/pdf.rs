//! PDF assembly with `lopdf`. One image XObject per placed slice.

use std::path::Path;

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::export::pagination::PageGeometry;
use crate::export::ExportError;

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Rectangle on a page, in mm, measured from the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedArea {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// The document assembly capability. A writer starts with one empty page.
pub trait DocumentWriter {
    fn add_image(&mut self, image: &RgbImage, area: PlacedArea) -> Result<(), ExportError>;
    fn new_page(&mut self);
    fn save(self, path: &Path) -> Result<(), ExportError>;
}

#[derive(Default)]
struct PendingPage {
    images: Vec<(ObjectId, PlacedArea)>,
}

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page: PageGeometry,
    pages: Vec<PendingPage>,
}

impl PdfWriter {
    pub fn new(page: PageGeometry) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page,
            pages: vec![PendingPage::default()],
        }
    }

    fn page_content(&self, page: &PendingPage) -> Result<(Vec<u8>, Dictionary), ExportError> {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();

        for (n, (image_id, area)) in page.images.iter().enumerate() {
            let name = format!("Im{n}");
            let width = area.width_mm * PT_PER_MM;
            let height = area.height_mm * PT_PER_MM;
            let x = area.x_mm * PT_PER_MM;
            // PDF origin is bottom-left.
            let y = (self.page.height_mm - area.y_mm - area.height_mm) * PT_PER_MM;

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    (width as f32).into(),
                    0f32.into(),
                    0f32.into(),
                    (height as f32).into(),
                    (x as f32).into(),
                    (y as f32).into(),
                ],
            ));
            operations.push(Operation::new(
                "Do",
                vec![Object::Name(name.as_bytes().to_vec())],
            ));
            operations.push(Operation::new("Q", vec![]));
            xobjects.set(name.as_bytes().to_vec(), *image_id);
        }

        let encoded = Content { operations }
            .encode()
            .map_err(|e| ExportError::ExportFailed(format!("encoding page content: {e}")))?;
        Ok((encoded, dictionary! { "XObject" => xobjects }))
    }
}

impl DocumentWriter for PdfWriter {
    fn add_image(&mut self, image: &RgbImage, area: PlacedArea) -> Result<(), ExportError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.as_raw().clone(),
        );
        let image_id = self.doc.add_object(stream);
        if let Some(page) = self.pages.last_mut() {
            page.images.push((image_id, area));
        }
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages.push(PendingPage::default());
    }

    fn save(mut self, path: &Path) -> Result<(), ExportError> {
        let media_box = vec![
            0f32.into(),
            0f32.into(),
            ((self.page.width_mm * PT_PER_MM) as f32).into(),
            ((self.page.height_mm * PT_PER_MM) as f32).into(),
        ];

        let pending = std::mem::take(&mut self.pages);
        let mut kids: Vec<Object> = Vec::with_capacity(pending.len());
        for page in &pending {
            let (content, resources) = self.page_content(page)?;
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
                "Resources" => resources,
                "MediaBox" => media_box.clone(),
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        self.doc
            .save(path)
            .map_err(|e| ExportError::ExportFailed(format!("writing {}: {e}", path.display())))?;
        Ok(())
    }
}
