use pdfium_render::prelude::*;

use crate::PdfError;

/// Rendering resolution for OCR. PDF points are 72/inch, so a page renders
/// at `dpi / 72` times its nominal size.
pub const RASTER_DPI: f32 = 300.0;

/// Renders PDF pages to preprocessed PNG images for the OCR engine.
/// Binding to the pdfium library happens once, at construction.
pub struct PageRasterizer {
    pdfium: Pdfium,
    dpi: f32,
}

impl PageRasterizer {
    pub fn new() -> Result<Self, PdfError> {
        Self::with_dpi(RASTER_DPI)
    }

    pub fn with_dpi(dpi: f32) -> Result<Self, PdfError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::Render(format!("failed to bind pdfium: {e}")))?;
        Ok(Self { pdfium: Pdfium::new(bindings), dpi })
    }

    /// Render the requested page indices (0-based). A page that fails to
    /// render is logged and omitted — it contributes no text, the document
    /// keeps going.
    pub fn render_pages(
        &self,
        bytes: &[u8],
        wanted: &[usize],
    ) -> Result<Vec<(usize, Vec<u8>)>, PdfError> {
        let doc = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfError::Parse(e.to_string()))?;
        let pages = doc.pages();

        let mut rendered = Vec::with_capacity(wanted.len());
        for &index in wanted {
            match self.render_one(&pages, index) {
                Ok(png) => rendered.push((index, png)),
                Err(e) => {
                    tracing::warn!(page = index + 1, error = %e, "page render failed — skipping");
                }
            }
        }
        Ok(rendered)
    }

    fn render_one(&self, pages: &PdfPages<'_>, index: usize) -> Result<Vec<u8>, PdfError> {
        let page = pages
            .get(index as u16)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        let scale = self.dpi / 72.0;
        let width = (page.width().value * scale) as i32;
        let height = (page.height().value * scale) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| PdfError::Render(e.to_string()))?;

        Ok(mitsumori_ocr::prepare_image(bitmap.as_image())?)
    }
}
