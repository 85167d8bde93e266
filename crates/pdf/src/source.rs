use std::path::Path;

use mitsumori_core::{PageText, TextOrigin};
use mitsumori_ocr::OcrBackend;

use crate::text::{image_only_pages, is_sparse, page_layout_texts};
use crate::PdfError;

/// The text source adapter for PDFs: text layer first, OCR fallback for
/// pages that read as scans.
///
/// The OCR backend is owned by the caller and shared across every file in
/// the batch — constructing one per document would reload the language
/// models each time.
pub struct PdfSource<'a> {
    pub ocr: Option<&'a dyn OcrBackend>,
    pub min_confidence: f32,
}

impl<'a> PdfSource<'a> {
    pub fn new(ocr: Option<&'a dyn OcrBackend>, min_confidence: f32) -> Self {
        Self { ocr, min_confidence }
    }

    pub fn page_texts(&self, path: &Path) -> Result<Vec<PageText>, PdfError> {
        let bytes = std::fs::read(path)?;
        self.page_texts_from_bytes(&bytes)
    }

    pub fn page_texts_from_bytes(&self, bytes: &[u8]) -> Result<Vec<PageText>, PdfError> {
        // 1. Structural pass — also validates that the document parses at
        //    all; an unparseable file is the caller's cue to skip it.
        let image_only = image_only_pages(bytes)?;

        // 2. Text layer, page by page. Extraction failing on a structurally
        //    valid document means a scan: every page falls through to OCR.
        let layout = match page_layout_texts(bytes) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(error = %e, "text layer unreadable — treating all pages as scanned");
                vec![String::new(); image_only.len()]
            }
        };

        let (mut pages, scanned) = partition_pages(&layout, &image_only);

        // 3. OCR fallback for the scanned remainder.
        if !scanned.is_empty() {
            tracing::info!(pages = scanned.len(), "pages need OCR");
            pages.extend(self.ocr_pages(bytes, &scanned)?);
            pages.sort_by_key(|p| p.page);
        }
        Ok(pages)
    }

    #[cfg(feature = "raster")]
    fn ocr_pages(&self, bytes: &[u8], wanted: &[usize]) -> Result<Vec<PageText>, PdfError> {
        let Some(ocr) = self.ocr else {
            tracing::info!(pages = wanted.len(), "no OCR backend configured — scanned pages skipped");
            return Ok(Vec::new());
        };

        let rasterizer = crate::raster::PageRasterizer::new()?;
        let mut out = Vec::new();
        for (page, png) in rasterizer.render_pages(bytes, wanted)? {
            match ocr.recognize(&png) {
                Ok(lines) => {
                    let lines = mitsumori_ocr::filter_confident(lines, self.min_confidence);
                    tracing::info!(page = page + 1, lines = lines.len(), "page recognized via OCR");
                    out.push(PageText { page, origin: TextOrigin::Ocr, lines });
                }
                Err(e) => {
                    tracing::warn!(page = page + 1, error = %e, "OCR failed — page contributes no text");
                }
            }
        }
        Ok(out)
    }

    #[cfg(not(feature = "raster"))]
    fn ocr_pages(&self, _bytes: &[u8], wanted: &[usize]) -> Result<Vec<PageText>, PdfError> {
        if self.ocr.is_some() {
            tracing::info!(
                pages = wanted.len(),
                "scanned pages skipped — built without the `raster` feature"
            );
        }
        Ok(Vec::new())
    }
}

/// Split pages into text-layer results and indices needing OCR. A page goes
/// to OCR when its text layer is sparse or it is structurally image-only.
fn partition_pages(layout: &[String], image_only: &[bool]) -> (Vec<PageText>, Vec<usize>) {
    let total = layout.len().max(image_only.len());
    let mut pages = Vec::new();
    let mut scanned = Vec::new();

    for i in 0..total {
        let text = layout.get(i).map(String::as_str).unwrap_or("");
        let structural_scan = image_only.get(i).copied().unwrap_or(false);
        if is_sparse(text) || structural_scan {
            scanned.push(i);
        } else {
            pages.push(PageText {
                page: i,
                origin: TextOrigin::Layout,
                lines: text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect(),
            });
        }
    }
    (pages, scanned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page() -> String {
        "図番 品名 数量 単位 単価 金額\nTEM2521 カバー 2 個 1,500 3,000\n".repeat(3)
    }

    #[test]
    fn text_pages_keep_layout_origin_and_order() {
        let layout = vec![full_page(), full_page()];
        let (pages, scanned) = partition_pages(&layout, &[false, false]);
        assert_eq!(pages.len(), 2);
        assert!(scanned.is_empty());
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[0].origin, TextOrigin::Layout);
        assert!(!pages[0].lines.is_empty());
    }

    #[test]
    fn sparse_pages_go_to_ocr() {
        let layout = vec![full_page(), "御中".to_string()];
        let (pages, scanned) = partition_pages(&layout, &[false, false]);
        assert_eq!(pages.len(), 1);
        assert_eq!(scanned, vec![1]);
    }

    #[test]
    fn image_only_page_goes_to_ocr_despite_text() {
        // A page can carry boilerplate text in the layer over a scanned body.
        let layout = vec![full_page()];
        let (pages, scanned) = partition_pages(&layout, &[true]);
        assert!(pages.is_empty());
        assert_eq!(scanned, vec![0]);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let source = PdfSource::new(None, 0.3);
        assert!(matches!(
            source.page_texts_from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
