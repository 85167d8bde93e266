use thiserror::Error;

pub mod source;
pub mod text;

#[cfg(feature = "raster")]
pub mod raster;

pub use source::PdfSource;
pub use text::{image_only_pages, is_sparse, page_count, page_layout_texts, MIN_TEXT_CHARS};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
    #[error("Text extraction failed: {0}")]
    Extract(String),
    #[error("Page render failed: {0}")]
    Render(String),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] mitsumori_ocr::PreprocessError),
}
