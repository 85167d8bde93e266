use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// One recognized text line with the engine's confidence in it (0.0–1.0).
/// No bounding box survives — downstream parsing works from line order and
/// token shape alone.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f32,
}

impl OcrLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// Abstraction over an OCR engine. Implementations accept raw PNG/JPEG image
/// bytes and return recognized lines in reading order.
///
/// Engine construction is expensive (language models load at startup), so a
/// run builds one backend up front and passes it by reference into every
/// component that needs it — there is no global engine handle.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<OcrLine>, OcrError>;
}

/// Drop lines below the confidence floor, keeping the survivors' order.
pub fn filter_confident(lines: Vec<OcrLine>, min_confidence: f32) -> Vec<String> {
    lines
        .into_iter()
        .filter(|l| l.confidence >= min_confidence)
        .map(|l| l.text)
        .collect()
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset lines — lets the reconstruction pipeline be tested without
/// Tesseract installed.
pub struct MockRecognizer {
    pub lines: Vec<OcrLine>,
}

impl MockRecognizer {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| OcrLine::new(*l, 1.0)).collect(),
        }
    }

    pub fn with_confidences(lines: Vec<OcrLine>) -> Self {
        Self { lines }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<OcrLine>, OcrError> {
        Ok(self.lines.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, OcrLine};
    use leptess::LepTess;

    /// Quotation scans mix Japanese labels with Latin part codes, so the
    /// engine always loads both language models.
    pub const QUOTE_LANGS: &str = "jpn+eng";

    // LepTess is neither Send nor Sync, so only the configuration lives in
    // the recognizer and the engine is built per call.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        pub fn for_quotes() -> Self {
            Self::new(None, QUOTE_LANGS)
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<OcrLine>, OcrError> {
            tracing::debug!(lang = %self.lang, "running Tesseract");
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;

            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;

            // leptess exposes one confidence per page, not per line; apply it
            // uniformly so the caller's threshold still has something to cut.
            let confidence = (lt.mean_conf() as f32 / 100.0).clamp(0.0, 1.0);
            Ok(text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| OcrLine::new(l, confidence))
                .collect())
        }
    }
}
