pub mod preprocess;
pub mod recognizer;

pub use preprocess::{prepare_bytes, prepare_image, PreprocessError};
pub use recognizer::{filter_confident, MockRecognizer, OcrBackend, OcrError, OcrLine};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
