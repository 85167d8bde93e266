use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

// An A4 page rasterized at 300 DPI is ~2480×3508 px; anything beyond that
// adds OCR time without adding legibility.
const MAX_DIMENSION: u32 = 3600;

/// Normalize a rendered page image and return PNG bytes ready for OCR.
pub fn prepare_image(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    encode_png(normalize(img))
}

/// Decode raw image bytes (PNG / JPEG / …), normalize, re-encode as PNG.
pub fn prepare_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    prepare_image(img)
}

/// Grayscale + full-range contrast stretch. Faded thermal prints and pale
/// scan backgrounds otherwise sit in a narrow band the recognizer reads
/// poorly.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let gray: GrayImage = img.to_luma8();

    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px == min_px {
        // Uniform page (blank scan) — nothing to stretch.
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
