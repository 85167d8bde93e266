use lopdf::Document;

use crate::PdfError;

/// Minimum non-whitespace characters for a page's text layer to count as
/// real content. Below this the page is likely a scan with at best a stray
/// header, and OCR sees more than the text layer does.
pub const MIN_TEXT_CHARS: usize = 50;

/// Whether extracted text is too thin to trust.
pub fn is_sparse(text: &str) -> bool {
    text.chars().filter(|c| !c.is_whitespace()).count() < MIN_TEXT_CHARS
}

/// Per-page text-layer extraction, page order preserved.
pub fn page_layout_texts(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfError::Extract(e.to_string()))
}

/// Per-page structural check: a page whose resources carry XObject images
/// but no fonts is almost certainly a scan. Returned in page order.
pub fn image_only_pages(bytes: &[u8]) -> Result<Vec<bool>, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    let pages = doc.get_pages();

    let mut flags = Vec::with_capacity(pages.len());
    for object_id in pages.values() {
        let Some(page_dict) = doc
            .get_object(*object_id)
            .ok()
            .and_then(|o| o.as_dict().ok())
        else {
            flags.push(false);
            continue;
        };
        let has_fonts = resources_nonempty(&doc, page_dict, b"Font");
        let has_images = resources_nonempty(&doc, page_dict, b"XObject");
        flags.push(has_images && !has_fonts);
    }
    Ok(flags)
}

/// Number of pages, from the document tree.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len())
}

fn resources_nonempty(doc: &Document, page_dict: &lopdf::Dictionary, key: &[u8]) -> bool {
    page_dict
        .get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .and_then(|res| res.get(key).ok())
        .and_then(|v| doc.dereference(v).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|entries| !entries.is_empty())
}
