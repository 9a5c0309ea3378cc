//! PDF text ingestion.
//!
//! Reads the text layer of every page, in page order, and concatenates it
//! into a single trimmed string. Scanned/image-only pages yield no text; there
//! is no OCR fallback.

use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Extract the full text of the PDF at `path`.
pub fn extract(path: &Path) -> Result<String, IngestError> {
    let pages = extract_pages(path)?;
    Ok(join_pages(&pages))
}

/// Per-page text in page order. Fails on the first page that cannot be decoded.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }

    let unreadable = |reason: String| IngestError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    let doc = Document::load(path).map_err(|e| unreadable(e.to_string()))?;
    // BTreeMap keyed by 1-based page number, so iteration is page order.
    let pages = doc.get_pages();
    debug!("ingest {} pages={}", path.display(), pages.len());

    let mut out = Vec::with_capacity(pages.len());
    for &page_no in pages.keys() {
        let text = doc
            .extract_text(&[page_no])
            .map_err(|e| unreadable(format!("page {page_no}: {e}")))?;
        out.push(text);
    }
    Ok(out)
}

pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for p in pages {
        text.push_str(p.as_ref());
    }
    text.trim().to_string()
}
