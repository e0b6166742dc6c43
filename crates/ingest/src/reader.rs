use anyhow::{Context, Result};
use lopdf::Document;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::layout;
use crate::page::PageText;

pub struct PdfReader;

impl PdfReader {
    /// Read a PDF from disk and split it into per-page text.
    pub async fn read_file(path: &Path, doc_id: &str) -> Result<Vec<PageText>> {
        let bytes = fs::read(path)
            .await
            .context(format!("Failed to read file: {:?}", path))?;
        let source = path.to_string_lossy().to_string();
        Self::read_bytes(&bytes, doc_id, &source)
            .context(format!("Failed to parse PDF: {:?}", path))
    }

    /// Per-page text of an in-memory PDF, in page order. A page whose text
    /// cannot be extracted is returned blank so callers can skip it.
    pub fn read_bytes(bytes: &[u8], doc_id: &str, source: &str) -> Result<Vec<PageText>> {
        let doc = Document::load_mem(bytes)?;
        if doc.is_encrypted() {
            anyhow::bail!("Encrypted PDF is not supported: {}", source);
        }

        let pages = doc
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                let text = layout::page_text(&doc, page_id).unwrap_or_else(|e| {
                    warn!(source, page = page_number, error = %e, "Page text extraction failed");
                    String::new()
                });
                PageText::new(doc_id.to_string(), source.to_string(), page_number, text)
            })
            .collect::<Vec<_>>();

        debug!(
            source,
            pages = pages.len(),
            blank = pages.iter().filter(|p| p.is_blank()).count(),
            "Read PDF"
        );
        Ok(pages)
    }

    /// All `.pdf` files under `dir` (recursively), sorted by path.
    pub fn find_documents(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.context(format!("Failed to walk directory: {:?}", dir))?;
            let path = entry.path();
            if entry.file_type().is_file() && is_pdf(path) {
                documents.push(path.to_path_buf());
            }
        }

        documents.sort();
        Ok(documents)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
