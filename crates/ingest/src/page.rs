use serde::{Deserialize, Serialize};

/// Extracted text of one page of one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub doc_id: String,
    pub source: String,
    /// 1-based page number within the document.
    pub page_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(doc_id: String, source: String, page_number: u32, text: String) -> Self {
        Self {
            doc_id,
            source,
            page_number,
            text,
        }
    }

    /// True when the page carries no extractable text at all.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
