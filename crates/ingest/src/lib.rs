mod layout;
pub mod page;
pub mod reader;

pub use page::PageText;
pub use reader::PdfReader;

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Generate a stable document ID from file path
pub fn generate_doc_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Read one PDF into its pages.
pub async fn ingest_file(file_path: &Path) -> Result<Vec<PageText>> {
    let path_str = file_path.to_string_lossy().to_string();
    let doc_id = generate_doc_id(&path_str);
    PdfReader::read_file(file_path, &doc_id).await
}

/// Expand the given inputs into the list of PDFs to process: files are kept
/// as given, directories contribute every PDF beneath them. A missing input
/// is an error.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for input in inputs {
        if input.is_dir() {
            documents.extend(PdfReader::find_documents(input)?);
        } else if input.is_file() {
            documents.push(input.clone());
        } else {
            anyhow::bail!("Input not found: {:?}", input);
        }
    }

    Ok(documents)
}
