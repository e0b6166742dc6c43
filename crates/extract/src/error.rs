use std::path::PathBuf;

/// Failures loading the CID reference table. These abort a run; nothing
/// else in this crate returns an error.
#[derive(Debug, thiserror::Error)]
pub enum CidTableError {
    #[error("failed to open CID table {path}: {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read CID table: {0}")]
    Read(#[from] csv::Error),
    #[error("CID table has no `{0}` column")]
    MissingColumn(String),
    #[error("CID table contains no entries")]
    Empty,
}
