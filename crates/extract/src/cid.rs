//! Diagnosis-code (CID) reference table and code correction.

use crate::error::CidTableError;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CODE_COLUMN: &str = "SUBCAT";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "DESCRICAO";

/// Immutable code → description lookup, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct CidMapping {
    entries: HashMap<String, String>,
}

/// Result of running a raw code through [`correct_cid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidCorrection {
    pub code: String,
    /// Empty when the code was left untouched.
    pub note: String,
}

impl CidCorrection {
    pub fn was_corrected(&self) -> bool {
        !self.note.is_empty()
    }
}

/// Repairs the common scan artifact where the leading `I` of a
/// cardiovascular code is read as a digit (`1200` → `I200`).
pub fn correct_cid(raw: &str) -> CidCorrection {
    let mut chars = raw.chars();
    let first = chars.next();
    let is_four_chars = raw.chars().count() == 4;

    match first {
        Some(c) if is_four_chars && c.is_ascii_digit() => {
            let code = format!("I{}", chars.as_str());
            let note = format!("CID: {raw} → {code}");
            CidCorrection { code, note }
        }
        _ => CidCorrection {
            code: raw.to_string(),
            note: String::new(),
        },
    }
}

impl CidMapping {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the semicolon-delimited, Latin-1 encoded reference table.
    pub fn load(
        path: &Path,
        code_column: &str,
        description_column: &str,
    ) -> Result<Self, CidTableError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_path(path)
            .map_err(|source| CidTableError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let mapping = Self::from_csv(reader, code_column, description_column)?;
        info!(
            table = %path.display(),
            entries = mapping.len(),
            "Loaded CID table"
        );
        Ok(mapping)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        code_column: &str,
        description_column: &str,
    ) -> Result<Self, CidTableError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);
        Self::from_csv(reader, code_column, description_column)
    }

    fn from_csv<R: Read>(
        mut reader: csv::Reader<R>,
        code_column: &str,
        description_column: &str,
    ) -> Result<Self, CidTableError> {
        let headers: Vec<String> = reader.byte_headers()?.iter().map(decode_latin1).collect();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| CidTableError::MissingColumn(name.to_string()))
        };
        let code_idx = column(code_column)?;
        let desc_idx = column(description_column)?;

        let mut entries = HashMap::new();
        for record in reader.byte_records() {
            let record = record?;
            let (Some(code), Some(desc)) = (record.get(code_idx), record.get(desc_idx)) else {
                continue;
            };
            let code = decode_latin1(code).trim().to_string();
            if code.is_empty() {
                continue;
            }
            entries.insert(code, decode_latin1(desc).trim().to_string());
        }

        if entries.is_empty() {
            return Err(CidTableError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn describe(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
