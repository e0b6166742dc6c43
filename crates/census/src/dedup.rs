use extract::ExtractedRecord;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Drops records whose every field matches one already seen in the batch.
/// The first occurrence is kept and batch order is preserved.
#[derive(Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the record had not been seen before.
    pub fn insert(&mut self, record: &ExtractedRecord) -> bool {
        self.seen.insert(Self::fingerprint(record))
    }

    /// Keeps the first occurrence of each record; returns the kept records
    /// and how many were dropped.
    pub fn dedup(&mut self, records: Vec<ExtractedRecord>) -> (Vec<ExtractedRecord>, usize) {
        let before = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| self.insert(r)).collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    pub fn fingerprint(record: &ExtractedRecord) -> String {
        let mut hasher = Sha256::new();
        for cell in record.to_row() {
            hasher.update(cell.as_bytes());
            hasher.update([0x1f]);
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{CidMapping, Extractor, ExtractorConfig, Field};

    fn record(page: &str) -> ExtractedRecord {
        Extractor::new(&ExtractorConfig::default(), CidMapping::default())
            .extract_page(page)
            .unwrap()
    }

    #[test]
    fn test_identical_records_collapse() {
        let a = record("Beneficiário(a) 1 ANA\nAlta 05/02/24\n");
        let b = record("Beneficiário(a) 1 ANA\nAlta 05/02/24\n");
        let c = record("Beneficiário(a) 2 BIA\nAlta 05/02/24\n");

        let mut dedup = Deduplicator::new();
        let (kept, dropped) = dedup.dedup(vec![a.clone(), c.clone(), b]);
        assert!(!dedup.insert(&c));
        assert_eq!(kept, vec![a, c]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_fingerprint_separates_cells() {
        let mut a = record("Beneficiário(a) 1 ANA\n");
        let mut b = a.clone();
        a.beneficiary = Field::value("ANA X");
        a.accommodation = String::new();
        b.beneficiary = Field::value("ANA");
        b.accommodation = " X".to_string();
        assert_ne!(Deduplicator::fingerprint(&a), Deduplicator::fingerprint(&b));
    }
}
