pub mod anchors;
pub mod assembler;
pub mod cid;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod diaria;
pub mod error;
pub mod normalizer;
pub mod schema;

pub use assembler::RecordAssembler;
pub use cid::{CidCorrection, CidMapping, correct_cid};
pub use classifier::AdmissionClassifier;
pub use config::{DeploymentProfile, ExtractorConfig, UrgencyPolicy};
pub use dates::DateLocator;
pub use error::CidTableError;
pub use normalizer::ProviderNormalizer;
pub use schema::{AdmissionCharacter, AdmissionType, DiariaEntry, ExtractedRecord, Field};

/// Page-text → record engine, holding the run's reference data.
pub struct Extractor {
    assembler: RecordAssembler,
    cids: CidMapping,
}

impl Extractor {
    pub fn new(config: &ExtractorConfig, cids: CidMapping) -> Self {
        Self {
            assembler: RecordAssembler::new(config),
            cids,
        }
    }

    /// Extract the record for one page; `None` for a page without text.
    pub fn extract_page(&self, text: &str) -> Option<ExtractedRecord> {
        self.assembler.assemble(text, &self.cids)
    }

    pub fn cid_mapping(&self) -> &CidMapping {
        &self.cids
    }
}
