//! Turns one page of report text into one [`ExtractedRecord`].
//!
//! Each field is resolved by an ordered list of strategies; the first one
//! that produces a value wins and an exhausted list leaves the field's
//! sentinel in place. Nothing here fails: a page either has text and yields
//! a record, or has none and yields nothing.

use crate::anchors::{first_line_after, line_after, line_after_ignore_case};
use crate::cid::{CidMapping, correct_cid};
use crate::classifier::AdmissionClassifier;
use crate::config::{DeploymentProfile, ExtractorConfig};
use crate::dates::DateLocator;
use crate::diaria::parse_diarias;
use crate::normalizer::ProviderNormalizer;
use crate::schema::{ExtractedRecord, Field};
use tracing::debug;

pub const BENEFICIARY_NOT_FOUND: &str = "Beneficiário não encontrado";
pub const REASON_NOT_INFORMED: &str = "MOTIVO NÃO INFORMADO";
pub const ADMISSION_DATE_NOT_FOUND: &str = "Data de admissão não encontrada";
pub const DISCHARGE_DATE_NOT_FOUND: &str = "Data de alta não encontrada";
pub const CID_NOT_FOUND: &str = "CID NÃO ENCONTRADO";

pub const BENEFICIARY_ANCHOR: &str = "Beneficiário(a)";
pub const PROVIDER_ANCHOR: &str = "Executora";
pub const DIAGNOSIS_ANCHORS: &[&str] = &["CID Principal", "Principal"];
pub const ADMISSION_DATE_ANCHOR: &str = "Atendimento";
pub const DISCHARGE_DATE_ANCHOR: &str = "Alta";

/// Labels that may precede a free-text admission reason when no diagnosis
/// code is printed. Longer labels come first so they win over prefixes.
pub const REASON_ANCHORS: &[&str] = &[
    "DIAGNÓSTICO PRINCIPAL",
    "DIAGNÓSTICO",
    "MOTIVO DA INTERNAÇÃO",
    "MOTIVO INTERNAÇÃO",
    "CAUSA",
];

const MIN_REASON_CHARS: usize = 6;

type ReasonStrategy = fn(&RecordAssembler, &str, &CidMapping) -> Option<Field>;

pub struct RecordAssembler {
    profile: DeploymentProfile,
    dates: DateLocator,
    classifier: AdmissionClassifier,
    providers: ProviderNormalizer,
}

impl RecordAssembler {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            dates: DateLocator::new(config.date_window_chars, config.date_fallback_lines),
            classifier: AdmissionClassifier::new(config.urgency_policy),
            providers: ProviderNormalizer::new(config.profile.provider_name.clone()),
        }
    }

    /// Builds the record for one page, or `None` if the page has no text.
    pub fn assemble(&self, text: &str, cids: &CidMapping) -> Option<ExtractedRecord> {
        if text.trim().is_empty() {
            return None;
        }

        let diarias = parse_diarias(text);
        let (admission_type, admission_character) = self.classifier.classify(&diarias, text);

        let record = ExtractedRecord {
            state_code: self.profile.state_code.clone(),
            admission_type,
            admission_character,
            beneficiary: self.beneficiary(text),
            accommodation: self.profile.accommodation.clone(),
            provider: self.providers.normalize(line_after(text, PROVIDER_ANCHOR)),
            provider_tax_id: self.profile.provider_tax_id.clone(),
            admission_date: self.date(text, ADMISSION_DATE_ANCHOR, ADMISSION_DATE_NOT_FOUND),
            discharge_date: self.date(text, DISCHARGE_DATE_ANCHOR, DISCHARGE_DATE_NOT_FOUND),
            admission_reason: self.reason(text, cids),
        };

        debug!(
            diarias = diarias.len(),
            unresolved = record.unresolved_count(),
            "Assembled record"
        );
        Some(record)
    }

    fn beneficiary(&self, text: &str) -> Field {
        let Some(rest) = line_after(text, BENEFICIARY_ANCHOR) else {
            debug!("Beneficiary anchor not found");
            return Field::unresolved(BENEFICIARY_NOT_FOUND);
        };

        let mut tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens
            .first()
            .is_some_and(|t| t.chars().any(|c| c.is_ascii_digit()))
        {
            tokens.remove(0);
        }

        if tokens.is_empty() {
            Field::unresolved(BENEFICIARY_NOT_FOUND)
        } else {
            Field::value(tokens.join(" "))
        }
    }

    fn date(&self, text: &str, anchor: &str, sentinel: &str) -> Field {
        match self.dates.locate(text, anchor) {
            Some(date) => Field::value(date),
            None => {
                debug!(anchor, "Date not found");
                Field::unresolved(sentinel)
            }
        }
    }

    fn reason(&self, text: &str, cids: &CidMapping) -> Field {
        const STRATEGIES: &[ReasonStrategy] = &[
            RecordAssembler::reason_from_cid,
            RecordAssembler::reason_from_keywords,
        ];

        STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, text, cids))
            .unwrap_or_else(|| Field::unresolved(REASON_NOT_INFORMED))
    }

    fn reason_from_cid(&self, text: &str, cids: &CidMapping) -> Option<Field> {
        let (anchor, rest) = first_line_after(text, DIAGNOSIS_ANCHORS)?;
        let raw = rest.split_whitespace().next()?.replace('.', "").to_uppercase();

        let corrected = correct_cid(&raw);
        match cids.describe(&corrected.code) {
            Some(description) => Some(Field::value(description)),
            None => {
                debug!(anchor, code = %corrected.code, "CID not in mapping");
                let mut sentinel = format!("{CID_NOT_FOUND}: {}", corrected.code);
                if corrected.was_corrected() {
                    sentinel.push_str(&format!(" ({})", corrected.note));
                }
                Some(Field::unresolved(sentinel))
            }
        }
    }

    fn reason_from_keywords(&self, text: &str, _cids: &CidMapping) -> Option<Field> {
        REASON_ANCHORS.iter().find_map(|anchor| {
            let rest = line_after_ignore_case(text, anchor)?
                .trim_start_matches([':', '-'])
                .trim();
            let qualifies = rest.chars().count() >= MIN_REASON_CHARS
                && !rest.starts_with("Data")
                && !rest.chars().all(|c| c.is_ascii_digit());
            qualifies.then(|| Field::value(rest))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AdmissionCharacter, AdmissionType};

    fn cids() -> CidMapping {
        CidMapping::from_pairs([
            ("I200", "Angina instável"),
            ("J189", "Pneumonia não especificada"),
        ])
    }

    fn assembler() -> RecordAssembler {
        RecordAssembler::new(&ExtractorConfig::default())
    }

    #[test]
    fn test_end_to_end_page() {
        let page = "RELATÓRIO DE INTERNAÇÃO\n\
                    Beneficiário(a) 12345 JOÃO SILVA\n\
                    Executora UNIMED FLORIANOPOLIS\n\
                    Principal 1200\n\
                    Atendimento 01/02/24\n\
                    Alta 05/02/24\n";
        let record = assembler().assemble(page, &cids()).unwrap();

        assert_eq!(record.beneficiary, Field::value("JOÃO SILVA"));
        assert_eq!(record.provider, Field::value("UNIMED FLORIANOPOLIS"));
        assert_eq!(record.admission_reason, Field::value("Angina instável"));
        assert_eq!(record.admission_date, Field::value("01/02/24"));
        assert_eq!(record.discharge_date, Field::value("05/02/24"));
        assert_eq!(record.admission_character, AdmissionCharacter::Elective);
        assert_eq!(record.admission_type, AdmissionType::Clinical);
        assert_eq!(record.state_code, "SC");
        assert_eq!(record.accommodation, "APARTAMENTO");
        assert_eq!(record.provider_tax_id, "77.658.611/0001-08");
        assert_eq!(record.unresolved_count(), 0);
    }

    #[test]
    fn test_every_field_has_a_sentinel() {
        let record = assembler().assemble("página sem campos", &cids()).unwrap();
        assert_eq!(record.beneficiary.as_str(), BENEFICIARY_NOT_FOUND);
        assert_eq!(record.provider.as_str(), "UNIMED FLORIANOPOLIS");
        assert_eq!(record.admission_date.as_str(), ADMISSION_DATE_NOT_FOUND);
        assert_eq!(record.discharge_date.as_str(), DISCHARGE_DATE_NOT_FOUND);
        assert_eq!(record.admission_reason.as_str(), REASON_NOT_INFORMED);
        assert_eq!(record.unresolved_count(), 5);
        assert!(record.to_row().iter().all(|cell| !cell.is_empty()));
    }

    #[test]
    fn test_blank_page_yields_no_record() {
        assert!(assembler().assemble("  \n \n", &cids()).is_none());
        assert!(assembler().assemble("", &cids()).is_none());
    }

    #[test]
    fn test_unknown_cid_keeps_correction_note() {
        let record = assembler()
            .assemble("CID Principal 9999\n", &cids())
            .unwrap();
        assert_eq!(
            record.admission_reason,
            Field::unresolved("CID NÃO ENCONTRADO: I999 (CID: 9999 → I999)")
        );

        let record = assembler().assemble("CID Principal Z000\n", &cids()).unwrap();
        assert_eq!(record.admission_reason.as_str(), "CID NÃO ENCONTRADO: Z000");
    }

    #[test]
    fn test_dotted_cid_is_compacted() {
        let record = assembler()
            .assemble("CID Principal J18.9 PNEUMONIA\n", &cids())
            .unwrap();
        assert_eq!(record.admission_reason.as_str(), "Pneumonia não especificada");
    }

    #[test]
    fn test_reason_from_keywords_when_no_cid() {
        let page = "Motivo da internação: dor torácica há 2 dias\nData 01/02/24\n";
        let record = assembler().assemble(page, &cids()).unwrap();
        assert_eq!(record.admission_reason, Field::value("dor torácica há 2 dias"));
    }

    #[test]
    fn test_keyword_reason_rejects_short_numeric_and_dates() {
        for page in ["CAUSA 123456789\n", "DIAGNÓSTICO Data 01/02/24\n", "CAUSA dor\n"] {
            let record = assembler().assemble(page, &cids()).unwrap();
            assert_eq!(record.admission_reason.as_str(), REASON_NOT_INFORMED, "{page}");
        }
    }

    #[test]
    fn test_empty_cid_anchor_falls_back_to_keywords() {
        let page = "CID Principal\nDIAGNÓSTICO PRINCIPAL Insuficiência cardíaca\n";
        let record = assembler().assemble(page, &cids()).unwrap();
        assert_eq!(record.admission_reason.as_str(), "Insuficiência cardíaca");
    }

    #[test]
    fn test_beneficiary_without_identifier() {
        let record = assembler()
            .assemble("Beneficiário(a) MARIA DA SILVA\n", &cids())
            .unwrap();
        assert_eq!(record.beneficiary.as_str(), "MARIA DA SILVA");

        let record = assembler().assemble("Beneficiário(a) 0099\n", &cids()).unwrap();
        assert_eq!(record.beneficiary.as_str(), BENEFICIARY_NOT_FOUND);
    }

    #[test]
    fn test_urgent_surgical_stay() {
        let page = "Beneficiário(a) 1 ANA\n\
                    DIÁRIA DE UTI ADULTO GERAL 01/02/24\n\
                    DIÁRIA DE APARTAMENTO 03/02/24\n\
                    TAXA DE SALA CIRÚRGICA 1\n";
        let record = assembler().assemble(page, &cids()).unwrap();
        assert_eq!(record.admission_character, AdmissionCharacter::Urgent);
        assert_eq!(record.admission_type, AdmissionType::Surgical);
    }
}
