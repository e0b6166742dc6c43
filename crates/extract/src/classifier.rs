//! Rule-based admission classification.
//!
//! Character defaults to elective and type to clinical; only positive
//! evidence on the page moves either one.

use crate::config::UrgencyPolicy;
use crate::dates::parse_date;
use crate::schema::{AdmissionCharacter, AdmissionType, DiariaEntry};
use chrono::NaiveDate;
use tracing::debug;

pub const URGENCY_KEYWORDS: &[&str] = &["URGENTE", "EMERGÊNCIA"];

pub const SURGICAL_KEYWORDS: &[&str] = &[
    "CATETERISMO",
    "CIRURGIA",
    "RESSECÇÃO",
    "TAXA DE SALA CIRÚRGICA",
    "CIRURGICO",
    "CIRÚRGICO",
    "OPERAÇÃO",
    "PROCEDIMENTO CIRÚRGICO",
];

#[derive(Debug, Clone)]
pub struct AdmissionClassifier {
    policy: UrgencyPolicy,
}

struct DatedDiaria<'a> {
    accommodation: &'a str,
    date: NaiveDate,
}

impl DatedDiaria<'_> {
    fn is_icu(&self) -> bool {
        self.accommodation.to_uppercase().contains("UTI")
    }
}

impl AdmissionClassifier {
    pub fn new(policy: UrgencyPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(
        &self,
        diarias: &[DiariaEntry],
        text: &str,
    ) -> (AdmissionType, AdmissionCharacter) {
        let upper = text.to_uppercase();
        (
            self.admission_type(&upper),
            self.admission_character(diarias, &upper),
        )
    }

    fn admission_type(&self, upper_text: &str) -> AdmissionType {
        match SURGICAL_KEYWORDS.iter().find(|k| upper_text.contains(**k)) {
            Some(keyword) => {
                debug!(keyword, "Surgical keyword found");
                AdmissionType::Surgical
            }
            None => AdmissionType::Clinical,
        }
    }

    fn admission_character(&self, diarias: &[DiariaEntry], upper_text: &str) -> AdmissionCharacter {
        if let Some(keyword) = URGENCY_KEYWORDS.iter().find(|k| upper_text.contains(**k)) {
            debug!(keyword, "Urgency keyword found");
            return AdmissionCharacter::Urgent;
        }

        let dated: Vec<DatedDiaria> = diarias
            .iter()
            .filter_map(|d| {
                parse_date(&d.date).map(|date| DatedDiaria {
                    accommodation: &d.accommodation,
                    date,
                })
            })
            .collect();

        let urgent = match self.policy {
            UrgencyPolicy::UtiPresence => dated.iter().any(|d| d.is_icu()),
            UrgencyPolicy::UtiBeforeWard => {
                let first_icu = dated.iter().filter(|d| d.is_icu()).map(|d| d.date).min();
                let first_ward = dated.iter().filter(|d| !d.is_icu()).map(|d| d.date).min();
                match (first_icu, first_ward) {
                    (Some(icu), Some(ward)) => icu < ward,
                    (Some(_), None) => true,
                    _ => false,
                }
            }
        };

        if urgent {
            AdmissionCharacter::Urgent
        } else {
            AdmissionCharacter::Elective
        }
    }
}

impl Default for AdmissionClassifier {
    fn default() -> Self {
        Self::new(UrgencyPolicy::UtiPresence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diaria::parse_diarias;

    const POLICIES: [UrgencyPolicy; 2] = [UrgencyPolicy::UtiPresence, UrgencyPolicy::UtiBeforeWard];

    #[test]
    fn test_defaults_without_signals() {
        for policy in POLICIES {
            let classifier = AdmissionClassifier::new(policy);
            assert_eq!(
                classifier.classify(&[], "RELATÓRIO DE INTERNAÇÃO\nSem intercorrências"),
                (AdmissionType::Clinical, AdmissionCharacter::Elective)
            );
        }
    }

    #[test]
    fn test_icu_before_ward_is_urgent() {
        let text = "DIÁRIA DE UTI ADULTO 01/02/24\nDIÁRIA DE APARTAMENTO 03/02/24\n";
        let diarias = parse_diarias(text);
        for policy in POLICIES {
            let (_, character) = AdmissionClassifier::new(policy).classify(&diarias, text);
            assert_eq!(character, AdmissionCharacter::Urgent);
        }
    }

    #[test]
    fn test_ward_only_is_elective() {
        let text = "DIÁRIA DE APARTAMENTO 03/02/24\n";
        let diarias = parse_diarias(text);
        for policy in POLICIES {
            let (_, character) = AdmissionClassifier::new(policy).classify(&diarias, text);
            assert_eq!(character, AdmissionCharacter::Elective);
        }
    }

    #[test]
    fn test_policies_disagree_when_ward_comes_first() {
        let text = "DIÁRIA DE APARTAMENTO 01/02/24\nDIÁRIA DE UTI ADULTO 03/02/24\n";
        let diarias = parse_diarias(text);
        let presence = AdmissionClassifier::new(UrgencyPolicy::UtiPresence);
        let ordered = AdmissionClassifier::new(UrgencyPolicy::UtiBeforeWard);
        assert_eq!(presence.classify(&diarias, text).1, AdmissionCharacter::Urgent);
        assert_eq!(ordered.classify(&diarias, text).1, AdmissionCharacter::Elective);
    }

    #[test]
    fn test_unparseable_icu_date_ignored() {
        let diarias = vec![DiariaEntry {
            accommodation: "UTI NEONATAL".to_string(),
            date: "45/13/24".to_string(),
        }];
        let (_, character) = AdmissionClassifier::default().classify(&diarias, "");
        assert_eq!(character, AdmissionCharacter::Elective);
    }

    #[test]
    fn test_urgency_keyword_case_insensitive() {
        let (_, character) =
            AdmissionClassifier::default().classify(&[], "Atendimento de emergência");
        assert_eq!(character, AdmissionCharacter::Urgent);
    }

    #[test]
    fn test_surgical_keywords() {
        let classifier = AdmissionClassifier::default();
        for text in ["Taxa de sala cirúrgica", "CATETERISMO CARDÍACO", "procedimento cirurgico"] {
            assert_eq!(classifier.classify(&[], text).0, AdmissionType::Surgical, "{text}");
        }
    }
}
