use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Clinical vs. surgical course of the stay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AdmissionType {
    #[serde(rename = "CLINICA")]
    Clinical,
    #[serde(rename = "CIRURGICA")]
    Surgical,
}

/// Elective (scheduled) vs. urgent (emergency) stay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AdmissionCharacter {
    #[serde(rename = "ELETIVO")]
    Elective,
    #[serde(rename = "URGENCIA")]
    Urgent,
}

impl AdmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionType::Clinical => "CLINICA",
            AdmissionType::Surgical => "CIRURGICA",
        }
    }
}

impl AdmissionCharacter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionCharacter::Elective => "ELETIVO",
            AdmissionCharacter::Urgent => "URGENCIA",
        }
    }
}

impl fmt::Display for AdmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AdmissionCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record field: either a value read from the page or the sentinel text
/// that stands in for it. Both render as plain strings in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Value(String),
    Unresolved(String),
}

impl Field {
    pub fn value(text: impl Into<String>) -> Self {
        Field::Value(text.into())
    }

    pub fn unresolved(sentinel: impl Into<String>) -> Self {
        Field::Unresolved(sentinel.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Value(s) | Field::Unresolved(s) => s,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Field::Value(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One diária line: accommodation label plus the raw date token found on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiariaEntry {
    pub accommodation: String,
    pub date: String,
}

/// One output row, assembled from a single page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct ExtractedRecord {
    #[serde(rename = "UF")]
    pub state_code: String,
    #[serde(rename = "TIPO DE INTERNAÇÃO")]
    pub admission_type: AdmissionType,
    #[serde(rename = "CARÁTER")]
    pub admission_character: AdmissionCharacter,
    #[serde(rename = "Beneficiário Atendido")]
    pub beneficiary: Field,
    #[serde(rename = "ACOMODAÇÃO")]
    pub accommodation: String,
    #[serde(rename = "PRESTADOR")]
    pub provider: Field,
    #[serde(rename = "CNPJ")]
    pub provider_tax_id: String,
    #[serde(rename = "DATA DA ADMISSÃO")]
    pub admission_date: Field,
    #[serde(rename = "DATA DA ALTA")]
    pub discharge_date: Field,
    #[serde(rename = "MOTIVO DA INTERNAÇÃO")]
    pub admission_reason: Field,
}

impl ExtractedRecord {
    /// Output column headers, in row order.
    pub const COLUMNS: [&'static str; 10] = [
        "UF",
        "TIPO DE INTERNAÇÃO",
        "CARÁTER",
        "Beneficiário Atendido",
        "ACOMODAÇÃO",
        "PRESTADOR",
        "CNPJ",
        "DATA DA ADMISSÃO",
        "DATA DA ALTA",
        "MOTIVO DA INTERNAÇÃO",
    ];

    pub fn to_row(&self) -> [String; 10] {
        [
            self.state_code.clone(),
            self.admission_type.to_string(),
            self.admission_character.to_string(),
            self.beneficiary.to_string(),
            self.accommodation.clone(),
            self.provider.to_string(),
            self.provider_tax_id.clone(),
            self.admission_date.to_string(),
            self.discharge_date.to_string(),
            self.admission_reason.to_string(),
        ]
    }

    /// Number of fields that fell back to a sentinel.
    pub fn unresolved_count(&self) -> usize {
        [
            &self.beneficiary,
            &self.provider,
            &self.admission_date,
            &self.discharge_date,
            &self.admission_reason,
        ]
        .iter()
        .filter(|f| !f.is_resolved())
        .count()
    }
}
