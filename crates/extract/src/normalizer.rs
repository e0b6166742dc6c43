use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use crate::schema::Field;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,!?;:'\-/()]").expect("valid punctuation pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Maps whatever the report prints after `Executora` onto the single
/// provider this deployment serves.
#[derive(Debug, Clone)]
pub struct ProviderNormalizer {
    canonical: String,
    canonical_key: String,
}

impl ProviderNormalizer {
    pub fn new(canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        let canonical_key = Self::fold(&canonical);
        Self {
            canonical,
            canonical_key,
        }
    }

    /// Fold case, accents, punctuation and whitespace so scan variants of
    /// the same name compare equal.
    pub fn fold(name: &str) -> String {
        let upper: String = name.to_uppercase().chars().map(strip_accent).collect();
        let cleaned = PUNCTUATION.replace_all(&upper, " ");
        WHITESPACE.replace_all(cleaned.trim(), " ").to_string()
    }

    /// Canonical name, annotated with the raw text when it is a different
    /// spelling. A missing or empty raw value yields the bare canonical name.
    pub fn normalize(&self, raw: Option<&str>) -> Field {
        let raw = match raw.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return Field::unresolved(self.canonical.clone()),
        };

        let key = Self::fold(raw);
        if key == self.canonical_key {
            return Field::value(self.canonical.clone());
        }

        if !Self::are_similar(&key, &self.canonical_key) {
            warn!(
                provider = raw,
                canonical = %self.canonical,
                "Provider does not resemble the canonical name"
            );
        }
        Field::value(format!("{} ({})", self.canonical, raw))
    }

    /// Containment or a high share of common words.
    fn are_similar(a: &str, b: &str) -> bool {
        if a.contains(b) || b.contains(a) {
            return true;
        }

        let words_a: Vec<&str> = a.split_whitespace().collect();
        let words_b: Vec<&str> = b.split_whitespace().collect();
        if words_a.is_empty() || words_b.is_empty() {
            return false;
        }

        let common = words_a.iter().filter(|w| words_b.contains(w)).count();
        let total = words_a.len().max(words_b.len());
        common as f64 / total as f64 >= 0.5
    }
}

fn strip_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ç' => 'C',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ProviderNormalizer {
        ProviderNormalizer::new("UNIMED FLORIANOPOLIS")
    }

    #[test]
    fn test_fold() {
        assert_eq!(
            ProviderNormalizer::fold("  Unimed   Florianópolis. "),
            "UNIMED FLORIANOPOLIS"
        );
        assert_eq!(ProviderNormalizer::fold("UNIMED-FLORIANÓPOLIS"), "UNIMED FLORIANOPOLIS");
    }

    #[test]
    fn test_exact_name_is_not_annotated() {
        let field = normalizer().normalize(Some("UNIMED FLORIANOPOLIS"));
        assert_eq!(field, Field::value("UNIMED FLORIANOPOLIS"));
    }

    #[test]
    fn test_spelling_variant_is_canonical() {
        let field = normalizer().normalize(Some("Unimed Florianópolis"));
        assert_eq!(field.as_str(), "UNIMED FLORIANOPOLIS");
    }

    #[test]
    fn test_different_text_is_annotated() {
        let field = normalizer().normalize(Some("UNIMED FLORIANOPOLIS COOP. TRAB. MEDICO"));
        assert_eq!(
            field.as_str(),
            "UNIMED FLORIANOPOLIS (UNIMED FLORIANOPOLIS COOP. TRAB. MEDICO)"
        );
        assert!(field.is_resolved());
    }

    #[test]
    fn test_missing_provider_defaults() {
        let n = normalizer();
        for raw in [None, Some(""), Some("   ")] {
            let field = n.normalize(raw);
            assert_eq!(field.as_str(), "UNIMED FLORIANOPOLIS");
            assert!(!field.is_resolved());
        }
    }

    #[test]
    fn test_similarity() {
        assert!(ProviderNormalizer::are_similar("UNIMED FLORIANOPOLIS HOSPITAL", "UNIMED FLORIANOPOLIS"));
        assert!(ProviderNormalizer::are_similar("UNIMED FPOLIS", "UNIMED FLORIANOPOLIS"));
        assert!(!ProviderNormalizer::are_similar("HOSPITAL CELSO RAMOS", "UNIMED FLORIANOPOLIS"));
    }
}
