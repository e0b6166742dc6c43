//! Anchor lookups over raw page text.
//!
//! Every field on the report sits to the right of a fixed label. These
//! helpers return the text that follows a label on the same line, or `None`
//! when the label is absent.

use regex::RegexBuilder;

/// Rest of the line after the first occurrence of `anchor`, trimmed.
pub fn line_after<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    let start = text.find(anchor)? + anchor.len();
    Some(rest_of_line(&text[start..]))
}

/// Like [`line_after`], but the label is matched case-insensitively.
pub fn line_after_ignore_case<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    let re = RegexBuilder::new(&regex::escape(anchor))
        .case_insensitive(true)
        .build()
        .ok()?;
    let m = re.find(text)?;
    Some(rest_of_line(&text[m.end()..]))
}

/// Tries each anchor in order and returns the first non-empty remainder,
/// together with the anchor that produced it.
pub fn first_line_after<'a, 'b>(
    text: &'a str,
    anchors: &[&'b str],
) -> Option<(&'b str, &'a str)> {
    anchors.iter().find_map(|&anchor| {
        line_after(text, anchor)
            .filter(|rest| !rest.is_empty())
            .map(|rest| (anchor, rest))
    })
}

fn rest_of_line(text: &str) -> &str {
    let end = text.find('\n').unwrap_or(text.len());
    text[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "GUIA DE INTERNAÇÃO\nBeneficiário(a) 0042 ANA LIMA\nExecutora   UNIMED FLORIANOPOLIS  \nCID Principal\n";

    #[test]
    fn test_line_after_stops_at_newline() {
        assert_eq!(line_after(PAGE, "Beneficiário(a)"), Some("0042 ANA LIMA"));
        assert_eq!(line_after(PAGE, "Executora"), Some("UNIMED FLORIANOPOLIS"));
    }

    #[test]
    fn test_missing_anchor() {
        assert_eq!(line_after(PAGE, "Alta"), None);
    }

    #[test]
    fn test_anchor_at_end_of_line_gives_empty() {
        assert_eq!(line_after(PAGE, "CID Principal"), Some(""));
    }

    #[test]
    fn test_ignore_case() {
        let text = "Diagnóstico: pneumonia comunitária\n";
        assert_eq!(
            line_after_ignore_case(text, "DIAGNÓSTICO"),
            Some(": pneumonia comunitária")
        );
    }

    #[test]
    fn test_first_line_after_tries_anchors_in_order() {
        let anchors = ["CID Principal", "Principal"];
        assert_eq!(
            first_line_after("CID Principal I200\n", &anchors),
            Some(("CID Principal", "I200"))
        );
        assert_eq!(
            first_line_after("Diag. Principal J189\n", &anchors),
            Some(("Principal", "J189"))
        );
        assert_eq!(first_line_after("CID Principal\n", &anchors), None);
    }
}
