//! Anchor-relative date lookup.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}/\d{2}/\d{2,4})\b").expect("valid date pattern"));

/// Parses `DD/MM/YY` or `DD/MM/YYYY`; the year width picks the format.
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let format = match token.len() {
        10 => "%d/%m/%Y",
        8 => "%d/%m/%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(token, format).ok()
}

/// Re-emits a date in the uniform two-digit-year form.
pub fn format_short(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// True when the whole token looks like a date, parseable or not.
pub fn looks_like_date(token: &str) -> bool {
    DATE_PATTERN
        .find(token)
        .is_some_and(|m| m.start() == 0)
}

/// Every date-shaped substring of `text`, in order.
pub fn date_candidates(text: &str) -> impl Iterator<Item = &str> {
    DATE_PATTERN.find_iter(text).map(|m| m.as_str())
}

fn first_valid_date(text: &str) -> Option<NaiveDate> {
    date_candidates(text).find_map(parse_date)
}

/// Finds the date belonging to a textual anchor such as `Atendimento`.
#[derive(Debug, Clone)]
pub struct DateLocator {
    window_chars: usize,
    fallback_lines: usize,
}

impl DateLocator {
    pub fn new(window_chars: usize, fallback_lines: usize) -> Self {
        Self {
            window_chars,
            fallback_lines,
        }
    }

    /// Returns the first valid date after `anchor`, as `DD/MM/YY`.
    ///
    /// The text right after the anchor is searched first; when that window
    /// has no valid date, the anchor's line and the following lines are
    /// scanned instead. `None` if the anchor is absent or no date is found.
    pub fn locate(&self, text: &str, anchor: &str) -> Option<String> {
        let start = text.find(anchor)?;

        let window_end = text[start..]
            .char_indices()
            .nth(self.window_chars)
            .map(|(offset, _)| start + offset)
            .unwrap_or(text.len());

        // A date only has to start inside the window.
        DATE_PATTERN
            .find_iter(&text[start..])
            .take_while(|m| start + m.start() < window_end)
            .find_map(|m| parse_date(m.as_str()))
            .or_else(|| self.scan_lines(text, anchor))
            .map(format_short)
    }

    fn scan_lines(&self, text: &str, anchor: &str) -> Option<NaiveDate> {
        let lines: Vec<&str> = text.lines().collect();
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(anchor))
            .find_map(|(i, _)| {
                lines[i..]
                    .iter()
                    .take(self.fallback_lines)
                    .find_map(|line| first_valid_date(line))
            })
    }
}

impl Default for DateLocator {
    fn default() -> Self {
        Self::new(100, 5)
    }
}
