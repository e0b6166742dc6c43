use crate::dates::{date_candidates, looks_like_date};
use crate::schema::DiariaEntry;

pub const DIARIA_MARKER: &str = "DIÁRIA DE";

/// Collects one entry per `DIÁRIA DE` line, in page order.
///
/// The accommodation label is rebuilt from the words after the marker,
/// leaving out date-shaped words. Lines with fewer than three words or no
/// date are skipped.
pub fn parse_diarias(text: &str) -> Vec<DiariaEntry> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<DiariaEntry> {
    let marker_at = line.find(DIARIA_MARKER)?;
    if line.split_whitespace().count() < 3 {
        return None;
    }

    let date = date_candidates(line).next()?.to_string();
    let accommodation = line[marker_at + DIARIA_MARKER.len()..]
        .split_whitespace()
        .filter(|token| !looks_like_date(token))
        .collect::<Vec<_>>()
        .join(" ");

    Some(DiariaEntry {
        accommodation,
        date,
    })
}
