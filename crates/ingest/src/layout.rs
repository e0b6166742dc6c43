//! Page text with line breaks rebuilt from the text-positioning operators.
//!
//! lopdf's `extract_text` only breaks lines at `ET`, so reports that place
//! every line with `Td` inside one text object come out as a single line.
//! Here a vertical move (`Td`/`TD` with a y offset, `T*`, `'`, `"`, or a
//! `Tm` on a new baseline) also starts a new line.

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Kerning adjustments wider than this (in thousandths of an em) read as a space.
const WORD_GAP: f32 = 100.0;

pub fn page_text(doc: &Document, page_id: ObjectId) -> Result<String> {
    let encodings = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(doc).map(|e| (name, e)))
        .collect::<Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut text = String::new();
    let mut encoding = None;
    let mut baseline: Option<f32> = None;

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => {
                let dy = operands.get(1).and_then(|o| o.as_float().ok());
                if dy.is_some_and(|dy| dy != 0.0) {
                    break_line(&mut text);
                }
            }
            "Tm" => {
                let y = operands.get(5).and_then(|o| o.as_float().ok());
                if baseline.is_some() && y != baseline {
                    break_line(&mut text);
                }
                baseline = y;
            }
            "T*" | "ET" => break_line(&mut text),
            "'" => {
                break_line(&mut text);
                show(&mut text, encoding, operands.first())?;
            }
            "\"" => {
                break_line(&mut text);
                show(&mut text, encoding, operands.get(2))?;
            }
            "Tj" | "TJ" => {
                for operand in operands {
                    show(&mut text, encoding, Some(operand))?;
                }
            }
            _ => {}
        }
    }

    Ok(text)
}

fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn show(text: &mut String, encoding: Option<&Encoding>, operand: Option<&Object>) -> Result<()> {
    let (Some(encoding), Some(operand)) = (encoding, operand) else {
        debug!("Text shown without a decodable font, skipped");
        return Ok(());
    };

    match operand {
        Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)?),
        Object::Array(items) => {
            for item in items {
                show(text, Some(encoding), Some(item))?;
            }
        }
        Object::Integer(_) | Object::Real(_) => {
            if operand.as_float().is_ok_and(|gap| gap < -WORD_GAP) && !text.ends_with(' ') {
                text.push(' ');
            }
        }
        _ => {}
    }
    Ok(())
}
