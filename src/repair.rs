use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::Extraction;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction payload is empty")]
    Empty,
    #[error("extraction payload is not valid JSON after repair: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

pub fn repair(text: &str) -> String {
    if is_valid_json(text) {
        return text.to_string();
    }

    let trimmed = text.trim_end();
    let mut in_string = false;
    let mut escape_next = false;
    let mut open_stack = Vec::<char>::new();

    for character in trimmed.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if in_string {
            match character {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match character {
            '"' => in_string = true,
            '{' | '[' => open_stack.push(character),
            '}' if open_stack.last() == Some(&'{') => {
                open_stack.pop();
            }
            ']' if open_stack.last() == Some(&'[') => {
                open_stack.pop();
            }
            _ => {}
        }
    }

    let mut suffix = String::new();
    if in_string {
        suffix.push('"');
    }
    for opener in open_stack.iter().rev() {
        suffix.push(if *opener == '{' { '}' } else { ']' });
    }

    if suffix.is_empty() {
        return text.to_string();
    }

    warn!(suffix = %suffix, "repairing truncated JSON");
    format!("{trimmed}{suffix}")
}

pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => &body[3..],
        };
    }
    if let Some(stripped) = body.strip_suffix("```") {
        body = stripped;
    }

    body.trim()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExtraction {
    pub extraction: Extraction,
    pub repaired: bool,
    pub dropped_unnamed_areas: usize,
}

pub fn parse_extraction(raw: &str) -> Result<ParsedExtraction, ExtractionError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let repaired_body = repair(body);
    let repaired = repaired_body != body;
    debug!(chars = repaired_body.len(), repaired, "decoding extraction payload");

    let mut extraction: Extraction = serde_json::from_str(&repaired_body)?;

    let before = extraction.areas.len();
    extraction.areas.retain(|area| {
        let named = !area.area_name.trim().is_empty();
        if !named {
            warn!("dropping extracted area without a name");
        }
        named
    });
    let dropped_unnamed_areas = before - extraction.areas.len();

    info!(
        areas = extraction.areas.len(),
        global_notes = extraction.global_notes.len(),
        repaired,
        "parsed extraction"
    );

    Ok(ParsedExtraction {
        extraction,
        repaired,
        dropped_unnamed_areas,
    })
}
