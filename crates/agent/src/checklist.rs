//! Checklist extraction
//!
//! Turns step-structured or numbered-list text into ordered checklist
//! items. The generator is instructed to emit `step1. step2. ...` markers
//! after an introductory sentence ending in a colon; real output drifts,
//! so a numbered-list fallback covers `1. ... 2. ...` style replies.

use once_cell::sync::Lazy;
use regex::Regex;

use onboard_core::ChecklistItem;

static STEP_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)step\d+\.").expect("static regex"));
static STEP_CHUNK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^step(\d+)\.\s*(.*)$").expect("static regex"));
static NUMBER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\d+)\.\s*").expect("static regex"));

/// Extraction result: the answer prefix plus the ordered items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistParse {
    /// Text before the first colon (empty when the text has no colon)
    pub answer: String,
    /// Ordered checklist items; empty when neither pattern matched
    pub items: Vec<ChecklistItem>,
}

/// Extract a checklist from generated text
///
/// The part before the first colon becomes the answer; the rest is scanned
/// for `stepN.` markers (N kept verbatim from the marker, out-of-order and
/// duplicate numbers included). Only when that yields nothing does the
/// numbered-list fallback run, renumbering with a counter from 1. Zero
/// items is a valid outcome, not an error.
pub fn extract_checklist(text: &str) -> ChecklistParse {
    let (answer, body) = match text.find(':') {
        Some(i) => (text[..i].trim(), &text[i + 1..]),
        None => ("", text),
    };

    let mut items = step_items(body);
    if items.is_empty() {
        items = numbered_items(body);
    }

    ChecklistParse {
        answer: answer.to_string(),
        items,
    }
}

/// Primary pattern: `stepN.` markers, N taken from the marker text
fn step_items(body: &str) -> Vec<ChecklistItem> {
    let starts: Vec<usize> = STEP_MARKER.find_iter(body).map(|m| m.start()).collect();

    let mut items = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(body.len());
        let chunk = body[start..end].trim();
        if chunk.is_empty() {
            continue;
        }
        if let Some(caps) = STEP_CHUNK.captures(chunk) {
            let number = &caps[1];
            let description = strip_emphasis(caps[2].trim());
            items.push(ChecklistItem::new(format!("Step {number}: {description}")));
        }
    }
    items
}

/// Fallback pattern: `N.` list markers with a running counter from 1,
/// ignoring the source numbering
fn numbered_items(body: &str) -> Vec<ChecklistItem> {
    let markers: Vec<(usize, usize)> = NUMBER_MARKER
        .find_iter(body)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut items = Vec::new();
    for (i, &(_, desc_start)) in markers.iter().enumerate() {
        let desc_end = markers.get(i + 1).map(|&(s, _)| s).unwrap_or(body.len());
        let description = strip_emphasis(body[desc_start..desc_end].trim());
        if description.is_empty() {
            continue;
        }
        items.push(ChecklistItem::new(format!(
            "Step {}: {}",
            items.len() + 1,
            description
        )));
    }
    items
}

/// Strip markdown emphasis characters from a description
fn strip_emphasis(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '`' | '*' | '_' | '~'))
        .collect::<String>()
        .trim()
        .to_string()
}
