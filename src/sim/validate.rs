/// Stage-map validation.
///
/// A map is checked in three phases. Content type and size failures stop
/// the check on their own; structural checks run in full and every
/// violation is reported, in a fixed order.

use std::fs;
use std::path::Path;

use log::warn;

use crate::domain::grid::map_lines;
use crate::domain::tile::{is_enclosure_glyph, CH_BORDER, CH_GHOST, CH_PLAYER, CH_TARGET};
use crate::error::{StructuralIssue, ValidationError};

pub const MAX_FILE_SIZE: u64 = 1024;
pub const COLUMNS: std::ops::RangeInclusive<usize> = 20..=50;
pub const LINES: std::ops::RangeInclusive<usize> = 10..=20;

const MIME_TEXT: &str = "text/plain; charset=utf-8";
const MIME_HTML: &str = "text/html; charset=utf-8";
const MIME_BINARY: &str = "application/octet-stream";

/// Only the leading bytes are sniffed.
const SNIFF_LEN: usize = 512;

/// Validate the map file at `path`. The path is echoed verbatim in messages.
pub fn validate_stage_map(path: &Path) -> Result<(), ValidationError> {
    let label = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| ValidationError::Io { path: label.clone(), source })?;
    validate_map_bytes(&label, &bytes)
}

/// Validate map contents already in memory; `label` stands in for the path.
pub fn validate_map_bytes(label: &str, bytes: &[u8]) -> Result<(), ValidationError> {
    let result = check(label, bytes);
    if let Err(e) = &result {
        warn!("rejected stage map {label}: {e}");
    }
    result
}

fn check(label: &str, bytes: &[u8]) -> Result<(), ValidationError> {
    let mime = sniff_content_type(bytes);
    if !mime.starts_with("text/plain") {
        return Err(ValidationError::ContentType { path: label.to_string(), mime: mime.to_string() });
    }

    let size = bytes.len() as u64;
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::FileSize { path: label.to_string(), size, max: MAX_FILE_SIZE });
    }

    let text = String::from_utf8_lossy(bytes);
    let mut issues = structural_issues(&text);
    match issues.len() {
        0 => Ok(()),
        1 => Err(ValidationError::Structure { path: label.to_string(), issue: issues.remove(0) }),
        _ => Err(ValidationError::Aggregate { path: label.to_string(), issues }),
    }
}

// ── Content type ──

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Classify the leading bytes of a file as binary, HTML, or plain text.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if head.iter().copied().any(is_binary_byte) {
        return MIME_BINARY;
    }
    let start = head.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(head.len());
    let lead: Vec<u8> = head[start..].iter().take(14).map(u8::to_ascii_lowercase).collect();
    if lead.starts_with(b"<!doctype html") || lead.starts_with(b"<html") {
        return MIME_HTML;
    }
    MIME_TEXT
}

// ── Structure ──

/// Every structural violation of `text`, in reporting order.
pub fn structural_issues(text: &str) -> Vec<StructuralIssue> {
    let lines = map_lines(text);
    let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
    let columns = widths.first().copied().unwrap_or(0);
    let mut issues = Vec::new();

    // columns counts the whole first line, border characters included
    if !COLUMNS.contains(&columns) {
        issues.push(StructuralIssue::Columns);
    }
    if !LINES.contains(&lines.len()) {
        issues.push(StructuralIssue::Lines);
    }

    let uneven: Vec<usize> = widths
        .iter()
        .enumerate()
        .filter(|&(_, &w)| w != columns)
        .map(|(i, _)| i + 1)
        .collect();
    if !uneven.is_empty() {
        issues.push(StructuralIssue::NonUniform(uneven));
    }

    let last = lines.len().saturating_sub(1);
    let open: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|&(i, line)| !is_enclosed(line, i == 0 || i == last))
        .map(|(i, _)| i + 1)
        .collect();
    if !open.is_empty() {
        issues.push(StructuralIssue::Boundary(open));
    }

    let count = |ch: char| text.chars().filter(|&c| c == ch).count();
    match count(CH_PLAYER) {
        0 => issues.push(StructuralIssue::NoPlayer),
        1 => {}
        _ => issues.push(StructuralIssue::ManyPlayers),
    }
    if count(CH_GHOST) == 0 {
        issues.push(StructuralIssue::NoEnemies);
    }
    if count(CH_TARGET) == 0 {
        issues.push(StructuralIssue::NoTargets);
    }

    issues
}

/// A line is enclosed when it starts and ends with the border glyph; the
/// top and bottom lines must also hold nothing but border and walls.
fn is_enclosed(line: &str, edge: bool) -> bool {
    let starts = line.starts_with(CH_BORDER);
    let ends = line.chars().count() > 1 && line.ends_with(CH_BORDER);
    starts && ends && (!edge || line.chars().all(is_enclosure_glyph))
}
