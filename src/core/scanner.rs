use regex::Regex;
use serde::Serialize;
use std::fmt;

use super::error::{DedupError, DedupResult};
use super::{Markers, RecordBlock};

/// Matches the key field of a record, e.g. `name: 'Slack'`.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    marker: String,
    regex: Regex,
}

impl KeyPattern {
    pub fn new(field: &str) -> DedupResult<Self> {
        let regex = Regex::new(&format!(r"{}: '([^']+)'", regex::escape(field))).map_err(
            |source| DedupError::InvalidKeyField {
                field: field.to_string(),
                source,
            },
        )?;

        Ok(Self {
            marker: format!("{}:", field),
            regex,
        })
    }

    /// Cheap substring check before running the regex.
    pub fn has_marker(&self, line: &str) -> bool {
        line.contains(&self.marker)
    }

    pub fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Problems the line heuristic noticed but tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    UnterminatedBlock { start: usize },
    UnmatchedKeyLine { line: usize },
    UnboundedDuplicate { line: usize },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::UnterminatedBlock { start } => {
                write!(f, "block opened at line {} is never closed, ignoring it", start + 1)
            }
            ScanWarning::UnmatchedKeyLine { line } => {
                write!(f, "line {} has a key field without a single-quoted value", line + 1)
            }
            ScanWarning::UnboundedDuplicate { line } => write!(
                f,
                "duplicate at line {} has no block boundary before a kept record, leaving it",
                line + 1
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub blocks: Vec<RecordBlock>,
    pub warnings: Vec<ScanWarning>,
}

/// Partition `lines` into record blocks. Unterminated blocks are dropped.
pub fn scan(lines: &[String], markers: &Markers) -> Vec<RecordBlock> {
    scan_with_diagnostics(lines, markers).blocks
}

pub fn scan_with_diagnostics(lines: &[String], markers: &Markers) -> ScanResult {
    let mut result = ScanResult::default();
    let mut open: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        // A `{` only starts a record right after a separator line; anything
        // else is a brace nested inside a value.
        let starts_block = trimmed == markers.open
            && (i == 0 || lines[i - 1].trim() == markers.separator);

        if starts_block {
            if let Some(start) = open {
                result.warnings.push(ScanWarning::UnterminatedBlock { start });
            }
            open = Some(i);
        } else if trimmed == markers.close {
            if let Some(start) = open.take() {
                result.blocks.push(RecordBlock {
                    start,
                    end: i,
                    lines: lines[start..=i].to_vec(),
                });
            }
        }
    }

    if let Some(start) = open {
        result.warnings.push(ScanWarning::UnterminatedBlock { start });
    }

    result
}

/// The key of `block`: the first line carrying the key field whose value is
/// a single-quoted literal.
pub fn extract_key(block: &RecordBlock, pattern: &KeyPattern) -> Option<String> {
    block
        .lines
        .iter()
        .filter(|line| pattern.has_marker(line))
        .find_map(|line| pattern.capture(line))
        .map(str::to_string)
}

/// Absolute indices of lines in `block` that mention the key field but do not
/// match the quoted-literal pattern.
pub fn unmatched_key_lines(block: &RecordBlock, pattern: &KeyPattern) -> Vec<usize> {
    block
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| pattern.has_marker(line) && pattern.capture(line).is_none())
        .map(|(offset, _)| block.start + offset)
        .collect()
}
