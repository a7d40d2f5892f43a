use std::fs;
use std::path::Path;

use crate::core::{DedupError, DedupResult};

pub fn read_text(path: &Path) -> DedupResult<String> {
    fs::read_to_string(path).map_err(|source| DedupError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Split on `\n` only. A trailing newline yields a final empty line so that
/// joining restores the original bytes.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(String::from).collect()
}

pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

pub fn write_lines(path: &Path, lines: &[String]) -> DedupResult<()> {
    fs::write(path, join_lines(lines)).map_err(|source| DedupError::Write {
        path: path.to_path_buf(),
        source,
    })
}
