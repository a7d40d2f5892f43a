use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::utils;

pub mod anchored;
pub mod error;
pub mod scanner;

pub use error::{DedupError, DedupResult};
pub use scanner::{extract_key, scan, scan_with_diagnostics, KeyPattern, ScanWarning};

/// Delimiter tokens, compared against trimmed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub open: String,
    pub separator: String,
    pub close: String,
    pub key_field: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: "{".to_string(),
            separator: ",".to_string(),
            close: "},".to_string(),
            key_field: "name".to_string(),
        }
    }
}

/// How duplicate blocks are located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Partition the file into blocks first, then compare their keys
    #[default]
    Blocks,
    /// Start from each key line and widen to the surrounding block
    Anchored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBlock {
    pub start: usize,
    pub end: usize,
    pub lines: Vec<String>,
}

/// A block scheduled for deletion. Indices are 0-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    pub key: String,
    pub start: usize,
    pub end: usize,
}

impl Removal {
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    pub path: PathBuf,
    pub strategy: Strategy,
    pub dry_run: bool,
    pub lines_before: usize,
    pub lines_after: usize,
    pub removals: Vec<Removal>,
    pub warnings: Vec<ScanWarning>,
}

impl DedupReport {
    pub fn removed_count(&self) -> usize {
        self.removals.len()
    }
}

/// Receives removal decisions as the pipeline makes them.
pub trait RemovalObserver {
    fn on_duplicates_found(&mut self, _count: usize) -> io::Result<()> {
        Ok(())
    }

    fn on_removal(&mut self, removal: &Removal) -> io::Result<()>;

    fn on_finished(&mut self, _report: &DedupReport) -> io::Result<()> {
        Ok(())
    }
}

impl RemovalObserver for Vec<Removal> {
    fn on_removal(&mut self, removal: &Removal) -> io::Result<()> {
        self.push(removal.clone());
        Ok(())
    }
}

/// First occurrence of each key wins; later ones are returned in file order.
/// Blocks without a key are never removed.
pub fn find_duplicates(blocks: &[RecordBlock], pattern: &KeyPattern) -> Vec<Removal> {
    let mut seen = HashSet::new();
    let mut removals = Vec::new();

    for block in blocks {
        let Some(key) = extract_key(block, pattern) else {
            continue;
        };

        if seen.contains(&key) {
            removals.push(Removal {
                key,
                start: block.start,
                end: block.end,
            });
        } else {
            seen.insert(key);
        }
    }

    removals
}

/// Delete every removal range from `lines`. Ranges are applied from the
/// highest start down so pending indices stay valid.
pub fn remove(mut lines: Vec<String>, removals: &[Removal]) -> Vec<String> {
    let mut ordered: Vec<&Removal> = removals.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    for removal in ordered {
        if removal.start >= lines.len() {
            continue;
        }
        let end = removal.end.min(lines.len() - 1);
        lines.drain(removal.start..=end);
    }

    lines
}

#[derive(Debug, Clone)]
pub struct Deduplicator {
    markers: Markers,
    pattern: KeyPattern,
    strategy: Strategy,
    dry_run: bool,
}

impl Deduplicator {
    pub fn new(markers: Markers, strategy: Strategy) -> DedupResult<Self> {
        let pattern = KeyPattern::new(&markers.key_field)?;
        Ok(Self {
            markers,
            pattern,
            strategy,
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Find removals and diagnostics for an in-memory line sequence.
    pub fn analyze(&self, lines: &[String]) -> (Vec<Removal>, Vec<ScanWarning>) {
        match self.strategy {
            Strategy::Blocks => {
                let scanned = scan_with_diagnostics(lines, &self.markers);
                let mut warnings = scanned.warnings;
                for block in &scanned.blocks {
                    warnings.extend(
                        scanner::unmatched_key_lines(block, &self.pattern)
                            .into_iter()
                            .map(|line| ScanWarning::UnmatchedKeyLine { line }),
                    );
                }
                debug!("scanned {} record blocks", scanned.blocks.len());
                (find_duplicates(&scanned.blocks, &self.pattern), warnings)
            }
            Strategy::Anchored => anchored::find_removals(lines, &self.markers, &self.pattern),
        }
    }

    /// Deduplicate the file at `path` in place.
    pub fn run(&self, path: &Path, observer: &mut dyn RemovalObserver) -> DedupResult<DedupReport> {
        let content = utils::read_text(path)?;
        let lines = utils::split_lines(&content);
        let lines_before = lines.len();
        debug!("read {} lines from {}", lines_before, path.display());

        let (removals, warnings) = self.analyze(&lines);
        for warning in &warnings {
            warn!("{}: {}", path.display(), warning);
        }

        observer
            .on_duplicates_found(removals.len())
            .map_err(DedupError::Report)?;
        for removal in &removals {
            observer.on_removal(removal).map_err(DedupError::Report)?;
        }

        let kept = remove(lines, &removals);
        let lines_after = kept.len();

        if removals.is_empty() {
            debug!("no duplicates, leaving {} untouched", path.display());
        } else if self.dry_run {
            debug!("dry run, not writing {}", path.display());
        } else {
            utils::write_lines(path, &kept)?;
        }

        let report = DedupReport {
            path: path.to_path_buf(),
            strategy: self.strategy,
            dry_run: self.dry_run,
            lines_before,
            lines_after,
            removals,
            warnings,
        };
        observer.on_finished(&report).map_err(DedupError::Report)?;

        Ok(report)
    }
}
