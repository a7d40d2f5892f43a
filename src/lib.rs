pub mod config;
pub mod core;
pub mod terminal;
pub mod utils;

use std::path::Path;

use crate::core::{DedupReport, DedupResult, Deduplicator, Markers, Strategy};
use crate::terminal::ConsoleReporter;

/// Deduplicate `path` with the default markers, reporting to stdout.
pub fn run(path: &Path) -> DedupResult<DedupReport> {
    Deduplicator::new(Markers::default(), Strategy::Blocks)?
        .run(path, &mut ConsoleReporter::stdout(false))
}
