//! Key-anchored duplicate detection.
//!
//! Instead of partitioning the file into blocks up front, every line that
//! carries a key is an anchor. Duplicate anchors are widened backwards to the
//! line after the previous separator or close marker, and forwards to the next
//! close marker. A range never reaches a kept (first) anchor.

use std::collections::HashMap;

use log::debug;

use super::{KeyPattern, Markers, Removal, ScanWarning};

pub fn find_removals(
    lines: &[String],
    markers: &Markers,
    pattern: &KeyPattern,
) -> (Vec<Removal>, Vec<ScanWarning>) {
    // key -> anchor lines, keys kept in first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut anchors: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut warnings = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !pattern.has_marker(line) {
            continue;
        }
        match pattern.capture(line) {
            Some(key) => anchors
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(i),
            None => warnings.push(ScanWarning::UnmatchedKeyLine { line: i }),
        }
    }

    // First anchor of every key, ascending. Line order follows first-seen order.
    let kept: Vec<usize> = order.iter().map(|key| anchors[key][0]).collect();

    let mut duplicates: Vec<(usize, &str)> = order
        .iter()
        .flat_map(|key| anchors[key].iter().skip(1).map(move |&line| (line, *key)))
        .collect();
    duplicates.sort_by(|a, b| b.0.cmp(&a.0));

    let is_boundary = |line: &str| {
        let trimmed = line.trim();
        trimmed == markers.separator || trimmed == markers.close
    };

    let mut removals = Vec::new();
    // Lowest start claimed so far; everything at or past it is already gone.
    let mut claimed_from = lines.len();

    for (line, key) in duplicates {
        if line >= claimed_from {
            debug!("anchor for {} at line {} already removed", key, line + 1);
            continue;
        }

        let next_kept = kept.partition_point(|&k| k < line);
        let floor = next_kept.checked_sub(1).map_or(0, |i| kept[i] + 1);

        let mut start = line;
        while start > floor && !is_boundary(&lines[start - 1]) {
            start -= 1;
        }
        if start > 0 && !is_boundary(&lines[start - 1]) {
            warnings.push(ScanWarning::UnboundedDuplicate { line });
            continue;
        }

        let (limit, stops_at_kept) = match kept.get(next_kept) {
            Some(&k) if k < claimed_from => (k, true),
            _ => (claimed_from, false),
        };
        let mut end = line;
        while end + 1 < limit && lines[end].trim() != markers.close {
            end += 1;
        }
        if stops_at_kept && lines[end].trim() != markers.close {
            warnings.push(ScanWarning::UnboundedDuplicate { line });
            continue;
        }

        removals.push(Removal {
            key: key.to_string(),
            start,
            end,
        });
        claimed_from = start;
    }

    removals.reverse();
    (removals, warnings)
}
