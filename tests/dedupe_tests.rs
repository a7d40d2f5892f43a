use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dedupe_records::core::{
    extract_key, find_duplicates, remove, scan, DedupError, DedupReport, Deduplicator,
    KeyPattern, Markers, Removal, Strategy,
};

static NEXT_FIXTURE: AtomicUsize = AtomicUsize::new(0);

fn unique_temp_path(name: &str) -> PathBuf {
    let seq = NEXT_FIXTURE.fetch_add(1, Ordering::Relaxed);
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("dedupe-records-{name}-{stamp}-{seq}.ts"))
}

fn record(name: &str) -> String {
    format!("{{\n    name: '{name}',\n    category: 'Productivity',\n  }},")
}

/// A data file shaped like the records list the tool is aimed at.
fn apps_file(records: &[&str]) -> String {
    let body: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    format!("export const apps: App[] = [\n,\n{}\n];\n", body.join("\n,\n"))
}

fn run_on(content: &str, strategy: Strategy, dry_run: bool) -> (String, DedupReport, Vec<Removal>) {
    let path = unique_temp_path("run");
    fs::write(&path, content).expect("fixture should be written");

    let mut observed: Vec<Removal> = Vec::new();
    let report = Deduplicator::new(Markers::default(), strategy)
        .expect("default markers are valid")
        .dry_run(dry_run)
        .run(&path, &mut observed)
        .expect("run should succeed");

    let output = fs::read_to_string(&path).expect("output should be readable");
    fs::remove_file(&path).ok();
    (output, report, observed)
}

fn names_in(content: &str) -> Vec<String> {
    let lines: Vec<String> = content.split('\n').map(String::from).collect();
    let pattern = KeyPattern::new("name").unwrap();
    scan(&lines, &Markers::default())
        .iter()
        .filter_map(|block| extract_key(block, &pattern))
        .collect()
}

#[test]
fn a_b_a_keeps_first_a_and_b() {
    let input = apps_file(&[&record("A"), &record("B"), &record("A")]);
    let (output, report, observed) = run_on(&input, Strategy::Blocks, false);

    assert_eq!(names_in(&output), vec!["A", "B"]);
    assert_eq!(report.removed_count(), 1);
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].key, "A");
    // header, separator, A(0..=3 -> 2..=5), sep, B(7..=10), sep, A(12..=15)
    assert_eq!((observed[0].start, observed[0].end), (12, 15));
}

#[test]
fn identical_duplicate_is_cut_without_blank_line() {
    let input = "{\n  name: 'Same',\n},\n,\n{\n  name: 'Same',\n},\n];\n";
    let (output, _, _) = run_on(input, Strategy::Blocks, false);

    let lines: Vec<&str> = input.split('\n').collect();
    let mut expected: Vec<&str> = lines[..4].to_vec();
    expected.extend_from_slice(&lines[7..]);
    assert_eq!(output, expected.join("\n"));
    assert_eq!(output, "{\n  name: 'Same',\n},\n,\n];\n");
}

#[test]
fn file_without_blocks_is_untouched() {
    let input = "export const apps: App[] = [];\n";
    let (output, report, observed) = run_on(input, Strategy::Blocks, false);

    assert_eq!(output, input);
    assert_eq!(report.removed_count(), 0);
    assert!(observed.is_empty());
}

#[test]
fn keyless_blocks_survive() {
    let keyless = "{\n    title: 'no key',\n  },";
    let input = apps_file(&[keyless, &record("A"), keyless, &record("A")]);
    let (output, report, _) = run_on(&input, Strategy::Blocks, false);

    assert_eq!(report.removed_count(), 1);
    assert_eq!(output.matches("title: 'no key'").count(), 2);
}

#[test]
fn second_run_is_a_no_op() {
    let input = apps_file(&[&record("A"), &record("B"), &record("A"), &record("B"), &record("C")]);
    let (once, first, _) = run_on(&input, Strategy::Blocks, false);
    let (twice, second, _) = run_on(&once, Strategy::Blocks, false);

    assert_eq!(first.removed_count(), 2);
    assert_eq!(second.removed_count(), 0);
    assert_eq!(once, twice);
}

#[test]
fn retained_blocks_keep_their_order() {
    let input = apps_file(&[
        &record("C"),
        &record("A"),
        &record("C"),
        &record("B"),
        &record("A"),
        &record("D"),
    ]);
    let (output, _, _) = run_on(&input, Strategy::Blocks, false);
    assert_eq!(names_in(&output), vec!["C", "A", "B", "D"]);
}

#[test]
fn line_count_drops_by_removed_ranges() {
    let input = apps_file(&[&record("A"), &record("A"), &record("B"), &record("A")]);
    let (output, report, _) = run_on(&input, Strategy::Blocks, false);

    let removed: usize = report.removals.iter().map(Removal::line_count).sum();
    assert_eq!(output.split('\n').count(), input.split('\n').count() - removed);
    assert_eq!(report.lines_after, report.lines_before - removed);
}

#[test]
fn every_key_survives_exactly_once() {
    let keys = ["A", "B", "A", "C", "B", "B", "D", "A"];
    let records: Vec<String> = keys.iter().map(|k| record(k)).collect();
    let refs: Vec<&str> = records.iter().map(String::as_str).collect();
    let (output, _, _) = run_on(&apps_file(&refs), Strategy::Blocks, false);

    assert_eq!(names_in(&output), vec!["A", "B", "C", "D"]);
}

#[test]
fn dry_run_reports_but_does_not_write() {
    let input = apps_file(&[&record("A"), &record("A")]);
    let (output, report, observed) = run_on(&input, Strategy::Blocks, true);

    assert_eq!(output, input);
    assert!(report.dry_run);
    assert_eq!(observed.len(), 1);
    assert!(report.lines_after < report.lines_before);
}

#[test]
fn anchored_strategy_matches_block_strategy() {
    let input = apps_file(&[&record("A"), &record("B"), &record("A"), &record("C"), &record("B")]);
    let (blocks, _, from_blocks) = run_on(&input, Strategy::Blocks, false);
    let (anchored, _, from_anchors) = run_on(&input, Strategy::Anchored, false);

    assert_eq!(blocks, anchored);
    assert_eq!(from_blocks, from_anchors);
}

#[test]
fn unterminated_block_is_kept_and_reported() {
    let input = "{\n  name: 'A',\n},\n,\n{\n  name: 'A',\n";
    let (output, report, _) = run_on(input, Strategy::Blocks, false);

    assert_eq!(output, input);
    assert_eq!(report.removed_count(), 0);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn pure_pipeline_without_disk() {
    let lines: Vec<String> = "{\n  name: 'A',\n},\n,\n{\n  name: 'A',\n},"
        .split('\n')
        .map(String::from)
        .collect();
    let pattern = KeyPattern::new("name").unwrap();
    let blocks = scan(&lines, &Markers::default());
    let removals = find_duplicates(&blocks, &pattern);

    assert_eq!(remove(lines, &removals), vec!["{", "  name: 'A',", "},", ","]);
}

#[test]
fn missing_file_is_a_read_error() {
    let path = unique_temp_path("missing");
    let err = Deduplicator::new(Markers::default(), Strategy::Blocks)
        .unwrap()
        .run(&path, &mut Vec::<Removal>::new())
        .unwrap_err();

    assert!(matches!(err, DedupError::Read { .. }));
}

#[test]
fn top_level_run_uses_default_markers() {
    let path = unique_temp_path("default");
    fs::write(&path, apps_file(&[&record("A"), &record("A")])).expect("fixture should be written");

    let report = dedupe_records::run(&path).expect("run should succeed");
    let output = fs::read_to_string(&path).expect("output should be readable");
    fs::remove_file(&path).ok();

    assert_eq!(report.removed_count(), 1);
    assert_eq!(names_in(&output), vec!["A"]);
}

#[test]
fn anchored_strategy_on_plain_array_keeps_first_occurrence() {
    let input = "export const apps: App[] = [\n  {\n    name: 'A',\n  },\n  {\n    name: 'B',\n  },\n  {\n    name: 'A',\n  },\n];\n";
    let (from_blocks, blocks_report, _) = run_on(input, Strategy::Blocks, false);
    let (output, report, observed) = run_on(input, Strategy::Anchored, false);

    assert_eq!(from_blocks, input);
    assert_eq!(blocks_report.removed_count(), 0);

    assert_eq!(report.removed_count(), 1);
    assert_eq!((observed[0].start, observed[0].end), (7, 9));
    assert_eq!(
        output,
        "export const apps: App[] = [\n  {\n    name: 'A',\n  },\n  {\n    name: 'B',\n  },\n];\n"
    );
}
