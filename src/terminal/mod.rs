use std::io::{self, Write};

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::core::{DedupReport, Removal, RemovalObserver};

/// Prints removal decisions to a terminal, or a JSON report at the end.
pub struct ConsoleReporter<W: Write> {
    out: W,
    json: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RemovalObserver for ConsoleReporter<W> {
    fn on_duplicates_found(&mut self, count: usize) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(self.out, "Found {} duplicates to remove:", count)
    }

    fn on_removal(&mut self, removal: &Removal) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        execute!(
            self.out,
            Print("  Removing: "),
            SetForegroundColor(Color::Yellow),
            Print(&removal.key),
            ResetColor,
            Print(format!(" at lines {}-{}\n", removal.start + 1, removal.end + 1))
        )
    }

    fn on_finished(&mut self, report: &DedupReport) -> io::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, report)?;
            return writeln!(self.out);
        }

        let count = report.removed_count();
        let message = if report.dry_run {
            format!("Dry run: {} duplicate records would be removed\n", count)
        } else {
            format!("Successfully removed {} duplicate records\n", count)
        };
        execute!(
            self.out,
            SetForegroundColor(Color::Green),
            Print(message),
            ResetColor
        )
    }
}
