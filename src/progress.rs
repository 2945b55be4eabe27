//! Terminal progress for seed runs.
//!
//! `SeedProgress` turns the seeder's [`SeedEvent`]s into two indicatif bars:
//! one counting tables, one counting records of the current table.

use crate::seeder::SeedEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bars driven by seed events. Cheap to clone; clones share the bars.
#[derive(Clone)]
pub struct SeedProgress {
    // Keeps both bars drawn together
    _multi: MultiProgress,
    tables: ProgressBar,
    records: ProgressBar,
}

impl SeedProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let tables = multi.add(ProgressBar::new(0));
        tables.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tables {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        tables.enable_steady_tick(Duration::from_millis(100));

        let records = multi.add(ProgressBar::new(0));
        records.set_style(
            ProgressStyle::with_template("  {prefix:.bold} [{bar:40.green/white}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );

        Self {
            _multi: multi,
            tables,
            records,
        }
    }

    /// Update the bars for one event
    pub fn handle(&self, event: &SeedEvent) {
        match event {
            SeedEvent::Starting { total_tables, .. } => {
                self.tables.set_length(*total_tables as u64);
                self.tables.set_position(0);
            }
            SeedEvent::TableStart { table, .. } => {
                self.tables.set_message(table.clone());
                self.records.set_prefix(table.clone());
                self.records.set_position(0);
                self.records.set_length(0);
                self.records.set_message("generating");
            }
            SeedEvent::Generating {
                records_generated, ..
            } => {
                self.records.set_length(*records_generated as u64);
                self.records.set_message("inserting");
            }
            SeedEvent::Inserting {
                records_inserted, ..
            } => {
                self.records.set_position(*records_inserted as u64);
            }
            SeedEvent::TableComplete { table_index, .. } => {
                self.records.set_message("done");
                self.tables.set_position(*table_index as u64);
            }
            SeedEvent::Complete { .. } => {
                self.records.finish_and_clear();
                self.tables.finish_with_message("done");
            }
        }
    }

    /// Listener closure for `Seeder::with_progress`
    pub fn listener(&self) -> impl FnMut(&SeedEvent) + Send + 'static {
        let progress = self.clone();
        move |event| progress.handle(event)
    }

    /// Clear the bars after a failed run
    pub fn abandon(&self) {
        self.records.abandon();
        self.tables.abandon_with_message("failed");
    }
}

impl Default for SeedProgress {
    fn default() -> Self {
        Self::new()
    }
}
