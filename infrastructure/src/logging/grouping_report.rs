//! Plain-text grouping report
//!
//! Appends one entry per assignment as the engine makes it, so the report
//! of an interrupted run shows how far it got.

use ecogroup_application::ClassificationProgress;
use ecogroup_domain::Rank;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

pub struct GroupingReportWriter {
    writer: Mutex<BufWriter<File>>,
}

impl GroupingReportWriter {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_entry(&self, entry: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.write_all(entry.as_bytes());
            let _ = writer.flush();
        }
    }
}

fn report_entry(taxon: &str, group: &str) -> String {
    format!("Functional Group: {}\n      Taxon: {}\n\n", group, taxon)
}

impl ClassificationProgress for GroupingReportWriter {
    fn on_rank_start(&self, _rank: Rank, _taxa: usize, _chunks: usize) {}

    fn on_chunk_complete(&self, _rank: Rank, _taxa: usize, _success: bool) {}

    fn on_rank_complete(&self, _rank: Rank, _assigned: usize, _resolved: usize) {}

    fn on_assignment(&self, taxon: &str, group: &str, _rank: Rank) {
        self.write_entry(&report_entry(taxon, group));
    }
}
