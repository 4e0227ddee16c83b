//! Progress reporting for classification runs and validation batches

use colored::Colorize;
use ecogroup_application::{ClassificationProgress, ValidationProgress};
use ecogroup_domain::Rank;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with one bar per rank or per validation batch
pub struct ProgressReporter {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn start_bar(&self, prefix: String, len: u64, message: String) {
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(Self::bar_style());
        pb.set_prefix(prefix);
        pb.set_message(message);
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            f(pb);
        }
    }

    fn finish_bar(&self, message: String) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationProgress for ProgressReporter {
    fn on_rank_start(&self, rank: Rank, taxa: usize, chunks: usize) {
        self.start_bar(
            format!("{:<8}", rank.as_str()),
            chunks as u64,
            format!("{} taxa", taxa),
        );
    }

    fn on_chunk_complete(&self, _rank: Rank, taxa: usize, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} {} taxa", "v".green(), taxa)
            } else {
                format!("{} {} taxa", "x".red(), taxa)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_rank_complete(&self, _rank: Rank, assigned: usize, resolved: usize) {
        self.finish_bar(format!(
            "{} {} assigned, {} resolved",
            "done".green(),
            assigned,
            resolved
        ));
    }

    fn on_new_group(&self, group: &str, forced: bool) {
        let note = if forced {
            format!("{} {} (extra group)", "+".yellow(), group)
        } else {
            format!("{} {}", "+".cyan(), group)
        };
        self.multi.println(note).ok();
    }
}

impl ValidationProgress for ProgressReporter {
    fn on_batch_start(&self, iterations: usize, workers: usize) {
        self.start_bar(
            format!("Validation ({} workers)", workers),
            iterations as u64,
            "Running...".to_string(),
        );
    }

    fn on_iteration_complete(&self, index: usize, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} iteration {}", "v".green(), index)
            } else {
                format!("{} iteration {}", "x".red(), index)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_batch_complete(&self, succeeded: usize, total: usize) {
        let summary = format!("{}/{} iterations succeeded", succeeded, total);
        if succeeded == total {
            self.finish_bar(summary.green().to_string());
        } else {
            self.finish_bar(summary.red().to_string());
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ClassificationProgress for SimpleProgress {
    fn on_rank_start(&self, rank: Rank, taxa: usize, chunks: usize) {
        println!(
            "{} {} ({} taxa, {} requests)",
            "->".cyan(),
            rank.as_str().bold(),
            taxa,
            chunks
        );
    }

    fn on_chunk_complete(&self, _rank: Rank, taxa: usize, success: bool) {
        if !success {
            println!("  {} request for {} taxa failed", "x".red(), taxa);
        }
    }

    fn on_rank_complete(&self, _rank: Rank, assigned: usize, resolved: usize) {
        println!("  {} assigned, {} resolved", assigned, resolved);
    }
}

impl ValidationProgress for SimpleProgress {
    fn on_batch_start(&self, iterations: usize, workers: usize) {
        println!(
            "{} {} iterations on {} workers",
            "->".cyan(),
            iterations,
            workers
        );
    }

    fn on_iteration_complete(&self, index: usize, success: bool) {
        if success {
            println!("  {} iteration {}", "v".green(), index);
        } else {
            println!("  {} iteration {} (failed)", "x".red(), index);
        }
    }
}
