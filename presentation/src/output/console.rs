//! Console output formatter for classification and validation results

use colored::Colorize;
use ecogroup_application::ClassificationSummary;
use ecogroup_domain::{RegionAnalysis, ValidationMetadata, ValidationReport};
use std::fmt::Write;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the validation report with terminal colors
    pub fn format_report(report: &ValidationReport) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Validation Analysis Report"));
        let _ = writeln!(out, "{} {}", "Generated on:".cyan().bold(), report.generated_at);

        let _ = writeln!(out, "\n{}", "Analysis Coverage:".cyan().bold());
        for region in &report.regions {
            let _ = writeln!(out, "\n{}:", region.name.bold());
            let _ = writeln!(
                out,
                "  Species grouping iterations: {}",
                region.group_iterations.len()
            );
            let _ = writeln!(out, "  Diet matrix iterations: {}", region.matrix_iterations.len());
            for incomplete in &region.incomplete {
                let _ = writeln!(
                    out,
                    "  {} {}: missing {}",
                    "!".yellow(),
                    incomplete.name,
                    incomplete.missing.join(", ")
                );
            }
        }

        for region in &report.regions {
            Self::region_section(&mut out, region);
        }

        out.push_str(&Self::footer());
        out
    }

    /// Same report without color codes, for files and dumb terminals
    pub fn format_report_plain(report: &ValidationReport) -> String {
        colored::control::set_override(false);
        let text = Self::format_report(report);
        colored::control::unset_override();
        text
    }

    /// Format as JSON
    pub fn format_json(report: &ValidationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn region_section(out: &mut String, region: &RegionAnalysis) {
        let summary = &region.summary;
        let thresholds = &region.thresholds;

        let _ = writeln!(out, "\n{}", region.name.yellow().bold());
        let _ = writeln!(out, "{}\n", "=".repeat(region.name.chars().count()));

        out.push_str(&Self::section_header("1. Group Complexity Analysis"));
        let _ = writeln!(out, "Total number of groups: {}", summary.total_groups);

        let _ = writeln!(out, "\n{}", "Overall Consistency Statistics:".cyan().bold());
        let _ = writeln!(
            out,
            "Mean consistency across all species: {:.3}",
            summary.mean_consistency
        );
        let _ = writeln!(
            out,
            "Median consistency across all species: {:.3}",
            summary.median_consistency
        );

        let _ = writeln!(
            out,
            "\n{}",
            "Distribution of number of different groups per species:".cyan().bold()
        );
        for (groups, species) in &summary.group_count_distribution {
            let _ = writeln!(out, "{} group(s): {} species", groups, species);
        }

        let unstable = region
            .consistency
            .unstable_species(thresholds.low_consistency);
        let _ = writeln!(
            out,
            "\n{} {}",
            format!(
                "Species with low stability (consistency < {}):",
                thresholds.low_consistency
            )
            .cyan()
            .bold(),
            unstable.len()
        );
        for record in unstable {
            let _ = writeln!(out, "\n{}:", record.species.bold());
            let _ = writeln!(out, "  Consistency score: {:.2}", record.consistency_score);
            let _ = writeln!(
                out,
                "  Number of different groups: {}",
                record.num_different_groups
            );
            let _ = writeln!(out, "  Group assignments and frequencies:");
            for (group, count, percent) in record.group_frequencies() {
                let _ = writeln!(out, "    - {}: {} times ({:.1}%)", group, count, percent);
            }
        }

        let _ = writeln!(
            out,
            "\n{}",
            "Group Stability Rankings (sorted by variation):".cyan().bold()
        );
        for group in region.consistency.groups_by_size_variation() {
            let _ = writeln!(out, "\n{}:", group.group.bold());
            let _ = writeln!(out, "  Size variation: {:.2}", group.size_std);
            let _ = writeln!(
                out,
                "  Size range: {} - {} species",
                group.min_size, group.max_size
            );
            let _ = writeln!(
                out,
                "  Jaccard similarity: {:.3}",
                group.avg_jaccard_similarity
            );
        }

        out.push('\n');
        out.push_str(&Self::section_header("2. Diet Interaction Analysis"));
        let Some(interactions) = &region.interactions else {
            let _ = writeln!(out, "No diet matrix data available for analysis");
            return;
        };
        let unstable = interactions.unstable(thresholds.unstable_interaction);
        let _ = writeln!(out, "Total interactions: {}", interactions.interactions.len());
        let _ = writeln!(
            out,
            "Mean stability score: {:.3}",
            interactions.mean_stability()
        );
        let _ = writeln!(
            out,
            "Unstable interactions (stability score < {}): {}",
            thresholds.unstable_interaction,
            unstable.len()
        );
        for record in unstable {
            let _ = writeln!(
                out,
                "\n{} -> {}:",
                record.predator.bold(),
                record.prey.bold()
            );
            let _ = writeln!(out, "  Mean proportion: {:.3}", record.mean);
            let _ = writeln!(out, "  Stability score: {:.3}", record.stability_score);
            let values: Vec<String> = record.raw_values.iter().map(|v| format!("{:.3}", v)).collect();
            let _ = writeln!(out, "  Raw values: [{}]", values.join(", "));
        }
    }

    /// Format the outcome of one classification run
    pub fn format_classification(summary: &ClassificationSummary, groups: usize) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Classification complete"));
        let _ = writeln!(out, "{} {}", "Oracle requests:".cyan().bold(), summary.oracle_calls);
        let _ = writeln!(out, "{} {}", "Taxa assigned:".cyan().bold(), summary.assigned);
        let _ = writeln!(out, "{} {}", "Taxa resolved:".cyan().bold(), summary.resolved);
        if summary.skipped > 0 {
            let _ = writeln!(
                out,
                "{} {}",
                "Already grouped:".cyan().bold(),
                summary.skipped
            );
        }
        let _ = writeln!(out, "{} {}", "Groups in registry:".cyan().bold(), groups);

        if !summary.new_groups.is_empty() {
            let _ = writeln!(out, "\n{}", "New groups:".green().bold());
            for group in &summary.new_groups {
                let _ = writeln!(out, "  * {}", group);
            }
        }
        if !summary.extra_groups.is_empty() {
            let _ = writeln!(out, "\n{}", "Extra groups (force grouping):".yellow().bold());
            for group in &summary.extra_groups {
                let _ = writeln!(out, "  * {}", group);
            }
        }
        if !summary.unresolved.is_empty() {
            let _ = writeln!(
                out,
                "\n{} {}",
                "Without a verdict:".red().bold(),
                summary.unresolved.join(", ")
            );
        }
        out.push_str(&Self::footer());
        out
    }

    /// Format the metadata of a finished validation batch
    pub fn format_validation(metadata: &ValidationMetadata) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Validation iterations complete"));
        let _ = writeln!(
            out,
            "All {} iterations of {} completed successfully",
            metadata.successful_iterations.to_string().green().bold(),
            metadata.base_name.bold()
        );
        for dir in &metadata.iteration_dirs {
            let _ = writeln!(out, "  * {}", dir);
        }
        out.push_str(&Self::footer());
        out
    }

    fn header(title: &str) -> String {
        format!(
            "\n{}\n{}\n{}\n\n",
            "=".repeat(60).cyan(),
            format!("  {}", title).cyan().bold(),
            "=".repeat(60).cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(title.len()))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
