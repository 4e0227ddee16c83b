//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Report format for `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

impl From<ReportFormat> for ecogroup_domain::OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => ecogroup_domain::OutputFormat::Text,
            ReportFormat::Json => ecogroup_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for ecogroup
#[derive(Parser, Debug)]
#[command(name = "ecogroup")]
#[command(author, version, about = "Functional group classification for marine ecosystem models")]
#[command(long_about = r#"
ecogroup sorts the species of a study area into the functional groups of an
Ecopath with Ecosim model by asking an LLM oracle, one taxonomic rank at a
time, and measures how reproducible that classification is.

Commands:
  classify   Group the species of one run directory (resumable)
  validate   Run the classification N times on copies of a base directory
  analyze    Measure consistency across the iterations of validation batches

Configuration files are loaded from (in priority order):
1. --config <path>                         Explicit config file
2. ./ecogroup.toml                         Project-level config
3. ~/.config/ecogroup/config.toml          Global config
4. ECOGROUP_<SECTION>__<KEY>               Environment variables

Example:
  ecogroup classify runs/north_sea
  ecogroup validate runs/north_sea_base -n 10 -w 4
  ecogroup analyze runs/north_sea runs/baltic --output report.txt
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Group the species of a run directory into functional groups
    Classify {
        /// Run directory holding 02_species_data.json
        #[arg(value_name = "RUN_DIR")]
        run_dir: PathBuf,

        /// Species data file (default: <RUN_DIR>/02_species_data.json)
        #[arg(long, value_name = "PATH")]
        species: Option<PathBuf>,

        /// Grouping template file; implies the upload template source
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,

        /// Keep the template's groups; novel groups go to a separate file
        #[arg(long)]
        force_grouping: bool,

        /// Research focus passed to the oracle with every request
        #[arg(long, value_name = "TEXT")]
        research_focus: Option<String>,
    },

    /// Run repeated classifications of a base directory
    Validate {
        /// Template directory, conventionally named <name>_base
        #[arg(value_name = "BASE_DIR")]
        base_dir: PathBuf,

        /// Number of iterations
        #[arg(short = 'n', long, value_name = "ITER")]
        iterations: Option<usize>,

        /// Number of parallel worker processes
        #[arg(short, long, value_name = "WORKERS")]
        workers: Option<usize>,
    },

    /// Analyze the consistency of validation iterations
    Analyze {
        /// Region directories holding <region>_<n> iteration folders
        #[arg(value_name = "REGION_DIR", required = true)]
        regions: Vec<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,
    },
}
