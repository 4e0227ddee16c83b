//! CLI entrypoint for ecogroup
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use ecogroup_application::{
    AnalyzeValidationInput, AnalyzeValidationUseCase, ClassificationProgress, ClassifySpeciesInput,
    ClassifySpeciesUseCase, CompositeProgress, ConversationLogger, LlmClassifier, NoConversationLogger,
    NoProgress, NoValidationProgress, RetryingClassifier, RunValidationInput, RunValidationUseCase,
    SynthesizeTemplateInput, SynthesizeTemplateUseCase, ValidationProgress,
};
use ecogroup_domain::{
    BoundingBox, ConfigIssue, Model, OutputFormat, ReferenceGroupRegistry, Severity, TemplateSource,
};
use ecogroup_infrastructure::{
    ConfigLoader, FileConfig, FileOracleConfig, FsIterationReader, GroupingReportWriter,
    HttpGatewayConfig, HttpLlmGateway, JsonCheckpointStore, JsonlConversationLogger,
    ProcessIterationRunner, RunLayout, RunSettings, TemplateLoader, load_hierarchy, read_json,
    write_json, write_metadata,
};
use ecogroup_infrastructure::layout::RUN_LOG_FILE;
use ecogroup_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter, SimpleProgress};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Some(Command::Classify { run_dir, .. }) if run_dir.is_dir() => Some(run_dir.as_path()),
        _ => None,
    };
    let _log_guard = init_logging(cli.verbose, log_dir);

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        return show_config(&cli, &config);
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    info!("Starting ecogroup");

    match command {
        Command::Classify {
            run_dir,
            species,
            template,
            force_grouping,
            research_focus,
        } => {
            let mut config = config;
            let layout = RunLayout::new(run_dir);
            if !layout.dir().is_dir() {
                bail!("Run directory {} does not exist", layout.dir().display());
            }

            // ai_config.json, then command line flags
            RunSettings::load(&layout)
                .await
                .with_context(|| format!("Failed to read {}", layout.ai_config().display()))?
                .apply(&mut config);
            if force_grouping {
                config.classification.force_grouping = true;
            }
            if research_focus.is_some() {
                config.classification.research_focus = research_focus;
            }
            if let Some(path) = template {
                config.classification.template = TemplateSource::Upload.to_string();
                config.classification.upload_path = Some(path.display().to_string());
            }

            report_issues(&config.validate())?;
            classify(&config, &layout, species, cli.quiet).await
        }
        Command::Validate {
            base_dir,
            iterations,
            workers,
        } => {
            let mut config = config;
            if let Some(n) = iterations {
                config.validation.iterations = n;
            }
            if let Some(w) = workers {
                config.validation.workers = w;
            }
            report_issues(&config.validate())?;
            validate(&config, base_dir, cli.quiet).await
        }
        Command::Analyze {
            regions,
            output,
            format,
        } => {
            report_issues(&config.validate())?;
            let format = format.map(OutputFormat::from).unwrap_or(config.output.format);
            analyze(&config, regions, output, format, cli.quiet).await
        }
    }
}

/// Set up stderr logging by verbosity, plus `ecogroup.log` in `log_dir`.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, RUN_LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(filter))
        .with(file_layer)
        .init();

    guard
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("{}", "Configuration sources (highest priority first):".bold());
    if cli.no_config {
        println!("  (config files disabled by --no-config)");
    } else {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
    }
    println!();
    println!("{}", "Merged configuration:".bold());
    println!(
        "{}",
        toml::to_string_pretty(config).context("Failed to render configuration")?
    );
    Ok(())
}

/// Print config issues; errors stop the run.
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("{} {}", "error:".red().bold(), issue.message),
            Severity::Warning => eprintln!("{} {}", "warning:".yellow().bold(), issue.message),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn build_gateway(oracle: &FileOracleConfig) -> Result<Arc<HttpLlmGateway>> {
    let config = HttpGatewayConfig::from_env(
        oracle.endpoint.clone(),
        &oracle.api_key_env,
        oracle.temperature,
        oracle.timeout(),
    );
    let gateway = HttpLlmGateway::new(config).context("Failed to create oracle client")?;
    Ok(Arc::new(gateway))
}

fn oracle_logger(layout: &RunLayout) -> Arc<dyn ConversationLogger> {
    match JsonlConversationLogger::open(layout.oracle_log()) {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoConversationLogger),
    }
}

async fn classify(
    config: &FileConfig,
    layout: &RunLayout,
    species: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let (model, _) = config.oracle.parse_model();
    let (policy, _) = config.retry.to_policy();
    let (source, _) = config.classification.parse_template();
    let params = config.classification.to_params();

    let species_path = species.unwrap_or_else(|| layout.species_data());
    let hierarchy = load_hierarchy(&species_path)
        .await
        .with_context(|| format!("Failed to load species data from {}", species_path.display()))?;
    if hierarchy.species_count == 0 {
        bail!("{} holds no usable species records", species_path.display());
    }
    write_json(&layout.hierarchy(), &hierarchy.root)
        .await
        .context("Failed to write the species hierarchy")?;

    let gateway = build_gateway(&config.oracle)?;
    let logger = oracle_logger(layout);

    let registry = load_registry(
        config,
        layout,
        source,
        Arc::clone(&gateway),
        model.clone(),
        Arc::clone(&logger),
    )
    .await?;
    if registry.is_empty() {
        bail!("The {} grouping template holds no groups", source);
    }
    info!("Loaded {} reference groups from the {} template", registry.len(), source);
    write_json(&layout.grouping(), &registry.to_template_value())
        .await
        .context("Failed to write the group registry")?;

    // === Dependency Injection ===
    let classifier = Arc::new(
        RetryingClassifier::new(
            LlmClassifier::new(gateway, model).with_logger(Arc::clone(&logger)),
            policy,
        )
        .with_logger(logger),
    );
    let store = Arc::new(JsonCheckpointStore::new(layout));
    let use_case = ClassifySpeciesUseCase::new(classifier, store);

    let report = GroupingReportWriter::open(&layout.grouping_report()).with_context(|| {
        format!("Failed to open {}", layout.grouping_report().display())
    })?;
    let bars = ProgressReporter::new();
    let display: &dyn ClassificationProgress = if quiet {
        &NoProgress
    } else if config.output.progress {
        &bars
    } else {
        &SimpleProgress
    };
    let progress = CompositeProgress::new(vec![display, &report as &dyn ClassificationProgress]);

    let input = ClassifySpeciesInput::new(hierarchy.root, registry).with_params(params);
    let output = use_case
        .execute_with_progress(input, &progress)
        .await
        .context("Classification failed")?;

    write_json(&layout.grouping(), &output.registry.to_template_value())
        .await
        .context("Failed to write the group registry")?;

    if !quiet {
        println!(
            "{}",
            ConsoleFormatter::format_classification(&output.summary, output.registry.len())
        );
    }
    Ok(())
}

/// Load the reference groups for `source`. GeoJSON synthesis falls back to
/// the default template when it fails.
async fn load_registry(
    config: &FileConfig,
    layout: &RunLayout,
    source: TemplateSource,
    gateway: Arc<HttpLlmGateway>,
    model: Model,
    logger: Arc<dyn ConversationLogger>,
) -> Result<ReferenceGroupRegistry> {
    let loader = TemplateLoader::new(&config.classification.template_path, layout.clone());

    if source == TemplateSource::Geojson {
        match synthesize_template(config, layout, &loader, gateway, model, logger).await {
            Ok(registry) => return Ok(registry),
            Err(e) => {
                warn!("Template synthesis failed ({:#}), using the default template", e);
                return loader
                    .load(TemplateSource::Default, None)
                    .await
                    .context("Failed to load the default grouping template");
            }
        }
    }

    let upload = config.classification.upload_path.as_deref().map(Path::new);
    loader
        .load(source, upload)
        .await
        .with_context(|| format!("Failed to load the {} grouping template", source))
}

async fn synthesize_template(
    config: &FileConfig,
    layout: &RunLayout,
    loader: &TemplateLoader,
    gateway: Arc<HttpLlmGateway>,
    model: Model,
    logger: Arc<dyn ConversationLogger>,
) -> Result<ReferenceGroupRegistry> {
    let geojson_path = layout.geojson();
    let geojson: Value = read_json(&geojson_path)
        .await
        .with_context(|| format!("Failed to read {}", geojson_path.display()))?
        .with_context(|| format!("{} not found", geojson_path.display()))?;
    let bbox = BoundingBox::from_geojson(&geojson)?;

    let reference = match loader.load(TemplateSource::Default, None).await {
        Ok(registry) => registry,
        Err(e) => {
            warn!("No reference groups for synthesis: {}", e);
            ReferenceGroupRegistry::new()
        }
    };

    let input = SynthesizeTemplateInput::new(bbox, reference)
        .with_research_focus(config.classification.research_focus.clone())
        .with_proposals(config.classification.proposals);
    let template = SynthesizeTemplateUseCase::new(gateway, model)
        .with_logger(logger)
        .execute(input)
        .await?;

    let groups = template.registry.to_template_value();
    write_json(&layout.grouping_template(), &groups).await?;
    write_json(
        &layout.ai_reference_groups(),
        &json!({
            "area": template.area,
            "bounding_box": bbox,
            "proposals": template.proposals,
            "template": groups,
        }),
    )
    .await?;

    Ok(template.registry)
}

async fn validate(config: &FileConfig, base_dir: PathBuf, quiet: bool) -> Result<()> {
    let runner = match &config.validation.command {
        Some(command) => ProcessIterationRunner::from_command(command),
        None => ProcessIterationRunner::current_exe(),
    }
    .context("Failed to locate the classification command")?
    .with_fatal_markers(config.validation.fatal_markers.clone());
    info!("Iterations run {}", runner.program().display());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping workers");
            on_signal.cancel();
        }
    });

    let bars = ProgressReporter::new();
    let progress: &dyn ValidationProgress = if quiet {
        &NoValidationProgress
    } else if config.output.progress {
        &bars
    } else {
        &SimpleProgress
    };

    let input = RunValidationInput::new(base_dir)
        .with_required_files(config.validation.required_files.clone())
        .with_params(config.validation.to_params());
    let metadata = RunValidationUseCase::new(Arc::new(runner))
        .execute_with_progress(input, cancel, progress)
        .await
        .context("Validation failed")?;

    let parent = Path::new(&metadata.base_dir)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let path = write_metadata(parent, &metadata)
        .await
        .context("Failed to write validation metadata")?;
    info!("Validation metadata written to {}", path.display());

    if !quiet {
        println!("{}", ConsoleFormatter::format_validation(&metadata));
    }
    Ok(())
}

async fn analyze(
    config: &FileConfig,
    regions: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let (thresholds, _) = config.analysis.to_thresholds();
    let use_case = AnalyzeValidationUseCase::new(Arc::new(FsIterationReader::new()));
    let report = use_case
        .execute(AnalyzeValidationInput::new(regions).with_thresholds(thresholds))
        .context("Analysis failed")?;

    let text = match (format, &output) {
        (OutputFormat::Json, _) => ConsoleFormatter::format_json(&report),
        (OutputFormat::Text, Some(_)) => ConsoleFormatter::format_report_plain(&report),
        (OutputFormat::Text, None) => ConsoleFormatter::format_report(&report),
    };

    match output {
        Some(path) => {
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                println!("Report written to {}", path.display());
            }
        }
        None => println!("{}", text),
    }
    Ok(())
}
