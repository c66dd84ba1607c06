use crate::cli::{configure_thread_pool, get_worker_count};
use crate::config::{self, OoMetricsConfig};
use crate::core::{Error, Result as CoreResult};
use crate::io::output::{create_writer, AnalysisReport, OutputFormat};
use crate::metrics::{analyze_universe, AnalysisOptions, HidingScope, DEFAULT_ROOT_TYPE};
use crate::provider::{open_provider, SourceKind};
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// `analyze` options as given on the command line, before the config file
/// fills in what was left out.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub path: PathBuf,
    pub source: Option<SourceKind>,
    pub package: Option<String>,
    pub scope: Option<HidingScope>,
    pub root_type: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub no_parallel: bool,
    pub plain: bool,
    pub config: Option<PathBuf>,
}

/// Fully resolved `analyze` settings.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub source: SourceKind,
    pub package: Option<String>,
    pub options: AnalysisOptions,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    /// Worker threads, 0 for all cores
    pub jobs: usize,
    pub plain: bool,
}

impl AnalyzeConfig {
    /// Merge command-line arguments over the file configuration.
    pub fn resolve(args: AnalyzeArgs, file: &OoMetricsConfig) -> Self {
        let use_color = file.output.use_color;
        let plain = args.plain
            || use_color == Some(false)
            || (use_color.is_none() && args.output.is_none() && !std::io::stdout().is_terminal());

        Self {
            source: args.source.or(file.analysis.source).unwrap_or_default(),
            package: args.package.or_else(|| file.analysis.package.clone()),
            options: AnalysisOptions {
                scope: args.scope.or(file.analysis.scope).unwrap_or_default(),
                root_type: args
                    .root_type
                    .or_else(|| file.analysis.root_type.clone())
                    .unwrap_or_else(|| DEFAULT_ROOT_TYPE.to_string()),
                parallel: !args.no_parallel && file.parallel.enabled,
            },
            format: args.format.or(file.output.default_format).unwrap_or_default(),
            jobs: args.jobs.or(file.parallel.jobs).unwrap_or(0),
            path: args.path,
            output: args.output,
            plain,
        }
    }
}

/// Load `--config` strictly, or the nearest `.oometrics.toml` leniently.
pub fn load_file_config(explicit: Option<&Path>) -> CoreResult<OoMetricsConfig> {
    match explicit {
        Some(path) => config::load_config_from(path),
        None => Ok(config::load_config()),
    }
}

/// Read the universe and compute its metrics.
pub fn run_analysis(config: &AnalyzeConfig) -> CoreResult<AnalysisReport> {
    let _span = info_span!("analyze", path = %config.path.display()).entered();

    let provider = open_provider(&config.path, config.source, config.package.as_deref());
    let (universe, warnings) = provider.provide()?.into_universe();
    for warning in &warnings {
        warn!(entry = %warning.entry, "{}", warning.message);
    }
    info!(
        classes = universe.len(),
        warnings = warnings.len(),
        "Universe loaded"
    );

    let metrics = analyze_universe(&universe, &config.options)?;
    Ok(AnalysisReport {
        source: config.path.display().to_string(),
        metrics,
        warnings,
    })
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    if config.options.parallel {
        configure_thread_pool(config.jobs);
        info!(workers = get_worker_count(config.jobs), "Parallel evaluation");
    }

    let report = run_analysis(&config).map_err(|e| match e {
        Error::EmptyUniverse => anyhow::anyhow!("No classes found in {}", config.path.display()),
        other => anyhow::Error::new(other),
    })?;

    let mut writer = create_writer(config.format, config.output.as_deref(), config.plain)
        .context("Failed to open output")?;
    writer.write_report(&report)?;
    Ok(())
}
