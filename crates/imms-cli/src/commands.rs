use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use imms_core::{Pipeline, PipelineConfig, RunSummary, inspect_columns};
use imms_map::ColumnMapping;
use imms_standards::RegistryCache;

use crate::cli::{MapColumnsArgs, RunArgs};
use crate::logging::redact_value;

/// Resolve the configuration and apply command-line overrides.
pub fn resolve_config(args: &RunArgs, cwd: &Path) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::discover(args.config.as_deref(), cwd)
        .context("load pipeline configuration")?;
    if let Some(language) = args.language {
        config.pipeline.language = language.into();
    }
    if let Some(dir) = &args.output_dir {
        config.pipeline.output_dir = cwd.join(dir);
    }
    if let Some(run_id) = &args.run_id {
        config.pipeline.run_id = Some(run_id.clone());
    }
    config.validate().context("validate pipeline configuration")?;
    Ok(config)
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunSummary> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = resolve_config(args, &cwd)?;
    let span = info_span!("imms_run", input = %args.input.display());
    let _guard = span.enter();
    info!(
        language = %config.pipeline.language,
        output_dir = %config.pipeline.output_dir.display(),
        dry_run = args.dry_run,
        "starting run"
    );

    let mut cache = RegistryCache::new();
    let summary = Pipeline::new(config)
        .with_dry_run(args.dry_run)
        .run(&args.input, &mut cache)
        .with_context(|| format!("process {}", args.input.display()))?;

    for warning in &summary.warnings {
        debug!(warning = %redact_value(warning), "run warning");
    }
    info!(
        clients = summary.clients,
        batches = summary.batches,
        warnings = summary.warnings.len(),
        "run complete"
    );
    Ok(summary)
}

pub fn run_map_columns(args: &MapColumnsArgs) -> Result<ColumnMapping> {
    inspect_columns(&args.input).with_context(|| format!("read {}", args.input.display()))
}
