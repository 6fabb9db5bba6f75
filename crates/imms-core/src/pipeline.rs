//! End-to-end preprocessing run with explicit stages.
//!
//! 1. **Ingest**: read the CSV or spreadsheet extract
//! 2. **Map**: fuzzy-map headers onto the canonical columns
//! 3. **Normalize**: check required columns, coerce rows
//! 4. **Facility**: resolve school names against the PHIX reference
//! 5. **Build**: identifiers, sort, sequence, client records
//! 6. **Batch**: partition the sequenced clients
//! 7. **Output**: artifact and batch files (skipped on dry runs)

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use imms_ingest::{ExtractTable, read_extract};
use imms_map::{ColumnMapper, ColumnMapping};
use imms_model::{Language, StudentRow};
use imms_report::{ArtifactPayload, write_artifact, write_batches};
use imms_standards::{DiseaseMap, FacilityRegistry, RegistryCache, VaccineReference};
use imms_transform::normalize_rows;
use imms_validate::{FacilityResolver, Resolution};
use tracing::info_span;

use crate::batcher::Batcher;
use crate::builder::ClientRecordBuilder;
use crate::config::PipelineConfig;
use crate::error::Result;

/// Counts and paths describing a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub language: Language,
    pub input_rows: usize,
    pub clients: usize,
    pub facilities_matched: usize,
    pub facilities_unmatched: usize,
    pub batches: usize,
    pub warnings: Vec<String>,
    pub artifact: Option<PathBuf>,
    pub batch_files: Vec<PathBuf>,
    pub unmatched_report: Option<PathBuf>,
    pub dry_run: bool,
}

/// Default run identifier: the UTC start time, e.g. `20250102T030405`.
pub fn default_run_id(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%S").to_string()
}

/// Read an extract and report how its headers would be mapped.
pub fn inspect_columns(input: &Path) -> Result<ColumnMapping> {
    let table = read_extract(input)?;
    Ok(ColumnMapper::new().map_headers(&table.headers))
}

/// One configured preprocessing run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Run every stage but write no artifact or batch files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process `input` end to end.
    ///
    /// The facility reference is loaded through `cache`, so repeated runs
    /// against the same workbook read it once.
    pub fn run(&self, input: &Path, cache: &mut RegistryCache) -> Result<RunSummary> {
        let config = &self.config;
        let started = Utc::now();
        let run_id = config
            .pipeline
            .run_id
            .clone()
            .unwrap_or_else(|| default_run_id(started));
        let language = config.pipeline.language;
        let output_dir = config.pipeline.output_dir.as_path();
        let run_span = info_span!("run", run_id = %run_id, language = %language);
        let _guard = run_span.enter();

        let table = info_span!("ingest").in_scope(|| read_extract(input))?;
        let input_rows = table.len();

        let table = info_span!("map").in_scope(|| self.map_columns(table));
        let rows = info_span!("normalize").in_scope(|| normalize_rows(&table))?;

        let mut warnings = Vec::new();
        let mut facilities_matched = 0;
        let mut facilities_unmatched = 0;
        let mut unmatched_report = None;
        let rows = if config.facility.enabled {
            let _facility = info_span!("facility").entered();
            let resolution = self.resolve_facilities(rows, cache, output_dir)?;
            facilities_unmatched = resolution.unmatched().count();
            facilities_matched = resolution.matches.len() - facilities_unmatched;
            unmatched_report = resolution.unmatched_report;
            warnings.extend(resolution.warnings);
            resolution.rows
        } else {
            tracing::info!("facility resolution disabled");
            rows
        };

        let target_phus: &[String] = if config.facility.enabled {
            &config.facility.target_phus
        } else {
            &[]
        };
        let built = info_span!("build").in_scope(|| -> Result<_> {
            let diseases = DiseaseMap::load(&config.reference.disease_map)?;
            let vaccines = VaccineReference::load(&config.reference.vaccine_reference)?;
            ClientRecordBuilder::new(language, &diseases, &vaccines)
                .with_ignore_agents(&config.notice.ignore_agents)
                .with_chart_diseases(&config.notice.chart_diseases_header)
                .with_delivery_date(config.notice.date_notice_delivery)
                .with_target_phus(target_phus)
                .build(rows)
        })?;
        let warnings = merge_warnings(warnings, built.warnings);
        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "run finished with warnings");
        }

        let batches = if config.batching_enabled() {
            info_span!("batch").in_scope(|| {
                Batcher::new(config.batching.group_by, config.batching.batch_size)
                    .plan(&built.clients)
            })
        } else {
            tracing::debug!("batching disabled");
            Vec::new()
        };

        let (artifact, batch_files) = if self.dry_run {
            tracing::info!("dry run, skipping artifact and batch output");
            (None, Vec::new())
        } else {
            let _output = info_span!("output").entered();
            let payload =
                ArtifactPayload::new(&run_id, language, started, &built.clients, &warnings);
            let artifact = write_artifact(output_dir, &payload)?;
            let files = write_batches(output_dir, &run_id, language, started, &batches)?;
            (Some(artifact), files)
        };

        Ok(RunSummary {
            run_id,
            language,
            input_rows,
            clients: built.clients.len(),
            facilities_matched,
            facilities_unmatched,
            batches: batches.len(),
            warnings,
            artifact,
            batch_files,
            unmatched_report,
            dry_run: self.dry_run,
        })
    }

    fn map_columns(&self, table: ExtractTable) -> ExtractTable {
        if !self.config.pipeline.map_columns {
            return table;
        }
        let mapping = ColumnMapper::new().map_headers(&table.headers);
        for line in mapping.report().lines() {
            tracing::debug!("{line}");
        }
        let dropped = mapping.dropped().count();
        if dropped > 0 {
            tracing::info!(dropped, "unmapped extract columns dropped");
        }
        mapping.apply(&table)
    }

    fn resolve_facilities(
        &self,
        rows: Vec<StudentRow>,
        cache: &mut RegistryCache,
        output_dir: &Path,
    ) -> Result<Resolution> {
        let facility = &self.config.facility;
        let reference = &self.config.reference;
        let registry = cache.get_or_load(&reference.phix_reference, &reference.phix_sheet)?;
        let registry: Cow<'_, FacilityRegistry> = if facility.target_phus.is_empty() {
            Cow::Borrowed(registry)
        } else {
            Cow::Owned(registry.scoped(&facility.target_phus)?)
        };
        let resolver = FacilityResolver::new(&registry)
            .with_strategy(facility.strategy)
            .with_threshold(facility.threshold)?;
        Ok(resolver.resolve(rows, facility.unmatched, Some(output_dir))?)
    }
}

/// Concatenate warning lists, keeping the first occurrence of each.
fn merge_warnings(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}
