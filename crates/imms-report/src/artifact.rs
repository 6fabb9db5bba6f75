use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use imms_model::{Batch, BatchStrategy, ClientRecord, Language};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

pub const ARTIFACTS_DIR: &str = "artifacts";
pub const BATCHES_DIR: &str = "batches";

/// The preprocessed client artifact consumed by notice generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPayload<'a> {
    pub run_id: Cow<'a, str>,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
    pub total_clients: usize,
    pub clients: Cow<'a, [ClientRecord]>,
    pub warnings: Cow<'a, [String]>,
}

impl<'a> ArtifactPayload<'a> {
    pub fn new(
        run_id: &'a str,
        language: Language,
        generated_at: DateTime<Utc>,
        clients: &'a [ClientRecord],
        warnings: &'a [String],
    ) -> Self {
        Self {
            run_id: Cow::Borrowed(run_id),
            language,
            generated_at,
            total_clients: clients.len(),
            clients: Cow::Borrowed(clients),
            warnings: Cow::Borrowed(warnings),
        }
    }
}

/// One batch file: batch metadata plus its ordered members.
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub run_id: &'a str,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
    pub strategy: BatchStrategy,
    pub group_key: Option<&'a str>,
    pub batch_number: usize,
    pub total_batches: usize,
    pub total_clients: usize,
    pub clients: &'a [&'a ClientRecord],
}

pub fn artifact_path(output_dir: &Path, run_id: &str) -> PathBuf {
    output_dir
        .join(ARTIFACTS_DIR)
        .join(format!("preprocessed_clients_{run_id}.json"))
}

/// Write the artifact as pretty-printed JSON and return its path.
pub fn write_artifact(output_dir: &Path, payload: &ArtifactPayload<'_>) -> Result<PathBuf> {
    let path = artifact_path(output_dir, &payload.run_id);
    write_json(&path, payload)?;
    tracing::info!(
        path = %path.display(),
        clients = payload.total_clients,
        warnings = payload.warnings.len(),
        "wrote client artifact"
    );
    Ok(path)
}

/// Read a previously written artifact.
pub fn read_artifact(path: &Path) -> Result<ArtifactPayload<'static>> {
    let bytes = std::fs::read(path).map_err(|e| ReportError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one JSON file per batch under `batches/`, named
/// `<language>_<batch name>.json`.
pub fn write_batches(
    output_dir: &Path,
    run_id: &str,
    language: Language,
    generated_at: DateTime<Utc>,
    batches: &[Batch<'_>],
) -> Result<Vec<PathBuf>> {
    let dir = output_dir.join(BATCHES_DIR);
    let mut paths = Vec::with_capacity(batches.len());
    for batch in batches {
        let path = dir.join(format!("{}_{}.json", language.code(), batch.name));
        let payload = BatchPayload {
            run_id,
            language,
            generated_at,
            strategy: batch.strategy,
            group_key: batch.group_key.as_deref(),
            batch_number: batch.batch_number,
            total_batches: batch.total_batches,
            total_clients: batch.members.len(),
            clients: &batch.members,
        };
        write_json(&path, &payload)?;
        paths.push(path);
    }
    tracing::info!(dir = %dir.display(), batches = paths.len(), "wrote batch files");
    Ok(paths)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).map_err(|e| ReportError::io(path, e))
}
