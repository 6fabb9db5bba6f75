use thiserror::Error;

use imms_ingest::IngestError;
use imms_report::ReportError;
use imms_standards::StandardsError;
use imms_transform::TransformError;
use imms_validate::FacilityError;

use crate::config::ConfigError;

/// Any fatal condition that aborts a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Standards(#[from] StandardsError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("vaccination history for client {client_id}: {source}")]
    History {
        client_id: String,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Facility(#[from] FacilityError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
