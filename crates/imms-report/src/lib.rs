#![deny(unsafe_code)]

//! Output writers: the client artifact, per-batch files and the
//! unmatched-facility CSV.

pub mod artifact;
pub mod error;
pub mod unmatched;

pub use artifact::{
    ARTIFACTS_DIR, ArtifactPayload, BATCHES_DIR, BatchPayload, artifact_path, read_artifact,
    write_artifact, write_batches,
};
pub use error::{ReportError, Result};
pub use unmatched::{UNMATCHED_FACILITIES_FILE, write_unmatched_csv};
