#![deny(unsafe_code)]

//! Configuration, client record building, batching and the end-to-end
//! preprocessing pipeline.

pub mod batcher;
pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;

pub use batcher::{Batcher, slugify};
pub use builder::{BuildOutput, ClientRecordBuilder, OVER_16_AGE, POSTAL_CODE_PLACEHOLDER};
pub use config::{
    BatchingSection, CONFIG_FILENAME, ConfigError, FacilitySection, NoticeSection,
    PipelineConfig, PipelineSection, ReferenceSection, default_ignore_agents,
};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary, default_run_id, inspect_columns};
