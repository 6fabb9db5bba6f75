//! Pipeline configuration loaded from `parameters.toml`.
//!
//! Every table and field is optional; missing values take the defaults
//! below. Relative paths are resolved against the directory holding the
//! configuration file.
//!
//! ```toml
//! [pipeline]
//! language = "en"
//! output_dir = "output"
//!
//! [reference]
//! disease_map = "config/disease_map.json"
//! vaccine_reference = "config/vaccine_reference.json"
//! phix_reference = "config/phix_reference.xlsx"
//!
//! [facility]
//! strategy = "fuzzy"
//! threshold = 85
//! unmatched = "warn"
//! target_phus = []
//!
//! [batching]
//! batch_size = 100
//! group_by = "school"
//!
//! [notice]
//! date_notice_delivery = "2025-09-02"
//! chart_diseases_header = ["Measles", "Mumps", "Rubella"]
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use imms_model::{BatchStrategy, Language, MatchStrategy, UnmatchedPolicy};
use imms_standards::PHIX_SHEET_NAME;
use imms_validate::DEFAULT_FUZZY_THRESHOLD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "parameters.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub language: Language,
    pub output_dir: PathBuf,
    /// Fixed run identifier; a UTC timestamp is used when absent.
    pub run_id: Option<String>,
    /// Fuzzy-map extract headers onto the canonical columns before validation.
    pub map_columns: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            language: Language::English,
            output_dir: PathBuf::from("output"),
            run_id: None,
            map_columns: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSection {
    pub disease_map: PathBuf,
    pub vaccine_reference: PathBuf,
    pub phix_reference: PathBuf,
    pub phix_sheet: String,
}

impl Default for ReferenceSection {
    fn default() -> Self {
        Self {
            disease_map: PathBuf::from("config/disease_map.json"),
            vaccine_reference: PathBuf::from("config/vaccine_reference.json"),
            phix_reference: PathBuf::from("config/phix_reference.xlsx"),
            phix_sheet: PHIX_SHEET_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitySection {
    /// Resolve school names against the PHIX reference.
    pub enabled: bool,
    pub strategy: MatchStrategy,
    pub threshold: u8,
    pub unmatched: UnmatchedPolicy,
    /// Restrict matching to facilities listed under these health units.
    pub target_phus: Vec<String>,
}

impl Default for FacilitySection {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: MatchStrategy::default(),
            threshold: DEFAULT_FUZZY_THRESHOLD,
            unmatched: UnmatchedPolicy::default(),
            target_phus: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingSection {
    /// Members per batch; 0 disables batching.
    pub batch_size: usize,
    pub group_by: BatchStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeSection {
    /// Reference date for the over-16 check when AGE is absent.
    pub date_notice_delivery: Option<NaiveDate>,
    /// Diseases charted individually; others collapse into "Other".
    pub chart_diseases_header: Vec<String>,
    /// Received agents dropped from the vaccination history.
    pub ignore_agents: Vec<String>,
}

impl Default for NoticeSection {
    fn default() -> Self {
        Self {
            date_notice_delivery: None,
            chart_diseases_header: Vec::new(),
            ignore_agents: default_ignore_agents(),
        }
    }
}

pub fn default_ignore_agents() -> Vec<String> {
    [
        "-unspecified",
        "unspecified",
        "Not Specified",
        "Not specified",
        "Not Specified-unspecified",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub reference: ReferenceSection,
    pub facility: FacilitySection,
    pub batching: BatchingSection,
    pub notice: NoticeSection,
}

impl PipelineConfig {
    /// Read, validate, and resolve paths of a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Load `path` when given, else `parameters.toml` in `dir` if present,
    /// else the defaults resolved against `dir`.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        tracing::info!(dir = %dir.display(), "no config file found, using defaults");
        let mut config = Self::default();
        config.resolve_paths(dir);
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Make every relative path absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.pipeline.output_dir,
            &mut self.reference.disease_map,
            &mut self.reference.vaccine_reference,
            &mut self.reference.phix_reference,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.facility.threshold > 100 {
            return Err(ConfigError::invalid(
                "facility.threshold",
                format!("must be between 0 and 100, got {}", self.facility.threshold),
            ));
        }
        if self.batching.batch_size == 0 && self.batching.group_by != BatchStrategy::Size {
            tracing::warn!(
                group_by = %self.batching.group_by,
                "batching.group_by has no effect while batch_size is 0"
            );
        }
        if let Some(run_id) = &self.pipeline.run_id
            && (run_id.trim().is_empty() || run_id.contains(['/', '\\']))
        {
            return Err(ConfigError::invalid(
                "pipeline.run_id",
                format!("'{run_id}' is not usable in a file name"),
            ));
        }
        if self.reference.phix_sheet.trim().is_empty() {
            return Err(ConfigError::invalid("reference.phix_sheet", "must not be empty"));
        }
        Ok(())
    }

    pub fn batching_enabled(&self) -> bool {
        self.batching.batch_size > 0
    }
}
