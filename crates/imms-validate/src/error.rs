use thiserror::Error;

use imms_report::ReportError;

/// Names listed in an unmatched-facility error before the overflow count.
pub const MAX_LISTED_UNMATCHED: usize = 10;

#[derive(Debug, Error)]
pub enum FacilityError {
    #[error(
        "{} facilities not found in PHIX reference: {}",
        .names.len(),
        list_names(.names)
    )]
    Unmatched { names: Vec<String> },

    #[error("fuzzy threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(u8),

    #[error(transparent)]
    Report(#[from] ReportError),
}

fn list_names(names: &[String]) -> String {
    let mut listed = names
        .iter()
        .take(MAX_LISTED_UNMATCHED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > MAX_LISTED_UNMATCHED {
        listed.push_str(&format!(" (and {} more)", names.len() - MAX_LISTED_UNMATCHED));
    }
    listed
}

pub type Result<T> = std::result::Result<T, FacilityError>;
