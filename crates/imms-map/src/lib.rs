#![deny(unsafe_code)]

//! Fuzzy scoring and the extract column mapper.

pub mod columns;
pub mod score;

pub use columns::{
    COLUMN_MATCH_THRESHOLD, ColumnDecision, ColumnMapper, ColumnMapping, ColumnStatus,
    normalize_column_name,
};
pub use score::{best_match, partial_ratio, ratio};
