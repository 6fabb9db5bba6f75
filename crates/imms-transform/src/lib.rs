#![deny(unsafe_code)]

//! Row-level transformation of the mapped extract.
//!
//! - [`schema`]: required-column check and coercion into `StudentRow`
//! - [`identifier`]: deterministic school/board identifiers
//! - [`history`]: vaccination history tokenizer and grouping
//! - [`due`]: overdue-disease display mapping
//! - [`dates`]: date parsing and localized display

pub mod dates;
pub mod due;
pub mod error;
pub mod history;
pub mod identifier;
pub mod schema;

pub use dates::{age_on, format_display_date, parse_date, parse_history_date};
pub use due::{DueMapper, VaccinesDue};
pub use error::{Result, TransformError};
pub use history::{HistoryProcessor, HistoryToken, OTHER_DISEASE, mark_unspecified, tokenize_history};
pub use identifier::{BOARD_PREFIX, SCHOOL_PREFIX, synthesize_identifier};
pub use schema::{canonical_key, ensure_required_columns, normalize_rows};
