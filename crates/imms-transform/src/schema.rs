//! Required-column validation and row normalization.

use std::collections::BTreeMap;

use imms_ingest::ExtractTable;
use imms_model::{REQUIRED_COLUMNS, StudentRow};

use crate::dates::parse_date;
use crate::error::{Result, TransformError};

/// Uppercase and trim a header, then replace spaces with underscores.
/// `PROVINCE/TERRITORY` becomes `PROVINCE`.
pub fn canonical_key(header: &str) -> String {
    let key = header.trim().to_uppercase().replace(' ', "_");
    if key == "PROVINCE/TERRITORY" {
        "PROVINCE".to_string()
    } else {
        key
    }
}

/// Column positions keyed by [`canonical_key`]; the first occurrence wins.
struct ColumnIndex {
    positions: BTreeMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &[String]) -> Self {
        let mut positions = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            positions.entry(canonical_key(header)).or_insert(idx);
        }
        Self { positions }
    }

    /// Trimmed cell text; absent columns read as empty.
    fn text(&self, row: &[String], key: &str) -> String {
        self.positions
            .get(key)
            .and_then(|&idx| row.get(idx))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }
}

/// Fail unless every required column is present.
///
/// Headers compare after trimming and uppercasing.
pub fn ensure_required_columns(headers: &[String]) -> Result<()> {
    let found: Vec<String> = headers.iter().map(|h| h.trim().to_uppercase()).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !found.iter().any(|h| h == *required))
        .map(|required| (*required).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns { missing, found })
    }
}

fn parse_age(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|age| age.is_finite())
}

/// Validate the mapped extract and coerce every row into a [`StudentRow`].
///
/// Unparsable dates of birth become `None` and are left for the record
/// builder to flag. Columns the extract lacks read as empty strings.
pub fn normalize_rows(table: &ExtractTable) -> Result<Vec<StudentRow>> {
    ensure_required_columns(&table.headers)?;
    let index = ColumnIndex::new(&table.headers);

    let rows: Vec<StudentRow> = table
        .rows
        .iter()
        .map(|row| {
            let dob_raw = index.text(row, "DATE_OF_BIRTH");
            StudentRow {
                school_name: index.text(row, "SCHOOL_NAME"),
                client_id: index.text(row, "CLIENT_ID"),
                first_name: index.text(row, "FIRST_NAME"),
                last_name: index.text(row, "LAST_NAME"),
                date_of_birth: parse_date(&dob_raw),
                date_of_birth_raw: dob_raw,
                age: parse_age(&index.text(row, "AGE")),
                city: index.text(row, "CITY"),
                postal_code: index.text(row, "POSTAL_CODE"),
                province: index.text(row, "PROVINCE"),
                overdue_disease: index.text(row, "OVERDUE_DISEASE"),
                imms_given: index.text(row, "IMMS_GIVEN"),
                street_address_line_1: index.text(row, "STREET_ADDRESS_LINE_1"),
                street_address_line_2: index.text(row, "STREET_ADDRESS_LINE_2"),
                school_id: index.text(row, "SCHOOL_ID"),
                school_type: index.text(row, "SCHOOL_TYPE"),
                board_id: index.text(row, "BOARD_ID"),
                board_name: index.text(row, "BOARD_NAME"),
                unique_id: index.text(row, "UNIQUE_ID"),
                facility: None,
            }
        })
        .collect();

    let unparsable = rows
        .iter()
        .filter(|r| r.date_of_birth.is_none() && !r.date_of_birth_raw.is_empty())
        .count();
    if unparsable > 0 {
        tracing::warn!(rows = unparsable, "unparsable dates of birth treated as missing");
    }
    tracing::debug!(rows = rows.len(), "normalized extract rows");
    Ok(rows)
}
