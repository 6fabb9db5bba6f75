//! Spreadsheet reading (`.xlsx` / `.xls`) through calamine.

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveTime;

use crate::error::{IngestError, Result};
use crate::table::{ExtractTable, normalize_cell, normalize_header};

/// Read one worksheet into an [`ExtractTable`].
///
/// With `sheet = None` the first worksheet is used. The first non-blank row
/// becomes the header.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<ExtractTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
            })?,
        None => names.first().cloned().ok_or_else(|| IngestError::Empty {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .skip_while(|row| row.iter().all(String::is_empty));
    let Some(header_row) = rows.next() else {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    };
    let headers = header_row.iter().map(|h| normalize_header(h)).collect();
    tracing::debug!(path = %path.display(), sheet = %sheet_name, "read worksheet");
    Ok(ExtractTable::new(headers, rows.collect()))
}

/// Render a cell as text; dates become ISO strings.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => dt.date().format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => normalize_cell(&cell.to_string()),
        },
        other => normalize_cell(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_render_without_trailing_zero() {
        assert_eq!(cell_text(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("  Lincoln ".into())), "Lincoln");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn missing_workbook_is_not_found() {
        let err = read_sheet(Path::new("/nonexistent/ref.xlsx"), None).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
