#![deny(unsafe_code)]

//! Extract ingestion.
//!
//! Reads the raw per-student extract (CSV or spreadsheet) into an
//! [`ExtractTable`] of trimmed text cells. No column semantics are applied
//! here; see `imms-map` and `imms-transform`.

pub mod csv_reader;
pub mod error;
pub mod sheet;
pub mod table;

use std::path::Path;

pub use csv_reader::{DetectedEncoding, decode_bytes, read_csv_extract, sniff_delimiter};
pub use error::{IngestError, Result};
pub use sheet::read_sheet;
pub use table::ExtractTable;

/// Supported extract formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFormat {
    Csv,
    Spreadsheet,
}

impl ExtractFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(ExtractFormat::Csv),
            "xlsx" | "xls" => Ok(ExtractFormat::Spreadsheet),
            _ => Err(IngestError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }
}

/// Read an extract file, dispatching on its extension.
pub fn read_extract(path: &Path) -> Result<ExtractTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let table = match ExtractFormat::from_path(path)? {
        ExtractFormat::Csv => read_csv_extract(path)?,
        ExtractFormat::Spreadsheet => read_sheet(path, None)?,
    };
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers.len(),
        "loaded extract"
    );
    Ok(table)
}
