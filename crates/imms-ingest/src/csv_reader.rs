//! CSV extract reading with encoding fallback and delimiter sniffing.

use std::borrow::Cow;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;

use crate::error::{IngestError, Result};
use crate::table::{ExtractTable, normalize_cell, normalize_header};

/// Delimiters considered when sniffing, in preference order for ties.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Encoding that successfully decoded a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedEncoding {
    Utf8,
    Windows1252,
}

impl DetectedEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedEncoding::Utf8 => "utf-8",
            DetectedEncoding::Windows1252 => "windows-1252",
        }
    }
}

/// Decode raw bytes as UTF-8 (BOM stripped), falling back to Windows-1252.
///
/// The Windows-1252 decoder assigns a code point to every byte, so Latin-1
/// extracts land there too. UTF-16 input is rejected.
pub fn decode_bytes<'a>(path: &Path, bytes: &'a [u8]) -> Result<(Cow<'a, str>, DetectedEncoding)> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::Undecodable {
            path: path.to_path_buf(),
            reason: "UTF-16 input is not supported".to_string(),
        });
    }

    let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(body) {
        return Ok((Cow::Borrowed(text), DetectedEncoding::Utf8));
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(body);
    Ok((Cow::Owned(text.into_owned()), DetectedEncoding::Windows1252))
}

/// Pick the candidate delimiter occurring most often in the header line.
///
/// Quoted sections are ignored. Falls back to `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in header.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|&d| d == byte) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Read a CSV extract into an [`ExtractTable`].
pub fn read_csv_extract(path: &Path) -> Result<ExtractTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::open(path, e))?;
    let (text, encoding) = decode_bytes(path, &bytes)?;
    let delimiter = sniff_delimiter(&text);
    tracing::debug!(
        path = %path.display(),
        encoding = encoding.as_str(),
        delimiter = %char::from(delimiter).escape_default(),
        "decoded CSV extract"
    );
    parse_csv_text(path, &text, delimiter)
}

pub(crate) fn parse_csv_text(path: &Path, text: &str, delimiter: u8) -> Result<ExtractTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        records.push(record.iter().map(normalize_cell).collect::<Vec<_>>());
    }

    let mut iter = records
        .into_iter()
        .skip_while(|row| row.iter().all(String::is_empty));
    let Some(header_row) = iter.next() else {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    };
    let headers = header_row.iter().map(|h| normalize_header(h)).collect();
    Ok(ExtractTable::new(headers, iter.collect()))
}
