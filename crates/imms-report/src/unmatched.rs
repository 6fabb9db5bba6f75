use std::path::{Path, PathBuf};

use imms_model::FacilityMatch;

use crate::error::{ReportError, Result};

pub const UNMATCHED_FACILITIES_FILE: &str = "unmatched_facilities.csv";

/// Write `facility_name,match_type,confidence` rows for unmatched facilities.
///
/// Matched entries in `matches` are skipped. Returns the file path.
pub fn write_unmatched_csv(output_dir: &Path, matches: &[FacilityMatch]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| ReportError::io(output_dir, e))?;
    let path = output_dir.join(UNMATCHED_FACILITIES_FILE);
    let csv_err = |source| ReportError::Csv {
        path: path.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
    writer
        .write_record(["facility_name", "match_type", "confidence"])
        .map_err(csv_err)?;
    let mut written = 0usize;
    for m in matches.iter().filter(|m| !m.matched) {
        writer
            .write_record([
                m.input_name.as_str(),
                m.match_type.as_str(),
                m.confidence.to_string().as_str(),
            ])
            .map_err(csv_err)?;
        written += 1;
    }
    writer.flush().map_err(|e| ReportError::io(&path, e))?;

    tracing::info!(path = %path.display(), count = written, "wrote unmatched facilities");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use imms_model::Facility;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_only_unmatched_rows() {
        let dir = TempDir::new().unwrap();
        let facility = Facility {
            phix_id: "1".into(),
            name: "Apple School".into(),
            phu: "PHU".into(),
        };
        let matches = vec![
            FacilityMatch::exact("Apple School", &facility),
            FacilityMatch::unmatched("Nowhere, Inc"),
        ];
        let path = write_unmatched_csv(dir.path(), &matches).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "facility_name,match_type,confidence\n\"Nowhere, Inc\",none,0\n"
        );
    }
}
