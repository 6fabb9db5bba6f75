#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use imms_ingest::{ExtractFormat, ExtractTable, read_csv_extract, read_sheet};
use imms_model::Facility;

use crate::error::{Result, StandardsError};
use crate::hash::sha256_file;

/// Worksheet holding the facility listing in the PHIX workbook.
pub const PHIX_SHEET_NAME: &str = "Schools & Day Cares";

/// Uppercase, trim, and collapse internal whitespace.
pub fn normalize_facility_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// PHU column labels compare the same way facility names do.
pub fn normalize_phu_label(label: &str) -> String {
    normalize_facility_name(label)
}

/// Canonical facility reference, immutable once built.
///
/// Exact lookups go through `by_name`, keyed by normalized name; when more
/// than one PHU lists a name the first loaded facility wins. `names` keeps
/// the same keys in first-seen order for fuzzy search.
#[derive(Debug, Clone, Default)]
pub struct FacilityRegistry {
    facilities: Vec<Facility>,
    by_name: BTreeMap<String, usize>,
    names: Vec<String>,
    phus: Vec<String>,
}

impl FacilityRegistry {
    pub fn from_facilities<I>(facilities: I) -> Self
    where
        I: IntoIterator<Item = Facility>,
    {
        let mut registry = Self::default();
        for facility in facilities {
            registry.push(facility);
        }
        registry
    }

    /// Build from a table whose headers are PHU names and whose cells are
    /// `"FACILITY NAME - ID"` entries. Columns are read left to right.
    pub fn from_table(table: &ExtractTable) -> Self {
        let mut registry = Self::default();
        for (idx, phu) in table.headers.iter().enumerate() {
            registry.phus.push(phu.clone());
            for cell in table.column_values(idx) {
                if let Some(facility) = Facility::parse_entry(cell, phu) {
                    registry.push(facility);
                }
            }
        }
        registry
    }

    /// Load the reference workbook (or a CSV with the same layout).
    pub fn load(path: &Path, sheet: &str) -> Result<Self> {
        if !path.exists() {
            return Err(StandardsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let table = match ExtractFormat::from_path(path)? {
            ExtractFormat::Csv => read_csv_extract(path)?,
            ExtractFormat::Spreadsheet => read_sheet(path, Some(sheet))?,
        };
        let registry = Self::from_table(&table);
        tracing::info!(
            path = %path.display(),
            sha256 = %sha256_file(path)?,
            facilities = registry.facilities.len(),
            phus = registry.phus.len(),
            "loaded PHIX reference"
        );
        Ok(registry)
    }

    fn push(&mut self, facility: Facility) {
        let idx = self.facilities.len();
        let key = normalize_facility_name(&facility.name);
        if !self.phus.contains(&facility.phu) {
            self.phus.push(facility.phu.clone());
        }
        if !self.by_name.contains_key(&key) {
            self.by_name.insert(key.clone(), idx);
            self.names.push(key);
        }
        self.facilities.push(facility);
    }

    /// Exact lookup by already-normalized name.
    pub fn lookup(&self, normalized: &str) -> Option<&Facility> {
        self.by_name.get(normalized).map(|&idx| &self.facilities[idx])
    }

    /// Normalized facility names in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn phus(&self) -> &[String] {
        &self.phus
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Restrict the registry to facilities listed under the given PHUs.
    ///
    /// Labels compare after [`normalize_phu_label`]. An empty request returns
    /// a copy of the full registry.
    pub fn scoped(&self, phus: &[String]) -> Result<Self> {
        if phus.is_empty() {
            return Ok(self.clone());
        }
        let wanted: BTreeSet<String> = phus.iter().map(|p| normalize_phu_label(p)).collect();
        if !self
            .phus
            .iter()
            .any(|p| wanted.contains(&normalize_phu_label(p)))
        {
            return Err(StandardsError::UnknownPhu {
                requested: phus.join(", "),
            });
        }
        Ok(Self::from_facilities(
            self.facilities
                .iter()
                .filter(|f| wanted.contains(&normalize_phu_label(&f.phu)))
                .cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExtractTable {
        ExtractTable::new(
            vec!["Ottawa PHU".into(), "Toronto PHU".into()],
            vec![
                vec!["Lincoln Elementary School - 111".into(), "Apple School - 201".into()],
                vec!["St. Mary - North - 112".into(), "LINCOLN  elementary school - 202".into()],
                vec![String::new(), "Zebra School - 203".into()],
            ],
        )
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_facility_name("  Lincoln\t Elementary  "), "LINCOLN ELEMENTARY");
    }

    #[test]
    fn first_loaded_facility_wins_exact_lookup() {
        let registry = FacilityRegistry::from_table(&table());
        let hit = registry.lookup("LINCOLN ELEMENTARY SCHOOL").unwrap();
        assert_eq!(hit.phix_id, "111");
        assert_eq!(hit.phu, "Ottawa PHU");
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.names().len(), 4);
        assert_eq!(registry.lookup("ST. MARY - NORTH").unwrap().phix_id, "112");
    }

    #[test]
    fn scoped_keeps_only_requested_phus() {
        let registry = FacilityRegistry::from_table(&table());
        let scoped = registry.scoped(&["toronto  phu".to_string()]).unwrap();
        assert_eq!(scoped.lookup("LINCOLN ELEMENTARY SCHOOL").unwrap().phix_id, "202");
        assert!(scoped.lookup("ST. MARY - NORTH").is_none());

        let err = registry.scoped(&["Nowhere".to_string()]).unwrap_err();
        assert!(matches!(err, StandardsError::UnknownPhu { .. }));
    }
}
