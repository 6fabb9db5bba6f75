use std::fs;

use imms_standards::{
    DiseaseMap, FacilityRegistry, PHIX_SHEET_NAME, RegistryCache, StandardsError,
    VaccineReference,
};
use tempfile::TempDir;

const REFERENCE_CSV: &str = "\
Ottawa PHU,Toronto PHU
Lincoln Elementary School - 111,Apple School - 201
St. Mary - North - 112,Zebra School - 203
";

#[test]
fn loads_json_references() {
    let dir = TempDir::new().expect("temp dir");
    let disease_path = dir.path().join("disease_map.json");
    let vaccine_path = dir.path().join("vaccine_reference.json");
    fs::write(&disease_path, r#"{"Measles": "Measles (Rougeole)"}"#).expect("write");
    fs::write(&vaccine_path, r#"{"MMR": ["Measles", "Mumps", "Rubella"]}"#).expect("write");

    let diseases = DiseaseMap::load(&disease_path).expect("disease map");
    let vaccines = VaccineReference::load(&vaccine_path).expect("vaccine reference");
    assert_eq!(diseases.len(), 1);
    assert_eq!(vaccines.len(), 1);
}

#[test]
fn malformed_json_names_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("disease_map.json");
    fs::write(&path, "{ not json").expect("write");

    let err = DiseaseMap::load(&path).unwrap_err();
    assert!(matches!(err, StandardsError::Json { .. }));
    assert!(err.to_string().contains("disease_map.json"));
}

#[test]
fn missing_reference_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let err = FacilityRegistry::load(&dir.path().join("phix.xlsx"), PHIX_SHEET_NAME).unwrap_err();
    assert!(matches!(err, StandardsError::NotFound { .. }));
}

#[test]
fn loads_csv_facility_reference() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("phix.csv");
    fs::write(&path, REFERENCE_CSV).expect("write");

    let registry = FacilityRegistry::load(&path, PHIX_SHEET_NAME).expect("registry");
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.phus(), ["Ottawa PHU", "Toronto PHU"]);
    assert_eq!(registry.lookup("ZEBRA SCHOOL").expect("zebra").phix_id, "203");
}

#[test]
fn cache_loads_each_path_once() {
    let dir = TempDir::new().expect("temp dir");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    fs::write(&first, REFERENCE_CSV).expect("write");
    fs::write(&second, "Only PHU\nLone School - 9\n").expect("write");

    let mut cache = RegistryCache::new();
    assert_eq!(cache.get_or_load(&first, PHIX_SHEET_NAME).expect("first").len(), 4);

    // Changing the file on disk does not affect the cached registry.
    fs::write(&first, "Only PHU\n").expect("rewrite");
    assert_eq!(cache.get_or_load(&first, PHIX_SHEET_NAME).expect("first again").len(), 4);

    assert_eq!(cache.get_or_load(&second, PHIX_SHEET_NAME).expect("second").len(), 1);
    assert_eq!(cache.len(), 2);

    // A differently spelled path to the same file hits the same entry.
    let dotted = dir.path().join(".").join("first.csv");
    cache.get_or_load(&dotted, PHIX_SHEET_NAME).expect("dotted");
    assert_eq!(cache.len(), 2);
}
