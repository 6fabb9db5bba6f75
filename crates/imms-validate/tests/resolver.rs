use imms_model::{Facility, MatchStrategy, MatchType, StudentRow, UnmatchedPolicy};
use imms_standards::FacilityRegistry;
use imms_validate::{FacilityError, FacilityResolver};
use tempfile::TempDir;

fn registry() -> FacilityRegistry {
    FacilityRegistry::from_facilities([
        Facility {
            phix_id: "111".into(),
            name: "Lincoln Elementary School".into(),
            phu: "Ottawa PHU".into(),
        },
        Facility {
            phix_id: "222".into(),
            name: "Apple School".into(),
            phu: "Toronto PHU".into(),
        },
    ])
}

fn row(school: &str, client_id: &str) -> StudentRow {
    StudentRow {
        school_name: school.to_string(),
        client_id: client_id.to_string(),
        ..StudentRow::default()
    }
}

fn rows() -> Vec<StudentRow> {
    vec![
        row("Apple School", "C1"),
        row("Unknown Academy", "C2"),
        row("Lincoln Elementary School", "C3"),
        row("Unknown Academy", "C4"),
    ]
}

#[test]
fn exact_match_has_full_confidence() {
    let registry = registry();
    let result = FacilityResolver::new(&registry).match_facility("Lincoln Elementary School");
    assert!(result.matched);
    assert_eq!(result.confidence, 100);
    assert_eq!(result.match_type, MatchType::Exact);
}

#[test]
fn one_character_typo_matches_fuzzily() {
    let registry = registry();
    let resolver = FacilityResolver::new(&registry).with_threshold(80).unwrap();
    let result = resolver.match_facility("Lincoln Elementry School");
    assert!(result.matched);
    assert_eq!(result.match_type, MatchType::Fuzzy);
    assert!(result.confidence >= 80);
    assert_eq!(result.phix_id.as_deref(), Some("111"));
    assert_eq!(result.phu.as_deref(), Some("Ottawa PHU"));
}

#[test]
fn exact_strategy_refuses_the_typo() {
    let registry = registry();
    let resolver = FacilityResolver::new(&registry)
        .with_strategy(MatchStrategy::Exact)
        .with_threshold(80)
        .unwrap();
    let result = resolver.match_facility("Lincoln Elementry School");
    assert!(!result.matched);
    assert_eq!(result.match_type, MatchType::NoMatch);
}

#[test]
fn warn_keeps_every_row_and_reports() {
    let registry = registry();
    let dir = TempDir::new().unwrap();
    let resolution = FacilityResolver::new(&registry)
        .resolve(rows(), UnmatchedPolicy::Warn, Some(dir.path()))
        .unwrap();

    assert_eq!(resolution.rows.len(), 4);
    assert_eq!(resolution.matches.len(), 3);
    assert_eq!(resolution.warnings.len(), 1);
    assert!(resolution.warnings[0].starts_with("1 facilities not found in PHIX reference."));
    let phix_id = |idx: usize| {
        resolution.rows[idx]
            .facility
            .as_ref()
            .and_then(|m| m.phix_id.as_deref())
    };
    assert_eq!(phix_id(1), None);
    assert_eq!(phix_id(0), Some("222"));

    let csv = std::fs::read_to_string(resolution.unmatched_report.unwrap()).unwrap();
    assert_eq!(csv, "facility_name,match_type,confidence\nUnknown Academy,none,0\n");
}

#[test]
fn skip_drops_rows_with_unmatched_facilities() {
    let registry = registry();
    let resolution = FacilityResolver::new(&registry)
        .resolve(rows(), UnmatchedPolicy::Skip, None)
        .unwrap();

    let ids: Vec<&str> = resolution.rows.iter().map(|r| r.client_id.as_str()).collect();
    assert_eq!(ids, vec!["C1", "C3"]);
    assert!(resolution.rows.iter().all(StudentRow::facility_matched));
    assert_eq!(
        resolution.warnings.last().map(String::as_str),
        Some("Filtered 2 records with unmatched facilities.")
    );
}

#[test]
fn error_aborts_after_writing_the_side_csv() {
    let registry = registry();
    let dir = TempDir::new().unwrap();
    let err = FacilityResolver::new(&registry)
        .resolve(rows(), UnmatchedPolicy::Error, Some(dir.path()))
        .unwrap_err();

    match &err {
        FacilityError::Unmatched { names } => assert_eq!(names, &vec!["Unknown Academy".to_string()]),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("Unknown Academy"));
    assert!(dir.path().join("unmatched_facilities.csv").exists());
}

#[test]
fn fully_matched_run_has_no_warnings_or_report() {
    let registry = registry();
    let dir = TempDir::new().unwrap();
    let resolution = FacilityResolver::new(&registry)
        .resolve(
            vec![row("apple school", "C1")],
            UnmatchedPolicy::Error,
            Some(dir.path()),
        )
        .unwrap();
    assert!(resolution.warnings.is_empty());
    assert!(resolution.unmatched_report.is_none());
    assert_eq!(resolution.unmatched().count(), 0);
    assert!(!dir.path().join("unmatched_facilities.csv").exists());
}
