use std::path::Path;

use imms_core::{Batcher, ClientRecordBuilder, Pipeline, PipelineConfig, PipelineError};
use imms_model::{BatchStrategy, StudentRow, UnmatchedPolicy};
use imms_standards::{DiseaseMap, RegistryCache, VaccineReference};
use proptest::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "SCHOOL NAME,CLIENT ID,FIRST NAME,LAST NAME,DATE OF BIRTH,CITY,POSTAL CODE,\
PROVINCE/TERRITORY,OVERDUE DISEASE,IMMS GIVEN,STREET ADDRESS LINE 1,STREET ADDRESS LINE 2,BOARD NAME";

const ROWS: &[&str] = &[
    "Zebra School,C3,Zed,Young,2012-01-05,Guelph,N1H 1A1,ON,\"Measles, Mumps\",\"Jan 1, 2020 - MMR, Jan 1, 2020 - DTaP\",1 Main St,,North Board",
    "Apple School,C2,Bea,Smith,2013-02-06,Guelph,,ON,Measles,\"May 1, 2020 - MMR\",2 Side St,Unit 1,North Board",
    "Apple School,C1,Al,Jones,2014-03-07,Guelph,N1H 1A2,ON,,,3 Back St,,North Board",
    "Apple School,C4,Cy,Jones,2014-03-07,Guelph,N1H 1A2,ON,,,3 Back St,,North Board",
];

struct Fixture {
    dir: TempDir,
    input: std::path::PathBuf,
}

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

fn fixture(extra_rows: &[&str]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("extract.csv");
    let mut text = format!("{HEADER}\n");
    for row in ROWS.iter().chain(extra_rows) {
        text.push_str(row);
        text.push('\n');
    }
    write(&input, &text);
    write(
        &dir.path().join("disease_map.json"),
        r#"{"Measles": "Measles (Rougeole)"}"#,
    );
    write(
        &dir.path().join("vaccine_reference.json"),
        r#"{"MMR": ["Measles", "Mumps", "Rubella"], "DTaP": ["Diphtheria", "Tetanus", "Pertussis"]}"#,
    );
    write(
        &dir.path().join("phix.csv"),
        "Ottawa PHU,Toronto PHU\nApple School - 111,Zebra School - 222\n",
    );
    Fixture { dir, input }
}

fn config(fixture: &Fixture, output: &str) -> PipelineConfig {
    let base = fixture.dir.path();
    let mut config = PipelineConfig::default();
    config.pipeline.output_dir = base.join(output);
    config.pipeline.run_id = Some("test".into());
    config.reference.disease_map = base.join("disease_map.json");
    config.reference.vaccine_reference = base.join("vaccine_reference.json");
    config.reference.phix_reference = base.join("phix.csv");
    config.batching.batch_size = 2;
    config.batching.group_by = BatchStrategy::School;
    config
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn full_run_writes_sorted_artifact_and_school_batches() {
    let fixture = fixture(&[]);
    let mut cache = RegistryCache::new();
    let summary = Pipeline::new(config(&fixture, "out"))
        .run(&fixture.input, &mut cache)
        .unwrap();

    assert_eq!(summary.input_rows, 4);
    assert_eq!(summary.clients, 4);
    assert_eq!(summary.facilities_matched, 2);
    assert_eq!(summary.facilities_unmatched, 0);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.batch_files.len(), 3);
    assert!(summary.unmatched_report.is_none());
    assert_eq!(summary.warnings, Vec::<String>::new());

    let artifact = read_json(summary.artifact.as_deref().unwrap());
    let ids: Vec<&str> = artifact["clients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["client_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["C1", "C4", "C2", "C3"]);

    let zebra = &artifact["clients"][3];
    assert_eq!(zebra["sequence"], "00004");
    assert_eq!(zebra["vaccines_due"], "Measles (Rougeole), Mumps");
    assert_eq!(zebra["received"].as_array().unwrap().len(), 1);
    assert_eq!(zebra["received"][0]["date_given"], "2020-01-01");
    assert_eq!(zebra["received"][0]["vaccine"], serde_json::json!(["MMR", "DTaP"]));
    assert_eq!(zebra["metadata"]["phix_validation"]["id"], "222");
    assert_eq!(zebra["metadata"]["phix_validation"]["phu_name"], "Toronto PHU");
    assert!(zebra["metadata"]["phix_validation"]["target_phu_label"].is_null());
    assert_eq!(
        artifact["clients"][0]["metadata"]["phix_validation"]["phu_name"],
        "Ottawa PHU"
    );

    let smith = &artifact["clients"][2];
    assert_eq!(smith["contact"]["street"], "2 Side St Unit 1");
    assert_eq!(smith["contact"]["postal_code"], "Not provided");

    let first_batch = read_json(&summary.batch_files[0]);
    assert_eq!(first_batch["total_batches"], 2);
    assert_eq!(first_batch["total_clients"], 2);
    let last_batch = read_json(&summary.batch_files[2]);
    assert_eq!(last_batch["total_clients"], 1);
    assert_eq!(last_batch["clients"][0]["client_id"], "C3");

    assert_eq!(cache.len(), 1);
}

#[test]
fn reruns_are_deterministic() {
    let fixture = fixture(&[]);
    let mut cache = RegistryCache::new();
    let first = Pipeline::new(config(&fixture, "one"))
        .run(&fixture.input, &mut cache)
        .unwrap();
    let second = Pipeline::new(config(&fixture, "two"))
        .run(&fixture.input, &mut cache)
        .unwrap();

    let a = read_json(first.artifact.as_deref().unwrap());
    let b = read_json(second.artifact.as_deref().unwrap());
    assert_eq!(a["clients"], b["clients"]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn dry_run_writes_no_artifacts() {
    let fixture = fixture(&[]);
    let summary = Pipeline::new(config(&fixture, "out"))
        .with_dry_run(true)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap();
    assert!(summary.dry_run);
    assert!(summary.artifact.is_none());
    assert!(summary.batch_files.is_empty());
    assert_eq!(summary.batches, 3);
    assert!(!fixture.dir.path().join("out/artifacts").exists());
}

#[test]
fn skip_policy_drops_unmatched_school_rows() {
    let fixture = fixture(&[
        "Nowhere Academy,C9,Ann,Other,2014-03-07,Guelph,N1H 1A2,ON,,,3 Back St,,North Board",
    ]);
    let mut config = config(&fixture, "out");
    config.facility.unmatched = UnmatchedPolicy::Skip;
    let summary = Pipeline::new(config)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap();

    assert_eq!(summary.input_rows, 5);
    assert_eq!(summary.clients, 4);
    assert_eq!(summary.facilities_unmatched, 1);
    assert!(summary.unmatched_report.as_deref().unwrap().exists());
    assert!(
        summary
            .warnings
            .contains(&"Filtered 1 records with unmatched facilities.".to_string())
    );
}

#[test]
fn error_policy_aborts_without_artifact() {
    let fixture = fixture(&[
        "Nowhere Academy,C9,Ann,Other,2014-03-07,Guelph,N1H 1A2,ON,,,3 Back St,,North Board",
    ]);
    let mut config = config(&fixture, "out");
    config.facility.unmatched = UnmatchedPolicy::Error;
    let err = Pipeline::new(config)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap_err();

    assert!(matches!(err, PipelineError::Facility(_)));
    assert!(err.to_string().contains("Nowhere Academy"));
    assert!(fixture.dir.path().join("out/unmatched_facilities.csv").exists());
    assert!(!fixture.dir.path().join("out/artifacts").exists());
}

#[test]
fn scoped_run_records_target_phu() {
    let fixture = fixture(&[]);
    let mut config = config(&fixture, "out");
    config.facility.target_phus = vec!["toronto  phu".into()];
    let summary = Pipeline::new(config)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap();

    assert_eq!(summary.facilities_matched, 1);
    assert_eq!(summary.facilities_unmatched, 1);
    let artifact = read_json(summary.artifact.as_deref().unwrap());
    let zebra = &artifact["clients"][3]["metadata"]["phix_validation"];
    assert_eq!(zebra["phu_name"], "Toronto PHU");
    assert_eq!(zebra["target_phu_label"], "toronto  phu");
    let apple = &artifact["clients"][0]["metadata"]["phix_validation"];
    assert_eq!(apple["match_type"], "none");
    assert!(apple["phu_name"].is_null());
}

#[test]
fn zero_batch_size_writes_no_batch_files() {
    let fixture = fixture(&[]);
    let mut config = config(&fixture, "out");
    config.batching.batch_size = 0;
    let summary = Pipeline::new(config)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap();
    assert_eq!(summary.batches, 0);
    assert!(summary.batch_files.is_empty());
    assert!(summary.artifact.is_some());
}

#[test]
fn unknown_target_phu_is_fatal() {
    let fixture = fixture(&[]);
    let mut config = config(&fixture, "out");
    config.facility.target_phus = vec!["Nowhere PHU".into()];
    let err = Pipeline::new(config)
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Standards(_)));
}

#[test]
fn malformed_history_aborts_with_client_id() {
    let fixture = fixture(&[
        "Apple School,C7,Eve,Adams,2014-03-07,Guelph,,ON,,Jan 1 2020 - MMR,3 Back St,,North Board",
    ]);
    let err = Pipeline::new(config(&fixture, "out"))
        .run(&fixture.input, &mut RegistryCache::new())
        .unwrap_err();
    match err {
        PipelineError::History { client_id, .. } => assert_eq!(client_id, "C7"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("extract.csv");
    write(&input, "SCHOOL NAME,CLIENT ID\nApple School,C1\n");
    let mut config = PipelineConfig::default();
    config.facility.enabled = false;
    let err = Pipeline::new(config)
        .run(&input, &mut RegistryCache::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Transform(_)));
}

fn student(school: &str, last: &str, id: usize) -> StudentRow {
    StudentRow {
        school_name: school.to_string(),
        last_name: last.to_string(),
        first_name: "A".to_string(),
        client_id: format!("C{id:03}"),
        board_name: "Board".to_string(),
        ..StudentRow::default()
    }
}

proptest! {
    #[test]
    fn batches_partition_the_sorted_clients(
        entries in proptest::collection::vec((0usize..4, "[a-z]{1,3}"), 0..30),
        batch_size in 1usize..5,
        by_school in any::<bool>(),
    ) {
        let schools = ["Apple School", "Birch School", "Cedar School", "Dune School"];
        let rows: Vec<StudentRow> = entries
            .iter()
            .enumerate()
            .map(|(id, (school, last))| student(schools[*school], last, id))
            .collect();
        let diseases = DiseaseMap::default();
        let vaccines = VaccineReference::default();
        let builder = ClientRecordBuilder::new(imms_model::Language::English, &diseases, &vaccines);
        let first = builder.build(rows.clone()).unwrap();
        let second = builder.build(rows).unwrap();
        prop_assert_eq!(&first.clients, &second.clients);

        let strategy = if by_school { BatchStrategy::School } else { BatchStrategy::Size };
        let batches = Batcher::new(strategy, batch_size).plan(&first.clients);

        let flattened: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.members.iter().map(|c| c.sequence.as_str()))
            .collect();
        let expected: Vec<&str> = first.clients.iter().map(|c| c.sequence.as_str()).collect();
        prop_assert_eq!(flattened, expected);

        for batch in &batches {
            prop_assert!(!batch.is_empty());
            prop_assert!(batch.len() <= batch_size);
            prop_assert!(batch.batch_number <= batch.total_batches);
            if by_school {
                let key = batch.group_key.as_deref();
                prop_assert!(batch.members.iter().all(|c| Some(c.school.id.as_str()) == key));
            }
        }
    }
}
