//! Tests for imms-model types.

use chrono::NaiveDate;
use imms_model::{
    BoardInfo, ClientMetadata, ClientRecord, ContactInfo, Language, MatchType, PersonInfo,
    PhixValidation, ReceivedEntry, SchoolInfo,
};

fn sample_record() -> ClientRecord {
    ClientRecord {
        sequence: "00001".to_string(),
        client_id: "C-1".to_string(),
        language: Language::English,
        school: SchoolInfo {
            id: "sch_0123456789".to_string(),
            name: "Apple School".to_string(),
            school_type: String::new(),
        },
        board: BoardInfo {
            id: "brd_9876543210".to_string(),
            name: "North Board".to_string(),
        },
        person: PersonInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            full_name: "Ada Lovelace".to_string(),
            date_of_birth_iso: NaiveDate::from_ymd_opt(2015, 3, 9),
            date_of_birth_display: Some("Mar 09, 2015".to_string()),
            age: None,
            over_16: false,
        },
        contact: ContactInfo {
            street: "1 Main St".to_string(),
            city: "Ottawa".to_string(),
            province: "ON".to_string(),
            postal_code: "K1A 0B1".to_string(),
        },
        vaccines_due: "Measles, Mumps".to_string(),
        vaccines_due_list: vec!["Measles".to_string(), "Mumps".to_string()],
        received: vec![ReceivedEntry {
            date_given: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            vaccine: vec!["MMR".to_string()],
            diseases: vec!["Measles".to_string(), "Mumps".to_string()],
        }],
        metadata: ClientMetadata {
            unique_id: None,
            phix_validation: PhixValidation {
                id: Some("12345".to_string()),
                match_type: MatchType::Exact,
                confidence: 100,
                phu_name: Some("Ottawa PHU".to_string()),
                target_phu_label: None,
            },
        },
    }
}

#[test]
fn client_record_serializes_dates_as_iso() {
    let json = serde_json::to_value(sample_record()).expect("serialize record");
    assert_eq!(json["received"][0]["date_given"], "2020-01-01");
    assert_eq!(json["person"]["date_of_birth_iso"], "2015-03-09");
    assert_eq!(json["school"]["type"], "");
    assert_eq!(json["language"], "en");
    assert_eq!(json["metadata"]["phix_validation"]["match_type"], "exact");
}

#[test]
fn client_record_round_trips() {
    let record = sample_record();
    let json = serde_json::to_string(&record).expect("serialize record");
    let round: ClientRecord = serde_json::from_str(&json).expect("deserialize record");
    assert_eq!(round, record);
}
