use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{Language, MatchType};

/// Canonical client entity handed to notice generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Zero-padded, 1-based position in the sorted run.
    pub sequence: String,
    pub client_id: String,
    pub language: Language,
    pub school: SchoolInfo,
    pub board: BoardInfo,
    pub person: PersonInfo,
    pub contact: ContactInfo,
    pub vaccines_due: String,
    pub vaccines_due_list: Vec<String>,
    pub received: Vec<ReceivedEntry>,
    pub metadata: ClientMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub school_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth_iso: Option<NaiveDate>,
    pub date_of_birth_display: Option<String>,
    pub age: Option<f64>,
    pub over_16: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
}

/// Vaccines administered on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedEntry {
    pub date_given: NaiveDate,
    pub vaccine: Vec<String>,
    pub diseases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub unique_id: Option<String>,
    pub phix_validation: PhixValidation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhixValidation {
    pub id: Option<String>,
    pub match_type: MatchType,
    pub confidence: u8,
    /// Health unit whose column listed the matched facility.
    pub phu_name: Option<String>,
    /// Configured PHU scope, comma-joined; `None` when resolution was unscoped.
    pub target_phu_label: Option<String>,
}
