use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::facility::FacilityMatch;

/// One normalized extract row.
///
/// String fields are trimmed and never missing; absent optional columns are
/// empty strings. `date_of_birth` is `None` when the source value could not
/// be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub school_name: String,
    pub client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Raw date of birth text, kept for diagnostics when parsing fails.
    pub date_of_birth_raw: String,
    pub age: Option<f64>,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub overdue_disease: String,
    pub imms_given: String,
    pub street_address_line_1: String,
    pub street_address_line_2: String,
    pub school_id: String,
    pub school_type: String,
    pub board_id: String,
    pub board_name: String,
    pub unique_id: String,
    /// PHIX resolution attached by the facility resolver.
    pub facility: Option<FacilityMatch>,
}

impl StudentRow {
    pub fn facility_matched(&self) -> bool {
        self.facility.as_ref().is_some_and(|m| m.matched)
    }
}
