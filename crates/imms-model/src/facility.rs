use serde::{Deserialize, Serialize};

use crate::enums::MatchType;

/// A school or daycare listed in the PHIX reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facility {
    pub phix_id: String,
    pub name: String,
    /// Public Health Unit whose column listed this facility.
    pub phu: String,
}

impl Facility {
    /// Parse a reference cell of the form `"FACILITY NAME - ID"`.
    ///
    /// The split happens on the last `" - "` so names that themselves contain
    /// the separator keep it. A cell without a separator yields an empty ID.
    /// Blank cells yield `None`.
    pub fn parse_entry(entry: &str, phu: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        let (name, phix_id) = match entry.rsplit_once(" - ") {
            Some((name, id)) => (name.trim(), id.trim()),
            None => (entry, ""),
        };
        Some(Self {
            phix_id: phix_id.to_string(),
            name: name.to_string(),
            phu: phu.trim().to_string(),
        })
    }
}

/// Result of resolving one input facility name against the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityMatch {
    pub input_name: String,
    pub matched: bool,
    pub phix_id: Option<String>,
    pub phix_name: Option<String>,
    pub phu: Option<String>,
    /// Similarity in the range 0..=100.
    pub confidence: u8,
    pub match_type: MatchType,
}

impl FacilityMatch {
    pub fn unmatched(input_name: &str) -> Self {
        Self {
            input_name: input_name.to_string(),
            matched: false,
            phix_id: None,
            phix_name: None,
            phu: None,
            confidence: 0,
            match_type: MatchType::NoMatch,
        }
    }

    pub fn exact(input_name: &str, facility: &Facility) -> Self {
        Self::found(input_name, facility, 100, MatchType::Exact)
    }

    pub fn fuzzy(input_name: &str, facility: &Facility, confidence: u8) -> Self {
        Self::found(input_name, facility, confidence.min(100), MatchType::Fuzzy)
    }

    fn found(input_name: &str, facility: &Facility, confidence: u8, match_type: MatchType) -> Self {
        Self {
            input_name: input_name.to_string(),
            matched: true,
            phix_id: Some(facility.phix_id.clone()),
            phix_name: Some(facility.name.clone()),
            phu: Some(facility.phu.clone()),
            confidence,
            match_type,
        }
    }
}
