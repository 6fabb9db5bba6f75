//! Sorting, sequencing and assembly of client records.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use imms_model::{
    BoardInfo, ClientMetadata, ClientRecord, ContactInfo, Language, MatchType, PersonInfo,
    PhixValidation, ReceivedEntry, SchoolInfo, StudentRow,
};
use imms_standards::{DiseaseMap, VaccineReference};
use imms_transform::{
    BOARD_PREFIX, DueMapper, HistoryProcessor, SCHOOL_PREFIX, VaccinesDue, age_on,
    format_display_date, synthesize_identifier,
};

use crate::error::{PipelineError, Result};

pub const POSTAL_CODE_PLACEHOLDER: &str = "Not provided";
pub const OVER_16_AGE: i32 = 16;

/// Clients in sequence order plus the run's de-duplicated, sorted warnings.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub clients: Vec<ClientRecord>,
    pub warnings: Vec<String>,
}

/// Builds one fully populated [`ClientRecord`] per row.
#[derive(Debug, Clone)]
pub struct ClientRecordBuilder<'a> {
    language: Language,
    diseases: &'a DiseaseMap,
    history: HistoryProcessor<'a>,
    delivery_date: Option<NaiveDate>,
    target_phu_label: Option<String>,
}

impl<'a> ClientRecordBuilder<'a> {
    pub fn new(
        language: Language,
        diseases: &'a DiseaseMap,
        vaccines: &'a VaccineReference,
    ) -> Self {
        Self {
            language,
            diseases,
            history: HistoryProcessor::new(vaccines),
            delivery_date: None,
            target_phu_label: None,
        }
    }

    pub fn with_ignore_agents(mut self, ignore_agents: &'a [String]) -> Self {
        self.history = self.history.with_ignore_agents(ignore_agents);
        self
    }

    pub fn with_chart_diseases(mut self, chart_diseases: &'a [String]) -> Self {
        self.history = self.history.with_chart_diseases(chart_diseases);
        self
    }

    pub fn with_delivery_date(mut self, date: Option<NaiveDate>) -> Self {
        self.delivery_date = date;
        self
    }

    /// Record the PHU scope facility resolution ran under.
    pub fn with_target_phus(mut self, phus: &[String]) -> Self {
        self.target_phu_label = (!phus.is_empty()).then(|| phus.join(", "));
        self
    }

    /// Fill identifiers, sort, sequence, and build every record.
    ///
    /// Rows are stably sorted by school name, last name, first name and
    /// client ID before sequencing. A history that fails to parse aborts the
    /// build and names the client.
    pub fn build(&self, mut rows: Vec<StudentRow>) -> Result<BuildOutput> {
        let mut warnings = BTreeSet::new();

        for row in &mut rows {
            row.school_id = synthesize_identifier(&row.school_id, &row.school_name, SCHOOL_PREFIX);
            row.board_id = synthesize_identifier(&row.board_id, &row.board_name, BOARD_PREFIX);
        }
        if let Some(warning) = missing_board_warning(&rows) {
            warnings.insert(warning);
        }

        rows.sort_by(|a, b| {
            (&a.school_name, &a.last_name, &a.first_name, &a.client_id).cmp(&(
                &b.school_name,
                &b.last_name,
                &b.first_name,
                &b.client_id,
            ))
        });

        let due = DueMapper::new(self.diseases, self.language);
        let mut clients = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            if row.date_of_birth.is_none() {
                warnings.insert(format!("Missing date of birth for client {}", row.client_id));
            }
            let received =
                self.history
                    .process(&row.imms_given)
                    .map_err(|source| PipelineError::History {
                        client_id: row.client_id.clone(),
                        source,
                    })?;
            let vaccines_due = due.map(&row.overdue_disease);
            clients.push(self.assemble(idx + 1, row, vaccines_due, received));
        }

        warnings.extend(duplicate_id_warnings(&clients));
        tracing::info!(
            clients = clients.len(),
            warnings = warnings.len(),
            "built client records"
        );
        Ok(BuildOutput {
            clients,
            warnings: warnings.into_iter().collect(),
        })
    }

    fn assemble(
        &self,
        position: usize,
        row: StudentRow,
        vaccines_due: VaccinesDue,
        received: Vec<ReceivedEntry>,
    ) -> ClientRecord {
        let over_16 = self.over_16(&row);
        let phix_validation = match &row.facility {
            Some(m) => PhixValidation {
                id: m.phix_id.clone(),
                match_type: m.match_type,
                confidence: m.confidence,
                phu_name: m.phu.clone(),
                target_phu_label: self.target_phu_label.clone(),
            },
            None => PhixValidation {
                id: None,
                match_type: MatchType::NoMatch,
                confidence: 0,
                phu_name: None,
                target_phu_label: None,
            },
        };
        let street = [row.street_address_line_1.as_str(), row.street_address_line_2.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        let full_name = format!("{} {}", row.first_name, row.last_name)
            .trim()
            .to_string();
        let postal_code = if row.postal_code.is_empty() {
            POSTAL_CODE_PLACEHOLDER.to_string()
        } else {
            row.postal_code
        };

        ClientRecord {
            sequence: format!("{position:05}"),
            client_id: row.client_id,
            language: self.language,
            school: SchoolInfo {
                id: row.school_id,
                name: row.school_name,
                school_type: row.school_type,
            },
            board: BoardInfo {
                id: row.board_id,
                name: row.board_name,
            },
            person: PersonInfo {
                first_name: row.first_name,
                last_name: row.last_name,
                full_name,
                date_of_birth_iso: row.date_of_birth,
                date_of_birth_display: row
                    .date_of_birth
                    .map(|dob| format_display_date(dob, self.language)),
                age: row.age,
                over_16,
            },
            contact: ContactInfo {
                street,
                city: row.city,
                province: row.province,
                postal_code,
            },
            vaccines_due: vaccines_due.text,
            vaccines_due_list: vaccines_due.list,
            received,
            metadata: ClientMetadata {
                unique_id: Some(row.unique_id).filter(|id| !id.is_empty()),
                phix_validation,
            },
        }
    }

    /// AGE when present, else the birthday-adjusted age on the delivery date.
    fn over_16(&self, row: &StudentRow) -> bool {
        if let Some(age) = row.age {
            return age >= f64::from(OVER_16_AGE);
        }
        match (row.date_of_birth, self.delivery_date) {
            (Some(dob), Some(delivery)) => age_on(dob, delivery) >= OVER_16_AGE,
            _ => false,
        }
    }
}

fn missing_board_warning(rows: &[StudentRow]) -> Option<String> {
    if !rows.iter().any(|r| r.board_name.is_empty()) {
        return None;
    }
    let schools: BTreeSet<&str> = rows
        .iter()
        .filter(|r| r.board_name.is_empty() && !r.school_name.is_empty())
        .map(|r| r.school_name.as_str())
        .collect();
    if schools.is_empty() {
        return Some("Missing board name for one or more schools.".to_string());
    }
    Some(format!(
        "Missing board name for: {}",
        schools.into_iter().collect::<Vec<_>>().join(", ")
    ))
}

fn duplicate_id_warnings(clients: &[ClientRecord]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for client in clients {
        *counts.entry(client.client_id.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(cid, count)| {
            format!(
                "Duplicate client ID '{cid}' found {count} times. \
                 Later records will overwrite earlier ones in generated notices."
            )
        })
        .collect()
}
