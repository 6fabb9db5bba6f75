//! Vaccination history parsing, grouping and disease enrichment.
//!
//! # Grammar
//!
//! ```text
//! history := ws* ( entry ( ws* "," ws* entry )* ","? )? ws*
//! entry   := month " "+ day "," ws* year ws* "-" ws* vaccine
//! month   := three ASCII letters (Jan .. Dec)
//! day     := one or two digits
//! year    := four digits
//! vaccine := one or more characters up to the next "," (trimmed, non-empty)
//! ```
//!
//! Anything that does not fit the grammar is rejected with the offending
//! segment and its byte offset. A vaccine name that itself contains a comma
//! therefore fails on the text after the comma instead of being truncated
//! silently.

use chrono::NaiveDate;
use imms_model::ReceivedEntry;
use imms_standards::VaccineReference;

use crate::dates::parse_history_date;
use crate::error::{Result, TransformError};

/// Disease bucket for diseases outside the configured chart header.
pub const OTHER_DISEASE: &str = "Other";

/// One `(date, vaccine)` pair as written in the extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryToken {
    pub date: NaiveDate,
    pub vaccine: String,
    /// Byte offset of the entry in the source text.
    pub offset: usize,
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn malformed(&self, start: usize, reason: &'static str) -> TransformError {
        let end = self.text[self.pos..]
            .find(',')
            .map_or(self.text.len(), |i| self.pos + i);
        TransformError::MalformedHistory {
            segment: self.text[start..end].trim().to_string(),
            offset: start,
            reason,
        }
    }

    fn entry(&mut self) -> Result<HistoryToken> {
        let start = self.pos;

        let month = self.take_while(|c| c.is_ascii_alphabetic());
        if month.len() != 3 {
            return Err(self.malformed(start, "expected a three-letter month"));
        }
        if !self.eat(' ') {
            return Err(self.malformed(start, "expected a space after the month"));
        }
        self.skip_ws();

        let day = self.take_while(|c| c.is_ascii_digit());
        if !(1..=2).contains(&day.len()) {
            return Err(self.malformed(start, "expected a one- or two-digit day"));
        }
        if !self.eat(',') {
            return Err(self.malformed(start, "expected ',' after the day"));
        }
        self.skip_ws();

        let year = self.take_while(|c| c.is_ascii_digit());
        if year.len() != 4 {
            return Err(self.malformed(start, "expected a four-digit year"));
        }
        self.skip_ws();
        if !self.eat('-') {
            return Err(self.malformed(start, "expected '-' between date and vaccine"));
        }

        let vaccine = self.take_while(|c| c != ',').trim();
        if vaccine.is_empty() {
            return Err(self.malformed(start, "missing vaccine name"));
        }

        let date_text = format!("{month} {day}, {year}");
        let date = parse_history_date(&date_text)
            .ok_or(TransformError::InvalidHistoryDate { value: date_text })?;

        Ok(HistoryToken {
            date,
            vaccine: vaccine.to_string(),
            offset: start,
        })
    }
}

/// Split history text into dated vaccine tokens, in source order.
pub fn tokenize_history(text: &str) -> Result<Vec<HistoryToken>> {
    let mut cursor = Cursor { text, pos: 0 };
    let mut tokens = Vec::new();

    cursor.skip_ws();
    while !cursor.at_end() {
        tokens.push(cursor.entry()?);
        cursor.skip_ws();
        if cursor.at_end() {
            break;
        }
        if !cursor.eat(',') {
            return Err(cursor.malformed(cursor.pos, "expected ',' between entries"));
        }
        cursor.skip_ws();
    }
    Ok(tokens)
}

/// Replace `-unspecified` / ` unspecified` markers with `*`.
pub fn mark_unspecified(vaccine: &str) -> String {
    vaccine.replace("-unspecified", "*").replace(" unspecified", "*")
}

/// Turns history text into date-grouped, disease-enriched entries.
#[derive(Debug, Clone, Copy)]
pub struct HistoryProcessor<'a> {
    reference: &'a VaccineReference,
    ignore_agents: &'a [String],
    chart_diseases: &'a [String],
}

impl<'a> HistoryProcessor<'a> {
    pub fn new(reference: &'a VaccineReference) -> Self {
        Self {
            reference,
            ignore_agents: &[],
            chart_diseases: &[],
        }
    }

    /// Vaccine names dropped before grouping (exact match after trimming).
    pub fn with_ignore_agents(mut self, ignore_agents: &'a [String]) -> Self {
        self.ignore_agents = ignore_agents;
        self
    }

    /// Diseases charted individually; others collapse into [`OTHER_DISEASE`].
    /// An empty list disables collapsing.
    pub fn with_chart_diseases(mut self, chart_diseases: &'a [String]) -> Self {
        self.chart_diseases = chart_diseases;
        self
    }

    pub fn process(&self, text: &str) -> Result<Vec<ReceivedEntry>> {
        let mut tokens = tokenize_history(text)?;
        tokens.retain(|t| !self.ignore_agents.iter().any(|agent| agent == &t.vaccine));
        tokens.sort_by_key(|t| t.date);

        let mut received: Vec<ReceivedEntry> = Vec::new();
        for token in tokens {
            let vaccine = mark_unspecified(&token.vaccine);
            match received.last_mut() {
                Some(last) if last.date_given == token.date => last.vaccine.push(vaccine),
                _ => received.push(ReceivedEntry {
                    date_given: token.date,
                    vaccine: vec![vaccine],
                    diseases: Vec::new(),
                }),
            }
        }

        for entry in &mut received {
            entry.diseases = self.diseases_for(&entry.vaccine);
        }
        Ok(received)
    }

    fn diseases_for(&self, vaccines: &[String]) -> Vec<String> {
        let mut diseases = Vec::new();
        for vaccine in vaccines {
            self.reference.extend_diseases(vaccine, &mut diseases);
        }
        if self.chart_diseases.is_empty() {
            return diseases;
        }

        let (mut charted, other): (Vec<String>, Vec<String>) = diseases
            .into_iter()
            .partition(|d| self.chart_diseases.contains(d));
        if !other.is_empty() && !charted.iter().any(|d| d == OTHER_DISEASE) {
            charted.push(OTHER_DISEASE.to_string());
        }
        charted
    }
}

#[cfg(test)]
mod tests {
    use imms_standards::DiseaseRef;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reference() -> VaccineReference {
        VaccineReference::from_entries([
            (
                "MMR",
                DiseaseRef::Many(vec!["Measles".into(), "Mumps".into(), "Rubella".into()]),
            ),
            ("DTaP", DiseaseRef::Many(vec!["Diphtheria".into(), "Tetanus".into(), "Pertussis".into()])),
            ("Var", DiseaseRef::One("Varicella".into())),
            ("HPV*", DiseaseRef::One("HPV".into())),
        ])
    }

    #[test]
    fn tokenizes_entries_in_source_order() {
        let tokens = tokenize_history("Feb 1, 2020 - DTaP, Jan 1, 2020 - MMR").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].date, ymd(2020, 2, 1));
        assert_eq!(tokens[0].vaccine, "DTaP");
        assert_eq!(tokens[1].offset, 20);
    }

    #[test]
    fn blank_history_is_empty() {
        assert!(tokenize_history("").unwrap().is_empty());
        assert!(tokenize_history("   ").unwrap().is_empty());
        assert_eq!(tokenize_history("Jan 1, 2020 - MMR, ").unwrap().len(), 1);
    }

    #[test]
    fn hyphenated_vaccine_names_survive() {
        let tokens = tokenize_history("Mar 3, 2021 - DTaP-IPV-Hib").unwrap();
        assert_eq!(tokens[0].vaccine, "DTaP-IPV-Hib");
    }

    #[test]
    fn malformed_segment_is_fatal() {
        let err = tokenize_history("Jan 1, 2020 - MMR, garbage here").unwrap_err();
        assert_eq!(
            err,
            TransformError::MalformedHistory {
                segment: "garbage here".to_string(),
                offset: 19,
                reason: "expected a three-letter month",
            }
        );
    }

    #[test]
    fn comma_inside_vaccine_name_is_rejected() {
        let err = tokenize_history("Jan 1, 2020 - Tdap, adsorbed").unwrap_err();
        assert!(matches!(err, TransformError::MalformedHistory { ref segment, .. } if segment == "adsorbed"));
    }

    #[test]
    fn impossible_date_is_fatal() {
        let err = tokenize_history("Feb 30, 2020 - MMR").unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidHistoryDate {
                value: "Feb 30, 2020".to_string()
            }
        );
        assert!(tokenize_history("Foo 1, 2020 - MMR").is_err());
    }

    #[test]
    fn groups_by_date_ascending() {
        let reference = reference();
        let received = HistoryProcessor::new(&reference)
            .process("Feb 1, 2020 - DTaP, Jan 1, 2020 - MMR")
            .unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].date_given, ymd(2020, 1, 1));
        assert_eq!(received[0].vaccine, vec!["MMR"]);
        assert_eq!(received[0].diseases, vec!["Measles", "Mumps", "Rubella"]);
        assert_eq!(received[1].date_given, ymd(2020, 2, 1));
        assert_eq!(received[1].vaccine, vec!["DTaP"]);
    }

    #[test]
    fn same_date_entries_merge_in_vaccine_order() {
        let reference = reference();
        let received = HistoryProcessor::new(&reference)
            .process("May 1, 2020 - Var, May 1, 2020 - MMR")
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].vaccine, vec!["Var", "MMR"]);
        assert_eq!(
            received[0].diseases,
            vec!["Varicella", "Measles", "Mumps", "Rubella"]
        );
    }

    #[test]
    fn ignored_agents_are_dropped_and_unspecified_marked() {
        let reference = reference();
        let ignore = vec!["Not Specified".to_string()];
        let received = HistoryProcessor::new(&reference)
            .with_ignore_agents(&ignore)
            .process("Jun 2, 2022 - Not Specified, Jun 2, 2022 - HPV-unspecified, Jul 1, 2022 - Flu unspecified")
            .unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].vaccine, vec!["HPV*"]);
        assert_eq!(received[0].diseases, vec!["HPV"]);
        assert_eq!(received[1].vaccine, vec!["Flu*"]);
        assert_eq!(received[1].diseases, vec!["Flu*"]);
    }

    #[test]
    fn chart_header_collapses_other_diseases() {
        let reference = reference();
        let chart = vec!["Measles".to_string(), "Mumps".to_string()];
        let received = HistoryProcessor::new(&reference)
            .with_chart_diseases(&chart)
            .process("Jan 1, 2020 - MMR, Jan 1, 2020 - Var")
            .unwrap();
        assert_eq!(received[0].diseases, vec!["Measles", "Mumps", "Other"]);
    }
}
