//! Alignment of arbitrary extract headers to the canonical schema.

use std::collections::BTreeSet;

use imms_ingest::ExtractTable;
use imms_model::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use serde::Serialize;

use crate::score::{best_match, partial_ratio};

/// Minimum partial-ratio score for a header to be renamed.
pub const COLUMN_MATCH_THRESHOLD: f64 = 80.0;

/// Lowercase, trim, and turn spaces and dashes into underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// What happened to one raw header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ColumnStatus {
    /// Renamed to a required canonical header.
    Mapped { target: &'static str, score: f64 },
    /// Optional header present verbatim.
    Passthrough { target: &'static str },
    /// Best candidate already claimed by an earlier header.
    Duplicate { target: &'static str, score: f64 },
    /// Best candidate scored under the threshold.
    Unmapped { best: &'static str, score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDecision {
    pub source: String,
    pub normalized: String,
    #[serde(flatten)]
    pub status: ColumnStatus,
}

impl ColumnDecision {
    /// Canonical header this column is renamed to, if kept.
    pub fn target(&self) -> Option<&'static str> {
        match self.status {
            ColumnStatus::Mapped { target, .. } | ColumnStatus::Passthrough { target } => {
                Some(target)
            }
            ColumnStatus::Duplicate { .. } | ColumnStatus::Unmapped { .. } => None,
        }
    }
}

/// Mapping decisions for every raw header, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapping {
    pub threshold: f64,
    pub decisions: Vec<ColumnDecision>,
}

impl ColumnMapping {
    pub fn target_of(&self, source: &str) -> Option<&'static str> {
        self.decisions
            .iter()
            .find(|d| d.source == source)
            .and_then(ColumnDecision::target)
    }

    pub fn kept(&self) -> impl Iterator<Item = &ColumnDecision> {
        self.decisions.iter().filter(|d| d.target().is_some())
    }

    pub fn dropped(&self) -> impl Iterator<Item = &ColumnDecision> {
        self.decisions.iter().filter(|d| d.target().is_none())
    }

    /// Required canonical headers no raw header was mapped to.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mapped: BTreeSet<&str> = self.kept().filter_map(ColumnDecision::target).collect();
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !mapped.contains(c))
            .collect()
    }

    /// Human-readable mapping report, one line per raw header.
    pub fn report(&self) -> String {
        self.decisions
            .iter()
            .map(|d| match d.status {
                ColumnStatus::Mapped { target, score } => format!(
                    "Matching '{}' to '{}' with score {:.0}",
                    d.normalized, target, score
                ),
                ColumnStatus::Passthrough { target } => {
                    format!("Keeping '{}' as '{}'", d.normalized, target)
                }
                ColumnStatus::Duplicate { target, score } => format!(
                    "Skipping '{}' (score {:.0}, '{}' already mapped)",
                    d.normalized, score, target
                ),
                ColumnStatus::Unmapped { best, score } => format!(
                    "Dropping '{}' (best '{}' scored {:.0} < {:.0})",
                    d.normalized, best, score, self.threshold
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rename kept columns to their canonical headers and drop the rest.
    ///
    /// `table` must be the table whose headers produced this mapping.
    pub fn apply(&self, table: &ExtractTable) -> ExtractTable {
        // Decisions are positional: one per header of the mapped table.
        let kept: Vec<(usize, &'static str)> = self
            .decisions
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| d.target().map(|t| (idx, t)))
            .collect();

        let headers = kept.iter().map(|(_, t)| (*t).to_string()).collect();
        let rows = table
            .rows
            .iter()
            .map(|row| {
                kept.iter()
                    .map(|(idx, _)| row.get(*idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        ExtractTable::new(headers, rows)
    }
}

/// Fuzzy header mapper over the canonical schema.
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    threshold: f64,
    required: Vec<(String, &'static str)>,
    optional: Vec<(String, &'static str)>,
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnMapper {
    pub fn new() -> Self {
        let normalized = |cols: &[&'static str]| {
            cols.iter()
                .map(|c| (normalize_column_name(c), *c))
                .collect::<Vec<_>>()
        };
        Self {
            threshold: COLUMN_MATCH_THRESHOLD,
            required: normalized(&REQUIRED_COLUMNS),
            optional: normalized(&OPTIONAL_COLUMNS),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Decide a canonical target for each raw header.
    ///
    /// Optional headers are kept only on an exact normalized match. Every
    /// other header is scored against each required header with
    /// [`partial_ratio`]; the earliest best-scoring canonical header wins and
    /// each canonical header is claimed by at most one raw header.
    pub fn map_headers(&self, headers: &[String]) -> ColumnMapping {
        let mut claimed: BTreeSet<&'static str> = BTreeSet::new();
        let mut decisions = Vec::with_capacity(headers.len());

        for source in headers {
            let normalized = normalize_column_name(source);
            let status = self.decide(&normalized, &mut claimed);
            tracing::debug!(column = %source, ?status, "column mapping decision");
            decisions.push(ColumnDecision {
                source: source.clone(),
                normalized,
                status,
            });
        }

        ColumnMapping {
            threshold: self.threshold,
            decisions,
        }
    }

    fn decide(&self, normalized: &str, claimed: &mut BTreeSet<&'static str>) -> ColumnStatus {
        if let Some(&(_, target)) = self.optional.iter().find(|(n, _)| n == normalized) {
            return if claimed.insert(target) {
                ColumnStatus::Passthrough { target }
            } else {
                ColumnStatus::Duplicate {
                    target,
                    score: 100.0,
                }
            };
        }

        let candidates = self.required.iter().map(|(n, _)| n.as_str());
        let Some((idx, score)) = best_match(normalized, candidates, partial_ratio) else {
            return ColumnStatus::Unmapped {
                best: "",
                score: 0.0,
            };
        };
        let target = self.required[idx].1;

        if score < self.threshold {
            ColumnStatus::Unmapped {
                best: target,
                score,
            }
        } else if claimed.insert(target) {
            ColumnStatus::Mapped { target, score }
        } else {
            ColumnStatus::Duplicate { target, score }
        }
    }
}
