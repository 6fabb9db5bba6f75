//! Facility resolution and the unmatched-facility policies.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use imms_map::{best_match, ratio};
use imms_model::{FacilityMatch, MatchStrategy, StudentRow, UnmatchedPolicy};
use imms_report::write_unmatched_csv;
use imms_standards::{FacilityRegistry, normalize_facility_name};

use crate::error::{FacilityError, Result};

pub const DEFAULT_FUZZY_THRESHOLD: u8 = 85;

/// Outcome of resolving a run's rows.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Rows with `facility` attached; under `skip`, only matched rows.
    pub rows: Vec<StudentRow>,
    pub warnings: Vec<String>,
    /// One result per unique input name, in first-seen order.
    pub matches: Vec<FacilityMatch>,
    /// Side CSV written when at least one facility went unmatched.
    pub unmatched_report: Option<PathBuf>,
}

impl Resolution {
    pub fn unmatched(&self) -> impl Iterator<Item = &FacilityMatch> {
        self.matches.iter().filter(|m| !m.matched)
    }
}

/// Resolves school names against a [`FacilityRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct FacilityResolver<'a> {
    registry: &'a FacilityRegistry,
    strategy: MatchStrategy,
    threshold: u8,
}

impl<'a> FacilityResolver<'a> {
    pub fn new(registry: &'a FacilityRegistry) -> Self {
        Self {
            registry,
            strategy: MatchStrategy::default(),
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Minimum fuzzy score (0..=100) a candidate needs to count as a match.
    pub fn with_threshold(mut self, threshold: u8) -> Result<Self> {
        if threshold > 100 {
            return Err(FacilityError::InvalidThreshold(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Resolve one facility name.
    ///
    /// Exact lookup on the normalized name first. Under the fuzzy strategy a
    /// miss falls back to the best whole-string ratio over the registry's
    /// names; ties keep the name loaded first.
    pub fn match_facility(&self, name: &str) -> FacilityMatch {
        let normalized = normalize_facility_name(name);
        if normalized.is_empty() {
            return FacilityMatch::unmatched(name);
        }
        if let Some(facility) = self.registry.lookup(&normalized) {
            return FacilityMatch::exact(name, facility);
        }
        if self.strategy == MatchStrategy::Exact {
            return FacilityMatch::unmatched(name);
        }

        let names = self.registry.names();
        let best = best_match(&normalized, names.iter().map(String::as_str), ratio);
        match best {
            Some((idx, score)) if score >= f64::from(self.threshold) => {
                match self.registry.lookup(&names[idx]) {
                    Some(facility) => {
                        tracing::debug!(score, "fuzzy facility match");
                        FacilityMatch::fuzzy(name, facility, score.round() as u8)
                    }
                    None => FacilityMatch::unmatched(name),
                }
            }
            _ => FacilityMatch::unmatched(name),
        }
    }

    /// Resolve every row, matching each distinct school name once.
    ///
    /// When any name goes unmatched and `report_dir` is given, the side CSV
    /// is written there before the policy is applied, so it exists even when
    /// `error` aborts the run.
    pub fn resolve(
        &self,
        mut rows: Vec<StudentRow>,
        policy: UnmatchedPolicy,
        report_dir: Option<&Path>,
    ) -> Result<Resolution> {
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        let mut matches: Vec<FacilityMatch> = Vec::new();
        for row in &rows {
            if !index.contains_key(&row.school_name) {
                index.insert(row.school_name.clone(), matches.len());
                matches.push(self.match_facility(&row.school_name));
            }
        }

        let unmatched_names: Vec<String> = matches
            .iter()
            .filter(|m| !m.matched)
            .map(|m| m.input_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut warnings = Vec::new();
        let mut unmatched_report = None;
        if !unmatched_names.is_empty() {
            tracing::warn!(
                count = unmatched_names.len(),
                "facilities could not be matched to the PHIX reference"
            );
            let mut warning = format!(
                "{} facilities not found in PHIX reference.",
                unmatched_names.len()
            );
            if let Some(dir) = report_dir {
                let path = write_unmatched_csv(dir, &matches)?;
                warning.push_str(&format!(" See {} for details.", path.display()));
                unmatched_report = Some(path);
            }
            warnings.push(warning);

            match policy {
                UnmatchedPolicy::Warn => {}
                UnmatchedPolicy::Error => {
                    return Err(FacilityError::Unmatched {
                        names: unmatched_names,
                    });
                }
                UnmatchedPolicy::Skip => {
                    let before = rows.len();
                    rows.retain(|row| {
                        index
                            .get(&row.school_name)
                            .is_some_and(|&idx| matches[idx].matched)
                    });
                    let filtered = before - rows.len();
                    tracing::info!(
                        filtered,
                        remaining = rows.len(),
                        "dropped rows with unmatched facilities"
                    );
                    warnings.push(format!(
                        "Filtered {filtered} records with unmatched facilities."
                    ));
                }
            }
        }

        for row in &mut rows {
            if let Some(&idx) = index.get(&row.school_name) {
                row.facility = Some(matches[idx].clone());
            }
        }

        let matched = matches.iter().filter(|m| m.matched).count();
        tracing::info!(
            matched,
            unmatched = matches.len() - matched,
            strategy = %self.strategy,
            "facility resolution complete"
        );

        Ok(Resolution {
            rows,
            warnings,
            matches,
            unmatched_report,
        })
    }
}
