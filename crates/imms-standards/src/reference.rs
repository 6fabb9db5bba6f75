//! JSON reference tables: disease display map and vaccine reference.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, StandardsError};
use crate::hash::sha256_hex;

/// Free-text disease phrase → canonical display phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DiseaseMap {
    entries: BTreeMap<String, String>,
}

impl DiseaseMap {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path, "disease map")
    }

    /// Display text for `phrase`; unknown phrases pass through unchanged.
    pub fn display<'a>(&'a self, phrase: &'a str) -> &'a str {
        self.entries.get(phrase).map_or(phrase, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Diseases one vaccine protects against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DiseaseRef {
    One(String),
    Many(Vec<String>),
}

/// Vaccine code → disease(s).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct VaccineReference {
    entries: BTreeMap<String, DiseaseRef>,
}

impl VaccineReference {
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, DiseaseRef)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path, "vaccine reference")
    }

    /// Append the diseases covered by `vaccine` to `out`.
    ///
    /// A vaccine missing from the reference stands in for its own disease.
    pub fn extend_diseases(&self, vaccine: &str, out: &mut Vec<String>) {
        match self.entries.get(vaccine) {
            Some(DiseaseRef::One(disease)) => out.push(disease.clone()),
            Some(DiseaseRef::Many(diseases)) => out.extend(diseases.iter().cloned()),
            None => out.push(vaccine.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_json<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
    let value = serde_json::from_slice(&bytes).map_err(|source| StandardsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        sha256 = %sha256_hex(&bytes),
        "loaded {kind}"
    );
    Ok(value)
}
