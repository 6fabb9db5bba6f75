//! String-backed enumerations shared across the pipeline.
//!
//! Each enum round-trips through its lowercase wire form, which is also the
//! form accepted in `parameters.toml` and on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Output language of the generated notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "fr" | "french" => Ok(Language::French),
            _ => Err(ParseEnumError::new("language", s, "en, fr")),
        }
    }
}

/// How the client set is partitioned into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStrategy {
    /// One implicit group, chunked by size only.
    #[default]
    Size,
    /// One group per school identifier.
    School,
    /// One group per board identifier.
    Board,
}

impl BatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStrategy::Size => "size",
            BatchStrategy::School => "school",
            BatchStrategy::Board => "board",
        }
    }
}

impl fmt::Display for BatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStrategy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "size" => Ok(BatchStrategy::Size),
            "school" => Ok(BatchStrategy::School),
            "board" => Ok(BatchStrategy::Board),
            _ => Err(ParseEnumError::new(
                "batch strategy",
                s,
                "size, school, board",
            )),
        }
    }
}

/// Outcome class of a facility lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    #[serde(rename = "none")]
    NoMatch,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::NoMatch => "none",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the facility resolver may fall back to fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Exact,
    #[default]
    Fuzzy,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStrategy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchStrategy::Exact),
            "fuzzy" => Ok(MatchStrategy::Fuzzy),
            _ => Err(ParseEnumError::new("match strategy", s, "exact, fuzzy")),
        }
    }
}

/// What to do with rows whose facility is absent from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Keep every row and record a warning.
    #[default]
    Warn,
    /// Abort the run.
    Error,
    /// Drop rows whose facility did not match.
    Skip,
}

impl UnmatchedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedPolicy::Warn => "warn",
            UnmatchedPolicy::Error => "error",
            UnmatchedPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnmatchedPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(UnmatchedPolicy::Warn),
            "error" => Ok(UnmatchedPolicy::Error),
            "skip" => Ok(UnmatchedPolicy::Skip),
            _ => Err(ParseEnumError::new(
                "unmatched facility policy",
                s,
                "warn, error, skip",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_codes_and_names() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" french ".parse::<Language>().unwrap(), Language::French);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn batch_strategy_defaults_to_size_for_blank() {
        assert_eq!("".parse::<BatchStrategy>().unwrap(), BatchStrategy::Size);
        assert_eq!("Board".parse::<BatchStrategy>().unwrap(), BatchStrategy::Board);
        let err = "district".parse::<BatchStrategy>().unwrap_err();
        assert!(err.to_string().contains("district"));
    }

    #[test]
    fn match_type_serializes_lowercase() {
        let json = serde_json::to_string(&MatchType::NoMatch).unwrap();
        assert_eq!(json, "\"none\"");
        let json = serde_json::to_string(&Language::French).unwrap();
        assert_eq!(json, "\"fr\"");
    }
}
