//! Overdue-disease text → canonical display names.

use imms_model::Language;
use imms_standards::DiseaseMap;

/// Phrases rewritten before the comma split, per language. Each source
/// phrase contains a comma that would otherwise split it in two.
fn replacements(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::English => &[(
            "Haemophilus influenzae infection, invasive",
            "Invasive Haemophilus influenzae infection (Hib)",
        )],
        Language::French => &[(
            "infection à Haemophilus influenzae, invasive",
            "Haemophilus influenzae de type b (Hib)",
        )],
    }
}

/// Mapped overdue diseases in both joined and list form.
///
/// `list` is `text` split on commas, so a display name that itself contains
/// a comma contributes more than one list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaccinesDue {
    pub text: String,
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct DueMapper<'a> {
    diseases: &'a DiseaseMap,
    language: Language,
}

impl<'a> DueMapper<'a> {
    pub fn new(diseases: &'a DiseaseMap, language: Language) -> Self {
        Self { diseases, language }
    }

    pub fn map(&self, raw: &str) -> VaccinesDue {
        if raw.trim().is_empty() {
            return VaccinesDue::default();
        }

        let mut text = raw.to_string();
        for &(from, to) in replacements(self.language) {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }

        let text = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                self.diseases
                    .display(token)
                    .replace(['\'', '"'], "")
                    .trim()
                    .to_string()
            })
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let list = text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        VaccinesDue { text, list }
    }
}
