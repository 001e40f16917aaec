use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use crate::error::{RecommendError, Result};

/// Display language, used only as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }
}

impl FromStr for Language {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "hi" => Ok(Language::Hi),
            _ => Err(RecommendError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Descriptive text for one fertilizer in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertilizerDetails {
    pub npk: String,
    pub usage: String,
    pub dosage: String,
}

impl FertilizerDetails {
    fn new(npk: &str, usage: &str, dosage: &str) -> Self {
        Self {
            npk: npk.to_string(),
            usage: usage.to_string(),
            dosage: dosage.to_string(),
        }
    }
}

/// Static fertilizer metadata keyed by label, then language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTable(BTreeMap<String, BTreeMap<Language, FertilizerDetails>>);

impl MetadataTable {
    /// The table shipped with the application.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        table.insert(
            "Urea",
            FertilizerDetails::new(
                "46-0-0",
                "Boosts nitrogen levels; use during vegetative stage.",
                "50-70 kg per acre",
            ),
            FertilizerDetails::new(
                "46-0-0",
                "नाइट्रोजन की मात्रा बढ़ाता है; वृद्धि अवस्था में प्रयोग करें।",
                "50-70 किग्रा प्रति एकड़",
            ),
        );
        table.insert(
            "DAP",
            FertilizerDetails::new(
                "18-46-0",
                "High phosphorus content; good for root development.",
                "40-50 kg per acre",
            ),
            FertilizerDetails::new(
                "18-46-0",
                "उच्च फॉस्फोरस; जड़ों के विकास के लिए अच्छा।",
                "40-50 किग्रा प्रति एकड़",
            ),
        );
        table.insert(
            "Potash",
            FertilizerDetails::new(
                "0-0-60",
                "Increases disease resistance & improves grain filling.",
                "20-30 kg per acre",
            ),
            FertilizerDetails::new(
                "0-0-60",
                "रोग प्रतिरोधक क्षमता बढ़ाता है और दाने भरने में सुधार करता है।",
                "20-30 किग्रा प्रति एकड़",
            ),
        );
        table
    }

    /// Reads a replacement table, `{label: {lang: {npk, usage, dosage}}}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|e| {
            RecommendError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&txt)
    }

    pub fn from_json(txt: &str) -> Result<Self> {
        serde_json::from_str(txt)
            .map_err(|e| RecommendError::Config(format!("invalid fertilizer info: {e}")))
    }

    fn insert(&mut self, label: &str, en: FertilizerDetails, hi: FertilizerDetails) {
        let entry = self.0.entry(label.to_string()).or_default();
        entry.insert(Language::En, en);
        entry.insert(Language::Hi, hi);
    }

    pub fn get(&self, label: &str, language: Language) -> Option<&FertilizerDetails> {
        self.0.get(label).and_then(|by_lang| by_lang.get(&language))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" HI ".parse::<Language>().unwrap(), Language::Hi);
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(RecommendError::UnsupportedLanguage(code)) if code == "fr"
        ));
    }

    #[test]
    fn builtin_table_has_both_languages() {
        let table = MetadataTable::builtin();
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["DAP", "Potash", "Urea"]);
        let urea_en = table.get("Urea", Language::En).unwrap();
        let urea_hi = table.get("Urea", Language::Hi).unwrap();
        assert_eq!(urea_en.npk, "46-0-0");
        assert_eq!(urea_en.npk, urea_hi.npk);
        assert_eq!(urea_en.dosage, "50-70 kg per acre");
        assert!(table.get("14-35-14", Language::En).is_none());
    }

    #[test]
    fn table_from_json_replaces_builtin() {
        let table = MetadataTable::from_json(
            r#"{"10-26-26": {"en": {"npk": "10-26-26", "usage": "Flowering.", "dosage": "50 kg per acre"}}}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("10-26-26", Language::En).unwrap().usage, "Flowering.");
        assert!(table.get("10-26-26", Language::Hi).is_none());
        assert!(table.get("Urea", Language::En).is_none());
    }

    #[test]
    fn table_from_json_rejects_unknown_language() {
        let err = MetadataTable::from_json(
            r#"{"Urea": {"fr": {"npk": "46-0-0", "usage": "", "dosage": ""}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecommendError::Config(_)));
    }
}
