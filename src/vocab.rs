use crate::error::{RecommendError, Result};

/// Soil types in the order the input form lists them.
pub const SOIL_TYPES: &[&str] = &["Sandy", "Loamy", "Clayey", "Red", "Black"];

/// Crop types in the order the input form lists them.
pub const CROP_TYPES: &[&str] = &[
    "rice",
    "Wheat",
    "Tobacco",
    "Sugarcane",
    "Pulses",
    "pomegranate",
    "Paddy",
    "Oil seeds",
    "Millets",
    "Maize",
    "Ground Nuts",
    "Cotton",
    "coffee",
    "watermelon",
    "Barley",
    "kidneybeans",
    "orange",
];

/// A closed set of category labels.
///
/// Codes are indices into the labels sorted by code point, which is what the
/// model was trained against. The form order is kept separately for menus.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    kind: &'static str,
    display: Vec<String>,
    sorted: Vec<String>,
}

impl Vocabulary {
    pub fn new(kind: &'static str, labels: &[&str]) -> Self {
        let display: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let mut sorted = display.clone();
        // String ordering is byte-wise, i.e. code point order for UTF-8.
        sorted.sort();
        sorted.dedup();
        Self {
            kind,
            display,
            sorted,
        }
    }

    pub fn soil() -> Self {
        Self::new("soil type", SOIL_TYPES)
    }

    pub fn crop() -> Self {
        Self::new("crop type", CROP_TYPES)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Labels in form order.
    pub fn display_labels(&self) -> &[String] {
        &self.display
    }

    /// Labels in code order.
    pub fn sorted_labels(&self) -> &[String] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.sorted
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .map_err(|_| self.invalid(label.to_string()))
    }

    pub fn decode(&self, code: usize) -> Result<&str> {
        self.sorted
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| self.invalid(format!("code {code}")))
    }

    fn invalid(&self, label: String) -> RecommendError {
        RecommendError::InvalidCategory {
            kind: self.kind,
            label,
            allowed: self.display.clone(),
        }
    }
}

/// Both input vocabularies, built once per process.
#[derive(Debug, Clone)]
pub struct Vocabularies {
    pub soil: Vocabulary,
    pub crop: Vocabulary,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            soil: Vocabulary::soil(),
            crop: Vocabulary::crop(),
        }
    }
}
