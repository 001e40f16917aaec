use serde::Serialize;

use crate::features::Readings;
use crate::metadata::{FertilizerDetails, Language, MetadataTable};
use crate::model::LabelProbability;

/// How many alternatives the report lists.
pub const TOP_ALTERNATIVES: usize = 3;

/// Raw classifier output for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    /// Native label order; `None` when the classifier has no probabilities.
    pub probabilities: Option<Vec<LabelProbability>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub label: String,
    /// Probability x 100, rounded to 2 decimals.
    pub percentage: f64,
}

/// Nutrient levels in chart order (N, P, K).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientBalance {
    pub nitrogen: f64,
    pub phosphorous: f64,
    pub potassium: f64,
}

impl From<&Readings> for NutrientBalance {
    fn from(r: &Readings) -> Self {
        Self {
            nitrogen: r.nitrogen,
            phosphorous: r.phosphorous,
            potassium: r.potassium,
        }
    }
}

/// Everything the display surface needs for one recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationRecord {
    pub language: Language,
    pub recommendation: String,
    pub details: Option<FertilizerDetails>,
    pub alternatives: Option<Vec<Alternative>>,
    pub nutrients: Option<NutrientBalance>,
}

impl PresentationRecord {
    pub fn with_nutrients(mut self, readings: &Readings) -> Self {
        self.nutrients = Some(readings.into());
        self
    }
}

/// Builds the record. A label missing from the table just drops the detail
/// block.
pub fn present(
    result: &PredictionResult,
    metadata: &MetadataTable,
    language: Language,
) -> PresentationRecord {
    let details = metadata.get(&result.label, language).cloned();
    if details.is_none() {
        tracing::debug!(label = %result.label, %language, "no fertilizer details");
    }

    PresentationRecord {
        language,
        recommendation: result.label.clone(),
        details,
        alternatives: result
            .probabilities
            .as_deref()
            .map(|probs| rank_alternatives(probs, TOP_ALTERNATIVES)),
        nutrients: None,
    }
}

/// Highest probabilities first; equal probabilities keep native order.
pub fn rank_alternatives(probs: &[LabelProbability], top: usize) -> Vec<Alternative> {
    let mut ranked: Vec<&LabelProbability> = probs.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked
        .into_iter()
        .take(top)
        .map(|p| Alternative {
            label: p.label.clone(),
            percentage: round2(p.probability * 100.0),
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
