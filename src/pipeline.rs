use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::features::{assemble, FeatureVector, ReadingBounds, Readings, FEATURE_ORDER};
use crate::metadata::{Language, MetadataTable};
use crate::model::PredictionService;
use crate::presenter::{present, PredictionResult, PresentationRecord};
use crate::vocab::Vocabularies;

/// One form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub soil: String,
    pub crop: String,
    #[serde(flatten)]
    pub readings: Readings,
}

/// What an input form needs to constrain its fields.
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub soil_types: Vec<String>,
    pub crop_types: Vec<String>,
    pub bounds: ReadingBounds,
}

impl FormOptions {
    pub fn new(vocab: &Vocabularies) -> Self {
        Self {
            soil_types: vocab.soil.display_labels().to_vec(),
            crop_types: vocab.crop.display_labels().to_vec(),
            bounds: ReadingBounds::default(),
        }
    }
}

/// Process-wide state: built once, read-only afterwards, cheap to clone.
#[derive(Clone)]
pub struct Recommender {
    model: Arc<dyn PredictionService>,
    vocab: Arc<Vocabularies>,
    metadata: Arc<MetadataTable>,
    log_features: bool,
}

impl Recommender {
    pub fn new(model: Arc<dyn PredictionService>, metadata: MetadataTable) -> Self {
        Self {
            model,
            vocab: Arc::new(Vocabularies::default()),
            metadata: Arc::new(metadata),
            log_features: false,
        }
    }

    /// Log summary statistics of every assembled vector.
    pub fn with_feature_logging(mut self, enabled: bool) -> Self {
        self.log_features = enabled;
        self
    }

    pub fn vocabularies(&self) -> &Vocabularies {
        &self.vocab
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    pub fn options(&self) -> FormOptions {
        FormOptions::new(&self.vocab)
    }

    /// Validates and encodes the request into model input.
    pub fn features(&self, req: &RecommendRequest) -> Result<FeatureVector> {
        req.readings.validate()?;
        let soil = self.vocab.soil.encode(&req.soil)?;
        let crop = self.vocab.crop.encode(&req.crop)?;
        let r = &req.readings;
        Ok(assemble(
            soil,
            crop,
            r.nitrogen,
            r.potassium,
            r.phosphorous,
            r.ph,
            r.rainfall,
        ))
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let label = self.model.predict(features)?;
        let probabilities = if self.model.supports_probabilities() {
            Some(self.model.predict_probabilities(features)?)
        } else {
            None
        };
        Ok(PredictionResult {
            label,
            probabilities,
        })
    }

    /// Runs one request end to end. Any error halts the request.
    pub fn recommend(
        &self,
        req: &RecommendRequest,
        language: Language,
    ) -> Result<PresentationRecord> {
        let features = self.features(req)?;
        if self.log_features {
            log_feature_stats(&features);
        }

        let result = self.predict(&features)?;
        tracing::info!(
            soil = %req.soil,
            crop = %req.crop,
            fertilizer = %result.label,
            "recommendation ready"
        );

        Ok(present(&result, &self.metadata, language).with_nutrients(&req.readings))
    }
}

fn log_feature_stats(features: &FeatureVector) {
    let v = features.values();
    let nz = v.iter().filter(|x| **x != 0.0).count();
    let mean = v.iter().sum::<f64>() / v.len() as f64;
    let std = (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / v.len() as f64).sqrt();
    let sample: Vec<String> = FEATURE_ORDER
        .iter()
        .zip(v.iter())
        .map(|(name, x)| format!("{name}={x:.3}"))
        .collect();
    tracing::info!(
        "features in_dim={} nonzero={} mean={:.3} std={:.3} [{}]",
        v.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}
