use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{RecommendError, Result};
use crate::features::{FeatureVector, FEATURE_ORDER, N_FEATURES};

#[cfg(feature = "torch")]
mod torch;
#[cfg(feature = "torch")]
pub use torch::TorchClassifier;

/// Probability the classifier assigns to one fertilizer label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelProbability {
    pub label: String,
    pub probability: f64,
}

/// A loaded fertilizer classifier.
///
/// Implementations are read-only after construction; `predict` must return the
/// same label for the same vector.
pub trait PredictionService: Send + Sync {
    /// Label encoder classes, in the model's native index order.
    fn labels(&self) -> &[String];

    fn predict(&self, features: &FeatureVector) -> Result<String>;

    /// Whether `predict_probabilities` is implemented.
    fn supports_probabilities(&self) -> bool {
        false
    }

    /// One entry per label, in native order.
    fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<LabelProbability>> {
        Err(RecommendError::Prediction(
            "classifier does not expose class probabilities".into(),
        ))
    }
}

/// What the classifier's forward pass returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// `[1, C]` unnormalised scores.
    #[default]
    Logits,
    /// `[1, C]` class probabilities.
    Probabilities,
    /// A single predicted class index.
    ClassIndex,
}

impl OutputKind {
    pub fn has_probabilities(self) -> bool {
        !matches!(self, OutputKind::ClassIndex)
    }
}

/// Sidecar describing the classifier: label encoder classes plus the input
/// contract it was trained with.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMeta {
    pub classes: Vec<String>,
    #[serde(default)]
    pub feat_list: Option<Vec<String>>,
    #[serde(default)]
    pub in_dim: Option<usize>,
    #[serde(default)]
    pub output: OutputKind,
}

impl ModelMeta {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|e| {
            RecommendError::ModelUnavailable(format!(
                "failed to read meta at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&txt)
    }

    pub fn from_json(txt: &str) -> Result<Self> {
        let meta: ModelMeta = serde_json::from_str(txt).map_err(|e| {
            RecommendError::ModelUnavailable(format!("failed to parse model meta: {e}"))
        })?;
        meta.check()?;
        Ok(meta)
    }

    /// Fails unless the sidecar agrees with `FEATURE_ORDER`.
    pub fn check(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(RecommendError::ModelUnavailable(
                "model meta lists no classes".into(),
            ));
        }
        if let Some(in_dim) = self.in_dim {
            if in_dim != N_FEATURES {
                return Err(RecommendError::ModelUnavailable(format!(
                    "model expects {in_dim} features, pipeline builds {N_FEATURES}"
                )));
            }
        }
        if let Some(feat_list) = &self.feat_list {
            if feat_list.iter().map(String::as_str).ne(FEATURE_ORDER.iter().copied()) {
                return Err(RecommendError::ModelUnavailable(format!(
                    "feature order mismatch: model {feat_list:?}, pipeline {FEATURE_ORDER:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn label(&self, index: usize) -> Result<&str> {
        self.classes.get(index).map(String::as_str).ok_or_else(|| {
            RecommendError::Prediction(format!(
                "predicted class {index} outside label encoder ({} classes)",
                self.classes.len()
            ))
        })
    }
}

/// Index of the first maximum, matching numpy's argmax.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Allowed distance of a probability vector's sum from 1.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Rejects score vectors that cannot be ranked: non-finite logits, or
/// probabilities that are negative, non-finite or not normalised.
pub fn check_scores(output: OutputKind, raw: &[f64]) -> Result<()> {
    if let Some(bad) = raw.iter().find(|v| !v.is_finite()) {
        return Err(RecommendError::Prediction(format!(
            "model returned non-finite score {bad}"
        )));
    }
    if output == OutputKind::Probabilities {
        if let Some(neg) = raw.iter().find(|v| **v < 0.0) {
            return Err(RecommendError::Prediction(format!(
                "model returned negative probability {neg}"
            )));
        }
        let sum: f64 = raw.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(RecommendError::Prediction(format!(
                "model probabilities sum to {sum}, expected 1"
            )));
        }
    }
    Ok(())
}

/// Index of the winning class in a checked score vector.
pub fn top_class(output: OutputKind, raw: &[f64]) -> Result<usize> {
    check_scores(output, raw)?;
    argmax(raw).ok_or_else(|| RecommendError::Prediction("model returned no class scores".into()))
}

/// Pairs raw per-class scores with labels, normalising logits.
pub fn label_probabilities(
    classes: &[String],
    output: OutputKind,
    raw: &[f64],
) -> Result<Vec<LabelProbability>> {
    if raw.len() != classes.len() {
        return Err(RecommendError::Prediction(format!(
            "model returned {} scores for {} classes",
            raw.len(),
            classes.len()
        )));
    }
    check_scores(output, raw)?;
    let probs = match output {
        OutputKind::Logits => softmax(raw),
        OutputKind::Probabilities => raw.to_vec(),
        OutputKind::ClassIndex => {
            return Err(RecommendError::Prediction(
                "classifier does not expose class probabilities".into(),
            ))
        }
    };
    Ok(classes
        .iter()
        .zip(probs)
        .map(|(label, probability)| LabelProbability {
            label: label.clone(),
            probability,
        })
        .collect())
}
