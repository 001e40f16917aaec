use anyhow::{bail, Context};
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use super::{label_probabilities, top_class, LabelProbability, ModelMeta, OutputKind, PredictionService};
use crate::error::{RecommendError, Result};
use crate::features::{FeatureVector, N_FEATURES};

/// TorchScript fertilizer classifier plus its label encoder sidecar.
pub struct TorchClassifier {
    model: CModule,
    device: Device,
    meta: ModelMeta,
}

impl TorchClassifier {
    /// Loads both artifacts and runs a warm-up forward pass. Any failure here
    /// is `ModelUnavailable`.
    pub fn load(model_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> Result<Self> {
        Self::try_load(model_path.as_ref(), meta_path.as_ref())
            .map_err(|e| RecommendError::ModelUnavailable(format!("{e:#}")))
    }

    fn try_load(model_path: &Path, meta_path: &Path) -> anyhow::Result<Self> {
        let device = Device::Cpu;
        let meta = ModelMeta::load(meta_path)?;

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path.display()))?;

        // Probe output shape with a dummy forward
        let dummy = Tensor::zeros([1, N_FEATURES as i64], (Kind::Float, device));
        let t = model.forward_ts(&[dummy]).context("warm-up forward failed")?;
        let sz = t.size();
        let n_classes = meta.classes.len() as i64;
        match meta.output {
            OutputKind::Logits | OutputKind::Probabilities => {
                if sz != [1, n_classes] {
                    bail!("unexpected model output size {:?}, expected [1, {}]", sz, n_classes);
                }
            }
            OutputKind::ClassIndex => {
                if t.numel() != 1 {
                    bail!("unexpected model output size {:?}, expected a single class index", sz);
                }
            }
        }
        tracing::info!(
            classes = meta.classes.len(),
            output = ?meta.output,
            "warmup forward ok"
        );

        Ok(Self { model, device, meta })
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn forward(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let input = Tensor::from_slice(&features.to_f32())
            .reshape([1, N_FEATURES as i64])
            .to_device(self.device);

        let out = self
            .model
            .forward_ts(&[input])
            .map_err(|e| RecommendError::Prediction(e.to_string()))?
            .to_kind(Kind::Double)
            .reshape([-1]);

        let n = out.size()[0];
        Ok((0..n).map(|i| out.double_value(&[i])).collect())
    }
}

impl PredictionService for TorchClassifier {
    fn labels(&self) -> &[String] {
        &self.meta.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let raw = self.forward(features)?;
        let index = match self.meta.output {
            OutputKind::ClassIndex => {
                let v = raw.first().copied().unwrap_or(f64::NAN);
                if !(v >= 0.0) {
                    return Err(RecommendError::Prediction(format!(
                        "model returned invalid class index {v}"
                    )));
                }
                v.round() as usize
            }
            OutputKind::Logits | OutputKind::Probabilities => top_class(self.meta.output, &raw)?,
        };
        self.meta.label(index).map(str::to_owned)
    }

    fn supports_probabilities(&self) -> bool {
        self.meta.output.has_probabilities()
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<LabelProbability>> {
        let raw = self.forward(features)?;
        label_probabilities(&self.meta.classes, self.meta.output, &raw)
    }
}
