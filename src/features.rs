use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Input order the classifier was trained with. Any reordering silently
/// produces wrong predictions, so model metadata is checked against it.
pub const FEATURE_ORDER: [&str; 8] = [
    "soil_type",
    "crop_type",
    "nitrogen",
    "potassium",
    "phosphorous",
    "ph",
    "rainfall",
    "avg_nutrients",
];

pub const N_FEATURES: usize = FEATURE_ORDER.len();

/// Inclusive bounds for one numeric reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const NUTRIENT_BOUNDS: Bounds = Bounds { min: 0.0, max: 200.0, default: 0.0 };
pub const NITROGEN_BOUNDS: Bounds = Bounds { default: 20.0, ..NUTRIENT_BOUNDS };
pub const POTASSIUM_BOUNDS: Bounds = Bounds { default: 30.0, ..NUTRIENT_BOUNDS };
pub const PHOSPHOROUS_BOUNDS: Bounds = Bounds { default: 40.0, ..NUTRIENT_BOUNDS };
pub const PH_BOUNDS: Bounds = Bounds { min: 0.0, max: 14.0, default: 6.5 };
pub const RAINFALL_BOUNDS: Bounds = Bounds { min: 0.0, max: 500.0, default: 100.0 };

/// Bounds for every reading, for building input forms.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingBounds {
    pub nitrogen: Bounds,
    pub potassium: Bounds,
    pub phosphorous: Bounds,
    pub ph: Bounds,
    pub rainfall: Bounds,
}

impl Default for ReadingBounds {
    fn default() -> Self {
        Self {
            nitrogen: NITROGEN_BOUNDS,
            potassium: POTASSIUM_BOUNDS,
            phosphorous: PHOSPHOROUS_BOUNDS,
            ph: PH_BOUNDS,
            rainfall: RAINFALL_BOUNDS,
        }
    }
}

/// Numeric soil and weather readings for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub nitrogen: f64,
    pub potassium: f64,
    pub phosphorous: f64,
    pub ph: f64,
    /// Millimetres.
    pub rainfall: f64,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            nitrogen: NITROGEN_BOUNDS.default,
            potassium: POTASSIUM_BOUNDS.default,
            phosphorous: PHOSPHOROUS_BOUNDS.default,
            ph: PH_BOUNDS.default,
            rainfall: RAINFALL_BOUNDS.default,
        }
    }
}

impl Readings {
    /// Rejects readings outside their documented bounds (NaN included).
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("nitrogen", self.nitrogen, NITROGEN_BOUNDS),
            ("potassium", self.potassium, POTASSIUM_BOUNDS),
            ("phosphorous", self.phosphorous, PHOSPHOROUS_BOUNDS),
            ("ph", self.ph, PH_BOUNDS),
            ("rainfall", self.rainfall, RAINFALL_BOUNDS),
        ];
        for (reading, value, bounds) in checks {
            if !bounds.contains(value) {
                return Err(RecommendError::OutOfRange {
                    reading,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}

/// The 8 model inputs, in `FEATURE_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.0
    }

    pub fn average_nutrients(&self) -> f64 {
        self.0[N_FEATURES - 1]
    }

    /// Single-precision copy for tensor backends.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|v| *v as f32).collect()
    }
}

/// Builds the feature vector. No validation happens here; values pass through.
pub fn assemble(
    soil_code: usize,
    crop_code: usize,
    n: f64,
    k: f64,
    p: f64,
    ph: f64,
    rainfall: f64,
) -> FeatureVector {
    let average = (n + k + p) / 3.0;
    FeatureVector([
        soil_code as f64,
        crop_code as f64,
        n,
        k,
        p,
        ph,
        rainfall,
        average,
    ])
}
