/// Integration tests for the recommendation pipeline
///
/// Run with: cargo test --test recommend_pipeline -- --nocapture

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use krishisahay::{
    FeatureVector, LabelProbability, Language, MetadataTable, PredictionService,
    RecommendError, RecommendRequest, Recommender, Readings, Result,
};

/// Classifier with fixed scores that remembers the last vector it saw.
struct ScoredStub {
    labels: Vec<String>,
    scores: Vec<f64>,
    with_probabilities: bool,
    seen: Mutex<Option<FeatureVector>>,
}

impl ScoredStub {
    fn new(pairs: &[(&str, f64)], with_probabilities: bool) -> Self {
        Self {
            labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
            scores: pairs.iter().map(|(_, s)| *s).collect(),
            with_probabilities,
            seen: Mutex::new(None),
        }
    }

    fn last_seen(&self) -> Option<FeatureVector> {
        *self.seen.lock().unwrap()
    }
}

impl PredictionService for ScoredStub {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        *self.seen.lock().unwrap() = Some(*features);
        let best = krishisahay::model::argmax(&self.scores).unwrap();
        Ok(self.labels[best].clone())
    }

    fn supports_probabilities(&self) -> bool {
        self.with_probabilities
    }

    fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<LabelProbability>> {
        Ok(self
            .labels
            .iter()
            .zip(&self.scores)
            .map(|(label, p)| LabelProbability {
                label: label.clone(),
                probability: *p,
            })
            .collect())
    }
}

struct BrokenStub;

impl PredictionService for BrokenStub {
    fn labels(&self) -> &[String] {
        &[]
    }

    fn predict(&self, _features: &FeatureVector) -> Result<String> {
        Err(RecommendError::Prediction("shape mismatch".into()))
    }
}

fn request(soil: &str, crop: &str) -> RecommendRequest {
    RecommendRequest {
        soil: soil.into(),
        crop: crop.into(),
        readings: Readings {
            nitrogen: 20.0,
            potassium: 30.0,
            phosphorous: 40.0,
            ph: 6.5,
            rainfall: 100.0,
        },
    }
}

fn seven_fertilizers() -> Vec<(&'static str, f64)> {
    vec![
        ("10-26-26", 0.05),
        ("14-35-14", 0.10),
        ("17-17-17", 0.05),
        ("20-20", 0.10),
        ("28-28", 0.05),
        ("DAP", 0.25),
        ("Urea", 0.40),
    ]
}

#[test]
fn test_reference_request_end_to_end() {
    println!("\n=== Test: Reference Request End To End ===");
    let stub = Arc::new(ScoredStub::new(&seven_fertilizers(), true));
    let rec = Recommender::new(stub.clone(), MetadataTable::builtin());

    let record = rec
        .recommend(&request("Loamy", "Wheat"), Language::En)
        .expect("recommendation should succeed");

    let features = stub.last_seen().expect("model should have been called");
    println!("✓ features: {:?}", features.values());
    assert_eq!(
        features.values(),
        &[2.0, 10.0, 20.0, 30.0, 40.0, 6.5, 100.0, 30.0],
        "feature order must be soil, crop, N, K, P, pH, rainfall, avg"
    );
    assert_eq!(features.average_nutrients(), 30.0);

    assert_eq!(record.recommendation, "Urea");
    assert_eq!(record.details.as_ref().unwrap().npk, "46-0-0");

    let alts = record.alternatives.as_ref().unwrap();
    let labels: Vec<_> = alts.iter().map(|a| a.label.as_str()).collect();
    println!("✓ alternatives: {:?}", alts);
    // 14-35-14 and 20-20 tie; native order wins.
    assert_eq!(labels, vec!["Urea", "DAP", "14-35-14"]);
    assert_relative_eq!(alts[0].percentage, 40.0);
    assert_relative_eq!(alts[1].percentage, 25.0);

    let n = record.nutrients.unwrap();
    assert_eq!((n.nitrogen, n.phosphorous, n.potassium), (20.0, 40.0, 30.0));
    println!("✓ All assertions passed");
}

#[test]
fn test_hindi_details() {
    let stub = Arc::new(ScoredStub::new(&[("DAP", 0.8), ("Potash", 0.2)], true));
    let rec = Recommender::new(stub, MetadataTable::builtin());

    let record = rec.recommend(&request("Black", "Cotton"), Language::Hi).unwrap();
    assert_eq!(record.language, Language::Hi);
    let details = record.details.unwrap();
    assert_eq!(details.npk, "18-46-0");
    assert_eq!(details.dosage, "40-50 किग्रा प्रति एकड़");
    assert_eq!(record.alternatives.unwrap().len(), 2);
}

#[test]
fn test_without_probability_capability() {
    let stub = Arc::new(ScoredStub::new(&seven_fertilizers(), false));
    let rec = Recommender::new(stub, MetadataTable::builtin());

    let record = rec.recommend(&request("Red", "rice"), Language::En).unwrap();
    assert_eq!(record.recommendation, "Urea");
    assert!(record.alternatives.is_none(), "no ranking without probabilities");
}

#[test]
fn test_unknown_fertilizer_has_no_details() {
    let stub = Arc::new(ScoredStub::new(&[("28-28", 0.9), ("Urea", 0.1)], true));
    let rec = Recommender::new(stub, MetadataTable::builtin());

    let record = rec.recommend(&request("Sandy", "Maize"), Language::En).unwrap();
    assert_eq!(record.recommendation, "28-28");
    assert!(record.details.is_none());
    assert!(record.alternatives.is_some());
}

#[test]
fn test_invalid_category_halts_request() {
    let stub = Arc::new(ScoredStub::new(&seven_fertilizers(), true));
    let rec = Recommender::new(stub.clone(), MetadataTable::builtin());

    match rec.recommend(&request("Loamy", "Banana"), Language::En) {
        Err(RecommendError::InvalidCategory { kind, label, allowed }) => {
            assert_eq!(kind, "crop type");
            assert_eq!(label, "Banana");
            assert!(allowed.iter().any(|c| c == "Wheat"));
        }
        other => panic!("expected InvalidCategory, got {other:?}"),
    }
    assert!(
        rec.recommend(&request("Peaty", "Wheat"), Language::En).is_err(),
        "unknown soil must fail"
    );
    assert!(stub.last_seen().is_none(), "model must not run for invalid input");
}

#[test]
fn test_out_of_range_reading_halts_request() {
    let stub = Arc::new(ScoredStub::new(&seven_fertilizers(), true));
    let rec = Recommender::new(stub.clone(), MetadataTable::builtin());

    let mut req = request("Clayey", "Paddy");
    req.readings.rainfall = 650.0;
    let err = rec.recommend(&req, Language::En).unwrap_err();
    assert!(matches!(err, RecommendError::OutOfRange { reading: "rainfall", .. }));
    assert!(stub.last_seen().is_none());
}

#[test]
fn test_prediction_error_is_surfaced() {
    let rec = Recommender::new(Arc::new(BrokenStub), MetadataTable::builtin());
    let err = rec.recommend(&request("Loamy", "Wheat"), Language::En).unwrap_err();
    assert!(matches!(err, RecommendError::Prediction(_)));
    assert_eq!(err.to_string(), "prediction failed: shape mismatch");
}

#[test]
fn test_repeated_requests_are_deterministic() {
    let stub = Arc::new(ScoredStub::new(&seven_fertilizers(), true));
    let rec = Recommender::new(stub, MetadataTable::builtin());
    let shared = rec.clone();

    let a = rec.recommend(&request("Loamy", "Wheat"), Language::En).unwrap();
    let b = shared.recommend(&request("Loamy", "Wheat"), Language::En).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_form_options_list_vocabularies_in_form_order() {
    let rec = Recommender::new(Arc::new(BrokenStub), MetadataTable::builtin());
    let options = rec.options();
    assert_eq!(options.soil_types, vec!["Sandy", "Loamy", "Clayey", "Red", "Black"]);
    assert_eq!(options.crop_types.len(), 17);
    assert_eq!(options.crop_types[0], "rice");
    assert_eq!(options.bounds.nitrogen.max, 200.0);
    assert_eq!(options.bounds.ph.max, 14.0);
    assert_eq!(options.bounds.rainfall.max, 500.0);
}

#[test]
fn test_request_deserializes_from_flat_json() {
    let req: RecommendRequest = serde_json::from_str(
        r#"{"soil": "Loamy", "crop": "Wheat", "nitrogen": 20, "potassium": 30,
            "phosphorous": 40, "ph": 6.5, "rainfall": 100}"#,
    )
    .unwrap();
    assert_eq!(req, request("Loamy", "Wheat"));
}

#[test]
fn test_recommender_shares_process_state() {
    let rec = Recommender::new(Arc::new(BrokenStub), MetadataTable::builtin());
    let vocab = rec.vocabularies();
    assert_eq!(vocab.soil.kind(), "soil type");
    assert_eq!(vocab.crop.kind(), "crop type");
    assert_eq!(vocab.soil.sorted_labels()[0], "Black");
    assert_eq!(vocab.crop.sorted_labels().len(), 17);
    assert_eq!(rec.metadata().len(), 3);
    assert!(rec.metadata().get("Potash", Language::Hi).is_some());
}
