//! Fertilizer recommendation from soil and crop readings.
//!
//! The pipeline encodes the two category inputs, assembles the fixed-order
//! feature vector, asks a loaded classifier for a fertilizer and dresses the
//! answer with static reference text and ranked alternatives.

pub mod chart;
pub mod config;
pub mod error;
pub mod features;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod presenter;
pub mod report;
pub mod vocab;

pub use error::{RecommendError, Result};
pub use features::{assemble, FeatureVector, Readings, FEATURE_ORDER};
pub use metadata::{FertilizerDetails, Language, MetadataTable};
pub use model::{LabelProbability, PredictionService};
pub use pipeline::{FormOptions, RecommendRequest, Recommender};
pub use presenter::{present, Alternative, PredictionResult, PresentationRecord};
pub use vocab::{Vocabularies, Vocabulary};
