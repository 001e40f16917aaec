use thiserror::Error;

/// Everything that can stop a recommendation request, or the process before it
/// serves one.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("invalid {kind} '{label}'; allowed: [{}]", allowed.join(", "))]
    InvalidCategory {
        kind: &'static str,
        label: String,
        allowed: Vec<String>,
    },

    #[error("{reading} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        reading: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Startup fatal: no request can be served without the model.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("unsupported language code '{0}' (expected 'en' or 'hi')")]
    UnsupportedLanguage(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
