use async_trait::async_trait;
use thiserror::Error;

use crate::cricket::FeatureRow;

/// Failure to obtain a prediction from the model. Never retried.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unrecognised model response: {0}")]
    Malformed(String),

    #[error("model returned a non-finite prediction")]
    NonFinite,

    #[error("model returned an implausible total: {0}")]
    Implausible(f64),
}

/// Trait that every final-score model must implement.
///
/// The model is opaque: one feature row in, one predicted total out.
#[async_trait]
pub trait ScoreModel: Send + Sync {
    /// Predict the final innings total for a single feature row.
    async fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
