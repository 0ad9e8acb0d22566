use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::provider::{ModelError, ScoreModel};
use crate::cricket::FeatureRow;

/// Score model served over HTTP.
///
/// The feature row is POSTed as a one-element JSON array of objects, the
/// shape a pandas-backed serving endpoint expects for a single-row frame.
#[derive(Clone)]
pub struct HttpScoreModel {
    http: Client,
    url: String,
}

impl HttpScoreModel {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpScoreModel {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ScoreModel for HttpScoreModel {
    fn name(&self) -> &str {
        "http"
    }

    async fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        debug!("Requesting prediction from {}", self.url);

        let resp = self.http.post(&self.url).json(&[row]).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let raw: serde_json::Value = resp.json().await?;
        parse_prediction(&raw)
    }
}

/// Accepts `n`, `[n]`, `{"prediction": n}` or `{"predictions": [n]}`.
fn parse_prediction(raw: &serde_json::Value) -> Result<f64, ModelError> {
    let value = match raw {
        serde_json::Value::Number(_) => raw,
        serde_json::Value::Array(items) => items
            .first()
            .ok_or_else(|| ModelError::Malformed("empty prediction array".into()))?,
        serde_json::Value::Object(map) => {
            if let Some(v) = map.get("prediction") {
                v
            } else if let Some(v) = map.get("predictions").and_then(|p| p.get(0)) {
                v
            } else {
                return Err(ModelError::Malformed(raw.to_string()));
            }
        }
        _ => return Err(ModelError::Malformed(raw.to_string())),
    };

    let total = value
        .as_f64()
        .ok_or_else(|| ModelError::Malformed(value.to_string()))?;
    if !total.is_finite() {
        return Err(ModelError::NonFinite);
    }
    Ok(total)
}
