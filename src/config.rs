use clap::Parser;
use std::time::Duration;

use crate::history::HISTORY_CAPACITY;

/// Upper bound accepted for `--history-capacity`.
const MAX_HISTORY_CAPACITY: usize = 50;

/// T20 final-score predictor dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "t20-predictor", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Path of the JSON file holding recent predictions
    #[arg(long, env = "HISTORY_PATH", default_value = "history.json")]
    pub history_path: String,

    /// Number of recent predictions kept
    #[arg(long, env = "HISTORY_CAPACITY", default_value_t = HISTORY_CAPACITY)]
    pub history_capacity: usize,

    /// Score model endpoint; the built-in run-rate projection is used when unset
    #[arg(long, env = "MODEL_URL")]
    pub model_url: Option<String>,

    /// Timeout for a single model request in seconds
    #[arg(long, env = "MODEL_TIMEOUT_SECS", default_value = "10")]
    pub model_timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            anyhow::bail!("history_capacity must be between 1 and {}", MAX_HISTORY_CAPACITY);
        }
        if self.history_path.trim().is_empty() {
            anyhow::bail!("history_path must not be empty");
        }
        if self.model_timeout_secs == 0 {
            anyhow::bail!("model_timeout_secs must be positive");
        }
        if let Some(raw) = &self.model_url {
            let url = url::Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("MODEL_URL is not a valid URL: {}", e))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("MODEL_URL must use http or https, got {}", url.scheme());
            }
        }
        Ok(())
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}
