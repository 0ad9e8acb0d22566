use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use t20_predictor::config::Config;
use t20_predictor::dashboard::{self, AppState};
use t20_predictor::history::HistoryStore;
use t20_predictor::model::{HttpScoreModel, RunRateProjection, ScoreModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open history (never fails; problems are logged and start an empty log)
    let history = HistoryStore::open(&config.history_path, config.history_capacity);

    let model: Arc<dyn ScoreModel> = match &config.model_url {
        Some(url) => {
            info!("Using model endpoint {}", url);
            Arc::new(HttpScoreModel::new(url, config.model_timeout())?)
        }
        None => {
            info!("No MODEL_URL configured, using built-in run-rate projection");
            Arc::new(RunRateProjection::default())
        }
    };

    let app = dashboard::router(AppState::new(history, model));
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
