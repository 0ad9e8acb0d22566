//! T20 final-score prediction.
//!
//! Derives model features from a match situation, gates predictions on a
//! valid situation, tracks the predict/display lifecycle of one session and
//! keeps a short persisted history of committed predictions.

pub mod config;
pub mod cricket;
pub mod dashboard;
pub mod history;
pub mod model;
pub mod session;

pub use cricket::{derive, is_valid, City, DerivedFeatures, FeatureRow, MatchSituation, Team};
pub use history::{HistoryLog, HistoryStore, PredictionRecord, HISTORY_CAPACITY};
pub use model::{ModelError, ScoreModel};
pub use session::{Lifecycle, PredictError, PredictionSummary, SessionState, SituationUpdate};
