//! Prediction lifecycle for a single user session.
//!
//! The session owns the situation currently shown in the inputs and the
//! lifecycle state derived from it. Any change to the situation drops a
//! committed prediction, so a predicted score is only ever reported against
//! the situation it was computed for.

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::cricket::{
    derive, validity, City, DerivedFeatures, FeatureRow, InvalidReason, MatchSituation, Selection,
    Team,
};
use crate::history::{HistoryIndexOutOfRange, HistoryStore, PredictionRecord};
use crate::model::{ModelError, ScoreModel};

pub mod projection;
pub use projection::{PredictionSummary, ScoreOutlook};

/// Local-time format stored with each committed prediction.
pub const TIMESTAMP_FORMAT: &str = "%H:%M";

/// Highest model total accepted; anything above is a model fault.
pub const MAX_PLAUSIBLE_TOTAL: f64 = 500.0;

/// Where the session is in the predict cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    /// Situation incomplete or invalid
    Empty,
    /// Situation valid, no prediction committed for it
    Ready,
    /// A prediction has been committed for the current situation
    Predicted { predicted_score: i32 },
}

/// A change to a single input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SituationUpdate {
    BattingTeam(Option<Team>),
    BowlingTeam(Option<Team>),
    City(Option<City>),
    CurrentScore(u32),
    Overs(f64),
    Wickets(u32),
    LastFive(u32),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("match situation is not predictable: {0}")]
    InvalidSituation(#[from] InvalidReason),

    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),
}

/// Caller-owned state of one prediction session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    situation: MatchSituation,
    lifecycle: Lifecycle,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_situation(MatchSituation::default())
    }

    pub fn with_situation(situation: MatchSituation) -> Self {
        let lifecycle = settle(&situation);
        SessionState {
            situation,
            lifecycle,
        }
    }

    pub fn situation(&self) -> &MatchSituation {
        &self.situation
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Why the current situation cannot be predicted, if it cannot.
    pub fn validity(&self) -> Result<(), InvalidReason> {
        validity::check(&self.situation).map(|_| ())
    }

    /// Derived features, available whenever the situation is valid or a
    /// prediction is committed for it. A history entry is trusted even when
    /// it would fail today's checks, so `Predicted` always carries features.
    pub fn features(&self) -> Option<DerivedFeatures> {
        let available = matches!(self.lifecycle, Lifecycle::Predicted { .. })
            || self.validity().is_ok();
        available.then(|| {
            derive(
                self.situation.current_score,
                self.situation.overs,
                self.situation.wickets,
            )
        })
    }

    /// Summary of the committed prediction, if there is one.
    pub fn summary(&self) -> Option<PredictionSummary> {
        match self.lifecycle {
            Lifecycle::Predicted { predicted_score } => {
                Some(PredictionSummary::new(predicted_score, &self.situation))
            }
            _ => None,
        }
    }

    /// Apply a single field change.
    pub fn apply(&mut self, update: SituationUpdate) -> Lifecycle {
        let mut next = self.situation.clone();
        match update {
            SituationUpdate::BattingTeam(team) => next.batting_team = team,
            SituationUpdate::BowlingTeam(team) => next.bowling_team = team,
            SituationUpdate::City(city) => next.city = city,
            SituationUpdate::CurrentScore(score) => next.current_score = score,
            SituationUpdate::Overs(overs) => next.overs = overs,
            SituationUpdate::Wickets(wickets) => next.wickets = wickets,
            SituationUpdate::LastFive(runs) => next.last_five = runs,
        }
        self.replace_situation(next)
    }

    /// Replace the whole situation. An identical situation is a no-op;
    /// anything else drops a committed prediction.
    pub fn replace_situation(&mut self, situation: MatchSituation) -> Lifecycle {
        if situation != self.situation {
            self.situation = situation;
            self.lifecycle = settle(&self.situation);
        }
        self.lifecycle
    }

    /// Run the model for the current situation and commit the result to history.
    ///
    /// Only valid from `Ready`. In `Predicted` the committed prediction is
    /// returned again without calling the model or writing history. On model
    /// failure the session stays `Ready` and nothing is recorded.
    pub async fn predict(
        &mut self,
        model: &dyn ScoreModel,
        history: &mut HistoryStore,
    ) -> Result<PredictionSummary, PredictError> {
        if let Some(summary) = self.summary() {
            return Ok(summary);
        }

        let selection = validity::check(&self.situation)?;
        let row = self.feature_row(&selection);

        let total = model.predict(&row).await?;
        let predicted_score = plausible_total(total)?;
        debug!(
            "Model {} predicted {:.2} for {} v {}",
            model.name(),
            total,
            row.batting_team,
            row.bowling_team
        );

        history.append(self.record(&selection, predicted_score));
        self.lifecycle = Lifecycle::Predicted { predicted_score };
        info!(
            "Prediction committed: {} v {} at {} → {}",
            row.batting_team, row.bowling_team, row.city, predicted_score
        );

        Ok(PredictionSummary::new(predicted_score, &self.situation))
    }

    /// Clear every input back to its placeholder or minimum.
    pub fn reset(&mut self) {
        self.situation = MatchSituation::cleared();
        self.lifecycle = Lifecycle::Empty;
    }

    /// Restore a history entry into the inputs, trusting its stored score.
    pub fn load_history_entry(
        &mut self,
        history: &HistoryStore,
        index: usize,
    ) -> Result<PredictionSummary, HistoryIndexOutOfRange> {
        let record = history.get(index)?;
        self.situation = record.situation();
        self.lifecycle = Lifecycle::Predicted {
            predicted_score: record.predicted_score,
        };
        Ok(PredictionSummary::new(record.predicted_score, &self.situation))
    }

    fn feature_row(&self, selection: &Selection) -> FeatureRow {
        let s = &self.situation;
        let features = derive(s.current_score, s.overs, s.wickets);
        FeatureRow::new(
            selection.batting_team,
            selection.bowling_team,
            selection.city,
            s.current_score,
            &features,
            s.last_five,
        )
    }

    fn record(&self, selection: &Selection, predicted_score: i32) -> PredictionRecord {
        let s = &self.situation;
        PredictionRecord {
            batting_team: selection.batting_team,
            bowling_team: selection.bowling_team,
            city: selection.city,
            current_score: s.current_score,
            overs: s.overs,
            wickets: s.wickets,
            last_five: s.last_five,
            predicted_score,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

fn settle(situation: &MatchSituation) -> Lifecycle {
    match validity::check(situation) {
        Ok(_) => Lifecycle::Ready,
        Err(_) => Lifecycle::Empty,
    }
}

/// Truncate a model total to whole runs, rejecting totals no innings can reach.
fn plausible_total(total: f64) -> Result<i32, ModelError> {
    if !(0.0..=MAX_PLAUSIBLE_TOTAL).contains(&total) {
        return Err(ModelError::Implausible(total));
    }
    Ok(total.trunc() as i32)
}
