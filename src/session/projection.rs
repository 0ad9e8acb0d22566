use serde::Serialize;

use crate::cricket::{derive, DerivedFeatures, MatchSituation};

/// Figures shown alongside a committed prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub predicted_score: i32,
    /// Predicted total minus the current score
    pub runs_to_add: i32,
    /// Runs per over needed over the remaining overs to reach the prediction
    pub required_rate: f64,
}

impl PredictionSummary {
    pub fn new(predicted_score: i32, situation: &MatchSituation) -> Self {
        let features = derive(situation.current_score, situation.overs, situation.wickets);
        let runs_to_add = (predicted_score as i64 - situation.current_score as i64)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let required_rate = if features.overs_left > 0.0 {
            runs_to_add as f64 / features.overs_left
        } else {
            0.0
        };
        PredictionSummary {
            predicted_score,
            runs_to_add,
            required_rate,
        }
    }
}

/// Display-only decoration around a prediction. The formulas are heuristics
/// for the dashboard and carry no modelling weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreOutlook {
    pub conservative: i32,
    pub aggressive: i32,
    /// Share of the predicted total already scored, in percent
    pub percent_complete: u32,
    /// 0–100, higher when the current rate outpaces the required rate
    pub chase_confidence: u32,
}

impl ScoreOutlook {
    pub fn new(summary: &PredictionSummary, features: &DerivedFeatures, current_score: u32) -> Self {
        let predicted = summary.predicted_score as f64;

        let percent_complete = if summary.predicted_score != 0 {
            (current_score as f64 / predicted * 100.0).max(0.0) as u32
        } else {
            0
        };

        let chase_confidence = if summary.required_rate > 0.0 {
            let raw = (1.0 - features.current_run_rate / (summary.required_rate + 0.1)) * 50.0 + 50.0;
            (raw.trunc() as i64).clamp(0, 100) as u32
        } else {
            75
        };

        ScoreOutlook {
            conservative: (predicted * 0.92).trunc() as i32,
            aggressive: (predicted * 1.08).trunc() as i32,
            percent_complete,
            chase_confidence,
        }
    }
}
