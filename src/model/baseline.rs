//! Built-in run-rate projection, used when no trained model endpoint is configured.
//!
//! The remaining overs are projected at a blend of the innings run rate and
//! the last-five-overs rate, damped by how many wickets have fallen: a side
//! with fewer batters left cannot keep scoring at the same rate.

use async_trait::async_trait;

use super::provider::{ModelError, ScoreModel};
use crate::cricket::FeatureRow;

/// Rate retained with no wickets in hand is this floor plus a share per wicket.
const DAMPING_FLOOR: f64 = 0.6;
const DAMPING_PER_WICKET: f64 = 0.04;

#[derive(Debug, Clone)]
pub struct RunRateProjection {
    /// Weight of the last-five-overs rate against the innings rate (0.0–1.0)
    recent_weight: f64,
}

impl Default for RunRateProjection {
    fn default() -> Self {
        RunRateProjection { recent_weight: 0.4 }
    }
}

impl RunRateProjection {
    pub fn new(recent_weight: f64) -> Self {
        RunRateProjection {
            recent_weight: recent_weight.clamp(0.0, 1.0),
        }
    }

    pub fn project(&self, row: &FeatureRow) -> f64 {
        let current = row.current_score as f64;
        if row.balls_left == 0 || row.wickets_left == 0 {
            return current;
        }

        let recent_rate = row.last_five as f64 / 5.0;
        let rate = (1.0 - self.recent_weight) * row.crr + self.recent_weight * recent_rate;
        let damping = DAMPING_FLOOR + DAMPING_PER_WICKET * row.wickets_left.min(10) as f64;
        let overs_left = row.balls_left as f64 / 6.0;

        current + rate * overs_left * damping
    }
}

#[async_trait]
impl ScoreModel for RunRateProjection {
    fn name(&self) -> &str {
        "run-rate-projection"
    }

    async fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let total = self.project(row);
        if !total.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(total)
    }
}
