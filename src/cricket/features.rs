//! Feature derivation for the score model.
//!
//! Converts the raw situation (score, overs, wickets) into the canonical
//! features the model was trained on. Pure arithmetic, no state.

use serde::{Deserialize, Serialize};

use super::models::{City, Team, INNINGS_BALLS, TOTAL_WICKETS};

/// Features computed from the raw situation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Legal deliveries left in the innings, never negative
    pub balls_left: u32,
    /// Wickets still in hand
    pub wickets_left: u32,
    /// Runs per over so far
    pub current_run_rate: f64,
    /// Overs left in the innings, computed from whole balls bowled
    pub overs_left: f64,
}

/// Derive model features from the current score, overs completed and wickets lost.
///
/// `overs` is treated as a decimal quantity: balls bowled is `floor(overs × 6)`.
/// A zero (or negative) `overs` yields a run rate of 0 instead of dividing by zero.
pub fn derive(current_score: u32, overs: f64, wickets: u32) -> DerivedFeatures {
    let balls_bowled = balls_bowled(overs);
    let balls_remaining = INNINGS_BALLS as i64 - balls_bowled;

    let current_run_rate = if overs > 0.0 {
        current_score as f64 / overs
    } else {
        0.0
    };

    DerivedFeatures {
        balls_left: balls_remaining.max(0) as u32,
        wickets_left: TOTAL_WICKETS.saturating_sub(wickets),
        current_run_rate,
        overs_left: balls_remaining as f64 / 6.0,
    }
}

fn balls_bowled(overs: f64) -> i64 {
    if !overs.is_finite() || overs <= 0.0 {
        return 0;
    }
    (overs * 6.0).floor() as i64
}

/// The single-row input handed to the score model.
///
/// Field names are the column names the model pipeline was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    pub current_score: u32,
    pub balls_left: u32,
    pub wickets_left: u32,
    pub crr: f64,
    pub last_five: u32,
}

impl FeatureRow {
    pub fn new(
        batting_team: Team,
        bowling_team: Team,
        city: City,
        current_score: u32,
        features: &DerivedFeatures,
        last_five: u32,
    ) -> Self {
        FeatureRow {
            batting_team: batting_team.name().to_string(),
            bowling_team: bowling_team.name().to_string(),
            city: city.name().to_string(),
            current_score,
            balls_left: features.balls_left,
            wickets_left: features.wickets_left,
            crr: features.current_run_rate,
            last_five,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derive_mid_innings() {
        let f = derive(100, 10.0, 3);
        assert_eq!(f.balls_left, 60);
        assert_eq!(f.wickets_left, 7);
        assert_relative_eq!(f.current_run_rate, 10.0, epsilon = 1e-9);
        assert_relative_eq!(f.overs_left, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_balls_left_across_valid_overs() {
        for tenths in 50..=200u32 {
            let overs = tenths as f64 / 10.0;
            let f = derive(0, overs, 0);
            let expected = 120 - (overs * 6.0).floor() as u32;
            assert_eq!(f.balls_left, expected, "overs={overs}");
            assert!(f.balls_left <= 90, "overs={overs} gave {}", f.balls_left);
        }
    }

    #[test]
    fn test_wickets_left_complements_wickets() {
        for wickets in 0..=10u32 {
            let f = derive(80, 12.0, wickets);
            assert_eq!(f.wickets_left, 10 - wickets);
            assert_eq!(f.wickets_left + wickets, 10);
        }
    }

    #[test]
    fn test_fractional_overs_floor_balls() {
        // 8.3 × 6 = 49.8 → 49 balls bowled
        let f = derive(70, 8.3, 2);
        assert_eq!(f.balls_left, 71);
        assert_relative_eq!(f.overs_left, 71.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_innings_has_nothing_left() {
        let f = derive(180, 20.0, 6);
        assert_eq!(f.balls_left, 0);
        assert_relative_eq!(f.overs_left, 0.0, epsilon = 1e-9);
        assert_relative_eq!(f.current_run_rate, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_overs_gives_zero_run_rate() {
        let f = derive(12, 0.0, 0);
        assert_relative_eq!(f.current_run_rate, 0.0, epsilon = 1e-12);
        assert_eq!(f.balls_left, 120);
    }

    #[test]
    fn test_derive_is_repeatable() {
        assert_eq!(derive(143, 15.4, 4), derive(143, 15.4, 4));
    }

    #[test]
    fn test_feature_row_uses_display_names() {
        let f = derive(100, 10.0, 3);
        let row = FeatureRow::new(Team::NewZealand, Team::India, City::Auckland, 100, &f, 45);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["batting_team"], "New Zealand");
        assert_eq!(json["balls_left"], 60);
        assert_eq!(json["crr"], 10.0);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
