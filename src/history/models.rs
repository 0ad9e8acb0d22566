use serde::{Deserialize, Serialize};

use crate::cricket::{City, MatchSituation, Team};

/// A committed prediction, as stored in the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub current_score: u32,
    pub overs: f64,
    pub wickets: u32,
    pub last_five: u32,
    /// Model output, truncated to whole runs
    pub predicted_score: i32,
    /// Local wall-clock time of the prediction
    pub timestamp: String,
}

impl PredictionRecord {
    /// The situation this prediction was made for.
    pub fn situation(&self) -> MatchSituation {
        MatchSituation {
            batting_team: Some(self.batting_team),
            bowling_team: Some(self.bowling_team),
            city: Some(self.city),
            current_score: self.current_score,
            overs: self.overs,
            wickets: self.wickets,
            last_five: self.last_five,
        }
    }
}

/// What was found in the backing file when history was loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// File parsed; holds the number of records kept
    Loaded(usize),
    /// No file yet
    Absent,
    /// File unreadable or malformed; history starts empty
    Corrupt(String),
}
