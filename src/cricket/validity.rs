//! Gate deciding whether a situation can be handed to the model.
//!
//! An invalid situation is an ordinary state (the user is still filling in
//! the form), so it is reported as a value rather than raised.

use serde::Serialize;
use thiserror::Error;

use super::models::{
    City, MatchSituation, Team, INNINGS_OVERS, MAX_LAST_FIVE, MAX_SCORE, MIN_OVERS, TOTAL_WICKETS,
};

/// Why a situation is not predictable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    #[error("batting team not selected")]
    MissingBattingTeam,
    #[error("bowling team not selected")]
    MissingBowlingTeam,
    #[error("batting and bowling team must differ")]
    SameTeams,
    #[error("venue not selected")]
    MissingCity,
    #[error("minimum 5 overs required")]
    TooFewOvers,
    #[error("overs cannot exceed 20")]
    TooManyOvers,
    #[error("wickets cannot exceed 10")]
    TooManyWickets,
    #[error("score cannot exceed 400")]
    ScoreOutOfRange,
    #[error("last five overs cannot exceed 120 runs")]
    LastFiveOutOfRange,
}

/// The team and venue choices of a situation that passed the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
}

/// Returns true when the selections and overs allow a prediction.
pub fn is_valid(
    batting_team: Option<Team>,
    bowling_team: Option<Team>,
    city: Option<City>,
    overs: f64,
) -> bool {
    selection_check(batting_team, bowling_team, city, overs).is_ok()
}

/// Full check of a situation, including the numeric ranges of the data model.
pub fn check(situation: &MatchSituation) -> Result<Selection, InvalidReason> {
    let selection = selection_check(
        situation.batting_team,
        situation.bowling_team,
        situation.city,
        situation.overs,
    )?;

    if situation.overs > INNINGS_OVERS {
        return Err(InvalidReason::TooManyOvers);
    }
    if situation.wickets > TOTAL_WICKETS {
        return Err(InvalidReason::TooManyWickets);
    }
    if situation.current_score > MAX_SCORE {
        return Err(InvalidReason::ScoreOutOfRange);
    }
    if situation.last_five > MAX_LAST_FIVE {
        return Err(InvalidReason::LastFiveOutOfRange);
    }
    Ok(selection)
}

fn selection_check(
    batting_team: Option<Team>,
    bowling_team: Option<Team>,
    city: Option<City>,
    overs: f64,
) -> Result<Selection, InvalidReason> {
    let batting_team = batting_team.ok_or(InvalidReason::MissingBattingTeam)?;
    let bowling_team = bowling_team.ok_or(InvalidReason::MissingBowlingTeam)?;
    if batting_team == bowling_team {
        return Err(InvalidReason::SameTeams);
    }
    let city = city.ok_or(InvalidReason::MissingCity)?;
    if overs.is_nan() || overs < MIN_OVERS {
        return Err(InvalidReason::TooFewOvers);
    }
    Ok(Selection {
        batting_team,
        bowling_team,
        city,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn situation() -> MatchSituation {
        MatchSituation {
            batting_team: Some(Team::India),
            bowling_team: Some(Team::Australia),
            city: Some(City::Mumbai),
            current_score: 90,
            overs: 10.0,
            wickets: 2,
            last_five: 40,
        }
    }

    #[test]
    fn test_complete_situation_is_valid() {
        assert_eq!(
            check(&situation()),
            Ok(Selection {
                batting_team: Team::India,
                bowling_team: Team::Australia,
                city: City::Mumbai,
            })
        );
    }

    #[test]
    fn test_same_team_is_never_valid() {
        for team in Team::ALL {
            assert!(!is_valid(Some(team), Some(team), Some(City::Dubai), 12.0));
        }
        let mut s = situation();
        s.bowling_team = Some(Team::India);
        assert_eq!(check(&s), Err(InvalidReason::SameTeams));
    }

    #[test]
    fn test_overs_boundary_is_inclusive() {
        let (bat, bowl, city) = (Some(Team::England), Some(Team::Pakistan), Some(City::London));
        assert!(is_valid(bat, bowl, city, 5.0));
        assert!(!is_valid(bat, bowl, city, 4.9));
        assert!(!is_valid(bat, bowl, city, 0.0));
        assert!(!is_valid(bat, bowl, city, f64::NAN));
    }

    #[test]
    fn test_placeholders_are_reported_in_order() {
        assert!(!is_valid(None, Some(Team::India), Some(City::Delhi), 10.0));
        assert_eq!(
            selection_check(None, None, None, 10.0),
            Err(InvalidReason::MissingBattingTeam)
        );
        assert_eq!(
            selection_check(Some(Team::India), None, None, 10.0),
            Err(InvalidReason::MissingBowlingTeam)
        );
        assert_eq!(
            selection_check(Some(Team::India), Some(Team::England), None, 10.0),
            Err(InvalidReason::MissingCity)
        );
    }

    #[test]
    fn test_ranges_are_enforced() {
        let mut s = situation();
        s.overs = 20.1;
        assert_eq!(check(&s), Err(InvalidReason::TooManyOvers));

        let mut s = situation();
        s.wickets = 11;
        assert_eq!(check(&s), Err(InvalidReason::TooManyWickets));

        let mut s = situation();
        s.current_score = 401;
        assert_eq!(check(&s), Err(InvalidReason::ScoreOutOfRange));

        let mut s = situation();
        s.last_five = 121;
        assert_eq!(check(&s), Err(InvalidReason::LastFiveOutOfRange));

        let mut s = situation();
        s.overs = 20.0;
        s.wickets = 10;
        assert!(check(&s).is_ok());
    }
}
