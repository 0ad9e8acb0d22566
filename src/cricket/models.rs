use serde::{Deserialize, Serialize};
use std::fmt;

/// Deliveries in a full T20 innings (20 overs × 6 balls).
pub const INNINGS_BALLS: u32 = 120;
/// Overs in a full T20 innings.
pub const INNINGS_OVERS: f64 = 20.0;
/// Wickets available to the batting side.
pub const TOTAL_WICKETS: u32 = 10;
/// The model is only trained on situations at or beyond this many overs.
pub const MIN_OVERS: f64 = 5.0;
pub const MAX_SCORE: u32 = 400;
pub const MAX_LAST_FIVE: u32 = 120;

/// A full-member international side the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Afghanistan,
    Australia,
    Bangladesh,
    England,
    India,
    #[serde(rename = "New Zealand")]
    NewZealand,
    Pakistan,
    #[serde(rename = "South Africa")]
    SouthAfrica,
    #[serde(rename = "Sri Lanka")]
    SriLanka,
    #[serde(rename = "West Indies")]
    WestIndies,
}

impl Team {
    /// Every team, in selection-list order.
    pub const ALL: [Team; 10] = [
        Team::Afghanistan,
        Team::Australia,
        Team::Bangladesh,
        Team::England,
        Team::India,
        Team::NewZealand,
        Team::Pakistan,
        Team::SouthAfrica,
        Team::SriLanka,
        Team::WestIndies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Team::Afghanistan => "Afghanistan",
            Team::Australia => "Australia",
            Team::Bangladesh => "Bangladesh",
            Team::England => "England",
            Team::India => "India",
            Team::NewZealand => "New Zealand",
            Team::Pakistan => "Pakistan",
            Team::SouthAfrica => "South Africa",
            Team::SriLanka => "Sri Lanka",
            Team::WestIndies => "West Indies",
        }
    }

    /// Three-letter label used in compact history rows.
    pub fn short_name(&self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host city of a T20 international venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Abu Dhabi")]
    AbuDhabi,
    Adelaide,
    Auckland,
    Bangalore,
    Barbados,
    #[serde(rename = "Cape Town")]
    CapeTown,
    Cardiff,
    Centurion,
    Chandigarh,
    Chittagong,
    Christchurch,
    Colombo,
    Delhi,
    Dubai,
    Durban,
    Hamilton,
    Johannesburg,
    Kolkata,
    Lahore,
    Lauderhill,
    London,
    Manchester,
    Melbourne,
    Mirpur,
    #[serde(rename = "Mount Maunganui")]
    MountMaunganui,
    Mumbai,
    Nagpur,
    Nottingham,
    Pallekele,
    Southampton,
    #[serde(rename = "St Kitts")]
    StKitts,
    #[serde(rename = "St Lucia")]
    StLucia,
    Sydney,
    Trinidad,
    Wellington,
}

impl City {
    /// Every venue city, in selection-list order.
    pub const ALL: [City; 35] = [
        City::AbuDhabi,
        City::Adelaide,
        City::Auckland,
        City::Bangalore,
        City::Barbados,
        City::CapeTown,
        City::Cardiff,
        City::Centurion,
        City::Chandigarh,
        City::Chittagong,
        City::Christchurch,
        City::Colombo,
        City::Delhi,
        City::Dubai,
        City::Durban,
        City::Hamilton,
        City::Johannesburg,
        City::Kolkata,
        City::Lahore,
        City::Lauderhill,
        City::London,
        City::Manchester,
        City::Melbourne,
        City::Mirpur,
        City::MountMaunganui,
        City::Mumbai,
        City::Nagpur,
        City::Nottingham,
        City::Pallekele,
        City::Southampton,
        City::StKitts,
        City::StLucia,
        City::Sydney,
        City::Trinidad,
        City::Wellington,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            City::AbuDhabi => "Abu Dhabi",
            City::Adelaide => "Adelaide",
            City::Auckland => "Auckland",
            City::Bangalore => "Bangalore",
            City::Barbados => "Barbados",
            City::CapeTown => "Cape Town",
            City::Cardiff => "Cardiff",
            City::Centurion => "Centurion",
            City::Chandigarh => "Chandigarh",
            City::Chittagong => "Chittagong",
            City::Christchurch => "Christchurch",
            City::Colombo => "Colombo",
            City::Delhi => "Delhi",
            City::Dubai => "Dubai",
            City::Durban => "Durban",
            City::Hamilton => "Hamilton",
            City::Johannesburg => "Johannesburg",
            City::Kolkata => "Kolkata",
            City::Lahore => "Lahore",
            City::Lauderhill => "Lauderhill",
            City::London => "London",
            City::Manchester => "Manchester",
            City::Melbourne => "Melbourne",
            City::Mirpur => "Mirpur",
            City::MountMaunganui => "Mount Maunganui",
            City::Mumbai => "Mumbai",
            City::Nagpur => "Nagpur",
            City::Nottingham => "Nottingham",
            City::Pallekele => "Pallekele",
            City::Southampton => "Southampton",
            City::StKitts => "St Kitts",
            City::StLucia => "St Lucia",
            City::Sydney => "Sydney",
            City::Trinidad => "Trinidad",
            City::Wellington => "Wellington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw match situation as entered by the user.
///
/// Team and venue are `None` until selected; numeric fields carry whatever
/// was last entered and are range-checked by [`super::validity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSituation {
    pub batting_team: Option<Team>,
    pub bowling_team: Option<Team>,
    pub city: Option<City>,
    /// Runs scored so far
    pub current_score: u32,
    /// Overs completed, to one decimal place
    pub overs: f64,
    /// Wickets lost
    pub wickets: u32,
    /// Runs scored in the last five completed overs
    pub last_five: u32,
}

impl Default for MatchSituation {
    /// The situation a fresh session opens with.
    fn default() -> Self {
        MatchSituation {
            batting_team: None,
            bowling_team: None,
            city: None,
            current_score: 50,
            overs: 8.0,
            wickets: 2,
            last_five: 35,
        }
    }
}

impl MatchSituation {
    /// Placeholder selections and minimum numeric values, used on reset.
    pub fn cleared() -> Self {
        MatchSituation {
            batting_team: None,
            bowling_team: None,
            city: None,
            current_score: 0,
            overs: MIN_OVERS,
            wickets: 0,
            last_five: 0,
        }
    }
}
