//! Domain inputs consumed by the game screen core.
//!
//! Everything here arrives already deserialized from the data-fetch
//! collaborator. Raw entries keep every field optional; the timeline
//! classifier decides what is usable.

use chrono::{DateTime, Utc};
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Lookup table for league codes accepted on the command line and in requests
static LEAGUE_CODES: phf::Map<&'static str, League> = phf_map! {
    "nba" => League::Nba,
    "wnba" => League::Wnba,
    "ncaab" => League::Ncaab,
    "ncaam" => League::Ncaab,
    "cbb" => League::Ncaab,
    "nhl" => League::Nhl,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nba,
    Wnba,
    Ncaab,
    Nhl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sport {
    Basketball,
    Hockey,
}

impl League {
    /// Resolve a league from its code, case-insensitively
    pub fn from_code(code: &str) -> Option<League> {
        LEAGUE_CODES.get(code.trim().to_lowercase().as_str()).copied()
    }

    pub fn code(&self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Wnba => "wnba",
            League::Ncaab => "ncaab",
            League::Nhl => "nhl",
        }
    }

    pub fn sport(&self) -> Sport {
        match self {
            League::Nhl => Sport::Hockey,
            League::Nba | League::Wnba | League::Ncaab => Sport::Basketball,
        }
    }

    /// Number of periods played before overtime
    pub fn regulation_periods(&self) -> u32 {
        match self {
            League::Nba | League::Wnba => 4,
            League::Ncaab => 2,
            League::Nhl => 3,
        }
    }

    /// Short label for a period number ("Q2", "H1", "P3", "OT", "2OT", "SO")
    ///
    /// NHL regular season games decide ties with a shootout recorded as the
    /// period after the single overtime. Playoff games keep counting overtimes.
    pub fn period_label(&self, period: u32, playoffs: bool) -> String {
        let regulation = self.regulation_periods();
        if period == 0 {
            return "-".to_string();
        }
        if period <= regulation {
            let prefix = match self {
                League::Nba | League::Wnba => "Q",
                League::Ncaab => "H",
                League::Nhl => "P",
            };
            return format!("{}{}", prefix, period);
        }

        let overtime = period - regulation;
        if *self == League::Nhl && !playoffs && overtime >= 2 {
            return "SO".to_string();
        }
        if overtime == 1 {
            "OT".to_string()
        } else {
            format!("{}OT", overtime)
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code().to_uppercase())
    }
}

impl FromStr for League {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        League::from_code(s).ok_or_else(|| GameError::UnknownLeague(s.to_string()))
    }
}

/// Validated game identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(u64);

impl GameId {
    pub fn new(id: u64) -> Result<Self, GameError> {
        if id == 0 {
            return Err(GameError::InvalidGameId(id.to_string()));
        }
        Ok(GameId(id))
    }

    /// Parse a user- or link-supplied identifier
    pub fn parse(raw: &str) -> Result<Self, GameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(GameError::InvalidGameId(raw.to_string()));
        }
        let id = trimmed
            .parse::<u64>()
            .map_err(|_| GameError::InvalidGameId(raw.to_string()))?;
        GameId::new(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a screen session is opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameRequest {
    pub id: GameId,
    pub league: League,
}

impl GameRequest {
    pub fn new(id: GameId, league: League) -> Self {
        Self { id, league }
    }
}

/// Independently fetched pieces of the game screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataSlice {
    Game,
    Timeline,
    Story,
    SocialPosts,
    Odds,
}

impl DataSlice {
    pub const ALL: [DataSlice; 5] = [
        DataSlice::Game,
        DataSlice::Timeline,
        DataSlice::Story,
        DataSlice::SocialPosts,
        DataSlice::Odds,
    ];
}

impl fmt::Display for DataSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSlice::Game => "game",
            DataSlice::Timeline => "timeline",
            DataSlice::Story => "story",
            DataSlice::SocialPosts => "social posts",
            DataSlice::Odds => "odds",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Live { period: u32, clock: Option<String> },
    Final,
    Postponed,
}

impl GameStatus {
    pub fn has_started(&self) -> bool {
        matches!(self, GameStatus::Live { .. } | GameStatus::Final)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLine {
    pub abbrev: String,
    pub name: String,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub league: League,
    pub home: TeamLine,
    pub away: TeamLine,
    pub status: GameStatus,
    pub venue: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub playoffs: bool,
}

/// One play-by-play row as delivered by the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayEntry {
    pub period: Option<u32>,
    pub game_clock: Option<String>,
    pub wall_clock: Option<DateTime<Utc>>,
    pub play_type: Option<String>,
    pub description: Option<String>,
    pub team: Option<String>,
    pub player: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPostEntry {
    pub period: Option<u32>,
    pub posted_at: Option<DateTime<Utc>>,
    pub handle: Option<String>,
    pub text: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsEntry {
    pub period: Option<u32>,
    pub market: Option<String>,
    pub line: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Pregame preview or postgame recap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryPayload {
    pub headline: String,
    pub paragraphs: Vec<String>,
    pub key_moments: Vec<String>,
}
