//! Players, the minutes they played in each match, and the matches themselves.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::{MatchId, PlayerId};

/// Month in which a new season begins.
const SEASON_START_MONTH: u32 = 7;

pub const UNKNOWN_POSITION: &str = "unknown";

/// Last minute of the first half.
pub const HALF_TIME_MINUTE: u16 = 45;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: None,
            position: None,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

/// The span of a single match a player was on the pitch for, and the position held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMinutesEntry {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub start_minute: u16,
    pub end_minute: u16,
    #[serde(default = "unknown_position")]
    pub position: String,
}

fn unknown_position() -> String {
    UNKNOWN_POSITION.to_string()
}

impl RosterMinutesEntry {
    pub fn new(
        match_id: impl Into<MatchId>,
        player_id: impl Into<PlayerId>,
        minutes: (u16, u16),
        position: impl Into<String>,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            player_id: player_id.into(),
            start_minute: minutes.0,
            end_minute: minutes.1,
            position: position.into(),
        }
    }

    /// Both bounds are inclusive. `(0, 0)` marks a player who did not play.
    pub fn minutes(&self) -> u32 {
        if self.start_minute == 0 && self.end_minute == 0 {
            0
        } else {
            (self.end_minute as i32 - self.start_minute as i32 + 1).max(0) as u32
        }
    }

    pub fn played(&self) -> bool {
        self.minutes() > 0
    }

    /// Whether the span reaches into the given half. The first half ends at [HALF_TIME_MINUTE].
    pub fn covers_half(&self, second_half: bool) -> bool {
        if second_half {
            self.end_minute > HALF_TIME_MINUTE
        } else {
            self.start_minute <= HALF_TIME_MINUTE
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub team: String,
    #[serde(default)]
    pub opponent: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub competition: String,
    #[serde(default)]
    pub home: bool,
}

impl MatchSummary {
    pub fn new(match_id: impl Into<MatchId>, team: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            match_id: match_id.into(),
            team: team.into(),
            opponent: String::new(),
            date,
            competition: String::new(),
            home: true,
        }
    }

    pub fn season(&self) -> Season {
        Season::of(self.date)
    }
}

/// A season spanning July of `start_year` to June of the following year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season {
    pub start_year: i32,
}

impl Season {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    pub fn of(date: NaiveDate) -> Self {
        if date.month() >= SEASON_START_MONTH {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
    }
}

impl FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start, end) = match s.split_once(['/', '-']) {
            Some((start, end)) => (start, Some(end)),
            None => (s, None),
        };
        let start_year: i32 = start.parse().with_context(|| format!("invalid season {s}"))?;
        if let Some(end) = end {
            let end_year: i32 = end.parse().with_context(|| format!("invalid season {s}"))?;
            let expected = start_year + 1;
            let matches = match end.len() {
                2 => end_year == expected.rem_euclid(100),
                4 => end_year == expected,
                _ => false,
            };
            if !matches {
                bail!("season {s} must span consecutive years");
            }
        }
        Ok(Self::new(start_year))
    }
}

impl TryFrom<String> for Season {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.to_string()
    }
}
