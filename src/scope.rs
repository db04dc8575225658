//! The explicit parameters of a query, and the slice of a [Snapshot] they select.

use std::str::FromStr;

use anyhow::bail;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::debug;

use crate::event::{ActionEvent, MatchId, MilestoneFlag, Milestones};
use crate::roster::{MatchSummary, RosterMinutesEntry, Season};
use crate::snapshot::Snapshot;

const DEFAULT_PARTNER_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Half {
    #[default]
    Both,
    First,
    Second,
}

impl Half {
    pub fn admits(&self, milestones: &Milestones) -> bool {
        match self {
            Half::Both => true,
            Half::First => !milestones.second_half,
            Half::Second => milestones.second_half,
        }
    }
}

impl FromStr for Half {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" | "all" => Ok(Half::Both),
            "1" | "first" => Ok(Half::First),
            "2" | "second" => Ok(Half::Second),
            _ => bail!("unsupported half {s}"),
        }
    }
}

/// Ordering applied to partner tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartnerSort {
    #[default]
    Count,
    Value,
}

impl FromStr for PartnerSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" | "passes" => Ok(PartnerSort::Count),
            "value" | "pxt" => Ok(PartnerSort::Value),
            _ => bail!("unsupported partner sort {s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scope {
    pub team: Option<String>,
    pub season: Option<Season>,
    /// Restricts the query to these matches, in addition to the team and season filters.
    pub matches: Option<Vec<MatchId>>,
    pub half: Half,
    /// Narrows the spatial views (heatmaps and partners) only; summary counters ignore it.
    pub milestone: Option<MilestoneFlag>,
    pub partner_sort: PartnerSort,
    pub partner_limit: usize,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            team: None,
            season: None,
            matches: None,
            half: Half::default(),
            milestone: None,
            partner_sort: PartnerSort::default(),
            partner_limit: DEFAULT_PARTNER_LIMIT,
        }
    }
}

impl Scope {
    pub fn admits_match(&self, summary: &MatchSummary) -> bool {
        if let Some(team) = &self.team {
            if &summary.team != team {
                return false;
            }
        }
        if let Some(season) = &self.season {
            if !season.contains(summary.date) {
                return false;
            }
        }
        if let Some(matches) = &self.matches {
            if !matches.iter().any(|match_id| match_id == &summary.match_id) {
                return false;
            }
        }
        true
    }

    /// Whether the event is admitted to the spatial views under the milestone filter.
    pub fn admits_spatially(&self, event: &ActionEvent) -> bool {
        self.milestone
            .map_or(true, |flag| event.milestones.has(flag))
    }

    /// Selects the matches, events and roster minutes that fall within this scope. Events and
    /// minutes from matches absent in [Snapshot::matches] are never selected.
    pub fn select<'a>(&self, snapshot: &'a Snapshot) -> ScopedEvents<'a> {
        let matches: FxHashSet<&str> = snapshot
            .matches
            .iter()
            .filter(|summary| self.admits_match(summary))
            .map(|summary| summary.match_id.as_str())
            .collect();
        let events: Vec<_> = snapshot
            .events
            .iter()
            .filter(|event| matches.contains(event.match_id.as_str()))
            .filter(|event| self.half.admits(&event.milestones))
            .collect();
        let roster: Vec<_> = snapshot
            .roster_minutes
            .iter()
            .filter(|entry| matches.contains(entry.match_id.as_str()))
            .collect();
        debug!(
            "scoped {} of {} events across {} of {} matches",
            events.len(),
            snapshot.events.len(),
            matches.len(),
            snapshot.matches.len()
        );

        let mut positions: FxHashMap<&str, FxHashMap<&str, Vec<&RosterMinutesEntry>>> =
            FxHashMap::default();
        for &entry in &roster {
            positions
                .entry(entry.match_id.as_str())
                .or_default()
                .entry(entry.player_id.as_str())
                .or_default()
                .push(entry);
        }
        ScopedEvents {
            matches,
            events,
            roster,
            positions,
        }
    }
}

/// The portion of a [Snapshot] admitted by a [Scope]. Borrowed from the snapshot and dropped at
/// the end of the query.
#[derive(Debug)]
pub struct ScopedEvents<'a> {
    pub matches: FxHashSet<&'a str>,
    pub events: Vec<&'a ActionEvent>,
    pub roster: Vec<&'a RosterMinutesEntry>,
    positions: FxHashMap<&'a str, FxHashMap<&'a str, Vec<&'a RosterMinutesEntry>>>,
}

impl<'a> ScopedEvents<'a> {
    /// Total minutes played by the player across the selected matches.
    pub fn minutes(&self, player_id: &str) -> u32 {
        self.roster
            .iter()
            .filter(|entry| entry.player_id == player_id)
            .map(|entry| entry.minutes())
            .sum()
    }

    /// Number of selected matches in which the player took the pitch.
    pub fn appearances(&self, player_id: &str) -> usize {
        self.roster
            .iter()
            .filter(|entry| entry.player_id == player_id && entry.played())
            .map(|entry| entry.match_id.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Minutes per on-pitch position, in order of first appearance.
    pub fn position_minutes(&self, player_id: &str) -> Vec<(&'a str, u32)> {
        let mut minutes: Vec<(&'a str, u32)> = vec![];
        for entry in self.roster.iter().filter(|entry| entry.player_id == player_id) {
            match minutes.iter_mut().find(|(position, _)| *position == entry.position) {
                Some((_, total)) => *total += entry.minutes(),
                None => minutes.push((entry.position.as_str(), entry.minutes())),
            }
        }
        minutes
    }

    /// The position held by the player in the given half of a match, if they are on its roster.
    /// Picks the first roster entry whose span reaches into that half, or the player's first
    /// entry for the match when none does.
    pub fn position(&self, match_id: &str, player_id: &str, second_half: bool) -> Option<&'a str> {
        let entries = self.positions.get(match_id)?.get(player_id)?;
        entries
            .iter()
            .copied()
            .find(|entry| entry.covers_half(second_half))
            .or_else(|| entries.first().copied())
            .map(|entry| entry.position.as_str())
    }
}
