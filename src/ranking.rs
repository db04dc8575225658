//! Where a player stands within the roster of a scope, per role and per metric.
//!
//! Every ordering is a stable descending sort over the roster in input order, so a tie is won by
//! the player listed first and ranks never repeat.

use std::str::FromStr;

use anyhow::bail;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use tracing::{debug, warn};

use crate::aggregate::{ratio, role_totals, Tally};
use crate::contribution::{PerRole, Role};
use crate::event::PlayerId;
use crate::scope::Scope;
use crate::snapshot::Snapshot;
use crate::xt::XtTable;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Ordinal,
    EnumCount,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TotalValue,
    ValuePer90,
    CountPer90,
    ValuePerAction,
}

impl Metric {
    pub fn of(&self, tally: &Tally, minutes: u32) -> f64 {
        match self {
            Metric::TotalValue => tally.value,
            Metric::ValuePer90 => tally.value_per_90(minutes),
            Metric::CountPer90 => tally.count_per_90(minutes),
            Metric::ValuePerAction => tally.value_per_action(),
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total" | "value" => Ok(Metric::TotalValue),
            "value90" | "per90" => Ok(Metric::ValuePer90),
            "count90" => Ok(Metric::CountPer90),
            "average" | "peraction" => Ok(Metric::ValuePerAction),
            _ => bail!("unsupported metric {s}"),
        }
    }
}

/// Role totals and minutes of one roster player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub minutes: u32,
    pub roles: PerRole<Tally>,
}

impl PlayerStats {
    pub fn metric(&self, role: Role, metric: Metric) -> f64 {
        metric.of(&self.roles[role], self.minutes)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Standing {
    /// 1-based.
    pub rank: usize,
    pub total_players: usize,
    pub value: f64,
    pub percentile: f64,
    /// The player's share of the metric summed across the roster, as a percentage.
    pub team_share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub player_id: PlayerId,
    pub roles: PerRole<[Standing; Metric::COUNT]>,
}

impl Ranking {
    pub fn standing(&self, role: Role, metric: Metric) -> &Standing {
        &self.roles[role][metric.ordinal()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: PlayerId,
    pub minutes: u32,
    pub tally: Tally,
    pub value: f64,
}

/// Statistics of every roster player in scope: each player of the snapshot in input order,
/// restricted to the scoped team when one is set. Players without a recorded team are kept.
pub fn roster_stats(snapshot: &Snapshot, xt: &XtTable, scope: &Scope) -> Vec<PlayerStats> {
    let scoped = scope.select(snapshot);
    let totals = role_totals(&scoped, xt);
    let stats: Vec<_> = snapshot
        .players
        .iter()
        .filter(|player| match (&scope.team, &player.team) {
            (Some(team), Some(player_team)) => team == player_team,
            _ => true,
        })
        .map(|player| PlayerStats {
            player_id: player.id.clone(),
            minutes: scoped.minutes(&player.id),
            roles: totals
                .get(player.id.as_str())
                .cloned()
                .unwrap_or_default(),
        })
        .collect();
    debug!(
        "collected stats for {} of {} players",
        stats.len(),
        snapshot.players.len()
    );
    stats
}

/// Roster indices in descending order of the metric. Ties keep roster order.
pub fn order(stats: &[PlayerStats], role: Role, metric: Metric) -> Vec<usize> {
    let mut order: Vec<_> = (0..stats.len()).collect();
    order.sort_by(|&a, &b| {
        stats[b]
            .metric(role, metric)
            .total_cmp(&stats[a].metric(role, metric))
    });
    order
}

fn percentile(rank: usize, total_players: usize) -> f64 {
    if total_players > 1 {
        (total_players - rank) as f64 / (total_players - 1) as f64 * 100.0
    } else {
        100.0
    }
}

/// The standings of the given player, or `None` if they are not on the roster.
pub fn rank(stats: &[PlayerStats], player_id: &str) -> Option<Ranking> {
    let Some(subject) = stats.iter().position(|player| player.player_id == player_id) else {
        warn!("player {player_id} is not on the ranked roster");
        return None;
    };
    let total_players = stats.len();
    let roles = PerRole::from_fn(|role| {
        let mut standings = [Standing::default(); Metric::COUNT];
        for metric in Metric::iter() {
            let rank = order(stats, role, metric)
                .iter()
                .position(|&index| index == subject)
                .map_or(total_players, |position| position + 1);
            let value = stats[subject].metric(role, metric);
            let sum: f64 = stats.iter().map(|player| player.metric(role, metric)).sum();
            standings[metric.ordinal()] = Standing {
                rank,
                total_players,
                value,
                percentile: percentile(rank, total_players),
                team_share: ratio(value, sum) * 100.0,
            };
        }
        standings
    });
    debug!("ranked {player_id} among {total_players} players");
    Some(Ranking {
        player_id: player_id.to_string(),
        roles,
    })
}

pub fn ranking(
    snapshot: &Snapshot,
    xt: &XtTable,
    scope: &Scope,
    player_id: &str,
) -> Option<Ranking> {
    rank(&roster_stats(snapshot, xt, scope), player_id)
}

/// The full roster table for one role and metric, best first.
pub fn leaderboard(stats: &[PlayerStats], role: Role, metric: Metric) -> Vec<LeaderboardEntry> {
    order(stats, role, metric)
        .into_iter()
        .enumerate()
        .map(|(position, index)| {
            let player = &stats[index];
            LeaderboardEntry {
                rank: position + 1,
                player_id: player.player_id.clone(),
                minutes: player.minutes,
                tally: player.roles[role],
                value: player.metric(role, metric),
            }
        })
        .collect()
}
