//! Folds the scoped events into a [PlayerReport].
//!
//! Aggregation runs in two passes over the same scoped events. The first pass builds the
//! summary counters (role breakdowns, positions and turnover totals) and ignores the milestone
//! filter of the [Scope], so the headline numbers stay put while a user drills into a spatial
//! view. The second pass builds the heatmaps, partner tables and turnover zone grids, and honours
//! the milestone filter.

use std::collections::BTreeMap;
use std::ops::{AddAssign, Index, IndexMut};

use ordinalizer::Ordinal;
use rustc_hash::FxHashMap;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use tracing::{debug, trace};

use crate::classify::classify;
use crate::contribution::{credits, Contribution, PerRole, Readings, Role};
use crate::event::{ActionCategory, ActionEvent, ActionType, Milestones, PlayerId, TurnoverFields};
use crate::roster::UNKNOWN_POSITION;
use crate::scope::{PartnerSort, Scope, ScopedEvents};
use crate::snapshot::Snapshot;
use crate::xt::XtTable;
use crate::zone::{Zone, ZONES};

/// Scales `amount` to a 90-minute basis. Zero minutes yields zero.
pub fn per_90(amount: f64, minutes: u32) -> f64 {
    if minutes > 0 {
        amount * (90.0 / minutes as f64)
    } else {
        0.0
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub value: f64,
    pub count: u32,
}

impl Tally {
    #[inline(always)]
    pub fn record(&mut self, value: f64) {
        self.value += value;
        self.count += 1;
    }

    pub fn value_per_action(&self) -> f64 {
        ratio(self.value, self.count as f64)
    }

    pub fn value_per_90(&self, minutes: u32) -> f64 {
        per_90(self.value, minutes)
    }

    pub fn count_per_90(&self, minutes: u32) -> f64 {
        per_90(self.count as f64, minutes)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
        self.count += rhs.count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Laterality {
    Lateral,
    Central,
}

impl Laterality {
    /// A missing zone counts as central.
    pub fn of(zone: Option<Zone>) -> Self {
        if zone.map_or(false, |zone| zone.is_lateral()) {
            Laterality::Lateral
        } else {
            Laterality::Central
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LateralSplit([Tally; Laterality::COUNT]);

impl LateralSplit {
    pub fn total(&self) -> Tally {
        let mut total = Tally::default();
        for tally in &self.0 {
            total += *tally;
        }
        total
    }
}

impl Index<Laterality> for LateralSplit {
    type Output = Tally;

    fn index(&self, laterality: Laterality) -> &Self::Output {
        &self.0[laterality.ordinal()]
    }
}

impl IndexMut<Laterality> for LateralSplit {
    fn index_mut(&mut self, laterality: Laterality) -> &mut Self::Output {
        &mut self.0[laterality.ordinal()]
    }
}

/// The milestone categories of a role breakdown. An event counts towards every category it is
/// flagged with, or towards [MilestoneBucket::Other] when it carries none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum MilestoneBucket {
    PenaltyAreaEntry,
    Shot,
    Goal,
    P1,
    P2,
    P3,
    Other,
}

impl MilestoneBucket {
    pub fn matches(&self, milestones: &Milestones) -> bool {
        match self {
            MilestoneBucket::PenaltyAreaEntry => milestones.penalty_area_entry,
            MilestoneBucket::Shot => milestones.shot,
            MilestoneBucket::Goal => milestones.goal,
            MilestoneBucket::P1 => milestones.p1,
            MilestoneBucket::P2 => milestones.p2,
            MilestoneBucket::P3 => milestones.p3,
            MilestoneBucket::Other => {
                !(milestones.penalty_area_entry
                    || milestones.shot
                    || milestones.goal
                    || milestones.p1
                    || milestones.p2
                    || milestones.p3)
            }
        }
    }
}

/// Summed PxT and event count of one role, split by milestone and laterality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleBreakdown {
    pub total: Tally,
    buckets: [LateralSplit; MilestoneBucket::COUNT],
}

impl RoleBreakdown {
    pub fn record(&mut self, value: f64, milestones: &Milestones, laterality: Laterality) {
        self.total.record(value);
        for bucket in MilestoneBucket::iter().filter(|bucket| bucket.matches(milestones)) {
            self.buckets[bucket.ordinal()][laterality].record(value);
        }
    }

    pub fn bucket(&self, bucket: MilestoneBucket) -> &LateralSplit {
        &self.buckets[bucket.ordinal()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Direction {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Weighting {
    Value,
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGrid([f64; ZONES]);

impl Default for ZoneGrid {
    fn default() -> Self {
        Self([0.0; ZONES])
    }
}

impl ZoneGrid {
    /// Accumulates `amount` in the given zone; a missing zone is not recorded.
    pub fn add(&mut self, zone: Option<Zone>, amount: f64) {
        if let Some(zone) = zone {
            self.0[zone.index()] += amount;
        }
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Zone names mapped to their accumulated amounts, omitting untouched zones.
    pub fn named(&self) -> BTreeMap<String, f64> {
        Zone::all()
            .filter(|zone| self[*zone] != 0.0)
            .map(|zone| (zone.name(), self[zone]))
            .collect()
    }
}

impl Index<Zone> for ZoneGrid {
    type Output = f64;

    fn index(&self, zone: Zone) -> &Self::Output {
        &self.0[zone.index()]
    }
}

/// Zone grids for both directions of travel, each weighted by value and by count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heatmap([[ZoneGrid; Weighting::COUNT]; Direction::COUNT]);

impl Heatmap {
    fn record(&mut self, event: &ActionEvent, contribution: &Contribution) {
        let display_value = contribution.display_value();
        for direction in Direction::iter() {
            let zone = match direction {
                Direction::From => event.start_zone,
                Direction::To => event.end_zone,
            };
            let grids = &mut self.0[direction.ordinal()];
            grids[Weighting::Value.ordinal()].add(zone, display_value);
            grids[Weighting::Count.ordinal()].add(zone, 1.0);
        }
    }

    pub fn grid(&self, direction: Direction, weighting: Weighting) -> &ZoneGrid {
        &self.0[direction.ordinal()][weighting.ordinal()]
    }

    pub fn named(&self, direction: Direction, weighting: Weighting) -> BTreeMap<String, f64> {
        self.grid(direction, weighting).named()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partner {
    pub player_id: PlayerId,
    pub tally: Tally,
}

#[derive(Debug, Default)]
struct PartnerTable {
    partners: Vec<Partner>,
    index: FxHashMap<PlayerId, usize>,
}

impl PartnerTable {
    fn record(&mut self, player_id: &str, value: f64) {
        let index = match self.index.get(player_id) {
            Some(&index) => index,
            None => {
                let index = self.partners.len();
                self.partners.push(Partner {
                    player_id: player_id.to_string(),
                    tally: Tally::default(),
                });
                self.index.insert(player_id.to_string(), index);
                index
            }
        };
        self.partners[index].tally.record(value);
    }

    /// The top `limit` partners in descending order of the sort key. Ties keep the order in
    /// which partners were first encountered.
    fn ranked(mut self, sort: PartnerSort, limit: usize) -> Vec<Partner> {
        let key = |partner: &Partner| match sort {
            PartnerSort::Count => partner.tally.count as f64,
            PartnerSort::Value => partner.tally.value,
        };
        self.partners.sort_by(|a, b| key(b).total_cmp(&key(a)));
        self.partners.truncate(limit);
        self.partners
    }
}

/// Running mean of an optional count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Average {
    pub sum: f64,
    pub samples: u32,
}

impl Average {
    pub fn record(&mut self, sample: Option<u8>) {
        if let Some(sample) = sample {
            self.sum += sample as f64;
            self.samples += 1;
        }
    }

    pub fn mean(&self) -> f64 {
        ratio(self.sum, self.samples as f64)
    }
}

/// Regains or losses credited to a player, read both where the ball changed hands (defense) and
/// at the attacking-equivalent zone (attack).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnoverSummary {
    pub count: u32,
    pub defense_xt: f64,
    pub attack_xt: f64,
    pub players_behind_ball: Average,
    pub opponents_behind_ball: Average,
    pub defense_zones: ZoneGrid,
    pub attack_zones: ZoneGrid,
}

impl TurnoverSummary {
    fn record_totals(&mut self, readings: &Readings, turnover: &TurnoverFields) {
        self.count += 1;
        self.defense_xt += readings.defense;
        self.attack_xt += readings.attack;
        self.players_behind_ball.record(turnover.players_behind_ball);
        self.opponents_behind_ball.record(turnover.opponents_behind_ball);
    }

    fn record_zones(&mut self, readings: &Readings) {
        self.defense_zones.add(readings.defense_zone, 1.0);
        self.attack_zones.add(readings.attack_zone, 1.0);
    }

    pub fn count_per_90(&self, minutes: u32) -> f64 {
        per_90(self.count as f64, minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionEntry {
    pub position: String,
    pub minutes: u32,
    pub roles: PerRole<RoleBreakdown>,
}

impl PositionEntry {
    fn new(position: &str, minutes: u32) -> Self {
        Self {
            position: position.to_string(),
            minutes,
            roles: PerRole::default(),
        }
    }

    pub fn value_per_90(&self, role: Role) -> f64 {
        self.roles[role].total.value_per_90(self.minutes)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleReport {
    pub breakdown: RoleBreakdown,
    pub heatmap: Heatmap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReport {
    pub player_id: PlayerId,
    pub minutes: u32,
    pub appearances: usize,
    pub roles: PerRole<RoleReport>,
    /// Positions in order of first appearance on the roster.
    pub positions: Vec<PositionEntry>,
    /// Receivers of the player's passes.
    pub partners_to: Vec<Partner>,
    /// Senders of the passes the player received.
    pub partners_from: Vec<Partner>,
    pub regains: TurnoverSummary,
    pub losses: TurnoverSummary,
}

impl PlayerReport {
    pub fn total(&self, role: Role) -> &Tally {
        &self.roles[role].breakdown.total
    }

    pub fn value_per_90(&self, role: Role) -> f64 {
        self.total(role).value_per_90(self.minutes)
    }

    pub fn count_per_90(&self, role: Role) -> f64 {
        self.total(role).count_per_90(self.minutes)
    }

    pub fn value_per_action(&self, role: Role) -> f64 {
        self.total(role).value_per_action()
    }
}

/// The zone that decides the laterality of an event for a role: where the ball was played or
/// carried from, or where it was received.
fn credited_zone(event: &ActionEvent, role: Role) -> Option<Zone> {
    match role {
        Role::Receiver => event.end_zone,
        Role::Sender | Role::Dribbler => event.start_zone,
    }
}

fn position_entry<'p>(
    positions: &'p mut Vec<PositionEntry>,
    position: &str,
) -> &'p mut PositionEntry {
    let index = match positions.iter().position(|entry| entry.position == position) {
        Some(index) => index,
        None => {
            positions.push(PositionEntry::new(position, 0));
            positions.len() - 1
        }
    };
    &mut positions[index]
}

pub fn player_report(
    snapshot: &Snapshot,
    xt: &XtTable,
    scope: &Scope,
    player_id: &str,
) -> PlayerReport {
    let scoped = scope.select(snapshot);
    report(&scoped, xt, scope, player_id)
}

/// Builds the report of one player over already-scoped events.
pub fn report(scoped: &ScopedEvents, xt: &XtTable, scope: &Scope, player_id: &str) -> PlayerReport {
    let classified: Vec<_> = scoped
        .events
        .iter()
        .map(|&event| (event, classify(event)))
        .collect();

    let mut roles = PerRole::<RoleReport>::default();
    let mut positions: Vec<_> = scoped
        .position_minutes(player_id)
        .into_iter()
        .map(|(position, minutes)| PositionEntry::new(position, minutes))
        .collect();
    let (mut regains, mut losses) = (TurnoverSummary::default(), TurnoverSummary::default());

    // first pass: summary counters over every scoped event
    for &(event, category) in &classified {
        match category {
            ActionCategory::Packing => {
                let value = Contribution::of(event, xt).value();
                for (role, credited) in credits(event) {
                    if credited != player_id {
                        continue;
                    }
                    let laterality = Laterality::of(credited_zone(event, role));
                    roles[role]
                        .breakdown
                        .record(value, &event.milestones, laterality);
                    let position = scoped
                        .position(&event.match_id, player_id, event.milestones.second_half)
                        .unwrap_or(UNKNOWN_POSITION);
                    position_entry(&mut positions, position).roles[role].record(
                        value,
                        &event.milestones,
                        laterality,
                    );
                }
            }
            ActionCategory::Regain | ActionCategory::Loss if event.sender_id == player_id => {
                let summary = if category == ActionCategory::Regain {
                    &mut regains
                } else {
                    &mut losses
                };
                summary.record_totals(&Readings::of(event, xt), &event.turnover);
            }
            _ => {}
        }
    }

    // second pass: spatial views, narrowed by the milestone filter
    let (mut partners_to, mut partners_from) = (PartnerTable::default(), PartnerTable::default());
    let mut spatial = 0;
    for &(event, category) in classified
        .iter()
        .filter(|(event, _)| scope.admits_spatially(event))
    {
        spatial += 1;
        match category {
            ActionCategory::Packing => {
                let contribution = Contribution::of(event, xt);
                for (role, credited) in credits(event) {
                    if credited != player_id {
                        continue;
                    }
                    trace!("event {} credits {player_id} as {role}", event.id);
                    roles[role].heatmap.record(event, &contribution);
                    match (role, event.action_type) {
                        (Role::Sender, ActionType::Pass) => {
                            if let Some(receiver_id) = &event.receiver_id {
                                partners_to.record(receiver_id, contribution.value());
                            }
                        }
                        (Role::Receiver, ActionType::Pass) => {
                            partners_from.record(&event.sender_id, contribution.value());
                        }
                        _ => {}
                    }
                }
            }
            ActionCategory::Regain if event.sender_id == player_id => {
                regains.record_zones(&Readings::of(event, xt));
            }
            ActionCategory::Loss if event.sender_id == player_id => {
                losses.record_zones(&Readings::of(event, xt));
            }
            _ => {}
        }
    }
    debug!(
        "report for {player_id}: {} scoped events, {spatial} in spatial views",
        classified.len()
    );

    PlayerReport {
        player_id: player_id.to_string(),
        minutes: scoped.minutes(player_id),
        appearances: scoped.appearances(player_id),
        roles,
        positions,
        partners_to: partners_to.ranked(scope.partner_sort, scope.partner_limit),
        partners_from: partners_from.ranked(scope.partner_sort, scope.partner_limit),
        regains,
        losses,
    }
}

/// Role totals of every credited player, computed as the first pass of [report] does.
pub fn role_totals<'a>(
    scoped: &ScopedEvents<'a>,
    xt: &XtTable,
) -> FxHashMap<&'a str, PerRole<Tally>> {
    let mut totals: FxHashMap<&str, PerRole<Tally>> = FxHashMap::default();
    for &event in &scoped.events {
        if classify(event) != ActionCategory::Packing {
            continue;
        }
        let value = Contribution::of(event, xt).value();
        for (role, credited) in credits(event) {
            totals.entry(credited).or_default()[role].record(value);
        }
    }
    totals
}
