//! Raw annotated events, as supplied by the annotation tooling.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::bail;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::zone::{self, Zone};

pub type PlayerId = String;
pub type MatchId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Pass,
    Dribble,
}

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
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Packing,
    Regain,
    Loss,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Milestones {
    #[serde(rename = "isP0")]
    pub p0: bool,
    #[serde(rename = "isP1")]
    pub p1: bool,
    #[serde(rename = "isP2")]
    pub p2: bool,
    #[serde(rename = "isP3")]
    pub p3: bool,
    #[serde(rename = "isP0Start")]
    pub p0_start: bool,
    #[serde(rename = "isP1Start")]
    pub p1_start: bool,
    #[serde(rename = "isP2Start")]
    pub p2_start: bool,
    #[serde(rename = "isP3Start")]
    pub p3_start: bool,
    #[serde(rename = "isPenaltyAreaEntry")]
    pub penalty_area_entry: bool,
    #[serde(rename = "isShot")]
    pub shot: bool,
    #[serde(rename = "isGoal")]
    pub goal: bool,
    #[serde(rename = "isSecondHalf")]
    pub second_half: bool,
}

impl Milestones {
    pub fn has(&self, flag: MilestoneFlag) -> bool {
        match flag {
            MilestoneFlag::P0 => self.p0,
            MilestoneFlag::P1 => self.p1,
            MilestoneFlag::P2 => self.p2,
            MilestoneFlag::P3 => self.p3,
            MilestoneFlag::P0Start => self.p0_start,
            MilestoneFlag::P1Start => self.p1_start,
            MilestoneFlag::P2Start => self.p2_start,
            MilestoneFlag::P3Start => self.p3_start,
            MilestoneFlag::PenaltyAreaEntry => self.penalty_area_entry,
            MilestoneFlag::Shot => self.shot,
            MilestoneFlag::Goal => self.goal,
        }
    }

    pub fn set(&mut self, flag: MilestoneFlag) {
        let field = match flag {
            MilestoneFlag::P0 => &mut self.p0,
            MilestoneFlag::P1 => &mut self.p1,
            MilestoneFlag::P2 => &mut self.p2,
            MilestoneFlag::P3 => &mut self.p3,
            MilestoneFlag::P0Start => &mut self.p0_start,
            MilestoneFlag::P1Start => &mut self.p1_start,
            MilestoneFlag::P2Start => &mut self.p2_start,
            MilestoneFlag::P3Start => &mut self.p3_start,
            MilestoneFlag::PenaltyAreaEntry => &mut self.penalty_area_entry,
            MilestoneFlag::Shot => &mut self.shot,
            MilestoneFlag::Goal => &mut self.goal,
        };
        *field = true;
    }
}

/// A milestone that a spatial view may be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MilestoneFlag {
    P0,
    P1,
    P2,
    P3,
    P0Start,
    P1Start,
    P2Start,
    P3Start,
    PenaltyAreaEntry,
    Shot,
    Goal,
}

impl Display for MilestoneFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MilestoneFlag::P0 => "p0",
            MilestoneFlag::P1 => "p1",
            MilestoneFlag::P2 => "p2",
            MilestoneFlag::P3 => "p3",
            MilestoneFlag::P0Start => "p0start",
            MilestoneFlag::P1Start => "p1start",
            MilestoneFlag::P2Start => "p2start",
            MilestoneFlag::P3Start => "p3start",
            MilestoneFlag::PenaltyAreaEntry => "pk",
            MilestoneFlag::Shot => "shot",
            MilestoneFlag::Goal => "goal",
        };
        write!(f, "{label}")
    }
}

impl FromStr for MilestoneFlag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        Ok(match normalised.as_str() {
            "p0" => MilestoneFlag::P0,
            "p1" => MilestoneFlag::P1,
            "p2" => MilestoneFlag::P2,
            "p3" => MilestoneFlag::P3,
            "p0start" => MilestoneFlag::P0Start,
            "p1start" => MilestoneFlag::P1Start,
            "p2start" => MilestoneFlag::P2Start,
            "p3start" => MilestoneFlag::P3Start,
            "pk" | "penaltyarea" | "penaltyareaentry" => MilestoneFlag::PenaltyAreaEntry,
            "shot" => MilestoneFlag::Shot,
            "goal" => MilestoneFlag::Goal,
            _ => bail!("unsupported milestone {s}"),
        })
    }
}

/// Fields specific to regains and losses of possession.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TurnoverFields {
    #[serde(deserialize_with = "zone::deserialize_lenient")]
    pub defense_zone: Option<Zone>,
    #[serde(deserialize_with = "zone::deserialize_lenient")]
    pub attack_zone: Option<Zone>,
    #[serde(rename = "defenseXT")]
    pub defense_xt: Option<f64>,
    #[serde(rename = "attackXT")]
    pub attack_xt: Option<f64>,
    pub players_behind_ball: Option<u8>,
    pub opponents_behind_ball: Option<u8>,
    pub total_players_on_field: Option<u8>,
    pub total_opponents_on_field: Option<u8>,
    #[serde(rename = "isReactionTime")]
    pub reaction_time: bool,
    #[serde(rename = "isBelowThresholdTime")]
    pub below_threshold_time: bool,
}

impl TurnoverFields {
    /// Whether any of the fields recorded only for regains is present.
    pub fn has_regain_fields(&self) -> bool {
        self.players_behind_ball.is_some() || self.opponents_behind_ball.is_some()
    }
}

/// One recorded pass or dribble. Every metric is derived from these fields on demand; an event is
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    pub id: String,
    pub match_id: MatchId,
    pub sender_id: PlayerId,
    #[serde(default)]
    pub receiver_id: Option<PlayerId>,
    pub action_type: ActionType,
    #[serde(default, deserialize_with = "zone::deserialize_lenient")]
    pub start_zone: Option<Zone>,
    #[serde(default, deserialize_with = "zone::deserialize_lenient")]
    pub end_zone: Option<Zone>,
    #[serde(default)]
    pub packing_points: u32,
    #[serde(flatten)]
    pub milestones: Milestones,
    #[serde(flatten)]
    pub turnover: TurnoverFields,
    #[serde(default)]
    pub category: Option<ActionCategory>,
}

impl ActionEvent {
    pub fn pass(
        id: impl Into<String>,
        match_id: impl Into<MatchId>,
        sender_id: impl Into<PlayerId>,
        receiver_id: impl Into<PlayerId>,
    ) -> Self {
        Self {
            receiver_id: Some(receiver_id.into()),
            ..Self::blank(id.into(), match_id.into(), sender_id.into(), ActionType::Pass)
        }
    }

    pub fn dribble(
        id: impl Into<String>,
        match_id: impl Into<MatchId>,
        sender_id: impl Into<PlayerId>,
    ) -> Self {
        Self::blank(id.into(), match_id.into(), sender_id.into(), ActionType::Dribble)
    }

    fn blank(id: String, match_id: MatchId, sender_id: PlayerId, action_type: ActionType) -> Self {
        Self {
            id,
            match_id,
            sender_id,
            receiver_id: None,
            action_type,
            start_zone: None,
            end_zone: None,
            packing_points: 0,
            milestones: Milestones::default(),
            turnover: TurnoverFields::default(),
            category: None,
        }
    }

    /// Sets the start and end zones by name; unparsable names leave the zone unset.
    pub fn with_zones(mut self, start: &str, end: &str) -> Self {
        self.start_zone = Zone::parse(start);
        self.end_zone = Zone::parse(end);
        self
    }

    pub fn with_packing_points(mut self, packing_points: u32) -> Self {
        self.packing_points = packing_points;
        self
    }

    pub fn with_milestone(mut self, flag: MilestoneFlag) -> Self {
        self.milestones.set(flag);
        self
    }

    pub fn in_second_half(mut self) -> Self {
        self.milestones.second_half = true;
        self
    }

    pub fn with_category(mut self, category: ActionCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_turnover(mut self, turnover: TurnoverFields) -> Self {
        self.turnover = turnover;
        self
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn deserialize_full_event() {
        let json = r#"{
            "id": "e1",
            "matchId": "m1",
            "senderId": "p7",
            "receiverId": "p9",
            "actionType": "pass",
            "startZone": "c4",
            "endZone": 70,
            "packingPoints": 3,
            "isP2": true,
            "isShot": true,
            "isSecondHalf": true,
            "playersBehindBall": 4,
            "defenseXT": 0.02,
            "category": "regain"
        }"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();
        assert_eq!("p9", event.receiver_id.as_deref().unwrap());
        assert_eq!(ActionType::Pass, event.action_type);
        assert_eq!("C4", event.start_zone.unwrap().name());
        assert_eq!("F11", event.end_zone.unwrap().name());
        assert_eq!(3, event.packing_points);
        assert!(event.milestones.p2 && event.milestones.shot && event.milestones.second_half);
        assert!(!event.milestones.goal);
        assert_eq!(Some(4), event.turnover.players_behind_ball);
        assert_eq!(Some(0.02), event.turnover.defense_xt);
        assert_eq!(Some(ActionCategory::Regain), event.category);
    }

    #[test]
    fn deserialize_minimal_dribble() {
        let json = r#"{
            "id": "e2",
            "matchId": "m1",
            "senderId": "p7",
            "actionType": "dribble",
            "startZone": "not-a-zone"
        }"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ActionEvent::dribble("e2", "m1", "p7"), event);
    }

    #[test]
    fn milestone_flags_round_trip_through_setters() {
        for flag in MilestoneFlag::iter() {
            let mut milestones = Milestones::default();
            assert!(!milestones.has(flag));
            milestones.set(flag);
            assert!(milestones.has(flag));
            assert!(MilestoneFlag::iter()
                .filter(|&other| other != flag)
                .all(|other| !milestones.has(other)));
        }
    }

    #[test]
    fn milestone_flag_from_str() {
        assert_eq!(MilestoneFlag::P2, MilestoneFlag::from_str("P2").unwrap());
        assert_eq!(MilestoneFlag::P1Start, MilestoneFlag::from_str("p1-start").unwrap());
        assert_eq!(
            MilestoneFlag::PenaltyAreaEntry,
            MilestoneFlag::from_str("penalty_area").unwrap()
        );
        for flag in MilestoneFlag::iter() {
            assert_eq!(flag, MilestoneFlag::from_str(&flag.to_string()).unwrap());
        }
        assert_eq!(
            "unsupported milestone p9",
            MilestoneFlag::from_str("p9").err().unwrap().to_string()
        );
    }

    #[test]
    fn regain_fields() {
        assert!(!TurnoverFields::default().has_regain_fields());
        assert!(TurnoverFields {
            opponents_behind_ball: Some(0),
            ..TurnoverFields::default()
        }
        .has_regain_fields());
        assert!(!TurnoverFields {
            total_players_on_field: Some(11),
            reaction_time: true,
            ..TurnoverFields::default()
        }
        .has_regain_fields());
    }
}
