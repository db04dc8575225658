//! The value of a single event: the PxT of a pass or dribble, who it is credited to, and the two xT
//! readings of a regain or loss.

use std::ops::{Index, IndexMut};

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter};

use crate::event::{ActionEvent, ActionType};
use crate::xt::XtTable;
use crate::zone::Zone;

/// Stands in for a goal's PxT when it would otherwise round to zero, so that goals remain visible
/// in value-weighted views.
pub const GOAL_EPSILON: f64 = 0.01;

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
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Sender,
    Receiver,
    Dribbler,
}

const ROLES: [Role; Role::COUNT] = [Role::Sender, Role::Receiver, Role::Dribbler];

/// One value per [Role], indexed by role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerRole<T>([T; Role::COUNT]);

impl<T> PerRole<T> {
    pub fn from_fn(mut f: impl FnMut(Role) -> T) -> Self {
        Self(std::array::from_fn(|index| f(ROLES[index])))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        ROLES.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Role> for PerRole<T> {
    type Output = T;

    fn index(&self, role: Role) -> &Self::Output {
        &self.0[role.ordinal()]
    }
}

impl<T> IndexMut<Role> for PerRole<T> {
    fn index_mut(&mut self, role: Role) -> &mut Self::Output {
        &mut self.0[role.ordinal()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub start_xt: f64,
    pub end_xt: f64,
    pub packing_points: u32,
    pub goal: bool,
}

impl Contribution {
    pub fn of(event: &ActionEvent, xt: &XtTable) -> Self {
        Self {
            start_xt: xt.value(event.start_zone),
            end_xt: xt.value(event.end_zone),
            packing_points: event.packing_points,
            goal: event.milestones.goal,
        }
    }

    #[inline(always)]
    pub fn xt_delta(&self) -> f64 {
        self.end_xt - self.start_xt
    }

    /// The PxT of the event: the xT gained, scaled by the opponents bypassed.
    #[inline(always)]
    pub fn value(&self) -> f64 {
        self.xt_delta() * self.packing_points as f64
    }

    /// The value shown in value-weighted views. A goal whose PxT rounds to zero at two decimal
    /// places shows as [GOAL_EPSILON].
    pub fn display_value(&self) -> f64 {
        let value = self.value();
        if self.goal && (value * 100.0).round() == 0.0 {
            GOAL_EPSILON
        } else {
            value
        }
    }
}

/// The roles credited with an event, and the player credited in each. A pass credits its sender
/// and, when recorded, its receiver; a dribble credits only its dribbler.
pub fn credits(event: &ActionEvent) -> impl Iterator<Item = (Role, &str)> {
    let (first, second) = match event.action_type {
        ActionType::Pass => (
            (Role::Sender, event.sender_id.as_str()),
            event
                .receiver_id
                .as_deref()
                .map(|receiver_id| (Role::Receiver, receiver_id)),
        ),
        ActionType::Dribble => ((Role::Dribbler, event.sender_id.as_str()), None),
    };
    std::iter::once(first).chain(second)
}

/// The two simultaneous xT readings of a regain or loss: where the ball changed hands, and the
/// attacking-equivalent of that zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub defense_zone: Option<Zone>,
    pub attack_zone: Option<Zone>,
    pub defense: f64,
    pub attack: f64,
}

impl Readings {
    /// Prefers the stored zones and values, recomputing any that are missing from the table. A
    /// missing zone is mirrored from the other one, and the defense zone falls back to the event's
    /// start zone. A recomputed value is always read at the zone reported alongside it.
    pub fn of(event: &ActionEvent, xt: &XtTable) -> Self {
        let turnover = &event.turnover;
        let defense_zone = turnover
            .defense_zone
            .or_else(|| turnover.attack_zone.map(|zone| zone.opposite()))
            .or(event.start_zone);
        let attack_zone = turnover
            .attack_zone
            .or_else(|| defense_zone.map(|zone| zone.opposite()));
        Self {
            defense_zone,
            attack_zone,
            defense: turnover
                .defense_xt
                .unwrap_or_else(|| xt.value(defense_zone)),
            attack: turnover
                .attack_xt
                .unwrap_or_else(|| xt.value(attack_zone)),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::event::{MilestoneFlag, TurnoverFields};
    use crate::testing::corner_table;

    #[test]
    fn pass_value_and_credits() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R")
            .with_zones("A1", "H12")
            .with_packing_points(2);
        let contribution = Contribution::of(&event, &xt);
        assert_float_absolute_eq!(0.24, contribution.xt_delta());
        assert_float_absolute_eq!(0.48, contribution.value());

        let credited: Vec<_> = credits(&event).collect();
        assert_eq!(vec![(Role::Sender, "P"), (Role::Receiver, "R")], credited);
    }

    #[test]
    fn pass_without_receiver_credits_sender_only() {
        let mut event = ActionEvent::pass("e", "m", "P", "R");
        event.receiver_id = None;
        assert_eq!(vec![(Role::Sender, "P")], credits(&event).collect::<Vec<_>>());
    }

    #[test]
    fn dribble_credits_dribbler_only() {
        let event = ActionEvent::dribble("e", "m", "P");
        assert_eq!(vec![(Role::Dribbler, "P")], credits(&event).collect::<Vec<_>>());
    }

    #[test]
    fn missing_zone_reads_zero() {
        let xt = corner_table();
        let mut event = ActionEvent::dribble("e", "m", "P")
            .with_zones("A1", "H12")
            .with_packing_points(3);
        event.start_zone = None;
        assert_float_absolute_eq!(0.75, Contribution::of(&event, &xt).value());
        event.end_zone = None;
        assert_eq!(0.0, Contribution::of(&event, &xt).value());
    }

    #[test]
    fn backward_pass_is_negative() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R")
            .with_zones("H12", "A1")
            .with_packing_points(1);
        assert_float_absolute_eq!(-0.24, Contribution::of(&event, &xt).value());
    }

    #[test]
    fn goal_floor_applies_to_display_only() {
        let xt = corner_table();
        let goal = ActionEvent::pass("e", "m", "P", "R")
            .with_zones("A1", "A1")
            .with_packing_points(4)
            .with_milestone(MilestoneFlag::Goal);
        let contribution = Contribution::of(&goal, &xt);
        assert_eq!(0.0, contribution.value());
        assert_eq!(GOAL_EPSILON, contribution.display_value());

        let scoring = Contribution::of(&goal.clone().with_zones("A1", "H12"), &xt);
        assert_float_absolute_eq!(0.96, scoring.display_value());

        let not_goal = ActionEvent::pass("e", "m", "P", "R").with_zones("A1", "A1");
        assert_eq!(0.0, Contribution::of(&not_goal, &xt).display_value());
    }

    #[test]
    fn readings_prefer_stored_values() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R").with_turnover(TurnoverFields {
            defense_zone: Zone::parse("A1"),
            defense_xt: Some(0.5),
            attack_xt: Some(0.7),
            ..TurnoverFields::default()
        });
        let readings = Readings::of(&event, &xt);
        assert_eq!(0.5, readings.defense);
        assert_eq!(0.7, readings.attack);
    }

    #[test]
    fn readings_recompute_both_views() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R").with_turnover(TurnoverFields {
            defense_zone: Zone::parse("A1"),
            ..TurnoverFields::default()
        });
        let readings = Readings::of(&event, &xt);
        assert_float_absolute_eq!(0.01, readings.defense);
        assert_float_absolute_eq!(0.25, readings.attack);
        assert_eq!("H12", readings.attack_zone.unwrap().name());
    }

    #[test]
    fn readings_fall_back_to_start_zone() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R").with_zones("H12", "A1");
        let readings = Readings::of(&event, &xt);
        assert_eq!("H12", readings.defense_zone.unwrap().name());
        assert_float_absolute_eq!(0.25, readings.defense);
        assert_float_absolute_eq!(0.01, readings.attack);

        let readings = Readings::of(&ActionEvent::dribble("e", "m", "P"), &xt);
        assert_eq!((0.0, 0.0), (readings.defense, readings.attack));
        assert_eq!(None, readings.attack_zone);
    }

    #[test]
    fn readings_mirror_stored_attack_zone() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R").with_turnover(TurnoverFields {
            attack_zone: Zone::parse("A1"),
            ..TurnoverFields::default()
        });
        let readings = Readings::of(&event, &xt);
        assert_eq!("H12", readings.defense_zone.unwrap().name());
        assert_eq!("A1", readings.attack_zone.unwrap().name());
        assert_float_absolute_eq!(0.25, readings.defense);
        assert_float_absolute_eq!(0.01, readings.attack);
    }

    #[test]
    fn readings_agree_with_reported_zones() {
        let xt = corner_table();
        let event = ActionEvent::pass("e", "m", "P", "R").with_turnover(TurnoverFields {
            defense_zone: Zone::parse("H12"),
            attack_zone: Zone::parse("H12"),
            ..TurnoverFields::default()
        });
        let readings = Readings::of(&event, &xt);
        assert_float_absolute_eq!(0.25, readings.defense);
        assert_float_absolute_eq!(0.25, readings.attack);
        assert_eq!(xt.value(readings.attack_zone), readings.attack);
    }

    #[test]
    fn roles_in_ordinal_order() {
        use strum::IntoEnumIterator;
        for (index, role) in Role::iter().enumerate() {
            assert_eq!(index, role.ordinal());
            assert_eq!(role, ROLES[index]);
        }
    }

    #[test]
    fn per_role_indexing() {
        let mut per_role = PerRole::from_fn(|role| role.to_string());
        assert_eq!("receiver", per_role[Role::Receiver]);
        per_role[Role::Dribbler].push('!');
        let collected: Vec<_> = per_role
            .iter()
            .map(|(role, label)| (role, label.as_str()))
            .collect();
        assert_eq!(
            vec![
                (Role::Sender, "sender"),
                (Role::Receiver, "receiver"),
                (Role::Dribbler, "dribbler!")
            ],
            collected
        );
    }
}
