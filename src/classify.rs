//! Assigns each event to a [ActionCategory]. An authoritative tag always wins; events recorded
//! before the tag existed fall back to a heuristic over the fields that are present.

use tracing::{debug, trace};

use crate::event::{ActionCategory, ActionEvent};

pub fn classify(event: &ActionEvent) -> ActionCategory {
    event.category.unwrap_or_else(|| infer(event))
}

/// Best-effort category of an untagged event. Ambiguous combinations may be misclassified.
///
/// The reaction-time check precedes the regain check, so an event carrying both the
/// reaction-time flag and regain fields is a loss.
pub fn infer(event: &ActionEvent) -> ActionCategory {
    let turnover = &event.turnover;
    let regain_fields = turnover.has_regain_fields();
    if turnover.reaction_time || (turnover.below_threshold_time && !regain_fields) {
        ActionCategory::Loss
    } else if regain_fields {
        ActionCategory::Regain
    } else {
        ActionCategory::Packing
    }
}

/// Copies of the given events with the inferred category stamped onto every untagged one. Meant
/// as a one-off migration of legacy records; tagged events are copied unchanged.
pub fn backfill(events: &[ActionEvent]) -> Vec<ActionEvent> {
    let mut stamped = 0;
    let backfilled = events
        .iter()
        .map(|event| {
            let mut event = event.clone();
            if event.category.is_none() {
                let category = infer(&event);
                trace!("stamping event {} as {category}", event.id);
                event.category = Some(category);
                stamped += 1;
            }
            event
        })
        .collect();
    debug!("backfilled {stamped} of {} events", events.len());
    backfilled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TurnoverFields;

    fn untagged(turnover: TurnoverFields) -> ActionEvent {
        ActionEvent::pass("e", "m", "p1", "p2").with_turnover(turnover)
    }

    #[test]
    fn tag_overrides_heuristic() {
        let event = untagged(TurnoverFields {
            reaction_time: true,
            below_threshold_time: true,
            ..TurnoverFields::default()
        })
        .with_category(ActionCategory::Regain);
        assert_eq!(ActionCategory::Regain, classify(&event));

        let event = ActionEvent::dribble("e", "m", "p1").with_category(ActionCategory::Loss);
        assert_eq!(ActionCategory::Loss, classify(&event));
    }

    #[test]
    fn defaults_to_packing() {
        assert_eq!(ActionCategory::Packing, classify(&untagged(TurnoverFields::default())));
        let event = untagged(TurnoverFields {
            total_players_on_field: Some(11),
            defense_xt: Some(0.1),
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Packing, classify(&event));
    }

    #[test]
    fn reaction_time_is_loss() {
        let event = untagged(TurnoverFields {
            reaction_time: true,
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Loss, classify(&event));
    }

    #[test]
    fn reaction_time_precedes_regain_fields() {
        let event = untagged(TurnoverFields {
            reaction_time: true,
            players_behind_ball: Some(5),
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Loss, classify(&event));
    }

    #[test]
    fn below_threshold_without_regain_fields_is_loss() {
        let event = untagged(TurnoverFields {
            below_threshold_time: true,
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Loss, classify(&event));
    }

    #[test]
    fn below_threshold_with_regain_fields_is_regain() {
        let event = untagged(TurnoverFields {
            below_threshold_time: true,
            opponents_behind_ball: Some(3),
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Regain, classify(&event));
    }

    #[test]
    fn regain_fields_alone_are_regain() {
        let event = untagged(TurnoverFields {
            players_behind_ball: Some(0),
            ..TurnoverFields::default()
        });
        assert_eq!(ActionCategory::Regain, classify(&event));
    }

    #[test]
    fn backfill_stamps_untagged_only() {
        let events = vec![
            untagged(TurnoverFields {
                players_behind_ball: Some(2),
                ..TurnoverFields::default()
            }),
            untagged(TurnoverFields {
                reaction_time: true,
                ..TurnoverFields::default()
            })
            .with_category(ActionCategory::Packing),
            untagged(TurnoverFields::default()),
        ];
        let backfilled = backfill(&events);
        let categories: Vec<_> = backfilled.iter().map(|event| event.category).collect();
        assert_eq!(
            vec![
                Some(ActionCategory::Regain),
                Some(ActionCategory::Packing),
                Some(ActionCategory::Packing)
            ],
            categories
        );
        assert!(events[0].category.is_none());
        for (original, stamped) in events.iter().zip(&backfilled) {
            assert_eq!(classify(original), classify(stamped));
        }
    }
}
