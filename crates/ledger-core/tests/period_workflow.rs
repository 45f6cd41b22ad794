use ledger_core::state_machine::{allowed_transitions, validate_transition};
use ledger_core::{PeriodStatus, StateMachineError};
use proptest::prelude::*;

const ALL: [PeriodStatus; 6] = [
    PeriodStatus::Draft,
    PeriodStatus::Review,
    PeriodStatus::Submitted,
    PeriodStatus::Audit,
    PeriodStatus::Verified,
    PeriodStatus::Locked,
];

fn status() -> impl Strategy<Value = PeriodStatus> {
    proptest::sample::select(ALL.to_vec())
}

#[test]
fn only_draft_accepts_edits() {
    let editable: Vec<PeriodStatus> = ALL.into_iter().filter(|s| s.accepts_edits()).collect();
    assert_eq!(editable, vec![PeriodStatus::Draft]);
}

#[test]
fn every_status_is_reachable_from_draft() {
    let mut reached = vec![PeriodStatus::Draft];
    let mut frontier = vec![PeriodStatus::Draft];
    while let Some(from) = frontier.pop() {
        for to in allowed_transitions(from) {
            if !reached.contains(&to) {
                reached.push(to);
                frontier.push(to);
            }
        }
    }
    reached.sort();
    assert_eq!(reached, ALL.to_vec());
}

#[test]
fn status_round_trips_through_text() {
    for s in ALL {
        assert_eq!(s.to_string().parse::<PeriodStatus>().unwrap(), s);
        assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{s}\""));
    }
    assert!("archived".parse::<PeriodStatus>().is_err());
}

proptest! {
    #[test]
    fn prop_validation_agrees_with_allowed_list(from in status(), to in status()) {
        let listed = allowed_transitions(from).contains(&to);
        match validate_transition(from, to) {
            Ok(()) => prop_assert!(listed),
            Err(StateMachineError::Locked) => prop_assert_eq!(from, PeriodStatus::Locked),
            Err(StateMachineError::IllegalTransition { .. }) => prop_assert!(!listed),
        }
    }

    #[test]
    fn prop_no_self_transitions(s in status()) {
        prop_assert!(validate_transition(s, s).is_err());
    }
}
