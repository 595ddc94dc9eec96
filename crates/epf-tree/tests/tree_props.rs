//! Property tests over random editing sessions

use epf_test_utils::{blank_profile, sample_profile};
use epf_tree::{Action, ActionKind, Dispatch, EvidenceProfile, IgnoreReason, Level};
use proptest::prelude::*;

fn kind() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Add),
        Just(ActionKind::MoveUp),
        Just(ActionKind::MoveDown),
        Just(ActionKind::Remove),
        Just(ActionKind::Show),
        Just(ActionKind::Hide),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    (
        prop::sample::select(Level::ALL.to_vec()),
        prop::collection::vec(1u32..4, 3),
        1u32..5,
        kind(),
    )
        .prop_map(|(level, slots, target, kind)| {
            let ancestors = slots[..level.depth()].to_vec();
            if kind == ActionKind::Add {
                Action::add(level, ancestors)
            } else {
                Action::row(level, ancestors, target, kind)
            }
        })
}

fn assert_renumbered(profile: &EvidenceProfile) {
    assert!(profile.check_invariants().is_ok());
    for stream in profile.streams() {
        let orders = stream.payload().scenarios.display_orders();
        let expected: Vec<u32> = (1..=u32::try_from(orders.len()).unwrap()).collect();
        assert_eq!(orders, expected);
    }
}

proptest! {
    #[test]
    fn random_sessions_keep_invariants(actions in prop::collection::vec(action(), 0..40)) {
        let mut profile = blank_profile();
        for action in &actions {
            profile.apply(action);
            assert_renumbered(&profile);
        }
    }

    #[test]
    fn imported_profiles_keep_invariants(actions in prop::collection::vec(action(), 0..40)) {
        let mut profile = sample_profile();
        for action in &actions {
            profile.apply(action);
        }
        prop_assert!(profile.check_invariants().is_ok());
    }

    #[test]
    fn rendered_buttons_parse_back(actions in prop::collection::vec(action(), 0..20)) {
        let mut profile = sample_profile();
        for action in &actions {
            profile.apply(action);
        }

        let view = profile.view();
        let parser = profile.parser();
        for row in &view.streams.rows {
            for id in row.buttons.iter().chain(row.children.scenarios.add_button.iter()) {
                prop_assert!(parser.parse(id).is_some(), "unparseable {}", id);
            }
            for scenario in &row.children.scenarios.rows {
                for id in &scenario.buttons {
                    let parsed = parser.parse(id);
                    prop_assert!(parsed.is_some(), "unparseable {}", id);
                    prop_assert_eq!(parsed.map(|a| a.level), Some(Level::Scenario));
                }
            }
        }
    }

    #[test]
    fn garbage_identifiers_are_malformed(id in "[a-zA-Z_0-9]{0,24}") {
        let mut profile = blank_profile();
        let outcome = profile.apply_id(&id);
        if profile.parser().parse(&id).is_none() {
            prop_assert_eq!(outcome, Dispatch::Ignored(IgnoreReason::Malformed));
        }
        prop_assert!(profile.check_invariants().is_ok());
    }
}
