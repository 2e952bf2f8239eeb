use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xform_status::State::{self, Failed, InProgress, Successful, Unknown};

fn any_state() -> impl Strategy<Value = State> {
    prop_oneof![
        Just(InProgress),
        Just(Successful),
        Just(Failed),
        Just(Unknown),
    ]
}

#[test]
fn test_reduction_table() {
    let table = [
        (InProgress, InProgress, InProgress),
        (InProgress, Successful, InProgress),
        (InProgress, Failed, InProgress),
        (InProgress, Unknown, InProgress),
        (Successful, InProgress, InProgress),
        (Successful, Successful, Successful),
        (Successful, Failed, Failed),
        (Successful, Unknown, Unknown),
        (Failed, InProgress, InProgress),
        (Failed, Successful, Failed),
        (Failed, Failed, Failed),
        (Failed, Unknown, Unknown),
        (Unknown, InProgress, InProgress),
        (Unknown, Successful, Unknown),
        (Unknown, Failed, Unknown),
        (Unknown, Unknown, Unknown),
    ];

    for (a, b, expected) in table {
        assert_eq!(a.reduce(b), expected, "reduce({a}, {b})");
    }
}

#[test]
fn test_mixed_children_stay_in_progress() {
    assert_eq!(State::fold([Successful, Failed, InProgress]), InProgress);
}

proptest! {
    #[test]
    fn prop_reduce_is_symmetric(a in any_state(), b in any_state()) {
        prop_assert_eq!(a.reduce(b), b.reduce(a));
    }

    #[test]
    fn prop_reduce_is_associative(a in any_state(), b in any_state(), c in any_state()) {
        prop_assert_eq!(a.reduce(b).reduce(c), a.reduce(b.reduce(c)));
    }

    #[test]
    fn prop_fold_ignores_order(mut states in prop::collection::vec(any_state(), 0..12)) {
        let forward = State::fold(states.iter().copied());
        states.reverse();
        prop_assert_eq!(State::fold(states.iter().copied()), forward);
        states.sort_by_key(|s| *s as u8);
        prop_assert_eq!(State::fold(states), forward);
    }

    #[test]
    fn prop_in_progress_dominates(mut states in prop::collection::vec(any_state(), 0..12), at in 0usize..12) {
        let at = at.min(states.len());
        states.insert(at, InProgress);
        prop_assert_eq!(State::fold(states), InProgress);
    }
}
