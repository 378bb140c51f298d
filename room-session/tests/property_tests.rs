//! Property-based tests for track ordering and the creation guard

use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

use room_session::guard::{Admission, CreationState, PlaylistCreationGuard};
use room_session::ordering::{collate, is_sorted, sorted};
use room_session::room_api::{ApiError, PlaylistCreationResult, Track};
use room_session::{SessionError, SharedTrackSet};

// ============================================================================
// Test Helpers
// ============================================================================

/// Artist names from a small alphabet so that ties, case and accent variants
/// are common
fn artist_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "abba", "ABBA", "Abba", "Blur", "blur", "Muse", "a", "B", "",
        "Édith", "édith", "edith", "Edith", "e\u{301}dith", "Ólafur", "Zappa", "Björk",
        "Røyksopp", "Кино", "坂本龍一",
    ])
    .prop_map(str::to_string)
}

fn tracks_strategy() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(prop::collection::vec(artist_strategy(), 0..3), 0..24).prop_map(
        |artist_lists| {
            artist_lists
                .into_iter()
                .enumerate()
                .map(|(i, artists)| Track::new(format!("t{}", i), "Song").with_artists(artists))
                .collect()
        },
    )
}

#[derive(Debug, Clone)]
enum GuardOp {
    Request,
    Confirm(bool),
    Succeed,
    Fail,
    Acknowledge,
}

fn guard_op_strategy() -> impl Strategy<Value = GuardOp> {
    prop_oneof![
        Just(GuardOp::Request),
        any::<bool>().prop_map(GuardOp::Confirm),
        Just(GuardOp::Succeed),
        Just(GuardOp::Fail),
        Just(GuardOp::Acknowledge),
    ]
}

// ============================================================================
// Ordering
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sorting is deterministic: sorting sorted output changes nothing
    #[test]
    fn prop_sort_is_idempotent(tracks in tracks_strategy()) {
        let once = sorted(&tracks);
        let twice = sorted(&once);
        prop_assert_eq!(once, twice);
    }

    /// Sorted output is in order and is a permutation of the input
    #[test]
    fn prop_sort_orders_and_preserves(tracks in tracks_strategy()) {
        let out = sorted(&tracks);
        prop_assert!(is_sorted(&out));
        prop_assert_eq!(out.len(), tracks.len());

        let mut in_ids: Vec<String> = tracks.iter().map(|t| t.id.to_string()).collect();
        let mut out_ids: Vec<String> = out.iter().map(|t| t.id.to_string()).collect();
        in_ids.sort();
        out_ids.sort();
        prop_assert_eq!(in_ids, out_ids);
    }

    /// Tracks with identical artists keep the order the server sent them in
    #[test]
    fn prop_sort_is_stable(tracks in tracks_strategy()) {
        let out = sorted(&tracks);
        let position = |id: &str| tracks.iter().position(|t| t.id.as_str() == id);

        for pair in out.windows(2) {
            if pair[0].joined_artists() == pair[1].joined_artists() {
                prop_assert!(position(pair[0].id.as_str()) < position(pair[1].id.as_str()));
            }
        }
    }

    /// Only identical strings compare equal, and the order is antisymmetric
    #[test]
    fn prop_collate_is_a_total_order(a in "[a-cA-CéÉèøØ\u{301} ]{0,4}", b in "[a-cA-CéÉèøØ\u{301} ]{0,4}") {
        let forward = collate(&a, &b);
        prop_assert_eq!(forward, collate(&b, &a).reverse());
        prop_assert_eq!(forward == Ordering::Equal, a == b);
    }

    /// Comparison is transitive across accent and case variants
    #[test]
    fn prop_collate_is_transitive(a in artist_strategy(), b in artist_strategy(), c in artist_strategy()) {
        if collate(&a, &b) != Ordering::Greater && collate(&b, &c) != Ordering::Greater {
            prop_assert_ne!(collate(&a, &c), Ordering::Greater);
        }
    }

    /// Accents never move a name past a different base letter
    #[test]
    fn prop_accented_e_sorts_between_d_and_f(
        name in prop::sample::select(vec!["Édith", "édith", "Èric", "e\u{301}mile"])
    ) {
        prop_assert_eq!(collate("Daft Punk", name), Ordering::Less);
        prop_assert_eq!(collate(name, "Fleetwood Mac"), Ordering::Less);
        prop_assert_eq!(collate(name, "Zappa"), Ordering::Less);
    }

    /// Building a track set never keeps two tracks with the same id
    #[test]
    fn prop_track_set_has_unique_ids(tracks in tracks_strategy(), dupes in 0usize..6) {
        let mut reported = tracks.clone();
        reported.extend(tracks.iter().take(dupes).cloned());

        let set = SharedTrackSet::from_server(reported);
        let ids = set.ids();
        let unique: HashSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(set.len(), tracks.len());
        prop_assert!(is_sorted(set.as_slice()));
    }
}

// ============================================================================
// Creation guard
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No sequence of operations produces a second request while one is
    /// pending, or any request after success
    #[test]
    fn prop_guard_is_single_flight(ops in prop::collection::vec(guard_op_strategy(), 0..40)) {
        let mut guard = PlaylistCreationGuard::new();
        let mut issued = 0u32;
        let mut succeeded = 0u32;

        for op in ops {
            let before = guard.state().clone();
            match op {
                GuardOp::Request => {
                    let admission = guard.request_create();
                    if matches!(before, CreationState::Requesting | CreationState::Succeeded) {
                        prop_assert_ne!(admission, Admission::Confirm);
                    }
                }
                GuardOp::Confirm(answer) => {
                    if guard.resolve_confirmation(answer) {
                        prop_assert!(!before.is_requesting());
                        issued += 1;
                    }
                }
                GuardOp::Succeed => {
                    if guard.complete(Ok(PlaylistCreationResult::new("p"))).is_succeeded()
                        && before.is_requesting()
                    {
                        succeeded += 1;
                    }
                }
                GuardOp::Fail => {
                    guard.complete(Err(SessionError::from(ApiError::Transient("t".into()))));
                }
                GuardOp::Acknowledge => {
                    guard.acknowledge_failure();
                }
            }

            prop_assert!(succeeded <= 1);
            if succeeded == 1 {
                prop_assert!(guard.result().is_some());
            }
        }

        prop_assert!(issued >= succeeded);
    }
}
