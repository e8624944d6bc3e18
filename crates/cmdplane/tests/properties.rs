// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property-based tests for the pure, stateless pieces of the command and
//! event plane: profile shaping's word-cap invariant (spec §8 property 5)
//! and the notification dedupe key's determinism/collision-avoidance
//! (spec §8 property 3's key derivation). Grounded on the pack's
//! `EffortlessMetrics-agent-backplane` crate, which uses `proptest` for
//! the same kind of "holds for all inputs" contract invariant rather than
//! a handful of example-based cases.

use cmdplane::profile::Profile;
use cmdplane::store::notification::dedupe_key;
use proptest::prelude::*;

fn arb_profile() -> impl Strategy<Value = Profile> {
    prop_oneof![
        Just(Profile::Workout),
        Just(Profile::Kitchen),
        Just(Profile::Commute),
        Just(Profile::Default),
    ]
}

// A profanity-free, whitespace-separated word generator — sentence-ending
// periods are injected separately so the truncation logic's "preserve
// sentence boundaries" branch gets real coverage.
fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z]{1,10}", 0..80)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property 5: for any spoken text and any profile, the shaped output
    /// never exceeds that profile's max word count.
    #[test]
    fn shape_never_exceeds_profile_word_cap(words in arb_words(), profile in arb_profile()) {
        let text = words.join(" ");
        let shaped = cmdplane::profile::shape(&text, profile);
        let word_count = shaped.trim_end_matches('…').split_whitespace().count();
        prop_assert!(word_count <= profile.max_words());
    }

    /// Same property, but with periods sprinkled in so truncation
    /// sometimes lands on the "last period within cap" branch instead of
    /// the hard-cut ellipsis branch.
    #[test]
    fn shape_never_exceeds_cap_with_sentence_boundaries(
        words in arb_words(),
        period_every in 1usize..6,
        profile in arb_profile(),
    ) {
        let mut text = String::new();
        for (i, w) in words.iter().enumerate() {
            text.push_str(w);
            if i % period_every == period_every - 1 {
                text.push('.');
            }
            text.push(' ');
        }
        let shaped = cmdplane::profile::shape(text.trim(), profile);
        let word_count = shaped.trim_end_matches('…').split_whitespace().count();
        prop_assert!(word_count <= profile.max_words());
    }

    /// Unchanged text that is already within the cap round-trips exactly.
    #[test]
    fn shape_is_identity_under_the_cap(words in prop::collection::vec("[a-zA-Z]{1,10}", 0..10)) {
        let text = words.join(" ");
        for profile in [Profile::Workout, Profile::Kitchen, Profile::Commute, Profile::Default] {
            if words.len() <= profile.max_words() {
                prop_assert_eq!(cmdplane::profile::shape(&text, profile), text.clone());
            }
        }
    }

    /// The dedupe key is a pure function of its three inputs: identical
    /// `(event_type, repo, reference)` triples always collapse to the same
    /// key, and changing any one component changes the key (modulo the
    /// astronomically unlikely SHA-256 collision).
    #[test]
    fn dedupe_key_is_deterministic(
        event_type in "[a-z._]{1,20}",
        repo in "[a-z]{1,10}/[a-z]{1,10}",
        reference in "[0-9]{1,6}",
    ) {
        let a = dedupe_key(&event_type, &repo, &reference);
        let b = dedupe_key(&event_type, &repo, &reference);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn dedupe_key_changes_with_reference(
        event_type in "[a-z._]{1,20}",
        repo in "[a-z]{1,10}/[a-z]{1,10}",
        r1 in "[0-9]{1,6}",
        r2 in "[0-9]{1,6}",
    ) {
        prop_assume!(r1 != r2);
        let a = dedupe_key(&event_type, &repo, &r1);
        let b = dedupe_key(&event_type, &repo, &r2);
        prop_assert_ne!(a, b);
    }
}
