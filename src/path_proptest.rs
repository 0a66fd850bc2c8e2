//! Property-based tests for checkout key derivation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{canonical_checkout_dir, origin_hash, sanitize_path_component};
    use proptest::prelude::*;
    use std::path::Path;

    // ============================================================================
    // origin_hash property tests
    // ============================================================================

    proptest! {
        /// Property: origin_hash is always 12 lowercase hex characters
        #[test]
        fn origin_hash_is_twelve_lowercase_hex(input in ".*") {
            let hash = origin_hash(&input);
            prop_assert_eq!(hash.len(), 12);
            prop_assert!(
                hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
                "origin_hash produced non-hex output '{}' from input '{}'",
                hash,
                input
            );
        }

        /// Property: origin_hash is deterministic (same input = same output)
        #[test]
        fn origin_hash_is_deterministic(input in ".*") {
            prop_assert_eq!(origin_hash(&input), origin_hash(&input));
        }
    }

    // ============================================================================
    // sanitize_path_component property tests
    // ============================================================================

    proptest! {
        /// Property: sanitize_path_component never produces filesystem-unsafe characters
        #[test]
        fn sanitize_never_produces_unsafe_chars(input in ".*") {
            let result = sanitize_path_component(&input);
            let unsafe_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
            for ch in unsafe_chars {
                prop_assert!(
                    !result.contains(ch),
                    "sanitize_path_component produced unsafe character '{}' from input '{}'",
                    ch,
                    input
                );
            }
        }

        /// Property: sanitizing preserves the number of characters
        #[test]
        fn sanitize_preserves_char_count(input in ".*") {
            let result = sanitize_path_component(&input);
            prop_assert_eq!(result.chars().count(), input.chars().count());
        }

        /// Property: sanitizing is idempotent
        #[test]
        fn sanitize_is_idempotent(input in ".*") {
            let once = sanitize_path_component(&input);
            let twice = sanitize_path_component(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: a canonical checkout dir is always exactly two levels below the root
        #[test]
        fn canonical_dir_is_two_levels_deep(origin in ".*", git_ref in "[a-zA-Z0-9/_-][a-zA-Z0-9/._-]{0,39}") {
            let root = Path::new("/cache");
            let dir = canonical_checkout_dir(root, &origin, &git_ref);
            let relative = dir.strip_prefix(root).unwrap();
            prop_assert_eq!(relative.components().count(), 2);
        }
    }
}
