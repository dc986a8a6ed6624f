//! Property-based tests for hashing and resolution invariants.
//!
//! Uses proptest to verify invariants across random inputs:
//! - The content digest is a pure function
//! - Recorded content round-trips through hash resolution
//! - The result cache never exceeds its configured bound
//! - The prefix solver recovers arbitrary truncations

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use linetrace::models::RecordOrigin;
use linetrace::{CodeHasher, EditOperation, LineRecord, LineRecordCache, PartialEditSolver};
use proptest::prelude::*;

proptest! {
    /// Property: identical inputs always yield identical digests.
    #[test]
    fn prop_hash_is_deterministic(input in ".*", seed in any::<u32>()) {
        prop_assert_eq!(
            CodeHasher::hash32(&input, seed),
            CodeHasher::hash32(&input, seed)
        );
    }

    /// Property: the rendered digest is always 8 lowercase hex characters.
    #[test]
    fn prop_code_hash_is_eight_hex(file in "[a-z/.]{1,30}", content in ".{0,80}") {
        let digest = CodeHasher::code_hash(&file, EditOperation::Added, &content);
        prop_assert_eq!(digest.len(), 8);
        prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    /// Property: a recorded line resolves back to its exact content and
    /// operation through the opaque hash alone.
    #[test]
    fn prop_record_round_trips(
        file in "[a-z]{1,8}\\.(ts|rs)",
        content in "[ -~]{1,60}",
        added in any::<bool>(),
    ) {
        let operation = if added { EditOperation::Added } else { EditOperation::Removed };
        let mut cache = LineRecordCache::new(1000, 200, None);
        cache.record(LineRecord::new(
            &file, 0, &content, operation, 10, RecordOrigin::FullLine,
        ));

        let hash = CodeHasher::code_hash(&file, operation, &content);
        let result = cache.find_match(&hash, &file).unwrap();
        prop_assert_eq!(result.content, content);
        prop_assert_eq!(result.operation, operation);
    }

    /// Property: the result cache never exceeds its configured bound.
    #[test]
    fn prop_result_cache_stays_bounded(
        cap in 2usize..32,
        contents in proptest::collection::vec("[a-z0-9 ]{1,20}", 1..80),
    ) {
        let mut cache = LineRecordCache::new(1000, cap, None);
        for (i, content) in contents.iter().enumerate() {
            cache.record(LineRecord::new(
                "a.ts",
                u32::try_from(i).unwrap(),
                content,
                EditOperation::Added,
                10,
                RecordOrigin::FullLine,
            ));
            let hash = CodeHasher::code_hash("a.ts", EditOperation::Added, content);
            cache.find_match(&hash, "a.ts");
            prop_assert!(cache.stats().cached_results <= cap);
        }
    }

    /// Property: the prefix solver recovers any truncation of a line that
    /// falls inside its scan limit.
    #[test]
    fn prop_prefix_solver_recovers_truncations(
        content in "[a-z][a-z ]{4,59}",
        cut in 0usize..60,
    ) {
        let units: Vec<u16> = content.encode_utf16().collect();
        let cut = cut.min(units.len());
        let truncated = String::from_utf16_lossy(&units[..cut]);

        let target = CodeHasher::code_hash("a.ts", EditOperation::Removed, &truncated);
        let solver = PartialEditSolver::new(100);
        let result = solver.solve(&target, "a.ts", &content).unwrap();
        prop_assert_eq!(result.content, truncated);
    }

    /// Property: consuming every record leaves nothing double-consumed.
    #[test]
    fn prop_at_most_once_consumption(copies in 1usize..6) {
        let mut cache = LineRecordCache::new(1000, 200, None);
        for i in 0..copies {
            cache.record(LineRecord::new(
                "a.ts",
                u32::try_from(i).unwrap(),
                "same line",
                EditOperation::Added,
                10,
                RecordOrigin::FullLine,
            ));
        }

        let hash = CodeHasher::code_hash("a.ts", EditOperation::Added, "same line");
        for expected_used in 1..=copies {
            prop_assert!(cache.find_match(&hash, "a.ts").is_some());
            prop_assert_eq!(cache.stats().used_records, expected_used);
        }
        // Every copy consumed exactly once; the pool is exhausted.
        prop_assert!(cache.find_match(&hash, "a.ts").is_none());
    }
}
