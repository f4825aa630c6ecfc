//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;
use wapsrv_core::iri::is_valid_slug;
use wapsrv_core::SequenceBackend;

/// Proptest configuration for engine-level properties, which are slow
/// compared to pure strategies.
pub fn engine_proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        ..ProptestConfig::default()
    }
}

/// Strategy for generating legal container slugs.
pub fn slug_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,15}")
        .expect("Invalid regex")
        .prop_filter("Slug must be a legal path segment", |s| is_valid_slug(s))
}

/// Strategy for generating slugs that must be rejected.
pub fn invalid_slug_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{0,4}[ /?#.][a-z]{0,4}").expect("Invalid regex")
}

/// Strategy for generating container labels.
pub fn label_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,31}").expect("Invalid regex")
}

/// Strategy for generating annotation target IRIs.
pub fn target_strategy() -> impl Strategy<Value = String> {
    (1u32..1000).prop_map(|n| format!("http://example.org/doc/{n}"))
}

/// Strategy for generating page sizes.
pub fn page_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=12
}

/// Strategy picking a sequence backend.
pub fn backend_strategy() -> impl Strategy<Value = SequenceBackend> {
    prop_oneof![Just(SequenceBackend::Graph), Just(SequenceBackend::Indexed)]
}

/// A sequence operation for model-based testing.
#[derive(Debug, Clone)]
pub enum SequenceOp {
    /// Post a new annotation.
    Append,
    /// Delete the live annotation at this index (modulo the live count).
    Remove(usize),
}

/// Strategy for generating a script of sequence operations.
pub fn sequence_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<SequenceOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(SequenceOp::Append),
            1 => any::<usize>().prop_map(SequenceOp::Remove),
        ],
        0..max_ops,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_slug_strategy() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let slug = slug_strategy().new_tree(&mut runner).unwrap().current();
            assert!(is_valid_slug(&slug));
        }
    }

    #[test]
    fn test_invalid_slug_strategy() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let slug = invalid_slug_strategy().new_tree(&mut runner).unwrap().current();
            assert!(!is_valid_slug(&slug));
        }
    }

    #[test]
    fn test_target_strategy() {
        let mut runner = TestRunner::default();
        let target = target_strategy().new_tree(&mut runner).unwrap().current();
        assert!(target.starts_with("http://example.org/doc/"));
    }

    #[test]
    fn test_sequence_ops_strategy() {
        let mut runner = TestRunner::default();
        let ops = sequence_ops_strategy(20).new_tree(&mut runner).unwrap().current();
        assert!(ops.len() < 20);
    }
}
