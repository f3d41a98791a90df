//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid build id
    pub fn build_id() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9_.-]{0,24}"
    }

    /// Generate a string that is not a valid build id
    pub fn invalid_build_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[-_.][A-Za-z0-9]{0,8}",
            "[a-z]{1,8}[ /:@][a-z]{1,8}",
        ]
    }

    /// Generate an architecture name accepted in input files
    pub fn arch_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("x86".to_string()),
            Just("x86_64".to_string()),
            Just("arm".to_string()),
            Just("arm64".to_string()),
            Just("aarch64".to_string()),
            Just("riscv".to_string()),
        ]
    }

    /// Generate a build system name accepted in input files
    pub fn build_system_name() -> impl Strategy<Value = String> {
        prop_oneof![Just("make".to_string()), Just("cmake".to_string())]
    }

    /// Generate a list of distinct build ids
    pub fn distinct_build_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(build_id(), 1..=max).prop_map(|ids| ids.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_build_id_generator(id in build_id()) {
            prop_assert!(!id.is_empty());
            prop_assert!(id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()));
        }

        #[test]
        fn test_distinct_build_ids_generator(ids in distinct_build_ids(8)) {
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
