//! Pure predicate evaluation over raw measurement tuples.
//!
//! Three independently optional predicates combined with logical AND; an
//! unset predicate is vacuously true. Filters only admit or reject — they
//! never mutate or enrich a tuple, and rejected tuples never allocate a
//! record downstream.

use std::collections::HashSet;

/// Filter configuration for the extraction pipeline.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Exact match against the block's `measInfoId`.
    pub meas_info_id: Option<String>,
    /// Exact match against a value's `p` attribute. A tuple without a `p`
    /// attribute never matches a configured value.
    pub p_value: Option<u32>,
    /// Set membership over the instance's `measObjLdn`. Empty set = unset.
    pub obj_ldns: HashSet<String>,
}

impl RecordFilter {
    /// A filter that admits every tuple.
    pub fn admit_all() -> Self {
        Self::default()
    }

    /// True when no predicate is configured.
    pub fn is_empty(&self) -> bool {
        self.meas_info_id.is_none() && self.p_value.is_none() && self.obj_ldns.is_empty()
    }

    /// Decide whether a raw tuple survives filtering.
    pub fn matches(&self, meas_info_id: &str, obj_ldn: &str, p_value: Option<u32>) -> bool {
        if let Some(ref want) = self.meas_info_id {
            if want != meas_info_id {
                return false;
            }
        }
        if let Some(want) = self.p_value {
            match p_value {
                Some(p) if p == want => {}
                _ => return false,
            }
        }
        if !self.obj_ldns.is_empty() && !self.obj_ldns.contains(obj_ldn) {
            return false;
        }
        true
    }

    /// Cheap block-level pre-check: a block whose `measInfoId` fails the
    /// filter cannot produce any surviving tuple.
    pub fn admits_block(&self, meas_info_id: &str) -> bool {
        match self.meas_info_id {
            Some(ref want) => want == meas_info_id,
            None => true,
        }
    }

    /// Instance-level pre-check, same idea as [`admits_block`](Self::admits_block).
    pub fn admits_instance(&self, obj_ldn: &str) -> bool {
        self.obj_ldns.is_empty() || self.obj_ldns.contains(obj_ldn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filter(
        meas_info_id: Option<&str>,
        p_value: Option<u32>,
        obj_ldns: &[&str],
    ) -> RecordFilter {
        RecordFilter {
            meas_info_id: meas_info_id.map(str::to_string),
            p_value,
            obj_ldns: obj_ldns.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let f = RecordFilter::admit_all();
        assert!(f.is_empty());
        assert!(f.matches("UtranCell", "cell1", Some(1)));
        assert!(f.matches("", "", None));
    }

    #[test]
    fn test_meas_info_id_exact_match() {
        let f = filter(Some("UtranCell"), None, &[]);
        assert!(f.matches("UtranCell", "cell1", None));
        assert!(!f.matches("UtranCellFDD", "cell1", None));
        assert!(f.admits_block("UtranCell"));
        assert!(!f.admits_block("GsmCell"));
    }

    #[test]
    fn test_p_value_never_matches_missing_p() {
        let f = filter(None, Some(1), &[]);
        assert!(f.matches("x", "y", Some(1)));
        assert!(!f.matches("x", "y", Some(2)));
        assert!(!f.matches("x", "y", None));
    }

    #[test]
    fn test_obj_ldn_set_membership() {
        let f = filter(None, None, &["cell1", "cell2"]);
        assert!(f.matches("x", "cell1", None));
        assert!(f.matches("x", "cell2", None));
        assert!(!f.matches("x", "cell3", None));
        assert!(f.admits_instance("cell2"));
        assert!(!f.admits_instance("cell9"));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let f = filter(Some("UtranCell"), Some(2), &["cell1"]);
        assert!(f.matches("UtranCell", "cell1", Some(2)));
        assert!(!f.matches("UtranCell", "cell1", Some(1)));
        assert!(!f.matches("UtranCell", "cell2", Some(2)));
        assert!(!f.matches("GsmCell", "cell1", Some(2)));
    }

    proptest! {
        /// Filtering is idempotent and order-independent: the decision is a
        /// pure function of (filter, tuple), so evaluating twice equals once.
        #[test]
        fn prop_filter_is_pure(
            meas_info_id in "[a-zA-Z0-9]{0,12}",
            obj_ldn in "[a-zA-Z0-9=,]{0,16}",
            p in proptest::option::of(0u32..64),
            want_info in proptest::option::of("[a-zA-Z0-9]{0,12}"),
            want_p in proptest::option::of(0u32..64),
            ldns in proptest::collection::hash_set("[a-zA-Z0-9=,]{0,16}", 0..4),
        ) {
            let f = RecordFilter { meas_info_id: want_info, p_value: want_p, obj_ldns: ldns };
            let first = f.matches(&meas_info_id, &obj_ldn, p);
            let second = f.matches(&meas_info_id, &obj_ldn, p);
            prop_assert_eq!(first, second);
        }

        /// A configured p filter never admits a tuple lacking a p attribute.
        #[test]
        fn prop_p_filter_rejects_missing_p(
            meas_info_id in "[a-zA-Z0-9]{0,12}",
            obj_ldn in "[a-zA-Z0-9=,]{0,16}",
            want_p in 0u32..1024,
        ) {
            let f = RecordFilter { p_value: Some(want_p), ..Default::default() };
            prop_assert!(!f.matches(&meas_info_id, &obj_ldn, None));
        }

        /// The block/instance pre-checks never disagree with the full
        /// predicate: anything the pre-check rejects, matches() rejects.
        #[test]
        fn prop_prechecks_are_sound(
            meas_info_id in "[a-zA-Z0-9]{0,12}",
            obj_ldn in "[a-zA-Z0-9=,]{0,16}",
            p in proptest::option::of(0u32..64),
            want_info in proptest::option::of("[a-zA-Z0-9]{0,12}"),
            ldns in proptest::collection::hash_set("[a-zA-Z0-9=,]{0,16}", 0..4),
        ) {
            let f = RecordFilter { meas_info_id: want_info, p_value: None, obj_ldns: ldns };
            if !f.admits_block(&meas_info_id) || !f.admits_instance(&obj_ldn) {
                prop_assert!(!f.matches(&meas_info_id, &obj_ldn, p));
            }
        }
    }
}
