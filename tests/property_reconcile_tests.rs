use std::collections::HashSet;

use indexmap::IndexSet;
use proptest::prelude::*;
use scatter_pack::core::partition;

proptest! {
    #[test]
    fn partition_is_disjoint_and_complete(
        previous in prop::collection::vec(0u16..200, 0..80),
        next in prop::collection::vec(0u16..200, 0..80)
    ) {
        let previous: IndexSet<u16> = previous.into_iter().collect();
        let next: IndexSet<u16> = next.into_iter().collect();
        let result = partition(&previous, &next);

        let entering: HashSet<u16> = result.entering.iter().copied().collect();
        let updating: HashSet<u16> = result.updating.iter().copied().collect();
        let exiting: HashSet<u16> = result.exiting.iter().copied().collect();

        prop_assert!(entering.is_disjoint(&updating));
        prop_assert!(entering.is_disjoint(&exiting));
        prop_assert!(updating.is_disjoint(&exiting));

        let next_keys: HashSet<u16> = next.iter().copied().collect();
        let previous_keys: HashSet<u16> = previous.iter().copied().collect();
        let entering_or_updating: HashSet<u16> = entering.union(&updating).copied().collect();
        let updating_or_exiting: HashSet<u16> = updating.union(&exiting).copied().collect();
        prop_assert_eq!(entering_or_updating, next_keys);
        prop_assert_eq!(updating_or_exiting, previous_keys);

        // Entering and updating keep the order of the new data.
        let ordered: Vec<u16> = next
            .iter()
            .copied()
            .filter(|key| !previous.contains(key))
            .collect();
        prop_assert_eq!(result.entering, ordered);
    }
}
