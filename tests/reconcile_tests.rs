use approx::assert_relative_eq;
use indexmap::{IndexMap, IndexSet};
use scatter_pack::ChartError;
use scatter_pack::core::{
    DuplicateKeyPolicy, Easing, KeyedElements, Stage, Timing, TransitionPlan, index_by_key,
    partition,
};

/// Linear slide from zero over 100 ms, no delay.
struct SlidePlan;

impl TransitionPlan<String, f64> for SlidePlan {
    fn enter_state(&self, _key: &String, _target: &f64) -> f64 {
        0.0
    }

    fn timing(&self, _key: &String, _target: &f64) -> Timing {
        Timing::new(0.0, 100.0)
    }

    fn easing(&self) -> Easing {
        Easing::Linear
    }
}

/// Like `SlidePlan`, but entering elements get a second stage to 1000.
struct FollowUpPlan;

impl TransitionPlan<String, f64> for FollowUpPlan {
    fn enter_state(&self, _key: &String, _target: &f64) -> f64 {
        0.0
    }

    fn timing(&self, _key: &String, _target: &f64) -> Timing {
        Timing::new(0.0, 100.0)
    }

    fn easing(&self) -> Easing {
        Easing::Linear
    }

    fn follow_up(&self, _key: &String, _target: &f64, entering: bool) -> Option<Stage<f64>> {
        entering.then(|| Stage::new(1_000.0, Timing::new(0.0, 100.0), Easing::Linear))
    }
}

fn targets(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), *value))
        .collect()
}

#[test]
fn partition_splits_keys_into_enter_update_exit() {
    let previous: IndexSet<&str> = ["a", "b"].into_iter().collect();
    let next: IndexSet<&str> = ["b", "c"].into_iter().collect();
    let result = partition(&previous, &next);

    assert_eq!(result.entering, vec!["c"]);
    assert_eq!(result.updating, vec!["b"]);
    assert_eq!(result.exiting, vec!["a"]);
    assert!(!result.is_stable());
}

#[test]
fn reconcile_removes_exiting_and_appends_entering() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    elements.reconcile(targets(&[("a", 10.0), ("b", 20.0)]), 0.0, &SlidePlan);
    let result = elements.reconcile(targets(&[("b", 40.0), ("c", 30.0)]), 1_000.0, &SlidePlan);

    assert_eq!(result.entering, vec!["c".to_owned()]);
    assert_eq!(result.updating, vec!["b".to_owned()]);
    assert_eq!(result.exiting, vec!["a".to_owned()]);

    let keys: Vec<&String> = elements.keys().collect();
    assert_eq!(keys, vec!["b", "c"]);
    assert!(!elements.contains(&"a".to_owned()));
    assert_eq!(elements.target(&"b".to_owned()), Some(&40.0));
}

#[test]
fn entering_elements_start_from_enter_state() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    elements.reconcile(targets(&[("a", 10.0)]), 500.0, &SlidePlan);

    let sampled: Vec<f64> = elements.sample(500.0).map(|(_, value)| value).collect();
    assert_eq!(sampled, vec![0.0]);
    let sampled: Vec<f64> = elements.sample(550.0).map(|(_, value)| value).collect();
    assert_relative_eq!(sampled[0], 5.0, epsilon = 1e-9);
    assert_eq!(elements.settled_at(), Some(600.0));
}

#[test]
fn in_flight_transition_is_retargeted_from_its_sampled_value() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    let key = "a".to_owned();
    elements.reconcile(targets(&[("a", 100.0)]), 0.0, &SlidePlan);

    // Halfway through the entrance, retarget to 0.
    let result = elements.reconcile(targets(&[("a", 0.0)]), 50.0, &SlidePlan);
    assert_eq!(result.updating, vec![key.clone()]);

    let transition = elements.transition(&key).expect("transition");
    assert_eq!(transition.start_ms(), 50.0);
    assert_relative_eq!(transition.sample(50.0), 50.0, epsilon = 1e-9);
    assert_relative_eq!(transition.sample(100.0), 25.0, epsilon = 1e-9);
    assert_eq!(transition.sample(150.0), 0.0);
}

#[test]
fn identical_second_pass_is_stable() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    let data = targets(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
    elements.reconcile(data.clone(), 0.0, &SlidePlan);
    let result = elements.reconcile(data, 1_000.0, &SlidePlan);

    assert!(result.is_stable());
    assert_eq!(result.updating.len(), 3);
    let sampled: Vec<f64> = elements.sample(1_000.0).map(|(_, value)| value).collect();
    assert_eq!(sampled, vec![1.0, 2.0, 3.0]);
}

#[test]
fn follow_up_stage_runs_only_for_entering_elements() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    elements.reconcile(targets(&[("a", 10.0)]), 0.0, &FollowUpPlan);
    let key = "a".to_owned();

    let transition = elements.transition(&key).expect("transition");
    assert_eq!(transition.stages().len(), 2);
    assert_eq!(transition.sample(100.0), 10.0);
    assert_relative_eq!(transition.sample(150.0), 505.0, epsilon = 1e-9);
    assert_eq!(elements.target(&key), Some(&1_000.0));

    elements.reconcile(targets(&[("a", 20.0)]), 500.0, &FollowUpPlan);
    let transition = elements.transition(&key).expect("transition");
    assert_eq!(transition.stages().len(), 1);
    assert_eq!(elements.target(&key), Some(&20.0));
}

#[test]
fn index_by_key_applies_duplicate_policy() {
    let items = vec![("a", 1), ("b", 2), ("a", 3)];

    let err = index_by_key(items.clone(), DuplicateKeyPolicy::Reject, "marker")
        .expect_err("duplicate must fail");
    assert!(matches!(
        err,
        ChartError::DuplicateKey { layer: "marker", ref key } if key == "a"
    ));

    let indexed = index_by_key(items, DuplicateKeyPolicy::LastWins, "marker").expect("last wins");
    let pairs: Vec<(&str, i32)> = indexed.into_iter().collect();
    assert_eq!(pairs, vec![("a", 3), ("b", 2)]);
}

#[test]
fn clear_drops_every_element() {
    let mut elements: KeyedElements<String, f64> = KeyedElements::new();
    elements.reconcile(targets(&[("a", 1.0)]), 0.0, &SlidePlan);
    elements.clear();

    assert!(elements.is_empty());
    assert_eq!(elements.settled_at(), None);
}
