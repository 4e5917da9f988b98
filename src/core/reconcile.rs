use std::fmt::Display;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::transition::{Easing, Interpolate, Stage, Timing, Transition};
use crate::error::{ChartError, ChartResult};

/// What to do when two items in one reconciliation pass share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Fail the pass with [`ChartError::DuplicateKey`].
    #[default]
    Reject,
    /// Keep the last item, at the position of the first occurrence.
    LastWins,
}

/// Disjoint key sets produced by one reconciliation pass.
///
/// `entering` and `updating` follow the order of the new data; `exiting`
/// follows the order of the previous element set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation<K> {
    pub entering: Vec<K>,
    pub updating: Vec<K>,
    pub exiting: Vec<K>,
}

impl<K> Default for Reconciliation<K> {
    fn default() -> Self {
        Self {
            entering: Vec::new(),
            updating: Vec::new(),
            exiting: Vec::new(),
        }
    }
}

impl<K> Reconciliation<K> {
    /// True when no element was created or destroyed.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }
}

/// Partitions keys into entering (`next - previous`), updating
/// (`next ∩ previous`) and exiting (`previous - next`).
#[must_use]
pub fn partition<K>(previous: &IndexSet<K>, next: &IndexSet<K>) -> Reconciliation<K>
where
    K: Eq + Hash + Clone,
{
    let mut reconciliation = Reconciliation::default();
    for key in next {
        if previous.contains(key) {
            reconciliation.updating.push(key.clone());
        } else {
            reconciliation.entering.push(key.clone());
        }
    }
    reconciliation.exiting = previous
        .iter()
        .filter(|key| !next.contains(*key))
        .cloned()
        .collect();
    reconciliation
}

/// Indexes items by key, applying `policy` to duplicates.
pub fn index_by_key<K, T, I>(
    items: I,
    policy: DuplicateKeyPolicy,
    layer: &'static str,
) -> ChartResult<IndexMap<K, T>>
where
    K: Eq + Hash + Display,
    I: IntoIterator<Item = (K, T)>,
{
    let items = items.into_iter();
    let mut indexed = IndexMap::with_capacity(items.size_hint().0);
    for (key, item) in items {
        match policy {
            DuplicateKeyPolicy::Reject => {
                if indexed.contains_key(&key) {
                    return Err(ChartError::DuplicateKey {
                        layer,
                        key: key.to_string(),
                    });
                }
                indexed.insert(key, item);
            }
            DuplicateKeyPolicy::LastWins => {
                indexed.insert(key, item);
            }
        }
    }
    Ok(indexed)
}

/// Per-layer animation choreography used by [`KeyedElements::reconcile`].
pub trait TransitionPlan<K, A: Clone> {
    /// Visual state an entering element is created with.
    fn enter_state(&self, key: &K, target: &A) -> A;

    /// Delay and duration of the merged enter/update transition.
    fn timing(&self, key: &K, target: &A) -> Timing;

    fn easing(&self) -> Easing {
        Easing::default()
    }

    /// Target of the merged transition when a follow-up stage finishes the
    /// job. Defaults to the final target.
    fn primary_target(&self, _key: &K, target: &A, _entering: bool) -> A {
        target.clone()
    }

    /// Optional stage chained after the merged transition completes.
    fn follow_up(&self, _key: &K, _target: &A, _entering: bool) -> Option<Stage<A>> {
        None
    }
}

/// Keyed set of rendered elements, each driven by its own transition.
///
/// Draw order mirrors a retained scene graph: persisting elements keep their
/// slot and entering elements are appended.
#[derive(Debug, Clone)]
pub struct KeyedElements<K, A> {
    elements: IndexMap<K, Transition<A>>,
}

impl<K, A> Default for KeyedElements<K, A> {
    fn default() -> Self {
        Self {
            elements: IndexMap::new(),
        }
    }
}

impl<K, A> KeyedElements<K, A>
where
    K: Eq + Hash + Clone,
    A: Interpolate,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.elements.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.elements.keys()
    }

    #[must_use]
    pub fn key_set(&self) -> IndexSet<K> {
        self.elements.keys().cloned().collect()
    }

    #[must_use]
    pub fn transition(&self, key: &K) -> Option<&Transition<A>> {
        self.elements.get(key)
    }

    /// Final attributes of `key` once its transition completes.
    #[must_use]
    pub fn target(&self, key: &K) -> Option<&A> {
        self.elements.get(key).map(Transition::target)
    }

    /// Sampled attributes of every element at `now_ms`, in draw order.
    pub fn sample(&self, now_ms: f64) -> impl Iterator<Item = (&K, A)> {
        self.elements
            .iter()
            .map(move |(key, transition)| (key, transition.sample(now_ms)))
    }

    /// Time at which every element reaches its target.
    #[must_use]
    pub fn settled_at(&self) -> Option<f64> {
        self.elements
            .values()
            .map(Transition::end_ms)
            .fold(None, |latest, end| Some(latest.map_or(end, |l: f64| l.max(end))))
    }

    /// Applies one keyed data join.
    ///
    /// Exiting elements are removed immediately. Entering elements start at
    /// `plan.enter_state`; updating elements start from their currently
    /// sampled state, so an in-flight transition is retargeted rather than
    /// restarted. Both then animate to their targets in one merged
    /// transition.
    pub fn reconcile<P>(
        &mut self,
        targets: IndexMap<K, A>,
        now_ms: f64,
        plan: &P,
    ) -> Reconciliation<K>
    where
        P: TransitionPlan<K, A>,
    {
        let next_keys: IndexSet<K> = targets.keys().cloned().collect();
        let reconciliation = partition(&self.key_set(), &next_keys);

        for key in &reconciliation.exiting {
            self.elements.shift_remove(key);
        }

        for (key, target) in targets {
            let entering = !self.elements.contains_key(&key);
            let from = match self.elements.get(&key) {
                Some(existing) => existing.sample(now_ms),
                None => plan.enter_state(&key, &target),
            };
            let timing = plan.timing(&key, &target);
            let primary = plan.primary_target(&key, &target, entering);
            let follow_up = plan.follow_up(&key, &target, entering);
            let mut transition =
                Transition::new(from, now_ms, Stage::new(primary, timing, plan.easing()));
            if let Some(stage) = follow_up {
                transition = transition.then(stage);
            }
            self.elements.insert(key, transition);
        }

        trace!(
            entering = reconciliation.entering.len(),
            updating = reconciliation.updating.len(),
            exiting = reconciliation.exiting.len(),
            "reconciled keyed elements"
        );
        reconciliation
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
