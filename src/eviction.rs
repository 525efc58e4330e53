// src/eviction.rs
//
// Victim selection for bounded caches. Trimming asks a selector for "any N keys";
// no recency, frequency or value ordering is implied.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::hash::Hash;

/// Picks which keys a trim removes.
///
/// Implementations receive every key currently in the cache and should return
/// `n` distinct keys from it. Callers must not rely on which keys are chosen
/// unless they installed a deterministic selector themselves.
pub trait EvictionSelector<K> {
    fn select_eviction_candidates(&mut self, keys: &[K], n: usize) -> Vec<K>;
}

/// Takes the first `n` keys in whatever order the backing map yields them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrarySelector;

impl<K: Clone> EvictionSelector<K> for ArbitrarySelector {
    fn select_eviction_candidates(&mut self, keys: &[K], n: usize) -> Vec<K> {
        keys.iter().take(n).cloned().collect()
    }
}

/// Uniform random sample driven by a seedable RNG.
///
/// Keys are sorted before sampling so that the same seed and the same key set
/// always produce the same victims, regardless of hash map iteration order.
#[derive(Debug, Clone)]
pub struct SeededSelector {
    rng: StdRng,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<K: Ord + Clone> EvictionSelector<K> for SeededSelector {
    fn select_eviction_candidates(&mut self, keys: &[K], n: usize) -> Vec<K> {
        let mut sorted: Vec<&K> = keys.iter().collect();
        sorted.sort_unstable();
        sorted.shuffle(&mut self.rng);
        sorted.into_iter().take(n).cloned().collect()
    }
}

/// Asks `selector` for victims and returns exactly `min(n, keys.len())`
/// distinct members of `keys`.
///
/// Duplicates and keys outside `keys` are dropped; a short answer is topped
/// up from `keys` in order.
pub(crate) fn resolve_victims<K, S>(selector: &mut S, keys: &[K], n: usize) -> Vec<K>
where
    K: Eq + Hash + Clone,
    S: EvictionSelector<K> + ?Sized,
{
    let n = n.min(keys.len());
    let mut remaining: HashSet<&K> = keys.iter().collect();
    let mut victims = Vec::with_capacity(n);

    for key in selector.select_eviction_candidates(keys, n) {
        if victims.len() == n {
            break;
        }
        if remaining.remove(&key) {
            victims.push(key);
        }
    }
    for key in keys {
        if victims.len() == n {
            break;
        }
        if remaining.remove(key) {
            victims.push(key.clone());
        }
    }
    victims
}
