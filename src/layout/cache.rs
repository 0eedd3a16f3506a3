use crate::foundation::env;
use crate::layout::fit::{FitOptions, FitScope, FitTransform};
use crate::scene::model::MechanismDefinition;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_FIT_CACHE_CAPACITY: usize = 256;

/// Identity of a computed fit.
///
/// The definition fingerprint covers every cue, so an edited definition under the same id
/// misses instead of reusing a stale transform.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FitKey {
    pub mechanism_id: String,
    pub definition: u64,
    pub options: u64,
    pub scope: FitScope,
    pub strict_step_cues: bool,
    /// Only set for [`FitScope::Step`].
    pub step: Option<u32>,
}

impl FitKey {
    pub fn new(
        def: &MechanismDefinition,
        opts: &FitOptions,
        scope: FitScope,
        strict_step_cues: bool,
        step: u32,
    ) -> Self {
        Self {
            mechanism_id: def.id.clone(),
            definition: def.fingerprint(),
            options: opts.fingerprint(),
            scope,
            strict_step_cues,
            step: (scope == FitScope::Step).then_some(step),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FitCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded FIFO memo of fit transforms, including "no fit" results.
#[derive(Debug)]
pub struct FitCache {
    capacity: usize,
    map: HashMap<FitKey, Option<FitTransform>>,
    order: VecDeque<FitKey>,
    stats: FitCacheStats,
}

impl Default for FitCache {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_CACHE_CAPACITY)
    }
}

impl FitCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.min(64)),
            order: VecDeque::new(),
            stats: FitCacheStats::default(),
        }
    }

    /// Capacity from `MECHVIZ_FIT_CACHE_CAPACITY`, falling back to the default.
    pub fn from_env() -> Self {
        Self::new(
            env::positive_usize(env::ENV_FIT_CACHE_CAPACITY).unwrap_or(DEFAULT_FIT_CACHE_CAPACITY),
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> FitCacheStats {
        self.stats
    }

    pub fn get_or_insert_with(
        &mut self,
        key: FitKey,
        compute: impl FnOnce() -> Option<FitTransform>,
    ) -> Option<FitTransform> {
        if let Some(hit) = self.map.get(&key) {
            self.stats.hits += 1;
            return *hit;
        }
        self.stats.misses += 1;
        let value = compute();

        while self.map.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
            self.stats.evictions += 1;
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        value
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
        self.stats = FitCacheStats::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cache.rs"]
mod tests;
