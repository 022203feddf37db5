use crate::model::{RestaurantId, RestaurantSummary};
use std::collections::{HashMap, HashSet};

/// Restaurant lookups for lists that only carry ids (my reviews, visits).
#[derive(Debug, Clone, Default)]
pub struct RestaurantCache {
    entries: HashMap<RestaurantId, RestaurantSummary>,
}

impl RestaurantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RestaurantId) -> Option<&RestaurantSummary> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, restaurant: RestaurantSummary) {
        self.entries.insert(restaurant.id, restaurant);
    }

    /// Ids not cached yet, deduplicated, in first-seen order.
    pub fn missing<I>(&self, ids: I) -> Vec<RestaurantId>
    where
        I: IntoIterator<Item = RestaurantId>,
    {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|id| !self.entries.contains_key(id) && seen.insert(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::restaurant;

    #[test]
    fn missing_skips_cached_and_duplicates() {
        let mut cache = RestaurantCache::new();
        cache.insert(restaurant(2));
        assert_eq!(cache.missing([3, 2, 3, 1]), vec![3, 1]);
        assert_eq!(cache.get(2).map(|r| r.id), Some(2));
    }
}
