//! Optimized allocation and collection types for Tessel.
//!
//! This module provides:
//! - Re-exports of optimized hash collections using AHash
//! - SparseSet data structure for generational indices

pub mod sparse_set;

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_u64_keys() {
        let mut map = HashMap::new();
        map.insert(7u64, "seven");
        map.insert(9u64, "nine");
        assert_eq!(map.get(&7), Some(&"seven"));
        assert_eq!(map.remove(&9), Some("nine"));
        assert!(!map.contains_key(&9));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        assert!(set.insert(42));
        assert!(!set.insert(42));
        assert!(set.contains(&42));
    }
}
