//! In-process store
//!
//! `MemoryStore` implements [`Store`] over a single `DashMap` keyed by the
//! full store key. Each key holds exactly one structure (field map, set or
//! ranked set); using a key as the wrong structure is a `WrongType` error,
//! as it would be against Redis.
//!
//! # Design
//!
//! - DashMap: sharded locking, every single-key call is atomic
//! - Empty collections are removed, so `exists` means "has members"
//! - Composite writes (`ranked_*_into`) read their sources first, then
//!   replace the destination; they are not atomic across keys

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use typeahead_core::{Error, Result, Store};

use crate::ranked::RankedSet;

/// Structure stored under one key
#[derive(Debug, Clone)]
enum Entry {
    Map(FxHashMap<String, String>),
    Set(FxHashSet<String>),
    Ranked(RankedSet),
}

impl Entry {
    fn is_empty(&self) -> bool {
        match self {
            Entry::Map(m) => m.is_empty(),
            Entry::Set(s) => s.is_empty(),
            Entry::Ranked(r) => r.is_empty(),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str) -> Error {
    Error::WrongType {
        key: key.to_string(),
        expected,
    }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: DashMap<String, Entry>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a structure
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Remove every key
    pub fn clear(&self) {
        self.keys.clear();
    }

    /// Snapshot the ranked set at `key`; missing keys read as empty
    fn ranked_snapshot(&self, key: &str) -> Result<RankedSet> {
        match self.keys.get(key) {
            None => Ok(RankedSet::new()),
            Some(entry) => match entry.value() {
                Entry::Ranked(r) => Ok(r.clone()),
                _ => Err(wrong_type(key, "ranked set")),
            },
        }
    }

    /// Replace `dest` with `set`, or drop it if `set` is empty
    fn store_ranked(&self, dest: &str, set: RankedSet) -> usize {
        let len = set.len();
        if set.is_empty() {
            self.keys.remove(dest);
        } else {
            self.keys.insert(dest.to_string(), Entry::Ranked(set));
        }
        len
    }

    fn with_ranked<T>(&self, key: &str, f: impl FnOnce(&RankedSet) -> T) -> Result<Option<T>> {
        match self.keys.get(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Entry::Ranked(r) => Ok(Some(f(r))),
                _ => Err(wrong_type(key, "ranked set")),
            },
        }
    }

    fn with_ranked_mut<T>(&self, key: &str, f: impl FnOnce(&mut RankedSet) -> T) -> Result<T> {
        let mut entry = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Entry::Ranked(RankedSet::new()));
        match entry.value_mut() {
            Entry::Ranked(r) => Ok(f(r)),
            _ => Err(wrong_type(key, "ranked set")),
        }
    }
}

impl Store for MemoryStore {
    fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut entry = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Entry::Map(FxHashMap::default()));
        match entry.value_mut() {
            Entry::Map(m) => {
                m.insert(field.to_string(), value.to_string());
                Ok(())
            }
            _ => Err(wrong_type(key, "field map")),
        }
    }

    fn map_get_many(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        match self.keys.get(key) {
            None => Ok(vec![None; fields.len()]),
            Some(entry) => match entry.value() {
                Entry::Map(m) => Ok(fields.iter().map(|f| m.get(f).cloned()).collect()),
                _ => Err(wrong_type(key, "field map")),
            },
        }
    }

    fn map_remove(&self, key: &str, field: &str) -> Result<bool> {
        match self.keys.entry(key.to_string()) {
            MapEntry::Vacant(_) => Ok(false),
            MapEntry::Occupied(mut occ) => {
                let removed = match occ.get_mut() {
                    Entry::Map(m) => m.remove(field).is_some(),
                    _ => return Err(wrong_type(key, "field map")),
                };
                if occ.get().is_empty() {
                    occ.remove();
                }
                Ok(removed)
            }
        }
    }

    fn map_len(&self, key: &str) -> Result<usize> {
        match self.keys.get(key) {
            None => Ok(0),
            Some(entry) => match entry.value() {
                Entry::Map(m) => Ok(m.len()),
                _ => Err(wrong_type(key, "field map")),
            },
        }
    }

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let mut entry = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(FxHashSet::default()));
        match entry.value_mut() {
            Entry::Set(s) => Ok(s.insert(member.to_string())),
            _ => Err(wrong_type(key, "set")),
        }
    }

    fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        match self.keys.entry(key.to_string()) {
            MapEntry::Vacant(_) => Ok(false),
            MapEntry::Occupied(mut occ) => {
                let removed = match occ.get_mut() {
                    Entry::Set(s) => s.remove(member),
                    _ => return Err(wrong_type(key, "set")),
                };
                if occ.get().is_empty() {
                    occ.remove();
                }
                Ok(removed)
            }
        }
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        match self.keys.get(key) {
            None => Ok(Vec::new()),
            Some(entry) => match entry.value() {
                Entry::Set(s) => Ok(s.iter().cloned().collect()),
                _ => Err(wrong_type(key, "set")),
            },
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.keys.contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.keys.remove(key).is_some())
    }

    fn ranked_upsert(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.with_ranked_mut(key, |r| {
            r.upsert(member, score);
        })
    }

    fn ranked_remove(&self, key: &str, member: &str) -> Result<bool> {
        match self.keys.entry(key.to_string()) {
            MapEntry::Vacant(_) => Ok(false),
            MapEntry::Occupied(mut occ) => {
                let removed = match occ.get_mut() {
                    Entry::Ranked(r) => r.remove(member),
                    _ => return Err(wrong_type(key, "ranked set")),
                };
                if occ.get().is_empty() {
                    occ.remove();
                }
                Ok(removed)
            }
        }
    }

    fn ranked_cardinality(&self, key: &str) -> Result<usize> {
        Ok(self.with_ranked(key, |r| r.len())?.unwrap_or(0))
    }

    fn ranked_range_desc(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .with_ranked(key, |r| {
                r.range_desc(offset, limit)
                    .map(|(m, _)| m.to_string())
                    .collect()
            })?
            .unwrap_or_default())
    }

    fn ranked_range_desc_with_scores(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(String, f64)>> {
        Ok(self
            .with_ranked(key, |r| {
                r.range_desc(offset, limit)
                    .map(|(m, s)| (m.to_string(), s))
                    .collect()
            })?
            .unwrap_or_default())
    }

    fn ranked_score(&self, key: &str, member: &str) -> Result<Option<f64>> {
        Ok(self.with_ranked(key, |r| r.score(member))?.flatten())
    }

    fn ranked_increment(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        self.with_ranked_mut(key, |r| r.increment(member, delta))
    }

    fn ranked_intersect_into(&self, dest: &str, sources: &[String]) -> Result<usize> {
        let sets = sources
            .iter()
            .map(|s| self.ranked_snapshot(s))
            .collect::<Result<Vec<_>>>()?;
        let len = self.store_ranked(dest, RankedSet::intersection(&sets));
        debug!(target: "typeahead::store", dest, sources = sources.len(), len, "Intersection stored");
        Ok(len)
    }

    fn ranked_union_into(&self, dest: &str, sources: &[String]) -> Result<usize> {
        let sets = sources
            .iter()
            .map(|s| self.ranked_snapshot(s))
            .collect::<Result<Vec<_>>>()?;
        let len = self.store_ranked(dest, RankedSet::union(&sets));
        debug!(target: "typeahead::store", dest, sources = sources.len(), len, "Union stored");
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_put_and_get_many_preserves_positions() {
        let store = MemoryStore::new();
        store.map_put("db:s", "a", "1").unwrap();
        store.map_put("db:s", "c", "3").unwrap();

        let got = store.map_get_many("db:s", &strings(&["a", "b", "c"])).unwrap();
        assert_eq!(got, vec![Some("1".into()), None, Some("3".into())]);
    }

    #[test]
    fn test_map_get_many_missing_map() {
        let store = MemoryStore::new();
        let got = store.map_get_many("db:none", &strings(&["a", "b"])).unwrap();
        assert_eq!(got, vec![None, None]);
    }

    #[test]
    fn test_map_remove_last_field_deletes_key() {
        let store = MemoryStore::new();
        store.map_put("db:s", "a", "1").unwrap();
        assert!(store.map_remove("db:s", "a").unwrap());
        assert!(!store.map_remove("db:s", "a").unwrap());
        assert!(!store.exists("db:s").unwrap());
        assert_eq!(store.map_len("db:s").unwrap(), 0);
    }

    #[test]
    fn test_set_roundtrip_and_cleanup() {
        let store = MemoryStore::new();
        assert!(store.set_add("index:s", "ap").unwrap());
        assert!(!store.set_add("index:s", "ap").unwrap());
        assert_eq!(store.set_members("index:s").unwrap(), vec!["ap".to_string()]);
        assert!(store.set_remove("index:s", "ap").unwrap());
        assert!(!store.exists("index:s").unwrap());
    }

    #[test]
    fn test_ranked_remove_last_member_deletes_key() {
        let store = MemoryStore::new();
        store.ranked_upsert("index:s:a", "id1", 1.0).unwrap();
        assert_eq!(store.ranked_cardinality("index:s:a").unwrap(), 1);
        assert!(store.ranked_remove("index:s:a", "id1").unwrap());
        assert!(!store.exists("index:s:a").unwrap());
        assert_eq!(store.ranked_cardinality("index:s:a").unwrap(), 0);
    }

    #[test]
    fn test_ranked_range_desc() {
        let store = MemoryStore::new();
        store.ranked_upsert("k", "low", 1.0).unwrap();
        store.ranked_upsert("k", "high", 9.0).unwrap();
        store.ranked_upsert("k", "mid", 5.0).unwrap();

        assert_eq!(
            store.ranked_range_desc("k", 0, 2).unwrap(),
            strings(&["high", "mid"])
        );
        assert_eq!(
            store.ranked_range_desc_with_scores("k", 2, 5).unwrap(),
            vec![("low".to_string(), 1.0)]
        );
        assert!(store.ranked_range_desc("missing", 0, 5).unwrap().is_empty());
    }

    #[test]
    fn test_ranked_increment() {
        let store = MemoryStore::new();
        assert_eq!(store.ranked_increment("hot:s", "cat", 1.0).unwrap(), 1.0);
        assert_eq!(store.ranked_increment("hot:s", "cat", 1.0).unwrap(), 2.0);
        assert_eq!(store.ranked_score("hot:s", "cat").unwrap(), Some(2.0));
        assert_eq!(store.ranked_score("hot:s", "dog").unwrap(), None);
    }

    #[test]
    fn test_intersect_into() {
        let store = MemoryStore::new();
        store.ranked_upsert("a", "x", 1.0).unwrap();
        store.ranked_upsert("a", "y", 2.0).unwrap();
        store.ranked_upsert("b", "y", 3.0).unwrap();

        let len = store
            .ranked_intersect_into("dest", &strings(&["a", "b"]))
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.ranked_score("dest", "y").unwrap(), Some(5.0));
    }

    #[test]
    fn test_intersect_with_missing_source_leaves_no_dest() {
        let store = MemoryStore::new();
        store.ranked_upsert("a", "x", 1.0).unwrap();
        store.ranked_upsert("dest", "stale", 1.0).unwrap();

        let len = store
            .ranked_intersect_into("dest", &strings(&["a", "missing"]))
            .unwrap();
        assert_eq!(len, 0);
        assert!(!store.exists("dest").unwrap());
    }

    #[test]
    fn test_union_into_replaces_dest() {
        let store = MemoryStore::new();
        store.ranked_upsert("a", "x", 1.0).unwrap();
        store.ranked_upsert("b", "x", 2.0).unwrap();
        store.ranked_upsert("b", "z", 1.0).unwrap();
        store.ranked_upsert("dest", "stale", 100.0).unwrap();

        let len = store.ranked_union_into("dest", &strings(&["a", "b"])).unwrap();
        assert_eq!(len, 2);
        assert_eq!(store.ranked_score("dest", "x").unwrap(), Some(3.0));
        assert_eq!(store.ranked_score("dest", "stale").unwrap(), None);
    }

    #[test]
    fn test_wrong_type_errors() {
        let store = MemoryStore::new();
        store.map_put("db:s", "a", "1").unwrap();

        assert!(matches!(
            store.ranked_upsert("db:s", "m", 1.0),
            Err(Error::WrongType { .. })
        ));
        assert!(matches!(
            store.set_add("db:s", "m"),
            Err(Error::WrongType { .. })
        ));
        assert!(matches!(
            store.ranked_range_desc("db:s", 0, 1),
            Err(Error::WrongType { .. })
        ));
        // The failed writes must not have clobbered the map
        assert_eq!(store.map_len("db:s").unwrap(), 1);
    }

    #[test]
    fn test_delete_and_keys() {
        let store = MemoryStore::new();
        store.set_add("b", "1").unwrap();
        store.map_put("a", "f", "v").unwrap();
        assert_eq!(store.keys(), strings(&["a", "b"]));
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.key_count(), 1);
        store.clear();
        assert_eq!(store.key_count(), 0);
    }

    #[test]
    fn test_concurrent_upserts_same_key() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        store
                            .ranked_upsert("k", &format!("t{}-{}", t, i), i as f64)
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.ranked_cardinality("k").unwrap(), 800);
    }
}
