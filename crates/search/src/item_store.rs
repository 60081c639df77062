//! Authoritative item payloads
//!
//! One field map per scope (`db:{scope}`), item id → JSON payload. Index
//! sets only hold ids; everything returned to callers is read from here.

use std::sync::Arc;
use typeahead_core::{Deadline, Item, KeySpace, Result, Store};

/// Item id → payload map
#[derive(Clone)]
pub struct ItemStore {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl ItemStore {
    /// Create an item store over `store` for the scope of `keys`
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        ItemStore { store, keys }
    }

    /// Write the payload of `item` under `id`, replacing any previous one
    pub fn put(&self, id: &str, item: &Item, deadline: &Deadline) -> Result<()> {
        let payload = item.to_json()?;
        deadline.check("map_put")?;
        self.store.map_put(self.keys.items(), id, &payload)
    }

    /// Read payloads for `ids`
    ///
    /// The result is positional: slot `i` holds the item for `ids[i]`, or
    /// `None` if no payload exists for it.
    pub fn get_many(&self, ids: &[String], deadline: &Deadline) -> Result<Vec<Option<Item>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        deadline.check("map_get_many")?;
        self.store
            .map_get_many(self.keys.items(), ids)?
            .into_iter()
            .map(|payload| payload.map(|p| Item::from_json(&p)).transpose())
            .collect()
    }

    /// Read one payload
    pub fn get(&self, id: &str, deadline: &Deadline) -> Result<Option<Item>> {
        Ok(self
            .get_many(&[id.to_string()], deadline)?
            .into_iter()
            .next()
            .flatten())
    }

    /// Whether a payload exists for `id`
    pub fn has(&self, id: &str, deadline: &Deadline) -> Result<bool> {
        deadline.check("map_get_many")?;
        let slot = self.store.map_get_many(self.keys.items(), &[id.to_string()])?;
        Ok(matches!(slot.first(), Some(Some(_))))
    }

    /// Drop the payload for `id`; returns whether one existed
    pub fn remove(&self, id: &str, deadline: &Deadline) -> Result<bool> {
        deadline.check("map_remove")?;
        self.store.map_remove(self.keys.items(), id)
    }

    /// Number of stored items
    pub fn len(&self, deadline: &Deadline) -> Result<usize> {
        deadline.check("map_len")?;
        self.store.map_len(self.keys.items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeahead_core::Error;
    use typeahead_storage::MemoryStore;

    fn items() -> (Arc<MemoryStore>, ItemStore) {
        let store = Arc::new(MemoryStore::new());
        let items = ItemStore::new(store.clone(), KeySpace::new("t"));
        (store, items)
    }

    #[test]
    fn test_put_get() {
        let (_, items) = items();
        let d = Deadline::none();
        let apple = Item::new("Apple").with_score(10.0);
        items.put("id1", &apple, &d).unwrap();

        assert_eq!(items.get("id1", &d).unwrap(), Some(apple));
        assert!(items.has("id1", &d).unwrap());
        assert!(!items.has("id2", &d).unwrap());
        assert_eq!(items.len(&d).unwrap(), 1);
    }

    #[test]
    fn test_get_many_is_positional() {
        let (_, items) = items();
        let d = Deadline::none();
        items.put("a", &Item::new("A"), &d).unwrap();
        items.put("c", &Item::new("C"), &d).unwrap();

        let got = items
            .get_many(&["a".into(), "b".into(), "c".into()], &d)
            .unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].as_ref().unwrap().term, "A");
        assert!(got[1].is_none());
        assert_eq!(got[2].as_ref().unwrap().term, "C");
    }

    #[test]
    fn test_put_overwrites() {
        let (_, items) = items();
        let d = Deadline::none();
        items.put("a", &Item::new("A").with_score(1.0), &d).unwrap();
        items.put("a", &Item::new("A").with_score(2.0), &d).unwrap();
        assert_eq!(items.get("a", &d).unwrap().unwrap().score, 2.0);
        assert_eq!(items.len(&d).unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let (store, items) = items();
        let d = Deadline::none();
        items.put("a", &Item::new("A"), &d).unwrap();
        assert!(items.remove("a", &d).unwrap());
        assert!(!items.remove("a", &d).unwrap());
        assert!(!store.exists("db:t").unwrap());
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        let (store, items) = items();
        store.map_put("db:t", "bad", "{\"score\": 1}").unwrap();
        let err = items.get("bad", &Deadline::none()).unwrap_err();
        assert!(matches!(err, Error::MalformedItem(_)));
    }

    #[test]
    fn test_expired_deadline_issues_no_call() {
        let (store, items) = items();
        let past = Deadline::at(std::time::Instant::now() - std::time::Duration::from_millis(1));
        let err = items.put("a", &Item::new("A"), &past).unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded { .. }));
        assert_eq!(store.key_count(), 0);
    }
}
