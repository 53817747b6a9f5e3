//! Persistent saved-items list keyed by URL

use crate::item::SavedItem;
use researchflow_core::{ResultItem, Result};
use researchflow_storage::{keys, KeyValueStore, StoreError};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The URL was already present; nothing changed
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Changed,
}

/// Receiving end of registry notifications. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<RegistryEvent>,
}

impl Subscription {
    /// Drain pending notifications; `true` if any arrived
    pub fn changed(&mut self) -> bool {
        let mut seen = false;
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => seen = true,
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return seen,
            }
        }
    }

    /// Wait for the next notification. `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<RegistryEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => Some(RegistryEvent::Changed),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[derive(Clone)]
pub struct SavedItemsRegistry {
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<RegistryEvent>,
}

impl SavedItemsRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.events.subscribe(),
        }
    }

    /// Saved entries in the order they were added
    pub fn list(&self) -> Result<Vec<SavedItem>> {
        let raw = self.store.get(keys::SAVED_ITEMS)?;
        Ok(decode(raw.as_deref())?)
    }

    pub fn find(&self, url: &str) -> Result<Option<SavedItem>> {
        Ok(self.list()?.into_iter().find(|s| s.url() == url))
    }

    pub fn save(&self, item: ResultItem) -> Result<SaveOutcome> {
        let mut outcome = SaveOutcome::Duplicate;
        let mut failure = None;
        let mut candidate = Some(item);

        self.store.update(keys::SAVED_ITEMS, &mut |raw| {
            let mut items = match decode(raw.as_deref()) {
                Ok(items) => items,
                Err(err) => {
                    failure = Some(err);
                    return raw;
                }
            };
            let Some(item) = candidate.take() else {
                return raw;
            };
            if items.iter().any(|s| s.item.same_entity(&item)) {
                return raw;
            }
            items.push(SavedItem::new(item));
            match serde_json::to_string(&items) {
                Ok(encoded) => {
                    outcome = SaveOutcome::Saved;
                    Some(encoded)
                }
                Err(source) => {
                    failure = Some(encode_failure(source));
                    raw
                }
            }
        })?;

        if let Some(err) = failure {
            return Err(err.into());
        }
        tracing::info!(?outcome, "saved item");
        self.publish();
        Ok(outcome)
    }

    /// Remove the entry for `url`; `false` when there was none
    pub fn delete(&self, url: &str) -> Result<bool> {
        let mut removed = false;
        let mut failure = None;

        self.store.update(keys::SAVED_ITEMS, &mut |raw| {
            let mut items = match decode(raw.as_deref()) {
                Ok(items) => items,
                Err(err) => {
                    failure = Some(err);
                    return raw;
                }
            };
            let before = items.len();
            items.retain(|s| s.url() != url);
            if items.len() == before {
                return raw;
            }
            match serde_json::to_string(&items) {
                Ok(encoded) => {
                    removed = true;
                    Some(encoded)
                }
                Err(source) => {
                    failure = Some(encode_failure(source));
                    raw
                }
            }
        })?;

        if let Some(err) = failure {
            return Err(err.into());
        }
        tracing::info!(url, removed, "deleted saved item");
        self.publish();
        Ok(removed)
    }

    fn publish(&self) {
        // No receivers is fine: nothing is rendering bookmark state.
        let _ = self.events.send(RegistryEvent::Changed);
    }
}

impl std::fmt::Debug for SavedItemsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedItemsRegistry")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

/// Unreadable lists are reported, never replaced
fn decode(raw: Option<&str>) -> std::result::Result<Vec<SavedItem>, StoreError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw).map_err(|source| {
        tracing::warn!(error = %source, "saved items are unreadable");
        StoreError::Malformed {
            key: keys::SAVED_ITEMS.to_string(),
            source,
        }
    })
}

fn encode_failure(source: serde_json::Error) -> StoreError {
    StoreError::Encode {
        key: keys::SAVED_ITEMS.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use researchflow_storage::{FileStore, MemoryStore};

    fn article(url: &str) -> ResultItem {
        ResultItem {
            url: url.to_string(),
            title: format!("Title of {url}"),
            authors: vec!["Lovelace".to_string()],
            year: Some(1843),
            citation_count: 7,
            abstract_text: None,
            journal: None,
        }
    }

    fn registry() -> SavedItemsRegistry {
        SavedItemsRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_save_list_delete() {
        let reg = registry();
        assert_eq!(reg.save(article("https://a")).unwrap(), SaveOutcome::Saved);
        assert_eq!(reg.save(article("https://b")).unwrap(), SaveOutcome::Saved);

        let urls: Vec<String> = reg.list().unwrap().iter().map(|s| s.url().to_string()).collect();
        assert_eq!(urls, vec!["https://a", "https://b"]);

        assert!(reg.delete("https://a").unwrap());
        assert!(!reg.delete("https://a").unwrap());
        assert_eq!(reg.list().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_url_leaves_store_unchanged() {
        let reg = registry();
        reg.save(article("https://a")).unwrap();
        let before = reg.list().unwrap();

        let mut changed = article("https://a");
        changed.title = "Another title".to_string();
        assert_eq!(reg.save(changed).unwrap(), SaveOutcome::Duplicate);
        assert_eq!(reg.list().unwrap(), before);
    }

    #[test]
    fn test_every_mutation_publishes() {
        let reg = registry();
        let mut sub = reg.subscribe();
        assert!(!sub.changed());

        reg.save(article("https://a")).unwrap();
        assert!(sub.changed());
        assert!(!sub.changed());

        reg.save(article("https://a")).unwrap();
        assert!(sub.changed(), "duplicate reports still notify");

        reg.delete("https://missing").unwrap();
        assert!(sub.changed());
    }

    #[test]
    fn test_dropped_subscription_unsubscribes() {
        let reg = registry();
        let sub = reg.subscribe();
        assert_eq!(reg.events.receiver_count(), 1);
        drop(sub);
        assert_eq!(reg.events.receiver_count(), 0);
        reg.save(article("https://a")).unwrap();
    }

    #[test]
    fn test_find_and_persistence() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        SavedItemsRegistry::new(Arc::new(FileStore::new(&path)))
            .save(article("https://persisted"))
            .unwrap();

        let reopened = SavedItemsRegistry::new(Arc::new(FileStore::new(&path)));
        let found = reopened.find("https://persisted").unwrap().unwrap();
        assert_eq!(found.item.year, Some(1843));
        assert!(reopened.find("https://other").unwrap().is_none());
    }

    #[test]
    fn test_unreadable_list_is_left_alone() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SAVED_ITEMS, "{oops").unwrap();
        let reg = SavedItemsRegistry::new(store.clone());

        assert!(matches!(
            reg.list(),
            Err(researchflow_core::Error::Storage(StoreError::Malformed { .. }))
        ));
        assert!(reg.save(article("https://a")).is_err());
        assert!(reg.delete("https://a").is_err());
        assert_eq!(store.get(keys::SAVED_ITEMS).unwrap().as_deref(), Some("{oops"));
    }

    #[test]
    fn test_entries_without_timestamp_are_kept() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::SAVED_ITEMS,
                r#"[{"url": "https://a", "title": "A", "authors": [], "year": 2001, "citationCount": 4}]"#,
            )
            .unwrap();
        let reg = SavedItemsRegistry::new(store);

        assert_eq!(reg.list().unwrap()[0].item.citation_count, 4);
        assert_eq!(reg.save(article("https://b")).unwrap(), SaveOutcome::Saved);
        let urls: Vec<String> = reg.list().unwrap().iter().map(|s| s.url().to_string()).collect();
        assert_eq!(urls, vec!["https://a", "https://b"]);
    }

    #[tokio::test]
    async fn test_async_recv() {
        let reg = registry();
        let mut sub = reg.subscribe();
        reg.save(article("https://a")).unwrap();
        assert_eq!(sub.recv().await, Some(RegistryEvent::Changed));
        drop(reg);
        assert_eq!(sub.recv().await, None);
    }
}
