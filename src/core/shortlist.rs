use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Most listings a consumer can keep on a shortlist
pub const MAX_SHORTLIST_ITEMS: usize = 12;

/// Sessions kept by [`MemoryShortlistStore::new`]
pub const DEFAULT_MAX_SESSIONS: u64 = 100_000;

/// Idle time after which [`MemoryShortlistStore::new`] forgets a session
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Key-value storage behind a consumer's shortlist
///
/// Callers inject an implementation; values are opaque strings.
pub trait ShortlistStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: String);
    fn clear(&self, key: &str);
}

/// Process-local store, bounded in size and expiring idle sessions
#[derive(Debug)]
pub struct MemoryShortlistStore {
    entries: Cache<String, String>,
}

impl MemoryShortlistStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }

    pub fn with_limits(max_sessions: u64, idle: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle)
            .build();

        Self { entries }
    }

    /// Sessions currently held, after pending evictions are applied
    pub fn session_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl Default for MemoryShortlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortlistStore for MemoryShortlistStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key)
    }

    fn write(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn clear(&self, key: &str) {
        self.entries.invalidate(key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortlistError {
    #[error("shortlist already holds the maximum of {0} listings")]
    Full(usize),
}

/// Decoded form of a stored shortlist value
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stored {
    Current(Vec<Uuid>),
    /// Older clients saved one bare listing id
    Legacy(Uuid),
    Unreadable,
}

fn decode(raw: &str) -> Stored {
    if let Ok(ids) = serde_json::from_str::<Vec<Uuid>>(raw) {
        return Stored::Current(ids);
    }

    match Uuid::parse_str(raw.trim().trim_matches('"')) {
        Ok(id) => Stored::Legacy(id),
        Err(_) => Stored::Unreadable,
    }
}

fn encode(ids: &[Uuid]) -> String {
    serde_json::json!(ids).to_string()
}

/// A consumer's saved listings, layered over an injected store
#[derive(Clone)]
pub struct Shortlist {
    store: Arc<dyn ShortlistStore>,
}

impl Shortlist {
    pub fn new(store: Arc<dyn ShortlistStore>) -> Self {
        Self { store }
    }

    /// Read the shortlist, upgrading legacy values in place
    pub fn items(&self, key: &str) -> Vec<Uuid> {
        let Some(raw) = self.store.read(key) else {
            return Vec::new();
        };

        match decode(&raw) {
            Stored::Current(ids) => {
                let cleaned = dedup_and_cap(ids);
                if encode(&cleaned) != raw {
                    self.store.write(key, encode(&cleaned));
                }
                cleaned
            }
            Stored::Legacy(id) => {
                tracing::debug!("Migrating legacy shortlist value for {}", key);
                let ids = vec![id];
                self.store.write(key, encode(&ids));
                ids
            }
            Stored::Unreadable => {
                tracing::warn!("Discarding unreadable shortlist value for {}", key);
                self.store.clear(key);
                Vec::new()
            }
        }
    }

    pub fn add(&self, key: &str, listing_id: Uuid) -> Result<Vec<Uuid>, ShortlistError> {
        let mut ids = self.items(key);
        if ids.contains(&listing_id) {
            return Ok(ids);
        }
        if ids.len() >= MAX_SHORTLIST_ITEMS {
            return Err(ShortlistError::Full(MAX_SHORTLIST_ITEMS));
        }

        ids.push(listing_id);
        self.store.write(key, encode(&ids));
        Ok(ids)
    }

    pub fn remove(&self, key: &str, listing_id: Uuid) -> Vec<Uuid> {
        let mut ids = self.items(key);
        let before = ids.len();
        ids.retain(|id| *id != listing_id);

        if ids.is_empty() {
            self.store.clear(key);
        } else if ids.len() != before {
            self.store.write(key, encode(&ids));
        }
        ids
    }

    pub fn clear(&self, key: &str) {
        self.store.clear(key);
    }

    /// Take over a raw value carried from a client and return it migrated
    pub fn import(&self, key: &str, raw: &str) -> Vec<Uuid> {
        self.store.write(key, raw.to_string());
        self.items(key)
    }
}

fn dedup_and_cap(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len().min(MAX_SHORTLIST_ITEMS));
    for id in ids {
        if seen.len() == MAX_SHORTLIST_ITEMS {
            break;
        }
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortlist() -> (Arc<MemoryShortlistStore>, Shortlist) {
        let store = Arc::new(MemoryShortlistStore::new());
        (store.clone(), Shortlist::new(store))
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_empty_by_default() {
        let (_, list) = shortlist();
        assert!(list.items("session").is_empty());
    }

    #[test]
    fn test_add_and_remove() {
        let (_, list) = shortlist();
        list.add("s", id(1)).unwrap();
        list.add("s", id(2)).unwrap();
        assert_eq!(list.items("s"), vec![id(1), id(2)]);

        assert_eq!(list.remove("s", id(1)), vec![id(2)]);
        assert!(list.remove("s", id(2)).is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_, list) = shortlist();
        list.add("s", id(1)).unwrap();
        assert_eq!(list.add("s", id(1)).unwrap(), vec![id(1)]);
    }

    #[test]
    fn test_cap_enforced() {
        let (_, list) = shortlist();
        for n in 0..MAX_SHORTLIST_ITEMS as u128 {
            list.add("s", id(n)).unwrap();
        }
        assert_eq!(
            list.add("s", id(999)),
            Err(ShortlistError::Full(MAX_SHORTLIST_ITEMS))
        );
    }

    #[test]
    fn test_legacy_single_value_is_migrated() {
        let (store, list) = shortlist();
        store.write("s", id(7).to_string());

        assert_eq!(list.items("s"), vec![id(7)]);
        assert_eq!(store.read("s"), Some(format!("[\"{}\"]", id(7))));
    }

    #[test]
    fn test_legacy_quoted_value_is_migrated() {
        let (_, list) = shortlist();
        assert_eq!(list.import("s", &format!("\"{}\"", id(3))), vec![id(3)]);
    }

    #[test]
    fn test_unreadable_value_is_cleared() {
        let (store, list) = shortlist();
        store.write("s", "{not json".to_string());

        assert!(list.items("s").is_empty());
        assert_eq!(store.read("s"), None);
    }

    #[test]
    fn test_duplicates_in_stored_value_collapsed() {
        let (store, list) = shortlist();
        store.write("s", encode(&[id(1), id(1), id(2)]));

        assert_eq!(list.items("s"), vec![id(1), id(2)]);
        assert_eq!(store.read("s"), Some(encode(&[id(1), id(2)])));
    }

    #[test]
    fn test_encoded_value_is_a_json_array() {
        let encoded = encode(&[id(1), id(2)]);
        let parsed: Vec<Uuid> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed, vec![id(1), id(2)]);
        assert_eq!(encode(&[]), "[]");
    }

    #[test]
    fn test_store_is_bounded() {
        let store = MemoryShortlistStore::with_limits(8, DEFAULT_SESSION_IDLE);
        for n in 0..200 {
            store.write(&format!("session-{}", n), encode(&[id(n)]));
        }
        assert!(store.session_count() <= 8);
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = MemoryShortlistStore::with_limits(8, Duration::from_millis(50));
        store.write("s", encode(&[id(1)]));
        assert!(store.read("s").is_some());

        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(store.read("s"), None);
    }

    #[test]
    fn test_keys_are_isolated() {
        let (_, list) = shortlist();
        list.add("a", id(1)).unwrap();
        assert!(list.items("b").is_empty());
        list.clear("a");
        assert!(list.items("a").is_empty());
    }
}
