//! In-process key-value store.
//!
//! Same semantics as the Redis store, kept in a mutex-guarded map. Used for
//! dry runs and for exercising the caches without a Redis server.

use async_trait::async_trait;
use packscout_core::{DomainError, KeyValueStore, RepoResult};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// Key-value store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the server were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of write calls (`set`, `set_many`, `set_add`) served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Read a plain value without going through the async interface
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.lock().values.get(key).cloned()
    }

    /// Read the members of a set without going through the async interface
    pub fn members(&self, key: &str) -> BTreeSet<String> {
        self.state.lock().sets.get(key).cloned().unwrap_or_default()
    }

    /// Remove a plain value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.state.lock().values.remove(key)
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::CacheUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.check_available()?;
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.check_available()?;
        self.record_write();
        self.state
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> RepoResult<()> {
        self.check_available()?;
        if entries.is_empty() {
            return Ok(());
        }
        self.record_write();
        let mut state = self.state.lock();
        for (key, value) in entries {
            state.values.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn set_add(&self, key: &str, members: &[String]) -> RepoResult<()> {
        self.check_available()?;
        if members.is_empty() {
            return Ok(());
        }
        self.record_write();
        self.state
            .lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .extend(members.iter().cloned());
        Ok(())
    }

    async fn set_len(&self, key: &str) -> RepoResult<u64> {
        self.check_available()?;
        Ok(self.state.lock().sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn ping(&self) -> RepoResult<()> {
        self.check_available()
    }
}
