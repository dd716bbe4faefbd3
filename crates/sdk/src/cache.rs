//! Resilient read cache
//!
//! TTL-bounded JSON entries kept in an injected key-value store. When the
//! ledger is unreachable, reads fall back to the last value seen and tag it
//! stale instead of failing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use pulse_types::ErrorCategory;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{SdkError, SdkResult};

/// Prefix shared by every key this cache owns
pub const DEFAULT_NAMESPACE: &str = "pulse:";

// ============================================================================
// Store Port
// ============================================================================

/// Persistent string store the cache writes through.
///
/// Each `set` must replace the whole value; readers never observe a
/// partially written entry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }
}

// ============================================================================
// Entries and Lookups
// ============================================================================

/// Position of a write in a cache's history.
///
/// Seconds alone cannot order two writes landing in the same second, so each
/// write also takes the next value of a per-cache sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriteStamp {
    pub written_at: i64,
    pub seq: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    written_at: i64,
    #[serde(default)]
    seq: u64,
    /// `None` keeps the entry fresh until invalidated
    ttl_secs: Option<u64>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: i64) -> bool {
        match self.ttl_secs {
            None => true,
            Some(ttl) => {
                now.saturating_sub(self.written_at) < i64::try_from(ttl).unwrap_or(i64::MAX)
            }
        }
    }

    fn stamp(&self) -> WriteStamp {
        WriteStamp {
            written_at: self.written_at,
            seq: self.seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Fresh(T),
    Stale(T),
    Miss,
}

impl<T> CacheLookup<T> {
    /// The value only if it is still within its TTL
    pub fn fresh(self) -> Option<T> {
        match self {
            CacheLookup::Fresh(value) => Some(value),
            _ => None,
        }
    }

    /// The value regardless of age
    pub fn value(self) -> Option<T> {
        match self {
            CacheLookup::Fresh(value) | CacheLookup::Stale(value) => Some(value),
            CacheLookup::Miss => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheLookup::Fresh(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    Fresh,
    /// Served from cache because the ledger could not be reached
    Stale,
}

/// A read-through result and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub freshness: Freshness,
}

impl<T> Cached<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            freshness: Freshness::Fresh,
        }
    }

    pub fn stale(value: T) -> Self {
        Self {
            value,
            freshness: Freshness::Stale,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            freshness: self.freshness,
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

pub struct ResilientCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    /// Last sequence number handed to a write
    seq: AtomicU64,
}

impl ResilientCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_namespace(store, clock, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        namespace: &str,
    ) -> Self {
        Self {
            store,
            clock,
            namespace: namespace.to_string(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Current point in this cache's write history. A value fetched after
    /// this call is older than any write stamped later.
    pub fn observe(&self) -> WriteStamp {
        WriteStamp {
            written_at: self.clock.now(),
            seq: self.seq.load(Ordering::SeqCst),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = self.store.get(&self.scoped(key))?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn write_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> SdkResult<()> {
        let raw = serde_json::to_string(entry).map_err(SdkError::serialization)?;
        self.store.set(&self.scoped(key), raw);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        match self.read_entry::<T>(key) {
            Some(entry) if entry.is_fresh(self.clock.now()) => CacheLookup::Fresh(entry.value),
            Some(entry) => CacheLookup::Stale(entry.value),
            None => CacheLookup::Miss,
        }
    }

    /// Store `value`, stamping it with the current time
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> SdkResult<()> {
        self.write_entry(
            key,
            &CacheEntry {
                value,
                written_at: self.clock.now(),
                seq: self.next_seq(),
                ttl_secs: ttl.map(|d| d.as_secs()),
            },
        )
    }

    /// Store a value observed at `observed` unless a write stamped after
    /// it already landed. Returns whether the value was written.
    pub fn set_observed<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        observed: WriteStamp,
    ) -> SdkResult<bool> {
        if let Some(existing) = self.read_entry::<serde_json::Value>(key) {
            if existing.stamp() > observed {
                warn!(
                    "Discarding response for {} observed at {:?}, cache holds {:?}",
                    key,
                    observed,
                    existing.stamp()
                );
                return Ok(false);
            }
        }
        self.write_entry(
            key,
            &CacheEntry {
                value,
                written_at: observed.written_at,
                seq: self.next_seq(),
                ttl_secs: ttl.map(|d| d.as_secs()),
            },
        )?;
        Ok(true)
    }

    /// Last stored value regardless of TTL
    pub fn last_known<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_entry::<T>(key).map(|entry| entry.value)
    }

    pub fn invalidate(&self, key: &str) {
        self.store.remove(&self.scoped(key));
    }

    pub fn invalidate_prefix(&self, prefix: &str) {
        let scoped = self.scoped(prefix);
        for key in self.store.keys() {
            if key.starts_with(&scoped) {
                self.store.remove(&key);
            }
        }
    }

    /// Drop every entry in this cache's namespace; other keys in the store
    /// are left alone
    pub fn clear(&self) {
        self.invalidate_prefix("");
    }

    /// Serve a fresh entry, otherwise fetch and store.
    ///
    /// A transport failure falls back to the last known value tagged stale;
    /// every other error propagates unchanged.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> SdkResult<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = SdkResult<T>>,
    {
        if let CacheLookup::Fresh(value) = self.get::<T>(key) {
            debug!("Cache hit: {}", key);
            return Ok(Cached::fresh(value));
        }

        let observed = self.observe();
        match fetch().await {
            Ok(value) => {
                if self.set_observed(key, &value, ttl, observed)? {
                    return Ok(Cached::fresh(value));
                }
                // a newer write landed while this fetch was in flight
                match self.last_known::<T>(key) {
                    Some(newer) => Ok(Cached::fresh(newer)),
                    None => Ok(Cached::fresh(value)),
                }
            }
            Err(err) if err.category() == ErrorCategory::Transport => {
                match self.last_known::<T>(key) {
                    Some(value) => {
                        warn!("Serving stale {} after transport failure: {}", key, err);
                        Ok(Cached::stale(value))
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// Key Scheme
// ============================================================================

/// Logical cache keys, relative to the namespace
pub mod keys {
    use solana_sdk::pubkey::Pubkey;

    pub fn profile(owner: &Pubkey) -> String {
        format!("profile:{}", owner)
    }

    pub fn followers(user: &Pubkey) -> String {
        format!("followers:{}", user)
    }

    pub fn following(user: &Pubkey) -> String {
        format!("following:{}", user)
    }

    pub fn listing(listing: &Pubkey) -> String {
        format!("listing:{}", listing)
    }

    pub fn offer(offer: &Pubkey) -> String {
        format!("offer:{}", offer)
    }

    pub fn offers_for(listing: &Pubkey) -> String {
        format!("offer:listing:{}", listing)
    }

    pub fn stake_position(staker: &Pubkey) -> String {
        format!("stakePosition:{}", staker)
    }

    pub fn proposal(proposal: &Pubkey) -> String {
        format!("proposal:{}", proposal)
    }

    pub fn pool(creator: &Pubkey) -> String {
        format!("pool:{}", creator)
    }

    pub fn holding(holder: &Pubkey, creator: &Pubkey) -> String {
        format!("holding:{}:{}", holder, creator)
    }

    pub fn config() -> String {
        "config:platform".to_string()
    }
}
