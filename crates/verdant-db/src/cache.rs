//! # Catalog Cache
//!
//! Per-instance response memoization for vendor catalog reads.
//!
//! ## Why an Explicit Cache Object?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Cache                                      │
//! │                                                                         │
//! │  Render 1 ──┐                                                           │
//! │  Render 2 ──┼──► get_or_load("vendor-1") ──► ONE database load         │
//! │  Render 3 ──┘         │                                                 │
//! │                       ▼                                                 │
//! │             ┌─────────────────────┐                                     │
//! │             │  TtlCache           │   • TTL freshness (injected clock) │
//! │             │  vendor → catalog   │   • LRU eviction at capacity       │
//! │             │                     │   • in-flight de-duplication       │
//! │             └─────────────────────┘                                     │
//! │                                                                         │
//! │  Constructed per application instance: no module-level singletons,     │
//! │  no cross-test leakage, clock injected for deterministic tests.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## In-Flight De-Duplication
//! Concurrent `get_or_load` calls for the same key coalesce: the first
//! caller becomes the loader and holds a per-key gate while it runs;
//! followers wait on the gate and re-check the cache when it opens. A
//! failed load releases the gate without caching, so the next caller
//! retries instead of serving a stale error.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::DbResult;
use crate::pool::Database;
use verdant_core::types::{Product, Promotion};

// =============================================================================
// Clock
// =============================================================================

/// Time source for cache freshness decisions.
///
/// Injected rather than read from the system so TTL behavior is
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually-advanced clock for tests.
///
/// ## Example
/// ```rust,ignore
/// let clock = Arc::new(ManualClock::new(start));
/// clock.advance_secs(120); // two minutes pass, no sleeping
/// ```
#[derive(Debug)]
pub struct ManualClock {
    base: DateTime<Utc>,
    offset_secs: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `base`.
    pub fn new(base: DateTime<Utc>) -> Self {
        ManualClock {
            base,
            offset_secs: AtomicI64::new(0),
        }
    }

    /// Moves the clock forward.
    pub fn advance_secs(&self, secs: i64) {
        self.offset_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + Duration::seconds(self.offset_secs.load(Ordering::SeqCst))
    }
}

// =============================================================================
// TTL Cache
// =============================================================================

/// Cache tuning knobs.
#[derive(Debug, Clone)]
pub struct TtlCacheConfig {
    /// How long an entry stays fresh after being loaded.
    pub ttl: Duration,
    /// Maximum number of entries before LRU eviction kicks in.
    pub capacity: usize,
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        TtlCacheConfig {
            ttl: Duration::seconds(60),
            capacity: 64,
        }
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: DateTime<Utc>,
    last_used: DateTime<Utc>,
}

struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Per-key gates for loads in flight. The loader holds the gate
    /// locked; followers queue on it.
    pending: HashMap<K, Arc<AsyncMutex<()>>>,
}

/// What a `get_or_load` caller turned out to be after checking the state.
enum Role<V> {
    Hit(Arc<V>),
    Lead(OwnedMutexGuard<()>),
    Follow(Arc<AsyncMutex<()>>),
}

/// A TTL + LRU cache with in-flight request de-duplication.
///
/// Values are handed out as `Arc<V>`, so many concurrent renders share
/// one loaded catalog without cloning it.
pub struct TtlCache<K, V> {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    state: AsyncMutex<CacheState<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache.
    pub fn new(config: TtlCacheConfig, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            ttl: config.ttl,
            capacity: config.capacity,
            clock,
            state: AsyncMutex::new(CacheState {
                entries: HashMap::new(),
                pending: HashMap::new(),
            }),
        }
    }

    /// Returns the cached value for `key` if it is still fresh.
    ///
    /// A hit refreshes the entry's LRU position; a stale entry is
    /// dropped on the spot.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let fresh = match state.entries.get(key) {
            Some(entry) => now.signed_duration_since(entry.inserted_at) <= self.ttl,
            None => return None,
        };

        if !fresh {
            state.entries.remove(key);
            return None;
        }

        let entry = state.entries.get_mut(key)?;
        entry.last_used = now;
        Some(Arc::clone(&entry.value))
    }

    /// Inserts a value, evicting expired then least-recently-used
    /// entries to stay within capacity.
    pub async fn insert(&self, key: K, value: V) {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if !state.entries.contains_key(&key) {
            self.make_room(&mut state, now);
        }
        state.entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                inserted_at: now,
                last_used: now,
            },
        );
    }

    /// Returns the cached value for `key`, loading it with `load` on a
    /// miss. Concurrent callers for the same key share one load.
    ///
    /// A failed load is NOT cached: the error goes to the caller that
    /// ran the loader, and waiting callers retry with their own load.
    pub async fn get_or_load<F, Fut>(&self, key: &K, load: F) -> DbResult<Arc<V>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = DbResult<V>>,
    {
        loop {
            let role = {
                let mut state = self.state.lock().await;
                let now = self.clock.now();

                let fresh = state
                    .entries
                    .get(key)
                    .map(|entry| now.signed_duration_since(entry.inserted_at) <= self.ttl)
                    .unwrap_or(false);

                if fresh {
                    // Unreachable None: fresh implies present
                    match state.entries.get_mut(key) {
                        Some(entry) => {
                            entry.last_used = now;
                            Role::Hit(Arc::clone(&entry.value))
                        }
                        None => continue,
                    }
                } else {
                    state.entries.remove(key);
                    match state.pending.get(key) {
                        Some(gate) => Role::Follow(Arc::clone(gate)),
                        None => {
                            let gate = Arc::new(AsyncMutex::new(()));
                            match gate.clone().try_lock_owned() {
                                Ok(guard) => {
                                    state.pending.insert(key.clone(), gate);
                                    Role::Lead(guard)
                                }
                                // A fresh gate cannot be contended; fall
                                // back to following if it somehow is
                                Err(_) => Role::Follow(gate),
                            }
                        }
                    }
                }
            };

            match role {
                Role::Hit(value) => return Ok(value),

                Role::Follow(gate) => {
                    // The gate opens when the loader finishes (or fails);
                    // loop back and re-check the cache either way
                    drop(gate.lock().await);
                    continue;
                }

                Role::Lead(guard) => {
                    debug!("Cache miss, loading");
                    let result = load().await;

                    let mut state = self.state.lock().await;
                    state.pending.remove(key);

                    match result {
                        Ok(value) => {
                            let value = Arc::new(value);
                            let now = self.clock.now();
                            if !state.entries.contains_key(key) {
                                self.make_room(&mut state, now);
                            }
                            state.entries.insert(
                                key.clone(),
                                CacheEntry {
                                    value: Arc::clone(&value),
                                    inserted_at: now,
                                    last_used: now,
                                },
                            );
                            drop(state);
                            drop(guard);
                            return Ok(value);
                        }
                        Err(err) => {
                            drop(state);
                            drop(guard);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Drops the entry for `key`, if any.
    pub async fn invalidate(&self, key: &K) {
        self.state.lock().await.entries.remove(key);
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    /// Number of entries currently held (fresh or not).
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evicts expired entries, then least-recently-used entries until
    /// there is room for one more.
    fn make_room(&self, state: &mut CacheState<K, V>, now: DateTime<Utc>) {
        let ttl = self.ttl;
        state
            .entries
            .retain(|_, entry| now.signed_duration_since(entry.inserted_at) <= ttl);

        while state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    state.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

// =============================================================================
// Catalog Cache
// =============================================================================

/// Everything a storefront render needs for one vendor.
#[derive(Debug, Clone)]
pub struct VendorCatalog {
    pub products: Vec<Product>,
    pub promotions: Vec<Promotion>,
}

/// A vendor-keyed catalog cache over the repositories.
///
/// Render paths ask this for a vendor's catalog instead of hitting the
/// repositories directly; simultaneous renders of the same storefront
/// share a single database round trip.
pub struct CatalogCache {
    db: Database,
    cache: TtlCache<String, VendorCatalog>,
}

impl CatalogCache {
    /// Creates a catalog cache over `db`.
    pub fn new(db: Database, config: TtlCacheConfig, clock: Arc<dyn Clock>) -> Self {
        CatalogCache {
            db,
            cache: TtlCache::new(config, clock),
        }
    }

    /// Returns the vendor's products and active promotions, from cache
    /// when fresh.
    pub async fn vendor_catalog(&self, vendor_id: &str) -> DbResult<Arc<VendorCatalog>> {
        let key = vendor_id.to_string();
        self.cache
            .get_or_load(&key, || async {
                debug!(vendor_id, "Loading vendor catalog");
                let products = self.db.products().list_for_vendor(vendor_id).await?;
                let promotions = self.db.promotions().list_active_for_vendor(vendor_id).await?;
                Ok(VendorCatalog {
                    products,
                    promotions,
                })
            })
            .await
    }

    /// Drops the cached catalog for a vendor, forcing the next read to
    /// reload. Call after catalog writes.
    pub async fn invalidate_vendor(&self, vendor_id: &str) {
        self.cache.invalidate(&vendor_id.to_string()).await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;
    use verdant_core::money::Percent;
    use verdant_core::types::{Discount, PromotionScope};

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn small_cache(clock: Arc<dyn Clock>, capacity: usize) -> TtlCache<String, u32> {
        TtlCache::new(
            TtlCacheConfig {
                ttl: Duration::seconds(60),
                capacity,
            },
            clock,
        )
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_loader() {
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = small_cache(clock.clone(), 8);
        let calls = AtomicUsize::new(0);

        let key = "vendor-1".to_string();
        for _ in 0..3 {
            let value = cache
                .get_or_load(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<u32, DbError>(42) }
                })
                .await
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_reloads() {
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = small_cache(clock.clone(), 8);
        let calls = AtomicUsize::new(0);

        let key = "vendor-1".to_string();
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<u32, DbError>(42) }
        };

        cache.get_or_load(&key, load).await.unwrap();

        // Still fresh at 60s (inclusive), stale after
        clock.advance_secs(60);
        cache.get_or_load(&key, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get(&key).await.is_some());

        clock.advance_secs(1);
        assert!(cache.get(&key).await.is_none());
        cache.get_or_load(&key, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = small_cache(clock.clone(), 2);

        cache.insert("a".to_string(), 1).await;
        clock.advance_secs(1);
        cache.insert("b".to_string(), 2).await;
        clock.advance_secs(1);

        // Touch "a" so "b" becomes least recently used
        assert!(cache.get(&"a".to_string()).await.is_some());
        clock.advance_secs(1);

        cache.insert("c".to_string(), 3).await;

        assert!(cache.get(&"a".to_string()).await.is_some());
        assert!(cache.get(&"b".to_string()).await.is_none());
        assert!(cache.get(&"c".to_string()).await.is_some());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = small_cache(clock, 8);
        let calls = AtomicUsize::new(0);

        let key = "vendor-1".to_string();

        let failed = cache
            .get_or_load(&key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, DbError>(DbError::PoolExhausted) }
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_load(&key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<u32, DbError>(7) }
            })
            .await
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce() {
        let cache = Arc::new(small_cache(Arc::new(SystemClock), 8));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load(&"vendor-1".to_string(), || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Hold the load open so followers pile up
                            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                            Ok::<u32, DbError>(42)
                        }
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(*handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_cache_serves_and_invalidates() {
        let db = crate::pool::Database::new(DbConfig::in_memory()).await.unwrap();

        let mut product = verdant_core::types::Product::new("prod-1", "vendor-1", "Gelato");
        product.regular_price_cents = Some(4000);
        db.products().insert(&product).await.unwrap();

        let promo = verdant_core::types::Promotion::new(
            "promo-1",
            "vendor-1",
            "20% Off",
            PromotionScope::Global,
            Discount::Percentage(Percent::from_bps(2000)),
        );
        db.promotions().insert(&promo).await.unwrap();

        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = CatalogCache::new(db.clone(), TtlCacheConfig::default(), clock);

        let catalog = cache.vendor_catalog("vendor-1").await.unwrap();
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.promotions.len(), 1);

        // A write lands; the cached read stays stable until invalidated
        let mut second = verdant_core::types::Product::new("prod-2", "vendor-1", "Zkittlez");
        second.regular_price_cents = Some(3500);
        db.products().insert(&second).await.unwrap();

        let cached = cache.vendor_catalog("vendor-1").await.unwrap();
        assert_eq!(cached.products.len(), 1);

        cache.invalidate_vendor("vendor-1").await;
        let reloaded = cache.vendor_catalog("vendor-1").await.unwrap();
        assert_eq!(reloaded.products.len(), 2);
    }
}
