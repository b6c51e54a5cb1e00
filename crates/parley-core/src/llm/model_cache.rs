//! Memoised provider model listings.
//!
//! `ModelListCache` is a concurrent map backed by `DashMap`, shared by
//! cloning. Entries are cloned on read so no `DashMap` guard outlives the
//! call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use parley_types::model::ModelDetails;
use parley_types::provider::ProviderKind;

/// Default time a listing stays fresh.
pub const DEFAULT_MODEL_LIST_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct CachedList {
    fetched_at: Instant,
    models: Vec<ModelDetails>,
}

/// Concurrent cache of `list_models` results keyed by provider.
#[derive(Debug, Clone)]
pub struct ModelListCache {
    inner: Arc<DashMap<ProviderKind, CachedList>>,
    ttl: Duration,
}

impl ModelListCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_MODEL_LIST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Cloned listing for `kind`, or `None` if absent or stale.
    pub fn get(&self, kind: ProviderKind) -> Option<Vec<ModelDetails>> {
        let entry = self.inner.get(&kind)?;
        if entry.fetched_at.elapsed() < self.ttl {
            return Some(entry.models.clone());
        }
        drop(entry);
        self.inner.remove(&kind);
        None
    }

    pub fn insert(&self, kind: ProviderKind, models: Vec<ModelDetails>) {
        self.inner.insert(
            kind,
            CachedList {
                fetched_at: Instant::now(),
                models,
            },
        );
    }

    /// Forget one provider's listing.
    pub fn invalidate(&self, kind: ProviderKind) {
        self.inner.remove(&kind);
    }

    /// Forget every listing.
    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for ModelListCache {
    fn default() -> Self {
        Self::new()
    }
}
