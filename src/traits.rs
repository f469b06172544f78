//! Collaborator traits: the fetch function and the revalidating cache.
//!
//! The controller owns no transport and no storage. Everything it does is
//! expressed against two seams:
//!
//! - [`FetchFunction`] — caller-supplied capability that produces data for a
//!   `(params, key)` pair. Its *name* participates in key composition, so it
//!   must be stable and ideally non-empty.
//! - [`RevalidatingCache`] / [`CacheEntry`] — the external cache primitive
//!   that fetches on subscription change, tracks in-flight state, and
//!   supports imperative overwrite. Storage, eviction, deduplication and
//!   retry all live behind this seam.
//!
//! # Suppression contract
//!
//! Subscribing with `None` as the key MUST suppress fetching and yield an
//! entry reporting `is_validating() == false`. The controller relies on this
//! to model manual-mode slots that have not run yet.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::Result;
use crate::types::{SubscribeOptions, SubscriptionKey};

// ============================================================================
// Fetch function
// ============================================================================

/// A named, caller-supplied fetch capability.
///
/// Two controllers wrapping fetch functions with the same name and the same
/// discriminator share a cache slot. That collision is a documented caller
/// responsibility (pick distinct discriminators), not something this crate
/// detects.
#[async_trait]
pub trait FetchFunction: Send + Sync {
    /// Stable identity; concatenated with the discriminator to form the
    /// composite cache key.
    fn name(&self) -> &str;

    /// Produce the data for `params`. `key` is the composite key the fetch
    /// was issued under, for fetchers that route on it.
    async fn fetch(&self, params: Option<&Value>, key: Option<&str>) -> Result<Value>;
}

/// Adapter wrapping a name and an async closure as a [`FetchFunction`].
///
/// ```rust
/// use refetch::FetcherFn;
/// use serde_json::json;
///
/// let fetcher = FetcherFn::new("get_user", |params, _key| {
///     Box::pin(async move { Ok(json!({ "requested": params })) })
/// });
/// ```
pub struct FetcherFn<F> {
    name: String,
    f: F,
}

impl<F> FetcherFn<F>
where
    F: Fn(Option<Value>, Option<String>) -> BoxFuture<'static, Result<Value>> + Send + Sync,
{
    /// Wrap `f` under the given stable name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> FetchFunction for FetcherFn<F>
where
    F: Fn(Option<Value>, Option<String>) -> BoxFuture<'static, Result<Value>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, params: Option<&Value>, key: Option<&str>) -> Result<Value> {
        (self.f)(params.cloned(), key.map(str::to_owned)).await
    }
}

// ============================================================================
// Revalidating cache
// ============================================================================

/// The external revalidating-cache primitive.
///
/// Implementations decide how to store, deduplicate and revalidate entries.
/// The controller's only obligations are to hand over the current
/// `(key, params)` pair whenever it changes and to read entry state through
/// the returned handle.
pub trait RevalidatingCache: Send + Sync {
    /// Atomically replace the active subscription for a slot.
    ///
    /// A `Some` key whose pair differs from the previous subscription
    /// triggers a fetch via `fetcher` and stores the outcome in the entry.
    /// `None` suppresses fetching entirely (see module docs).
    ///
    /// `options.on_success` / `options.on_error` must be invoked after each
    /// fetch settles, including revalidations triggered through
    /// [`CacheEntry::mutate`].
    fn subscribe(
        &self,
        key: Option<SubscriptionKey>,
        fetcher: Arc<dyn FetchFunction>,
        options: SubscribeOptions,
    ) -> Arc<dyn CacheEntry>;
}

/// Read/overwrite handle for one cache slot.
///
/// All reads are pass-through: the controller never caches `data`/`error`/
/// `is_validating` on its side.
#[async_trait]
pub trait CacheEntry: Send + Sync {
    /// Current data, falling back to the subscription's `fallback_data`
    /// when nothing has been fetched yet.
    fn data(&self) -> Option<Value>;

    /// Error from the most recent failed fetch, cleared by a success.
    fn error(&self) -> Option<crate::RefetchError>;

    /// Whether a fetch for this entry is currently in flight.
    fn is_validating(&self) -> bool;

    /// Overwrite the entry's data. With `revalidate = true` the cache must
    /// re-fetch afterwards; with `false` the overwrite is local only.
    ///
    /// Resolves with the entry's data once the overwrite (and any
    /// revalidation) settles. A suppressed entry no-ops and resolves with
    /// `None`.
    async fn mutate(&self, data: Option<Value>, revalidate: bool) -> Result<Option<Value>>;
}
