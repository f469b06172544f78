//! Request controller: the key/parameter state machine.
//!
//! A [`RequestController`] owns exactly one piece of mutable state, the
//! `(key, params)` pair identifying its cache slot, plus the handle to the
//! collaborator's entry for that slot. Everything else (storage, dedup,
//! revalidation timing, transport) lives behind the
//! [`RevalidatingCache`](crate::RevalidatingCache) seam.
//!
//! # States
//!
//! - **Suppressed** — key is `None`. The collaborator must not fetch and
//!   reports `is_validating = false`. Initial state for [`Mode::Manual`](crate::Mode::Manual).
//! - **Active** — key is the composite (fetch-function name +
//!   discriminator), fixed for the controller's lifetime. Initial state for
//!   [`Mode::Automatic`](crate::Mode::Automatic).
//!
//! Transitions are driven entirely by [`run`](RequestController::run):
//! a changed pair (or the first activation) replaces the subscription and
//! the collaborator fetches; a repeated pair with `reload` short-circuits
//! into [`refresh`](RequestController::refresh); a repeated pair without
//! `reload` is a no-op that resolves with the current data.
//!
//! # Ordering
//!
//! Successive `run` calls are serialized by the caller. Two un-awaited
//! back-to-back runs race: the later pair wins the subscription, and an
//! earlier fetch already in flight may still settle pending completions.
//! The controller performs no cancellation.

mod bridge;

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, warn};

use crate::telemetry;
use crate::traits::{CacheEntry, FetchFunction, RevalidatingCache};
use crate::types::{
    DataShape, ErrorHook, RequestOptions, RequestSnapshot, SubscribeOptions, SubscriptionKey,
    SuccessHook, compose, initial_key, merge_fields, params_equal, shallow_clone,
};
use crate::{RefetchError, Result};

use bridge::{CompletionBridge, PendingRun};

/// Slot state owned exclusively by the controller.
///
/// The entry handle is replaced together with the pair so reads always
/// reflect the active subscription.
struct SlotState {
    key: Option<String>,
    params: Option<Value>,
    entry: Arc<dyn CacheEntry>,
}

/// Lifecycle controller for a single logical request.
///
/// Construct one per request declaration via [`RequestController::new`];
/// it subscribes immediately (with a suppressed key in [`Mode::Manual`](crate::Mode::Manual))
/// and stays live for the life of its owning scope.
pub struct RequestController {
    fetcher: Arc<dyn FetchFunction>,
    cache: Arc<dyn RevalidatingCache>,
    composite: String,
    subscribe_options: SubscribeOptions,
    bridge: Arc<CompletionBridge>,
    state: Mutex<SlotState>,
}

/// Outcome of the transition decision, computed under the state lock.
enum RunAction {
    Refresh,
    Noop(Option<Value>),
    Fetch(PendingRun),
}

impl RequestController {
    /// Create a controller and hand the initial subscription to the cache.
    ///
    /// In [`Mode::Automatic`](crate::Mode::Automatic) this triggers the first fetch immediately; in
    /// [`Mode::Manual`](crate::Mode::Manual) the slot stays suppressed until
    /// [`run`](Self::run).
    pub fn new(
        fetcher: Arc<dyn FetchFunction>,
        cache: Arc<dyn RevalidatingCache>,
        options: RequestOptions,
    ) -> Self {
        if fetcher.name().is_empty() {
            warn!(
                discriminator = %options.discriminator,
                "fetch function has an empty name; every anonymous fetcher \
                 with this discriminator shares one cache slot"
            );
        }
        let composite = compose(fetcher.name(), &options.discriminator);
        let bridge = Arc::new(CompletionBridge::new());
        let resolved = SubscribeOptions::resolve(&options.cache, options.initial_data);
        let subscribe_options = wrap_hooks(resolved, Arc::clone(&bridge));

        let key = initial_key(options.mode, &composite);
        let params = options.params;
        let subscription = key
            .as_deref()
            .map(|k| SubscriptionKey::new(k, params.as_ref()));
        debug!(
            key = %composite,
            mode = ?options.mode,
            suppressed = subscription.is_none(),
            "subscribing slot"
        );
        let entry = cache.subscribe(subscription, Arc::clone(&fetcher), subscribe_options.clone());

        Self {
            fetcher,
            cache,
            composite,
            subscribe_options,
            bridge,
            state: Mutex::new(SlotState { key, params, entry }),
        }
    }

    /// The composite key this controller subscribes under once active.
    pub fn composite_key(&self) -> &str {
        &self.composite
    }

    /// The currently active key: `None` while suppressed.
    pub fn key(&self) -> Option<String> {
        self.state.lock().map(|st| st.key.clone()).unwrap_or(None)
    }

    /// Parameters the slot is currently subscribed under.
    pub fn params(&self) -> Option<Value> {
        self.state
            .lock()
            .map(|st| st.params.clone())
            .unwrap_or(None)
    }

    /// Pass-through read of the entry's data (fallback data until the first
    /// fetch stores something).
    pub fn data(&self) -> Option<Value> {
        self.state.lock().map(|st| st.entry.data()).unwrap_or(None)
    }

    /// Pass-through read of the entry's error.
    pub fn error(&self) -> Option<RefetchError> {
        self.state.lock().map(|st| st.entry.error()).unwrap_or(None)
    }

    /// Pass-through read of the entry's in-flight flag.
    pub fn is_validating(&self) -> bool {
        self.state
            .lock()
            .map(|st| st.entry.is_validating())
            .unwrap_or(false)
    }

    /// Derived loading flag.
    ///
    /// While suppressed, only the never-run-but-pending case counts
    /// (no data yet, validating, no error) so a manual slot that has never
    /// run does not flash a loading indicator. Once active, this mirrors
    /// `is_validating` directly.
    pub fn loading(&self) -> bool {
        self.state
            .lock()
            .map(|st| match st.key {
                None => {
                    st.entry.data().is_none()
                        && st.entry.is_validating()
                        && st.entry.error().is_none()
                }
                Some(_) => st.entry.is_validating(),
            })
            .unwrap_or(false)
    }

    /// Capture loading/data/error/params/is_validating in one consistent
    /// read.
    pub fn snapshot(&self) -> RequestSnapshot {
        self.state
            .lock()
            .map(|st| {
                let data = st.entry.data();
                let error = st.entry.error();
                let is_validating = st.entry.is_validating();
                let loading = match st.key {
                    None => data.is_none() && is_validating && error.is_none(),
                    Some(_) => is_validating,
                };
                RequestSnapshot {
                    loading,
                    data,
                    error,
                    params: st.params.clone(),
                    is_validating,
                }
            })
            .unwrap_or(RequestSnapshot {
                loading: false,
                data: None,
                error: None,
                params: None,
                is_validating: false,
            })
    }

    /// Execute the request with `new_params`.
    ///
    /// - Pair changed (or first activation): replaces the subscription and
    ///   resolves with the eventual fetch outcome.
    /// - Pair unchanged and `reload`: delegates to [`refresh`](Self::refresh),
    ///   since re-issuing an identical pair would be a no-op for the
    ///   collaborator and an explicit revalidation is required.
    /// - Pair unchanged and `!reload`: no fetch; resolves immediately with
    ///   the current data.
    ///
    /// A fetch failure rejects this call *and* lands in
    /// [`error`](Self::error).
    pub async fn run(&self, new_params: Option<Value>, reload: bool) -> Result<Option<Value>> {
        let action = {
            let mut st = self.state_mut()?;
            let unchanged =
                st.key.is_some() && params_equal(st.params.as_ref(), new_params.as_ref());
            if unchanged && reload {
                RunAction::Refresh
            } else if unchanged {
                RunAction::Noop(st.entry.data())
            } else {
                // Register before the pair is replaced so a synchronously
                // settling fetch cannot slip past its listener.
                let pending = self.bridge.register();
                st.params = new_params;
                st.key = Some(self.composite.clone());
                let subscription = SubscriptionKey::new(&self.composite, st.params.as_ref());
                st.entry = self.cache.subscribe(
                    Some(subscription),
                    Arc::clone(&self.fetcher),
                    self.subscribe_options.clone(),
                );
                RunAction::Fetch(pending)
            }
        };

        match action {
            RunAction::Refresh => {
                debug!(key = %self.composite, "run: params unchanged, delegating to refresh");
                metrics::counter!(telemetry::RUNS_TOTAL, "kind" => "refresh").increment(1);
                self.refresh().await
            }
            RunAction::Noop(data) => {
                debug!(key = %self.composite, "run: params unchanged and no reload requested");
                metrics::counter!(telemetry::RUNS_TOTAL, "kind" => "noop").increment(1);
                Ok(data)
            }
            RunAction::Fetch(pending) => {
                debug!(key = %self.composite, "run: subscription replaced, awaiting completion");
                metrics::counter!(telemetry::RUNS_TOTAL, "kind" => "fetch").increment(1);
                pending.outcome().await.map(Some)
            }
        }
    }

    /// Re-validate the current entry without changing the pair.
    ///
    /// Hands the collaborator a shallow structural clone of the current data
    /// (same values, new container) with `revalidate = true`, forcing a
    /// re-fetch while the displayed data stays in place. On a suppressed
    /// slot this no-ops and resolves with `None`.
    pub async fn refresh(&self) -> Result<Option<Value>> {
        let entry = self.entry()?;
        let current = entry.data();
        debug!(
            key = %self.composite,
            shape = ?current.as_ref().map(DataShape::of),
            "refresh: revalidating current entry"
        );
        metrics::counter!(telemetry::REFRESHES_TOTAL).increment(1);
        entry.mutate(current.as_ref().map(shallow_clone), true).await
    }

    /// Optimistic local update: merge `new_data` over the current data and
    /// overwrite without revalidating.
    ///
    /// Mapping current data gets a field union (new fields win); any other
    /// current shape is replaced outright.
    pub async fn mutate(&self, new_data: Value) -> Result<Option<Value>> {
        let entry = self.entry()?;
        let merged = merge_fields(entry.data().as_ref(), new_data);
        debug!(key = %self.composite, "mutate: local overwrite, revalidation disabled");
        metrics::counter!(telemetry::MUTATIONS_TOTAL, "revalidate" => "false").increment(1);
        entry.mutate(Some(merged), false).await
    }

    /// Raw pass-through to the collaborator's overwrite operation, with the
    /// caller in full control of data and revalidation.
    pub async fn cache_mutate(
        &self,
        data: Option<Value>,
        revalidate: bool,
    ) -> Result<Option<Value>> {
        let entry = self.entry()?;
        metrics::counter!(
            telemetry::MUTATIONS_TOTAL,
            "revalidate" => if revalidate { "true" } else { "false" }
        )
        .increment(1);
        entry.mutate(data, revalidate).await
    }

    fn state_mut(&self) -> Result<MutexGuard<'_, SlotState>> {
        self.state
            .lock()
            .map_err(|e| RefetchError::Internal(format!("state lock poisoned: {e}")))
    }

    fn entry(&self) -> Result<Arc<dyn CacheEntry>> {
        Ok(Arc::clone(&self.state_mut()?.entry))
    }
}

/// Replace the resolved hooks with wrappers that settle the completion
/// bridge first, then forward to the caller's own hooks.
fn wrap_hooks(resolved: SubscribeOptions, bridge: Arc<CompletionBridge>) -> SubscribeOptions {
    let caller_success = resolved.on_success.clone();
    let success_bridge = Arc::clone(&bridge);
    let on_success: SuccessHook = Arc::new(move |data, key| {
        success_bridge.settle(&Ok(data.clone()));
        metrics::counter!(telemetry::COMPLETIONS_TOTAL, "status" => "ok").increment(1);
        if let Some(hook) = &caller_success {
            hook(data, key);
        }
    });

    let caller_error = resolved.on_error.clone();
    let on_error: ErrorHook = Arc::new(move |err, key| {
        bridge.settle(&Err(err.clone()));
        metrics::counter!(telemetry::COMPLETIONS_TOTAL, "status" => "error").increment(1);
        if let Some(hook) = &caller_error {
            hook(err, key);
        }
    });

    SubscribeOptions {
        revalidate_on_focus: resolved.revalidate_on_focus,
        fallback_data: resolved.fallback_data,
        on_success: Some(on_success),
        on_error: Some(on_error),
    }
}
