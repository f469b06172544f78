//! Shared test collaborators.
//!
//! [`MemoryCache`] is a deliberately small in-memory implementation of the
//! revalidating-cache contract, just enough to exercise the controller:
//! it fetches when a subscription pair changes, suppresses on `None`,
//! re-fetches on `mutate(_, true)`, fires the success/error hooks after
//! every settled fetch, and serves `fallback_data` until a fetch stores
//! something. It does no eviction, deduplication or retry — those belong
//! to real collaborators, not to these tests.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use refetch::{
    CacheEntry, FetchFunction, RefetchError, Result, RevalidatingCache, SubscribeOptions,
    SubscriptionKey,
};

// ============================================================================
// Fetchers
// ============================================================================

/// Records every invocation; responds with a canned value or an echo of the
/// received parameters.
pub struct CountingFetcher {
    name: String,
    calls: Mutex<Vec<(Option<Value>, Option<String>)>>,
    result: Option<Value>,
    fail_with: Option<String>,
}

impl CountingFetcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Mutex::new(Vec::new()),
            result: None,
            fail_with: None,
        }
    }

    /// Respond with a fixed value instead of the parameter echo.
    pub fn with_result(mut self, value: Value) -> Self {
        self.result = Some(value);
        self
    }

    /// Fail every fetch with the given message.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new(name)
        }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Option<Value>, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchFunction for CountingFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, params: Option<&Value>, key: Option<&str>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((params.cloned(), key.map(str::to_owned)));
        if let Some(message) = &self.fail_with {
            return Err(RefetchError::Fetch(message.clone()));
        }
        match &self.result {
            Some(value) => Ok(value.clone()),
            None => Ok(json!({ "echo": params })),
        }
    }
}

/// Blocks inside `fetch` until the test calls [`GatedFetcher::release`],
/// so in-flight state can be observed deterministically.
pub struct GatedFetcher {
    name: String,
    gate: Arc<Semaphore>,
    count: AtomicUsize,
    result: Value,
}

impl GatedFetcher {
    pub fn new(name: impl Into<String>, result: Value) -> Self {
        Self {
            name: name.into(),
            gate: Arc::new(Semaphore::new(0)),
            count: AtomicUsize::new(0),
            result,
        }
    }

    /// Let one pending fetch proceed.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchFunction for GatedFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _params: Option<&Value>, _key: Option<&str>) -> Result<Value> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| RefetchError::fetch(e))?;
        permit.forget();
        Ok(self.result.clone())
    }
}

// ============================================================================
// Memory cache
// ============================================================================

#[derive(Default)]
struct EntryState {
    data: Option<Value>,
    error: Option<RefetchError>,
    validating: bool,
}

/// Minimal revalidating cache honoring the collaborator contract.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Arc<Mutex<EntryState>>>>,
    active: Mutex<HashMap<String, SubscriptionKey>>,
    subscriptions: Mutex<Vec<Option<SubscriptionKey>>>,
}

impl MemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every `subscribe` call observed, in order.
    pub fn subscription_log(&self) -> Vec<Option<SubscriptionKey>> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Whether any entry has a fetch in flight.
    pub fn any_validating(&self) -> bool {
        self.entries
            .lock()
            .unwrap()
            .values()
            .any(|e| e.lock().unwrap().validating)
    }

    /// Yield until every in-flight fetch has settled.
    pub async fn until_idle(&self) {
        while self.any_validating() {
            tokio::task::yield_now().await;
        }
    }

    fn pair_id(key: &SubscriptionKey) -> String {
        match key.params() {
            None => key.key().to_owned(),
            Some(p) => format!("{}|{p}", key.key()),
        }
    }

    fn entry_state(&self, pair: &str) -> Arc<Mutex<EntryState>> {
        Arc::clone(
            self.entries
                .lock()
                .unwrap()
                .entry(pair.to_owned())
                .or_default(),
        )
    }
}

impl RevalidatingCache for MemoryCache {
    fn subscribe(
        &self,
        key: Option<SubscriptionKey>,
        fetcher: Arc<dyn FetchFunction>,
        options: SubscribeOptions,
    ) -> Arc<dyn CacheEntry> {
        self.subscriptions.lock().unwrap().push(key.clone());

        let Some(key) = key else {
            // Suppressed: fresh state, never validating, fallback served.
            return Arc::new(MemoryEntry {
                key: None,
                fetcher,
                options,
                state: Arc::new(Mutex::new(EntryState::default())),
            });
        };

        let pair = Self::pair_id(&key);
        let state = self.entry_state(&pair);

        let changed = {
            let mut active = self.active.lock().unwrap();
            let changed = active.get(key.key()) != Some(&key);
            active.insert(key.key().to_owned(), key.clone());
            changed
        };

        let entry = Arc::new(MemoryEntry {
            key: Some(key),
            fetcher,
            options,
            state,
        });
        if changed {
            entry.clone().start_fetch();
        }
        entry
    }
}

/// One slot handle vended by [`MemoryCache`].
pub struct MemoryEntry {
    key: Option<SubscriptionKey>,
    fetcher: Arc<dyn FetchFunction>,
    options: SubscribeOptions,
    state: Arc<Mutex<EntryState>>,
}

impl MemoryEntry {
    /// Mark the entry in flight and spawn the fetch.
    fn start_fetch(self: Arc<Self>) {
        self.state.lock().unwrap().validating = true;
        let entry = Arc::clone(&self);
        tokio::spawn(async move {
            entry.fetch_once().await;
        });
    }

    async fn fetch_once(&self) {
        let key = self.key.as_ref().expect("fetch on suppressed entry");
        let outcome = self
            .fetcher
            .fetch(key.params(), Some(key.key()))
            .await;
        let mut state = self.state.lock().unwrap();
        match &outcome {
            Ok(data) => {
                state.data = Some(data.clone());
                state.error = None;
            }
            Err(err) => {
                state.error = Some(err.clone());
            }
        }
        state.validating = false;
        drop(state);

        match outcome {
            Ok(data) => {
                if let Some(hook) = &self.options.on_success {
                    hook(&data, key.key());
                }
            }
            Err(err) => {
                if let Some(hook) = &self.options.on_error {
                    hook(&err, key.key());
                }
            }
        }
    }
}

#[async_trait]
impl CacheEntry for MemoryEntry {
    fn data(&self) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .data
            .clone()
            .or_else(|| self.options.fallback_data.clone())
    }

    fn error(&self) -> Option<RefetchError> {
        self.state.lock().unwrap().error.clone()
    }

    fn is_validating(&self) -> bool {
        self.state.lock().unwrap().validating
    }

    async fn mutate(&self, data: Option<Value>, revalidate: bool) -> Result<Option<Value>> {
        if self.key.is_none() {
            return Ok(None);
        }
        {
            let mut state = self.state.lock().unwrap();
            state.data = data;
        }
        if revalidate {
            self.state.lock().unwrap().validating = true;
            self.fetch_once().await;
        }
        Ok(self.state.lock().unwrap().data.clone())
    }
}
