//! Refetch - request-lifecycle controller for revalidating caches
//!
//! This crate decides, for a single logical request, *when* a fetch should
//! occur (automatic-on-construction vs. strictly manual), *what composite
//! key* identifies the request's cached slot, and exposes `run` / `refresh`
//! / `mutate` conveniences. Caching, deduplication and revalidation are
//! delegated entirely to an external [`RevalidatingCache`] collaborator,
//! and the actual I/O to a caller-supplied [`FetchFunction`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use refetch::{FetcherFn, RequestController, RequestOptions};
//! use serde_json::json;
//!
//! let fetcher = Arc::new(FetcherFn::new("get_json_data", |params, _key| {
//!     Box::pin(async move {
//!         // ... perform the actual request with `params`
//!         Ok(json!({ "items": [] }))
//!     })
//! }));
//!
//! // `cache` is any Arc<dyn RevalidatingCache> implementation.
//! let controller = RequestController::new(
//!     fetcher,
//!     cache,
//!     RequestOptions::new()
//!         .manual()
//!         .params(json!({ "keywords": "cache" }))
//!         .initial_data(json!({ "items": [] })),
//! );
//!
//! // Manual mode: nothing fetched yet, loading() is false.
//! let data = controller.run(Some(json!({ "keywords": "1" })), false).await?;
//! ```
//!
//! # Collaborator contract
//!
//! The cache primitive is out of scope here; implementations must honor the
//! contract documented on [`RevalidatingCache`] and [`CacheEntry`], most
//! importantly that a `None` subscription key suppresses fetching and
//! reports `is_validating = false`.

pub mod controller;
pub mod error;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use controller::RequestController;
pub use error::{RefetchError, Result};
pub use traits::{CacheEntry, FetchFunction, FetcherFn, RevalidatingCache};

// Re-export all types
pub use types::{
    CacheOptions, DEFAULT_REVALIDATE_ON_FOCUS, DataShape, ErrorHook, Mode, RequestOptions,
    RequestSnapshot, SubscribeOptions, SubscriptionKey, SuccessHook,
};
