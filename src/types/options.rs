//! Controller and collaborator configuration.
//!
//! Two layers, merged explicitly field by field (no implicit override
//! precedence):
//!
//! - [`RequestOptions`] — how the controller itself behaves (discriminator,
//!   mode, default params, seed data) plus the caller's [`CacheOptions`].
//! - [`SubscribeOptions`] — the fully resolved options handed to the
//!   collaborator on every subscription replacement. Produced by
//!   [`SubscribeOptions::resolve`], which applies the documented defaults
//!   and injects `fallback_data` from `initial_data`.

use std::sync::Arc;

use serde_json::Value;

use crate::RefetchError;
use crate::types::key::Mode;

/// Default for [`SubscribeOptions::revalidate_on_focus`].
///
/// The controller opts out of focus-driven revalidation unless the caller
/// explicitly asks for it.
pub const DEFAULT_REVALIDATE_ON_FOCUS: bool = false;

/// Hook invoked after a successful fetch, with the data and composite key.
pub type SuccessHook = Arc<dyn Fn(&Value, &str) + Send + Sync>;

/// Hook invoked after a failed fetch, with the error and composite key.
pub type ErrorHook = Arc<dyn Fn(&RefetchError, &str) + Send + Sync>;

/// Options for constructing a [`RequestController`](crate::RequestController).
///
/// ```rust
/// use refetch::{Mode, RequestOptions};
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .discriminator("detail")
///     .mode(Mode::Manual)
///     .params(json!({ "keywords": "cache" }))
///     .initial_data(json!({ "data": [] }));
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Disambiguates multiple controllers wrapping the same fetch function.
    /// Default: `""`.
    pub discriminator: String,
    /// Automatic (fetch on construction) or Manual (suppressed until `run`).
    pub mode: Mode,
    /// Default request parameters. Default: `None`.
    pub params: Option<Value>,
    /// Seed data, injected as the collaborator's fallback. Default: `None`.
    pub initial_data: Option<Value>,
    /// Caller-supplied collaborator knobs and hooks.
    pub cache: CacheOptions,
}

impl RequestOptions {
    /// Create options with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discriminator string.
    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = discriminator.into();
        self
    }

    /// Set the execution mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for [`Mode::Manual`].
    pub fn manual(self) -> Self {
        self.mode(Mode::Manual)
    }

    /// Set the default request parameters.
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the seed data handed to the collaborator as fallback.
    pub fn initial_data(mut self, data: Value) -> Self {
        self.initial_data = Some(data);
        self
    }

    /// Set the caller-level cache options.
    pub fn cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }
}

/// Caller-supplied collaborator options.
///
/// Unset fields fall back to the documented defaults during
/// [`SubscribeOptions::resolve`].
#[derive(Clone, Default)]
pub struct CacheOptions {
    /// Override for focus-driven revalidation. `None` = use
    /// [`DEFAULT_REVALIDATE_ON_FOCUS`].
    pub revalidate_on_focus: Option<bool>,
    /// Invoked after each successful fetch (after the controller's own
    /// completion bookkeeping).
    pub on_success: Option<SuccessHook>,
    /// Invoked after each failed fetch (after the controller's own
    /// completion bookkeeping).
    pub on_error: Option<ErrorHook>,
}

impl CacheOptions {
    /// Create empty caller options (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt in or out of focus-driven revalidation.
    pub fn revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = Some(enabled);
        self
    }

    /// Register a success hook.
    pub fn on_success(mut self, hook: SuccessHook) -> Self {
        self.on_success = Some(hook);
        self
    }

    /// Register an error hook.
    pub fn on_error(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }
}

/// Fully resolved options handed to the collaborator.
///
/// The controller resolves these once at construction: caller overrides
/// applied over defaults, `fallback_data` injected from `initial_data`, and
/// the hooks replaced by wrappers that settle the completion bridge before
/// forwarding to the caller's own hooks.
#[derive(Clone)]
pub struct SubscribeOptions {
    /// Whether the collaborator should revalidate when the owning surface
    /// regains focus.
    pub revalidate_on_focus: bool,
    /// Data reported by the entry until a fetch has stored something.
    pub fallback_data: Option<Value>,
    /// Hook the collaborator must invoke after each successful fetch.
    pub on_success: Option<SuccessHook>,
    /// Hook the collaborator must invoke after each failed fetch.
    pub on_error: Option<ErrorHook>,
}

impl SubscribeOptions {
    /// Merge caller options over the defaults, field by field.
    pub fn resolve(cache: &CacheOptions, initial_data: Option<Value>) -> Self {
        Self {
            revalidate_on_focus: cache
                .revalidate_on_focus
                .unwrap_or(DEFAULT_REVALIDATE_ON_FOCUS),
            fallback_data: initial_data,
            on_success: cache.on_success.clone(),
            on_error: cache.on_error.clone(),
        }
    }
}
