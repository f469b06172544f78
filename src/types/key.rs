//! Key composition and mode gating.
//!
//! A controller's cache slot is identified by a *composite key*: the fetch
//! function's name concatenated with a caller-chosen discriminator. The
//! composite is computed once at construction and never recomputed; it is
//! only toggled between "live" and `None` (suppressed). That `Option` is the
//! controller's only suppressed-vs-active signal; there is no separate
//! "has started" flag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When the controller issues its first fetch.
///
/// Fixed at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The composite key is live immediately; the cache fetches on
    /// construction.
    #[default]
    Automatic,
    /// The composite key starts suppressed (`None`) until the caller invokes
    /// [`run`](crate::RequestController::run).
    Manual,
}

/// Compose the stable slot identifier from a fetch function's name and a
/// discriminator.
///
/// Pure concatenation, no error conditions. An empty name degrades to
/// collisions across all anonymous fetchers sharing a discriminator, a
/// documented risk that is not handled defensively here.
pub fn compose(fetcher_name: &str, discriminator: &str) -> String {
    format!("{fetcher_name}{discriminator}")
}

/// Gate the composite key on the controller's mode.
///
/// `Manual` starts suppressed; `Automatic` starts live.
pub fn initial_key(mode: Mode, composite: &str) -> Option<String> {
    match mode {
        Mode::Manual => None,
        Mode::Automatic => Some(composite.to_owned()),
    }
}

/// Effective subscription key handed to the collaborator.
///
/// Mirrors the `key | [key, params]` union of the cache contract: a bare
/// composite when parameters are absent, composite plus parameters
/// otherwise. Changing either half replaces the subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionKey {
    /// Composite key with no parameters.
    Bare(String),
    /// Composite key paired with request parameters.
    WithParams(String, Value),
}

impl SubscriptionKey {
    /// Build the effective key for a composite and optional parameters.
    pub fn new(composite: impl Into<String>, params: Option<&Value>) -> Self {
        match params {
            None => SubscriptionKey::Bare(composite.into()),
            Some(p) => SubscriptionKey::WithParams(composite.into(), p.clone()),
        }
    }

    /// The composite-key half.
    pub fn key(&self) -> &str {
        match self {
            SubscriptionKey::Bare(k) => k,
            SubscriptionKey::WithParams(k, _) => k,
        }
    }

    /// The parameter half, if any.
    pub fn params(&self) -> Option<&Value> {
        match self {
            SubscriptionKey::Bare(_) => None,
            SubscriptionKey::WithParams(_, p) => Some(p),
        }
    }
}
