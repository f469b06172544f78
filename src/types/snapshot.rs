//! One-shot read of a controller's observable state.

use serde_json::Value;

use crate::RefetchError;

/// Everything a caller branches on per render/poll, captured in one read.
///
/// `loading` is derived, not stored: for a suppressed slot it is true only
/// in the never-run-but-pending case; for an active slot it mirrors
/// `is_validating`.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// Derived loading flag (see [`RequestController::loading`](crate::RequestController::loading)).
    pub loading: bool,
    /// Current entry data (fallback data until the first fetch stores
    /// something).
    pub data: Option<Value>,
    /// Error from the most recent failed fetch.
    pub error: Option<RefetchError>,
    /// Parameters the slot is currently subscribed under.
    pub params: Option<Value>,
    /// Raw in-flight flag from the collaborator.
    pub is_validating: bool,
}
