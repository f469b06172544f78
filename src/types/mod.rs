//! Public types for the refetch API.

mod key;
mod options;
mod shape;
mod snapshot;

pub use key::{Mode, SubscriptionKey, compose, initial_key};
pub use options::{
    CacheOptions, DEFAULT_REVALIDATE_ON_FOCUS, ErrorHook, RequestOptions, SubscribeOptions,
    SuccessHook,
};
pub use shape::{DataShape, merge_fields, params_equal, shallow_clone};
pub use snapshot::RequestSnapshot;
