//! Telemetry metric name constants.
//!
//! Centralised metric names for refetch operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `refetch_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `kind` — how a `run` resolved: "fetch" | "refresh" | "noop"
//! - `status` — completion outcome: "ok" | "error"
//! - `revalidate` — whether an overwrite requested revalidation: "true" | "false"

/// Total `run` invocations.
///
/// Labels: `kind` ("fetch" | "refresh" | "noop").
pub const RUNS_TOTAL: &str = "refetch_runs_total";

/// Total explicit revalidations (direct `refresh` calls plus `run`
/// short-circuits).
pub const REFRESHES_TOTAL: &str = "refetch_refreshes_total";

/// Total overwrite operations (`mutate` and raw `cache_mutate`).
///
/// Labels: `revalidate` ("true" | "false").
pub const MUTATIONS_TOTAL: &str = "refetch_mutations_total";

/// Total fetch completions observed through the collaborator's hooks.
///
/// Labels: `status` ("ok" | "error").
pub const COMPLETIONS_TOTAL: &str = "refetch_completions_total";
