//! Logging facilities for shared-selection.
//!
//! shared-selection uses the `tracing` crate for instrumentation. Library
//! code never installs a subscriber; to see logs, install one in your
//! application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("shared_selection::tracker=debug"))
//!         .init();
//!
//!     // ...
//! }
//! ```

/// Span names used throughout shared-selection for tracing.
pub mod span_names {
    /// Bulk replacement of a shared collection.
    pub const UPDATE: &str = "shared_selection::update";
    /// Selection resolution inside a tracker.
    pub const RESOLVE: &str = "shared_selection::resolve";
}

/// `tracing` targets, one per subsystem, for use in filter directives.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "shared_selection_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "shared_selection_core::signal";
    /// Ordered unique collection target.
    pub const COLLECTION: &str = "shared_selection::collection";
    /// Shared collection update protocol target.
    pub const UPDATE: &str = "shared_selection::update";
    /// Selection tracker target.
    pub const TRACKER: &str = "shared_selection::tracker";
    /// Typed row entries target.
    pub const ROW: &str = "shared_selection::row";
    /// Performance spans target.
    pub const PERF: &str = "shared_selection::perf";
}

/// Performance tracing span guard.
///
/// Enters an `info`-level span on the [`targets::PERF`] target for as long
/// as the guard lives. Subscribers that record span timings can use it to
/// profile expensive operations such as bulk updates.
///
/// # Example
///
/// ```
/// use shared_selection_core::logging::{span_names, PerfSpan};
///
/// let _span = PerfSpan::new(span_names::UPDATE);
/// // ... work measured while the guard is alive ...
/// ```
pub struct PerfSpan {
    _entered: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enters a span tagged with `name` until the guard drops.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "shared_selection::perf", "perf", operation = name);
        Self {
            _entered: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let _span = PerfSpan::new(span_names::UPDATE);
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::COLLECTION,
            targets::UPDATE,
            targets::TRACKER,
            targets::ROW,
            targets::PERF,
        ] {
            assert!(target.starts_with("shared_selection::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
