//! Production-friendly observability hooks for relay turns.
//!
//! ```rust
//! use robserve::{CompositeRelayHooks, MetricsRelayHooks, SafeRelayHooks, TracingRelayHooks};
//!
//! let hooks = SafeRelayHooks::new(
//!     CompositeRelayHooks::new()
//!         .with(TracingRelayHooks)
//!         .with(MetricsRelayHooks),
//! );
//! assert_eq!(hooks.inner().len(), 2);
//! ```

mod composite_hooks;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use composite_hooks::CompositeRelayHooks;
pub use metrics_hooks::MetricsRelayHooks;
pub use safe_hooks::SafeRelayHooks;
pub use tracing_hooks::TracingRelayHooks;

pub mod prelude {
    pub use crate::{CompositeRelayHooks, MetricsRelayHooks, SafeRelayHooks, TracingRelayHooks};
}

#[cfg(test)]
mod tests;
