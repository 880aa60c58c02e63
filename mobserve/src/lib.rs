//! Production-friendly observability hooks for chain runs and client
//! operations.
//!
//! ```rust
//! use mobserve::{MetricsObservabilityHooks, SafeChainHooks, TracingObservabilityHooks};
//!
//! let _chain_hooks = SafeChainHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeChainHooks, SafeOperationHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeChainHooks, SafeOperationHooks, TracingObservabilityHooks,
    };
}
