//! Shared application state.

use std::sync::Arc;

use crate::metrics::Metrics;
use crate::reconciler::Reconciler;

/// Shared application state.
pub struct AppState {
    /// Reconciler invoked once per event.
    pub reconciler: Reconciler,

    /// Invocation counters.
    pub metrics: Metrics,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(reconciler: Reconciler) -> Arc<Self> {
        Arc::new(Self {
            reconciler,
            metrics: Metrics::new(),
        })
    }
}
