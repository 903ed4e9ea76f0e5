use std::sync::Mutex;

/// Tallies geocoding outcomes across a resolution run.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    resolved: usize,
    unresolved: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                resolved: 0,
                unresolved: 0,
            }),
        }
    }

    pub fn record_resolved(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.resolved += 1;
        }
    }

    pub fn record_unresolved(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.unresolved += 1;
        }
    }

    /// `(resolved, unresolved)` counts so far.
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.resolved, metrics.unresolved)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
