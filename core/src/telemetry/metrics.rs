use std::sync::Mutex;

/// Counters for the restaurant fetch loop.
pub struct MetricsRecorder {
    inner: Mutex<FetchMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchMetrics {
    pub issued: usize,
    pub skipped: usize,
    pub applied: usize,
    pub stale: usize,
    pub failed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FetchMetrics::default()),
        }
    }

    fn bump(&self, update: impl FnOnce(&mut FetchMetrics)) {
        if let Ok(mut metrics) = self.inner.lock() {
            update(&mut metrics);
        }
    }

    pub fn record_issued(&self) {
        self.bump(|m| m.issued += 1);
    }

    pub fn record_skipped(&self) {
        self.bump(|m| m.skipped += 1);
    }

    pub fn record_applied(&self) {
        self.bump(|m| m.applied += 1);
    }

    pub fn record_stale(&self) {
        self.bump(|m| m.stale += 1);
    }

    pub fn record_failed(&self) {
        self.bump(|m| m.failed += 1);
    }

    pub fn snapshot(&self) -> FetchMetrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MetricsRecorder")
            .field(&self.snapshot())
            .finish()
    }
}
