use crate::api::{ApiResult, RestaurantQuery};
use crate::model::RestaurantSummary;
use crate::telemetry::{FetchMetrics, LogManager, MetricsRecorder};
use std::sync::Arc;

/// A request the caller must execute and hand back to [`FetchOrchestrator::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: RestaurantQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { count: usize },
    /// Result of a superseded request; dropped unseen.
    Stale,
    /// Current request failed; the previous list stays on screen.
    Failed,
}

/// Owns the visible restaurant list and decides which responses may replace it.
///
/// Each issued request carries a sequence number. Only the most recently issued
/// one may be applied, so responses that resolve out of order can never put an
/// older viewport's data on screen.
#[derive(Debug)]
pub struct FetchOrchestrator {
    next_seq: u64,
    awaiting: Option<u64>,
    last_query: Option<RestaurantQuery>,
    restaurants: Arc<Vec<RestaurantSummary>>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(MetricsRecorder::new()))
    }

    pub fn with_metrics(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            next_seq: 1,
            awaiting: None,
            last_query: None,
            restaurants: Arc::new(Vec::new()),
            metrics,
            logger: LogManager::new("fetch"),
        }
    }

    /// Issues a ticket for `query` unless it equals the last issued query.
    pub fn request(&mut self, query: RestaurantQuery) -> Option<FetchTicket> {
        if self.last_query == Some(query) {
            self.metrics.record_skipped();
            self.logger
                .detail("query unchanged since last request, skipping");
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.awaiting = Some(seq);
        self.last_query = Some(query);
        self.metrics.record_issued();
        self.logger
            .detail(&format!("#{seq} GET restaurants?{}", query.query_string()));
        Some(FetchTicket { seq, query })
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.awaiting == Some(seq)
    }

    pub fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn apply(&mut self, seq: u64, result: ApiResult<Vec<RestaurantSummary>>) -> ApplyOutcome {
        if !self.is_current(seq) {
            self.metrics.record_stale();
            self.logger
                .detail(&format!("#{seq} superseded, discarding response"));
            return ApplyOutcome::Stale;
        }
        self.awaiting = None;
        match result {
            Ok(restaurants) => {
                let count = restaurants.len();
                self.restaurants = Arc::new(restaurants);
                self.metrics.record_applied();
                self.logger
                    .detail(&format!("#{seq} applied {count} restaurants"));
                ApplyOutcome::Applied { count }
            }
            Err(err) => {
                self.metrics.record_failed();
                self.logger
                    .warn(&format!("#{seq} restaurant fetch failed: {err}"));
                ApplyOutcome::Failed
            }
        }
    }

    /// Forgets the pending request, e.g. on teardown. Its result will be stale.
    pub fn abandon(&mut self) {
        self.awaiting = None;
    }

    pub fn restaurants(&self) -> &Arc<Vec<RestaurantSummary>> {
        &self.restaurants
    }

    pub fn metrics(&self) -> FetchMetrics {
        self.metrics.snapshot()
    }
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
