use crate::api::{ApiResult, RestaurantQuery};
use crate::map::debounce::Debouncer;
use crate::map::geolocation::{GeolocationAdapter, GeolocationError};
use crate::map::orchestrator::{ApplyOutcome, FetchOrchestrator, FetchTicket};
use crate::map::overlay::OverlayState;
use crate::map::viewport::{ViewportSnapshot, ViewportState};
use crate::model::{BoundingBox, CategoryFilter, LatLng, RestaurantId, RestaurantSummary};
use crate::telemetry::{FetchMetrics, LogManager, MetricsRecorder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Ajou University main gate.
pub const DEFAULT_CENTER: LatLng = LatLng::new(37.2830, 127.0448);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSettings {
    pub debounce_ms: u64,
    pub initial_center: LatLng,
    pub initial_category: CategoryFilter,
}

impl Default for HomeSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            initial_center: DEFAULT_CENTER,
            initial_category: None,
        }
    }
}

impl HomeSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Everything a view needs to render the map page.
#[derive(Debug, Clone)]
pub struct HomeSnapshot {
    pub restaurants: Arc<Vec<RestaurantSummary>>,
    pub viewport: ViewportSnapshot,
    pub map_center: LatLng,
    pub user_location: Option<LatLng>,
    pub hovered: Option<RestaurantId>,
    pub selected: Option<RestaurantId>,
    pub loading: bool,
    pub locating: bool,
    pub metrics: FetchMetrics,
}

/// Page-level owner of the map loop: raw viewport, debounced bounds, the
/// restaurant list, marker interaction and the user location.
///
/// Sans-IO: methods that need the network hand back a [`FetchTicket`], and the
/// driver feeds the response into [`HomeController::apply`].
#[derive(Debug)]
pub struct HomeController {
    viewport: ViewportState,
    debouncer: Debouncer<BoundingBox>,
    settled_bounds: Option<BoundingBox>,
    orchestrator: FetchOrchestrator,
    overlay: OverlayState,
    geolocation: GeolocationAdapter,
    map_center: LatLng,
    logger: LogManager,
}

impl HomeController {
    pub fn new(settings: &HomeSettings) -> Self {
        Self::with_metrics(settings, Arc::new(MetricsRecorder::new()))
    }

    pub fn with_metrics(settings: &HomeSettings, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            viewport: ViewportState::new(settings.initial_category),
            debouncer: Debouncer::new(settings.debounce()),
            settled_bounds: None,
            orchestrator: FetchOrchestrator::with_metrics(metrics),
            overlay: OverlayState::new(),
            geolocation: GeolocationAdapter::new(),
            map_center: settings.initial_center,
            logger: LogManager::new("home"),
        }
    }

    /// Map reported new bounds. Starts (or restarts) the debounce window.
    pub fn bounds_changed(&mut self, bounds: BoundingBox, now: Instant) {
        if self.viewport.set_bounds(bounds) {
            self.debouncer.push(bounds, now);
        }
    }

    /// Category clicks bypass the debouncer and fetch immediately for the
    /// last settled bounds.
    pub fn category_selected(&mut self, category: CategoryFilter) -> Option<FetchTicket> {
        if !self.viewport.set_category(category) {
            return None;
        }
        self.logger
            .record(&format!("category -> {}", crate::model::category::filter_label(category)));
        let bounds = self.settled_bounds?;
        self.orchestrator
            .request(RestaurantQuery::new(bounds, category))
    }

    /// Releases settled bounds whose debounce deadline passed.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        let bounds = self.debouncer.poll(now)?;
        self.settled_bounds = Some(bounds);
        self.orchestrator
            .request(RestaurantQuery::new(bounds, self.viewport.category()))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn has_pending_bounds(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn apply(&mut self, seq: u64, result: ApiResult<Vec<RestaurantSummary>>) -> ApplyOutcome {
        let outcome = self.orchestrator.apply(seq, result);
        if let ApplyOutcome::Applied { .. } = outcome {
            let restaurants = Arc::clone(self.orchestrator.restaurants());
            self.overlay.retain_present(&restaurants);
        }
        outcome
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.orchestrator.is_current(seq)
    }

    pub fn hover(&mut self, id: RestaurantId) {
        self.overlay.hover(id);
    }

    pub fn unhover(&mut self, id: RestaurantId) {
        self.overlay.unhover(id);
    }

    pub fn clear_hover(&mut self) {
        self.overlay.clear_hover();
    }

    pub fn select(&mut self, id: RestaurantId) {
        self.overlay.select(id);
    }

    pub fn dismiss(&mut self) {
        self.overlay.dismiss();
    }

    /// Map moved its center (drag, zoom anchor, recenter).
    pub fn set_map_center(&mut self, center: LatLng) {
        self.map_center = center;
    }

    pub fn begin_locate(&mut self) -> bool {
        self.geolocation.begin()
    }

    /// Stores the user location and recenters the map. Bounds follow from the
    /// map's own bounds-changed event after it moves.
    pub fn finish_locate(
        &mut self,
        result: Result<LatLng, GeolocationError>,
    ) -> Result<LatLng, GeolocationError> {
        let result = self.geolocation.finish(result);
        match &result {
            Ok(position) => {
                self.map_center = *position;
                self.logger.record(&format!(
                    "recentered on user at ({:.5}, {:.5})",
                    position.lat, position.lng
                ));
            }
            Err(err) => self.logger.warn(&format!("geolocation failed: {err}")),
        }
        result
    }

    /// Cancels the pending debounce and forgets the in-flight request.
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        self.orchestrator.abandon();
    }

    pub fn restaurants(&self) -> &Arc<Vec<RestaurantSummary>> {
        self.orchestrator.restaurants()
    }

    pub fn restaurant(&self, id: RestaurantId) -> Option<&RestaurantSummary> {
        self.restaurants().iter().find(|r| r.id == id)
    }

    pub fn hovered(&self) -> Option<&RestaurantSummary> {
        self.overlay.hovered().and_then(|id| self.restaurant(id))
    }

    pub fn selected_id(&self) -> Option<RestaurantId> {
        self.overlay.selected()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn category(&self) -> CategoryFilter {
        self.viewport.category()
    }

    pub fn map_center(&self) -> LatLng {
        self.map_center
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.geolocation.user_location()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn is_locating(&self) -> bool {
        self.geolocation.is_busy()
    }

    pub fn metrics(&self) -> FetchMetrics {
        self.orchestrator.metrics()
    }

    pub fn snapshot(&self) -> HomeSnapshot {
        HomeSnapshot {
            restaurants: Arc::clone(self.restaurants()),
            viewport: self.viewport.snapshot(),
            map_center: self.map_center,
            user_location: self.user_location(),
            hovered: self.overlay.hovered(),
            selected: self.overlay.selected(),
            loading: self.is_loading(),
            locating: self.is_locating(),
            metrics: self.metrics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test_support::restaurant;

    fn bounds(offset: f64) -> BoundingBox {
        BoundingBox::new(37.28 + offset, 127.05 + offset, 37.27 + offset, 127.04 + offset).unwrap()
    }

    fn controller() -> HomeController {
        HomeController::new(&HomeSettings::default())
    }

    #[test]
    fn drag_burst_yields_one_ticket_with_last_bounds() {
        let mut home = controller();
        let start = Instant::now();
        for step in 0..6u64 {
            let at = start + Duration::from_millis(step * 50);
            home.bounds_changed(bounds(step as f64 * 0.001), at);
            assert!(home.poll(at).is_none());
        }
        let deadline = home.next_deadline().unwrap();
        let ticket = home.poll(deadline).unwrap();
        assert_eq!(ticket.query.bounds, bounds(5_f64 * 0.001));
        assert!(home.poll(deadline + Duration::from_secs(1)).is_none());
        assert_eq!(home.metrics().issued, 1);
    }

    #[test]
    fn identical_bounds_do_not_refetch() {
        let mut home = controller();
        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        assert!(home.poll(start + Duration::from_secs(1)).is_some());

        home.bounds_changed(bounds(0.0), start + Duration::from_secs(2));
        assert!(!home.has_pending_bounds());
        assert!(home.poll(start + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn bounds_returning_to_fetched_value_are_skipped() {
        let mut home = controller();
        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        assert!(home.poll(start + Duration::from_secs(1)).is_some());

        home.bounds_changed(bounds(0.01), start + Duration::from_secs(2));
        home.bounds_changed(bounds(0.0), start + Duration::from_millis(2100));
        assert!(home.poll(start + Duration::from_secs(3)).is_none());
        assert_eq!(home.metrics().skipped, 1);
    }

    #[test]
    fn category_fetches_immediately_once_bounds_settled() {
        let mut home = controller();
        assert!(home.category_selected(Some(Category::Korean)).is_none());

        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        let ticket = home.poll(start + Duration::from_secs(1)).unwrap();
        assert_eq!(ticket.query.category, Some(Category::Korean));

        let ticket = home.category_selected(Some(Category::Cafe)).unwrap();
        assert_eq!(ticket.query.bounds, bounds(0.0));
        assert_eq!(ticket.query.category, Some(Category::Cafe));
        assert!(home.category_selected(Some(Category::Cafe)).is_none());
    }

    #[test]
    fn applied_list_clears_dangling_hover() {
        let mut home = controller();
        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        let ticket = home.poll(start + Duration::from_secs(1)).unwrap();
        home.apply(ticket.seq, Ok(vec![restaurant(1), restaurant(2)]));
        home.hover(1);
        home.select(2);
        assert_eq!(home.hovered().map(|r| r.id), Some(1));

        home.bounds_changed(bounds(0.05), start + Duration::from_secs(2));
        let ticket = home.poll(start + Duration::from_secs(3)).unwrap();
        home.apply(ticket.seq, Ok(vec![restaurant(2), restaurant(3)]));
        assert!(home.hovered().is_none());
        assert_eq!(home.selected_id(), Some(2));
    }

    #[test]
    fn locate_moves_center_but_not_bounds() {
        let mut home = controller();
        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        home.poll(start + Duration::from_secs(1));

        assert!(home.begin_locate());
        assert!(!home.begin_locate());
        let here = LatLng::new(37.2901, 127.0512);
        assert_eq!(home.finish_locate(Ok(here)), Ok(here));
        assert_eq!(home.map_center(), here);
        assert_eq!(home.user_location(), Some(here));
        assert_eq!(home.viewport().bounds(), Some(bounds(0.0)));
        assert!(!home.has_pending_bounds());
    }

    #[test]
    fn teardown_drops_pending_bounds() {
        let mut home = controller();
        let start = Instant::now();
        home.bounds_changed(bounds(0.0), start);
        home.teardown();
        assert!(home.poll(start + Duration::from_secs(5)).is_none());
    }
}
