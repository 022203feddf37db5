use crate::map::controller::{HomeController, HomeSnapshot};
use crate::map::geolocation::{self, GeolocationError};
use crate::map::orchestrator::{ApplyOutcome, FetchTicket};
use crate::model::{BoundingBox, CategoryFilter, LatLng, RestaurantId, RestaurantSummary};
use crate::prelude::{LocationProvider, RestaurantSource};
use crate::api::ApiResult;
use crate::telemetry::LogManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

/// Input events for a running map loop, in UI event order.
#[derive(Debug, Clone)]
pub enum HomeCommand {
    BoundsChanged(BoundingBox),
    CategorySelected(CategoryFilter),
    MapCentered(LatLng),
    Hover(RestaurantId),
    Unhover(RestaurantId),
    Select(RestaurantId),
    Dismiss,
    Locate,
    Shutdown,
}

/// Transient user-facing messages (toasts).
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Located(LatLng),
    LocationFailed {
        error: GeolocationError,
        message: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Abort the transport of superseded fetches instead of letting them
    /// finish and be discarded.
    pub cancel_superseded: bool,
    pub location_timeout: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            cancel_superseded: true,
            location_timeout: Duration::from_secs(10),
        }
    }
}

/// Client side of a spawned [`HomeRuntime`].
pub struct HomeHandle {
    commands: mpsc::UnboundedSender<HomeCommand>,
    snapshots: watch::Receiver<HomeSnapshot>,
    notices: mpsc::UnboundedReceiver<Notice>,
}

impl HomeHandle {
    /// Returns `false` once the runtime has stopped.
    pub fn send(&self, command: HomeCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn snapshot(&self) -> HomeSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeSnapshot> {
        self.snapshots.clone()
    }

    pub async fn next_notice(&mut self) -> Option<Notice> {
        self.notices.recv().await
    }

    pub fn try_notice(&mut self) -> Option<Notice> {
        self.notices.try_recv().ok()
    }
}

type FetchResult = (u64, ApiResult<Vec<RestaurantSummary>>);

/// Headless tokio driver for [`HomeController`]: one task owns the controller
/// and reacts to commands, the debounce deadline, fetch completions and
/// geolocation completions, publishing a snapshot after each.
pub struct HomeRuntime<S, L> {
    controller: HomeController,
    source: Arc<S>,
    locator: Arc<L>,
    options: RuntimeOptions,
    snapshots: watch::Sender<HomeSnapshot>,
    notices: mpsc::UnboundedSender<Notice>,
    fetches: JoinSet<FetchResult>,
    locating: JoinSet<Result<LatLng, GeolocationError>>,
    logger: LogManager,
}

impl<S, L> HomeRuntime<S, L>
where
    S: RestaurantSource + 'static,
    L: LocationProvider + 'static,
{
    pub fn spawn(
        controller: HomeController,
        source: S,
        locator: L,
        options: RuntimeOptions,
    ) -> (HomeHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let runtime = HomeRuntime {
            controller,
            source: Arc::new(source),
            locator: Arc::new(locator),
            options,
            snapshots: snapshot_tx,
            notices: notice_tx,
            fetches: JoinSet::new(),
            locating: JoinSet::new(),
            logger: LogManager::new("runtime"),
        };
        let task = tokio::spawn(runtime.run(command_rx));

        let handle = HomeHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            notices: notice_rx,
        };
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<HomeCommand>) {
        loop {
            let deadline = self.controller.next_deadline();
            let wake = deadline
                .map(Instant::from_std)
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            // Commands first: UI events apply in arrival order before any
            // completion that raced with them.
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(HomeCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    if let Some(ticket) = self.controller.poll(Instant::now().into_std()) {
                        self.dispatch(ticket);
                    }
                }
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    match joined {
                        Ok((seq, result)) => {
                            if let ApplyOutcome::Applied { count } = self.controller.apply(seq, result) {
                                self.logger.record(&format!("showing {count} restaurants"));
                            }
                        }
                        Err(err) if err.is_cancelled() => {}
                        Err(err) => self.logger.warn(&format!("fetch task failed: {err}")),
                    }
                }
                Some(joined) = self.locating.join_next(), if !self.locating.is_empty() => {
                    let result = joined.unwrap_or_else(|err| Err(GeolocationError::Other(err.to_string())));
                    let notice = match self.controller.finish_locate(result) {
                        Ok(position) => Notice::Located(position),
                        Err(error) => Notice::LocationFailed {
                            message: error.user_message(),
                            error,
                        },
                    };
                    let _ = self.notices.send(notice);
                }
            }
            self.publish();
        }

        self.controller.teardown();
        self.fetches.abort_all();
        self.locating.abort_all();
        self.publish();
        self.logger.record("map loop stopped");
    }

    fn handle(&mut self, command: HomeCommand) {
        match command {
            HomeCommand::BoundsChanged(bounds) => {
                self.controller
                    .bounds_changed(bounds, Instant::now().into_std());
            }
            HomeCommand::CategorySelected(category) => {
                if let Some(ticket) = self.controller.category_selected(category) {
                    self.dispatch(ticket);
                }
            }
            HomeCommand::MapCentered(center) => self.controller.set_map_center(center),
            HomeCommand::Hover(id) => self.controller.hover(id),
            HomeCommand::Unhover(id) => self.controller.unhover(id),
            HomeCommand::Select(id) => self.controller.select(id),
            HomeCommand::Dismiss => self.controller.dismiss(),
            HomeCommand::Locate => {
                if !self.controller.begin_locate() {
                    self.logger.detail("location request already pending");
                    return;
                }
                let locator = Arc::clone(&self.locator);
                let timeout = self.options.location_timeout;
                self.locating
                    .spawn(async move { geolocation::locate(locator.as_ref(), timeout).await });
            }
            HomeCommand::Shutdown => {}
        }
    }

    fn dispatch(&mut self, ticket: FetchTicket) {
        if self.options.cancel_superseded && !self.fetches.is_empty() {
            self.logger.detail("aborting superseded fetch");
            self.fetches.abort_all();
        }
        let source = Arc::clone(&self.source);
        self.fetches.spawn(async move {
            let result = source.restaurants_in(&ticket.query).await;
            (ticket.seq, result)
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.controller.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, RestaurantQuery};
    use crate::map::controller::HomeSettings;
    use crate::map::geolocation::StaticLocation;
    use crate::model::Category;
    use crate::test_support::restaurant;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers call N with restaurant N after the N-th scripted delay.
    #[derive(Default)]
    struct ScriptedSource {
        calls: Mutex<Vec<RestaurantQuery>>,
        delays: Mutex<VecDeque<Duration>>,
    }

    impl ScriptedSource {
        fn with_delays(delays: &[u64]) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                delays: Mutex::new(delays.iter().map(|ms| Duration::from_millis(*ms)).collect()),
            })
        }

        fn calls(&self) -> Vec<RestaurantQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RestaurantSource for ScriptedSource {
        async fn restaurants_in(&self, query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(*query);
                calls.len() as u64
            };
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(vec![restaurant(index)])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RestaurantSource for FailingSource {
        async fn restaurants_in(&self, _query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>> {
            Err(ApiError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err()))
        }
    }

    fn bounds(offset: f64) -> BoundingBox {
        BoundingBox::new(37.28 + offset, 127.05 + offset, 37.27 + offset, 127.04 + offset).unwrap()
    }

    fn spawn_with<S: RestaurantSource + 'static>(
        source: S,
        cancel_superseded: bool,
    ) -> (HomeHandle, JoinHandle<()>) {
        HomeRuntime::spawn(
            HomeController::new(&HomeSettings::default()),
            source,
            StaticLocation::Denied,
            RuntimeOptions {
                cancel_superseded,
                ..RuntimeOptions::default()
            },
        )
    }

    fn shown_ids(handle: &HomeHandle) -> Vec<RestaurantId> {
        handle.snapshot().restaurants.iter().map(|r| r.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_bounds_trigger_a_single_fetch() {
        let source = ScriptedSource::with_delays(&[]);
        let (handle, _task) = spawn_with(Arc::clone(&source), true);

        for step in 0..5 {
            handle.send(HomeCommand::BoundsChanged(bounds(step as f64 * 0.002)));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bounds, bounds(4_f64 * 0.002));
        assert_eq!(shown_ids(&handle), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_from_older_viewport_is_discarded() {
        let source = ScriptedSource::with_delays(&[500, 50]);
        let (handle, _task) = spawn_with(Arc::clone(&source), false);

        handle.send(HomeCommand::BoundsChanged(bounds(0.0)));
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.send(HomeCommand::BoundsChanged(bounds(0.05)));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(source.calls().len(), 2);
        assert_eq!(shown_ids(&handle), vec![2]);
        let metrics = handle.snapshot().metrics;
        assert_eq!(metrics.applied, 1);
        assert_eq!(metrics.stale, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_is_aborted_when_enabled() {
        let source = ScriptedSource::with_delays(&[500, 50]);
        let (handle, _task) = spawn_with(Arc::clone(&source), true);

        handle.send(HomeCommand::BoundsChanged(bounds(0.0)));
        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.send(HomeCommand::BoundsChanged(bounds(0.05)));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(shown_ids(&handle), vec![2]);
        assert_eq!(handle.snapshot().metrics.stale, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn category_click_fetches_without_waiting() {
        let source = ScriptedSource::with_delays(&[]);
        let (handle, _task) = spawn_with(Arc::clone(&source), true);

        handle.send(HomeCommand::BoundsChanged(bounds(0.0)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.send(HomeCommand::CategorySelected(Some(Category::Korean)));
        tokio::time::sleep(Duration::from_millis(1)).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].category, Some(Category::Korean));
        assert!(calls[1].query_string().contains("category="));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_loop_alive() {
        let (handle, task) = spawn_with(FailingSource, true);
        handle.send(HomeCommand::BoundsChanged(bounds(0.0)));
        tokio::time::sleep(Duration::from_secs(1)).await;

        let snapshot = handle.snapshot();
        assert!(snapshot.restaurants.is_empty());
        assert_eq!(snapshot.metrics.failed, 1);
        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn denied_location_reports_permission_message() {
        let (mut handle, _task) = spawn_with(ScriptedSource::with_delays(&[]), true);
        handle.send(HomeCommand::Locate);
        handle.send(HomeCommand::Locate);

        let notice = handle.next_notice().await.unwrap();
        assert_eq!(
            notice,
            Notice::LocationFailed {
                error: GeolocationError::PermissionDenied,
                message: GeolocationError::PermissionDenied.user_message(),
            }
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.try_notice().is_none());
        assert!(!handle.snapshot().locating);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_debounce() {
        let source = ScriptedSource::with_delays(&[]);
        let (handle, task) = spawn_with(Arc::clone(&source), true);

        handle.send(HomeCommand::BoundsChanged(bounds(0.0)));
        handle.send(HomeCommand::Shutdown);
        task.await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(source.calls().is_empty());
        assert!(!handle.send(HomeCommand::Dismiss));
    }
}
