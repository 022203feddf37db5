use crate::config::ClientConfig;
use crate::map::{Camera, MapEvent};
use hankkicore::api::{ApiClient, ApiError, ApiResult, RecommendationRequest};
use hankkicore::map::{
    geolocation, ApplyOutcome, FetchTicket, GeolocationError, HomeController, RuntimeOptions,
    StaticLocation,
};
use hankkicore::model::{
    CategoryFilter, LatLng, MyReviewsResponse, RankingPeriod, RankingRestaurant, RestaurantDetail,
    RestaurantId, RestaurantRecommendation, RestaurantSummary, Review, ReviewDraft, VisitOutcome,
    VisitsResponse,
};
use hankkicore::present::RestaurantCache;
use hankkicore::session::Session;
use iced::{task, Size, Task};
use log::{info, warn};
use std::time::Instant;

pub const HISTORY_LIMIT: usize = 20;

/// Used until the canvas reports its real size.
const INITIAL_MAP_SIZE: Size = Size {
    width: 900.0,
    height: 620.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Map,
    Rankings,
    Guide,
    Recommend,
    MyPage,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Map,
        Page::Rankings,
        Page::Guide,
        Page::Recommend,
        Page::MyPage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Map => "맛집 지도",
            Page::Rankings => "방문 랭킹",
            Page::Guide => "아슐랭 가이드",
            Page::Recommend => "메뉴 추천",
            Page::MyPage => "마이페이지",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MyTab {
    Reviews,
    Visits,
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    Navigate(Page),
    Map(MapEvent),
    CategoryPicked(CategoryFilter),
    RestaurantsLoaded(u64, ApiResult<Vec<RestaurantSummary>>),
    LocateMe,
    Located(Result<LatLng, GeolocationError>),
    ShowRestaurant(RestaurantSummary),
    ClosePanel,
    DetailLoaded(RestaurantId, ApiResult<RestaurantDetail>),
    ReviewsLoaded(RestaurantId, ApiResult<Vec<Review>>),
    ScorePicked(u8),
    CommentEdited(String),
    SubmitReview,
    ReviewSubmitted(RestaurantId, ApiResult<()>),
    RecordVisit,
    VisitRecorded(RestaurantId, ApiResult<VisitOutcome>),
    RankingPeriodPicked(RankingPeriod),
    RankingCategoryPicked(CategoryFilter),
    RankingsLoaded(u64, ApiResult<Vec<RankingRestaurant>>),
    GuideCategoryPicked(CategoryFilter),
    GuideLoaded(u64, ApiResult<Vec<RestaurantSummary>>),
    SituationEdited(String),
    SituationPreset(&'static str),
    RecommendCategoryPicked(CategoryFilter),
    SubmitRecommendation,
    RecommendationsLoaded(ApiResult<Vec<RestaurantRecommendation>>),
    AuthCodeEdited(String),
    Login,
    Logout,
    SessionRefreshed(Session),
    LoginFinished(Session, ApiResult<()>),
    LogoutFinished(Session, ApiResult<()>),
    MyTabPicked(MyTab),
    MyPageTurned(u32),
    MyReviewsLoaded(ApiResult<MyReviewsResponse>),
    MyVisitsLoaded(ApiResult<VisitsResponse>),
    RestaurantCached(ApiResult<RestaurantDetail>),
}

/// Restaurant detail side panel on the map page.
#[derive(Debug, Default)]
pub struct DetailPanel {
    pub id: Option<RestaurantId>,
    pub detail: Option<RestaurantDetail>,
    pub reviews: Vec<Review>,
    pub loading: bool,
    pub error: Option<String>,
    pub draft: ReviewDraft,
    pub submitting: bool,
    pub form_error: Option<String>,
    pub visiting: bool,
    /// Opened from another page rather than a marker click.
    pub pinned: bool,
}

impl DetailPanel {
    fn opening(id: RestaurantId) -> Self {
        Self {
            id: Some(id),
            loading: true,
            ..Default::default()
        }
    }

    fn is_showing(&self, id: RestaurantId) -> bool {
        self.id == Some(id)
    }
}

/// List page state shared by the ranking and guide tabs. `request` tags the
/// latest load so slower earlier loads are ignored.
#[derive(Debug)]
pub struct ListPage<T> {
    pub category: CategoryFilter,
    pub entries: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    request: u64,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            category: None,
            entries: Vec::new(),
            loading: false,
            error: None,
            request: 0,
        }
    }
}

impl<T> ListPage<T> {
    fn begin(&mut self) -> u64 {
        self.request += 1;
        self.loading = true;
        self.error = None;
        self.request
    }

    fn finish(&mut self, request: u64, result: ApiResult<Vec<T>>) {
        if request != self.request {
            return;
        }
        self.loading = false;
        match result {
            Ok(entries) => self.entries = entries,
            Err(err) => {
                self.entries.clear();
                self.error = Some(err.user_message());
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RecommendPage {
    pub situation: String,
    pub category: CategoryFilter,
    pub results: Vec<RestaurantRecommendation>,
    pub loading: bool,
    pub searched: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct MyPage {
    pub auth_code: String,
    pub tab: MyTab,
    pub page: u32,
    pub reviews: Option<MyReviewsResponse>,
    pub visits: Option<VisitsResponse>,
    pub loading: bool,
    pub busy: bool,
    pub error: Option<String>,
    pub cache: RestaurantCache,
}

impl Default for MyPage {
    fn default() -> Self {
        Self {
            auth_code: String::new(),
            tab: MyTab::Reviews,
            page: 1,
            reviews: None,
            visits: None,
            loading: false,
            busy: false,
            error: None,
            cache: RestaurantCache::new(),
        }
    }
}

pub struct MapView {
    pub client: ApiClient,
    pub session: Session,
    pub home: HomeController,
    pub camera: Camera,
    pub map_size: Size,
    locator: StaticLocation,
    options: RuntimeOptions,
    in_flight: Option<task::Handle>,
    pub page: Page,
    pub detail: DetailPanel,
    pub ranking_period: RankingPeriod,
    pub rankings: ListPage<RankingRestaurant>,
    pub guide: ListPage<RestaurantSummary>,
    pub recommend: RecommendPage,
    pub my: MyPage,
    pub status: String,
    pub history: Vec<String>,
}

fn error_text(err: &ApiError) -> String {
    match err {
        ApiError::Status { .. } | ApiError::Validation(_) => err.user_message(),
        other => other.to_string(),
    }
}

impl MapView {
    pub fn boot(config: &ClientConfig, client: ApiClient, session: Session) -> (Self, Task<Message>) {
        let mut app = MapView {
            home: HomeController::new(&config.home_settings()),
            camera: Camera::new(config.initial_center, config.initial_zoom),
            map_size: INITIAL_MAP_SIZE,
            locator: config.location.clone(),
            options: config.runtime_options(),
            in_flight: None,
            page: Page::Map,
            detail: DetailPanel::default(),
            ranking_period: RankingPeriod::Daily,
            rankings: ListPage::default(),
            guide: ListPage::default(),
            recommend: RecommendPage::default(),
            my: MyPage::default(),
            status: "지도를 준비하는 중...".into(),
            history: Vec::new(),
            client,
            session,
        };
        app.camera_changed();

        let refresh = if app.session.is_logged_in() {
            let client = app.client.clone();
            let mut session = app.session.clone();
            Task::perform(
                async move {
                    session.refresh(&client).await;
                    session
                },
                Message::SessionRefreshed,
            )
        } else {
            Task::none()
        };
        (app, refresh)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => match self.home.poll(Instant::now()) {
                Some(ticket) => self.dispatch(ticket),
                None => Task::none(),
            },
            Message::Navigate(page) => self.navigate(page),
            Message::Map(event) => self.on_map_event(event),
            Message::CategoryPicked(category) => match self.home.category_selected(category) {
                Some(ticket) => self.dispatch(ticket),
                None => Task::none(),
            },
            Message::RestaurantsLoaded(seq, result) => {
                self.on_restaurants(seq, result);
                Task::none()
            }
            Message::LocateMe => {
                if !self.home.begin_locate() {
                    return Task::none();
                }
                self.status = "현재 위치를 확인하는 중...".into();
                let locator = self.locator.clone();
                let timeout = self.options.location_timeout;
                Task::perform(
                    async move { geolocation::locate(&locator, timeout).await },
                    Message::Located,
                )
            }
            Message::Located(result) => {
                match self.home.finish_locate(result) {
                    Ok(position) => {
                        self.camera.center = position;
                        self.camera_changed();
                        self.status = "현재 위치로 이동했습니다.".into();
                        self.push_history(format!(
                            "내 위치: ({:.5}, {:.5})",
                            position.lat, position.lng
                        ));
                    }
                    Err(err) => {
                        self.status = err.user_message().into();
                        self.push_history(format!("위치 확인 실패: {err}"));
                    }
                }
                Task::none()
            }
            Message::ShowRestaurant(restaurant) => {
                let mut tasks = vec![self.navigate(Page::Map)];
                if let Some(ticket) = self.home.category_selected(None) {
                    tasks.push(self.dispatch(ticket));
                }
                if let Some(position) = restaurant.position() {
                    self.camera.center = position;
                    self.camera_changed();
                }
                tasks.push(self.open_detail(restaurant.id));
                self.detail.pinned = true;
                Task::batch(tasks)
            }
            Message::ClosePanel => {
                self.home.dismiss();
                self.detail = DetailPanel::default();
                Task::none()
            }
            Message::DetailLoaded(id, result) => {
                if self.detail.is_showing(id) {
                    self.detail.loading = false;
                    match result {
                        Ok(detail) => self.detail.detail = Some(detail),
                        Err(err) => self.detail.error = Some(error_text(&err)),
                    }
                }
                Task::none()
            }
            Message::ReviewsLoaded(id, result) => {
                if self.detail.is_showing(id) {
                    match result {
                        Ok(reviews) => self.detail.reviews = reviews,
                        Err(err) => warn!("reviews for {id} failed: {err}"),
                    }
                }
                Task::none()
            }
            Message::ScorePicked(score) => {
                self.detail.draft.score = score;
                self.detail.form_error = None;
                Task::none()
            }
            Message::CommentEdited(comment) => {
                self.detail.draft.comment = comment;
                self.detail.form_error = None;
                Task::none()
            }
            Message::SubmitReview => self.submit_review(),
            Message::ReviewSubmitted(id, result) => {
                if !self.detail.is_showing(id) {
                    return Task::none();
                }
                self.detail.submitting = false;
                match result {
                    Ok(()) => {
                        self.detail.draft.reset();
                        self.status = "리뷰가 등록되었습니다.".into();
                        self.push_history(format!("리뷰 작성: #{id}"));
                        self.load_detail(id)
                    }
                    Err(err) => {
                        self.detail.form_error = Some(error_text(&err));
                        Task::none()
                    }
                }
            }
            Message::RecordVisit => self.record_visit(),
            Message::VisitRecorded(id, result) => {
                let showing = self.detail.is_showing(id);
                if showing {
                    self.detail.visiting = false;
                }
                match result {
                    Ok(outcome) => {
                        if outcome == VisitOutcome::Recorded {
                            if let Some(detail) = self.detail.detail.as_mut().filter(|_| showing) {
                                detail.summary.visit_count += 1;
                            }
                            self.push_history(format!("방문 기록: #{id}"));
                        }
                        self.status = outcome.message().into();
                    }
                    Err(err) => self.status = error_text(&err),
                }
                Task::none()
            }
            Message::RankingPeriodPicked(period) => {
                self.ranking_period = period;
                self.load_rankings()
            }
            Message::RankingCategoryPicked(category) => {
                self.rankings.category = category;
                self.load_rankings()
            }
            Message::RankingsLoaded(request, result) => {
                self.rankings.finish(request, result);
                Task::none()
            }
            Message::GuideCategoryPicked(category) => {
                self.guide.category = category;
                self.load_guide()
            }
            Message::GuideLoaded(request, result) => {
                self.guide.finish(request, result);
                Task::none()
            }
            Message::SituationEdited(text) => {
                self.recommend.situation = text;
                Task::none()
            }
            Message::SituationPreset(text) => {
                self.recommend.situation = text.to_string();
                Task::none()
            }
            Message::RecommendCategoryPicked(category) => {
                self.recommend.category = category;
                Task::none()
            }
            Message::SubmitRecommendation => self.submit_recommendation(),
            Message::RecommendationsLoaded(result) => {
                self.recommend.loading = false;
                self.recommend.searched = true;
                match result {
                    Ok(results) => self.recommend.results = results,
                    Err(err) => {
                        self.recommend.results.clear();
                        self.recommend.error = Some(error_text(&err));
                    }
                }
                Task::none()
            }
            Message::AuthCodeEdited(code) => {
                self.my.auth_code = code;
                Task::none()
            }
            Message::Login => {
                let code = self.my.auth_code.trim().to_string();
                if code.is_empty() || self.my.busy {
                    return Task::none();
                }
                self.my.busy = true;
                self.my.error = None;
                let client = self.client.clone();
                let mut session = self.session.clone();
                Task::perform(
                    async move {
                        let result = session.login_with_code(&client, &code).await;
                        (session, result)
                    },
                    |(session, result)| Message::LoginFinished(session, result),
                )
            }
            Message::Logout => {
                if self.my.busy {
                    return Task::none();
                }
                self.my.busy = true;
                let client = self.client.clone();
                let mut session = self.session.clone();
                Task::perform(
                    async move {
                        let result = session.logout(&client).await;
                        (session, result)
                    },
                    |(session, result)| Message::LogoutFinished(session, result),
                )
            }
            Message::SessionRefreshed(session) => {
                self.session = session;
                if !self.session.is_logged_in() {
                    self.push_history("저장된 로그인 정보가 만료되었습니다.".into());
                }
                Task::none()
            }
            Message::LoginFinished(session, result) => {
                self.session = session;
                self.my.busy = false;
                match result {
                    Ok(()) => {
                        self.my.auth_code.clear();
                        if let Some(user) = self.session.user() {
                            self.status = format!("{}님 환영합니다!", user.user_name);
                            info!("signed in as {}", user.user_login_id);
                        }
                        self.load_my()
                    }
                    Err(err) => {
                        self.my.error = Some(error_text(&err));
                        Task::none()
                    }
                }
            }
            Message::LogoutFinished(session, result) => {
                self.session = session;
                self.my = MyPage::default();
                if let Err(err) = result {
                    warn!("server logout failed: {err}");
                }
                self.status = "로그아웃되었습니다.".into();
                Task::none()
            }
            Message::MyTabPicked(tab) => {
                self.my.tab = tab;
                self.my.page = 1;
                self.load_my()
            }
            Message::MyPageTurned(page) => {
                self.my.page = page.max(1);
                self.load_my()
            }
            Message::MyReviewsLoaded(result) => {
                self.my.loading = false;
                match result {
                    Ok(response) => {
                        let missing = self
                            .my
                            .cache
                            .missing(response.reviews.iter().map(|r| r.restaurant_id));
                        self.my.reviews = Some(response);
                        Task::batch(missing.into_iter().map(|id| {
                            let client = self.client.clone();
                            Task::perform(
                                async move { client.restaurant(id).await },
                                Message::RestaurantCached,
                            )
                        }))
                    }
                    Err(err) => {
                        self.on_my_error(err);
                        Task::none()
                    }
                }
            }
            Message::MyVisitsLoaded(result) => {
                self.my.loading = false;
                match result {
                    Ok(response) => self.my.visits = Some(response),
                    Err(err) => self.on_my_error(err),
                }
                Task::none()
            }
            Message::RestaurantCached(result) => {
                match result {
                    Ok(detail) => self.my.cache.insert(detail.summary),
                    Err(err) => warn!("restaurant lookup failed: {err}"),
                }
                Task::none()
            }
        }
    }

    pub fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }

    /// Feeds the current camera into the debounced bounds pipeline.
    fn camera_changed(&mut self) {
        self.home.set_map_center(self.camera.center);
        match self.camera.bounds(self.map_size) {
            Ok(bounds) => self.home.bounds_changed(bounds, Instant::now()),
            Err(err) => warn!("ignoring unusable viewport: {err}"),
        }
    }

    fn dispatch(&mut self, ticket: FetchTicket) -> Task<Message> {
        if self.options.cancel_superseded {
            if let Some(handle) = self.in_flight.take() {
                handle.abort();
            }
        }
        let FetchTicket { seq, query } = ticket;
        let client = self.client.clone();
        let (task, handle) = Task::perform(
            async move { client.restaurants_in(&query).await },
            move |result| Message::RestaurantsLoaded(seq, result),
        )
        .abortable();
        self.in_flight = Some(handle);
        self.status = "식당 목록을 불러오는 중...".into();
        task
    }

    fn on_restaurants(&mut self, seq: u64, result: ApiResult<Vec<RestaurantSummary>>) {
        let failure = result.as_ref().err().map(error_text);
        match self.home.apply(seq, result) {
            ApplyOutcome::Applied { count } => {
                self.in_flight = None;
                self.status = format!("주변 식당 {count}곳");
                self.push_history(format!("#{seq}: 식당 {count}곳 표시"));
                if let Some(id) = self.detail.id.filter(|_| self.home.selected_id().is_none()) {
                    if !self.detail.pinned {
                        self.detail = DetailPanel::default();
                    } else if self.home.restaurant(id).is_some() {
                        self.home.select(id);
                    }
                }
            }
            ApplyOutcome::Failed => {
                self.in_flight = None;
                let message = failure.unwrap_or_default();
                self.status = format!("식당 목록을 불러오지 못했습니다: {message}");
                self.push_history(format!("#{seq}: 실패"));
            }
            ApplyOutcome::Stale => {}
        }
    }

    fn on_map_event(&mut self, event: MapEvent) -> Task<Message> {
        match event {
            MapEvent::Resized { size, then } => {
                self.map_size = size;
                self.camera_changed();
                if let Some(event) = then {
                    return self.on_map_event(*event);
                }
            }
            MapEvent::Panned(delta) => {
                self.camera = self.camera.panned(delta);
                self.camera_changed();
            }
            MapEvent::Zoomed { steps, anchor } => {
                let zoomed = self.camera.zoomed(steps, anchor, self.map_size);
                if zoomed != self.camera {
                    self.camera = zoomed;
                    self.camera_changed();
                }
            }
            MapEvent::HoverChanged { from, to } => {
                if let Some(id) = from {
                    self.home.unhover(id);
                }
                if let Some(id) = to {
                    self.home.hover(id);
                }
            }
            MapEvent::Clicked(Some(id)) => return self.open_detail(id),
            MapEvent::Clicked(None) => {
                self.home.dismiss();
                self.detail = DetailPanel::default();
            }
        }
        Task::none()
    }

    /// The map keeps its list and camera while other tabs are shown.
    fn navigate(&mut self, page: Page) -> Task<Message> {
        if page == self.page {
            return Task::none();
        }
        self.page = page;
        match page {
            Page::Map | Page::Recommend => Task::none(),
            Page::Rankings => self.load_rankings(),
            Page::Guide => self.load_guide(),
            Page::MyPage => self.load_my(),
        }
    }

    fn open_detail(&mut self, id: RestaurantId) -> Task<Message> {
        self.home.select(id);
        self.detail = DetailPanel::opening(id);
        self.load_detail(id)
    }

    fn load_detail(&mut self, id: RestaurantId) -> Task<Message> {
        let detail_client = self.client.clone();
        let reviews_client = self.client.clone();
        Task::batch([
            Task::perform(
                async move { detail_client.restaurant(id).await },
                move |result| Message::DetailLoaded(id, result),
            ),
            Task::perform(
                async move { reviews_client.reviews(id).await },
                move |result| Message::ReviewsLoaded(id, result),
            ),
        ])
    }

    fn submit_review(&mut self) -> Task<Message> {
        let Some(id) = self.detail.id else {
            return Task::none();
        };
        if self.detail.submitting {
            return Task::none();
        }
        if let Err(err) = self.detail.draft.validate(self.session.is_logged_in()) {
            self.detail.form_error = Some(err.to_string());
            return Task::none();
        }
        self.detail.submitting = true;
        self.detail.form_error = None;
        let client = self.client.clone();
        let session = self.session.clone();
        let draft = self.detail.draft.clone();
        Task::perform(
            async move { client.submit_review(id, &draft, &session).await },
            move |result| Message::ReviewSubmitted(id, result),
        )
    }

    fn record_visit(&mut self) -> Task<Message> {
        let Some(id) = self.detail.id else {
            return Task::none();
        };
        if !self.session.is_logged_in() {
            self.status = "로그인이 필요합니다.".into();
            return Task::none();
        }
        if self.detail.visiting {
            return Task::none();
        }
        self.detail.visiting = true;
        let client = self.client.clone();
        Task::perform(
            async move { client.record_visit(id).await },
            move |result| Message::VisitRecorded(id, result),
        )
    }

    fn load_rankings(&mut self) -> Task<Message> {
        let request = self.rankings.begin();
        let client = self.client.clone();
        let period = self.ranking_period;
        let category = self.rankings.category;
        Task::perform(
            async move { client.visit_rankings(period, category).await },
            move |result| Message::RankingsLoaded(request, result),
        )
    }

    fn load_guide(&mut self) -> Task<Message> {
        let request = self.guide.begin();
        let client = self.client.clone();
        let category = self.guide.category;
        Task::perform(
            async move {
                client
                    .restaurants(category)
                    .await
                    .map(|page| page.restaurants)
            },
            move |result| Message::GuideLoaded(request, result),
        )
    }

    fn submit_recommendation(&mut self) -> Task<Message> {
        if self.recommend.loading {
            return Task::none();
        }
        let request =
            match RecommendationRequest::new(&self.recommend.situation, self.recommend.category) {
                Ok(request) => request,
                Err(err) => {
                    self.recommend.error = Some(err.to_string());
                    return Task::none();
                }
            };
        self.recommend.loading = true;
        self.recommend.error = None;
        let client = self.client.clone();
        Task::perform(
            async move { client.recommend(&request).await },
            Message::RecommendationsLoaded,
        )
    }

    fn load_my(&mut self) -> Task<Message> {
        if !self.session.is_logged_in() {
            return Task::none();
        }
        self.my.loading = true;
        self.my.error = None;
        let client = self.client.clone();
        let page = self.my.page;
        match self.my.tab {
            MyTab::Reviews => Task::perform(
                async move { client.my_reviews(page).await },
                Message::MyReviewsLoaded,
            ),
            MyTab::Visits => Task::perform(
                async move { client.my_visits(page).await },
                Message::MyVisitsLoaded,
            ),
        }
    }

    fn on_my_error(&mut self, err: ApiError) {
        if err.status().map(|s| s.as_u16()) == Some(401) {
            self.session.clear();
            self.my = MyPage::default();
            self.my.error = Some("로그인이 필요합니다.".into());
        } else {
            self.my.error = Some(error_text(&err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hankkicore::api::{ApiConfig, StatusCode};
    use hankkicore::model::{BoundingBox, Category};

    fn app() -> MapView {
        let config = ClientConfig::default();
        let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9")).unwrap();
        MapView::boot(&config, client, Session::anonymous()).0
    }

    fn summary(id: RestaurantId) -> RestaurantSummary {
        RestaurantSummary {
            id,
            name: format!("식당 {id}"),
            address: "수원시".into(),
            phone: None,
            category: "한식".into(),
            lat: "37.2830".into(),
            lng: "127.0448".into(),
            local_currency: false,
            goodness: false,
            kind_price: false,
            review_count: 0,
            visit_count: 0,
            avg_score: 0.0,
            restaurant_score: None,
        }
    }

    #[test]
    fn boot_schedules_first_viewport_fetch() {
        let app = app();
        assert!(app.home.has_pending_bounds());
        assert_eq!(app.page, Page::Map);
    }

    #[test]
    fn resize_and_pan_update_debounced_bounds() {
        let mut app = app();
        let _ = app.update(Message::Map(MapEvent::Resized {
            size: Size::new(400.0, 300.0),
            then: None,
        }));
        let _ = app.update(Message::Map(MapEvent::Panned(iced::Vector::new(50.0, 0.0))));
        assert!(app.home.has_pending_bounds());
        assert!(app.home.map_center().lng < ClientConfig::default().initial_center.lng);
    }

    #[test]
    fn late_response_for_old_ticket_is_ignored() {
        let mut app = app();
        let bounds = BoundingBox::new(37.29, 127.05, 37.27, 127.04).unwrap();
        app.home.bounds_changed(bounds, Instant::now() - std::time::Duration::from_secs(1));
        let first = app.home.poll(Instant::now()).unwrap();
        let second = app.home.category_selected(Some(Category::Cafe)).unwrap();

        let _ = app.update(Message::RestaurantsLoaded(second.seq, Ok(vec![summary(2)])));
        let _ = app.update(Message::RestaurantsLoaded(first.seq, Ok(vec![summary(1)])));
        assert_eq!(app.home.restaurants().iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(app.home.metrics().stale, 1);
    }

    #[test]
    fn review_form_requires_login() {
        let mut app = app();
        app.detail = DetailPanel::opening(3);
        let _ = app.update(Message::ScorePicked(5));
        let _ = app.update(Message::CommentEdited("아주 맛있어요".into()));
        let _ = app.update(Message::SubmitReview);
        assert_eq!(app.detail.form_error.as_deref(), Some("로그인이 필요합니다."));
        assert!(!app.detail.submitting);
    }

    #[test]
    fn empty_situation_is_rejected_before_request() {
        let mut app = app();
        let _ = app.update(Message::SubmitRecommendation);
        assert_eq!(app.recommend.error.as_deref(), Some("상황을 입력해주세요."));
        assert!(!app.recommend.loading);
    }

    #[test]
    fn late_visit_reply_leaves_other_panel_alone() {
        let mut app = app();
        let _ = app.update(Message::Map(MapEvent::Clicked(Some(3))));
        let _ = app.update(Message::DetailLoaded(
            3,
            Ok(RestaurantDetail {
                summary: summary(3),
                menus: Vec::new(),
                one_line_comment: String::new(),
            }),
        ));
        let _ = app.update(Message::VisitRecorded(7, Ok(VisitOutcome::Recorded)));
        let detail = app.detail.detail.as_ref().unwrap();
        assert_eq!(detail.summary.id, 3);
        assert_eq!(detail.summary.visit_count, 0);

        let _ = app.update(Message::VisitRecorded(3, Ok(VisitOutcome::Recorded)));
        assert_eq!(app.detail.detail.as_ref().unwrap().summary.visit_count, 1);
    }

    #[test]
    fn restaurant_shown_from_rankings_survives_filtered_list() {
        let mut app = app();
        let bounds = BoundingBox::new(37.29, 127.05, 37.27, 127.04).unwrap();
        app.home.bounds_changed(bounds, Instant::now() - std::time::Duration::from_secs(1));
        let first = app.home.poll(Instant::now()).unwrap();
        let _ = app.update(Message::RestaurantsLoaded(first.seq, Ok(vec![summary(1)])));
        let _ = app.update(Message::CategoryPicked(Some(Category::Cafe)));
        let _ = app.update(Message::Navigate(Page::Rankings));

        let _ = app.update(Message::ShowRestaurant(summary(9)));
        assert_eq!(app.page, Page::Map);
        assert_eq!(app.home.category(), None);
        assert_eq!(app.home.selected_id(), Some(9));

        let latest = app.home.metrics().issued as u64;
        assert!(app.home.is_current(latest));
        let _ = app.update(Message::RestaurantsLoaded(latest, Ok(vec![summary(1)])));
        assert_eq!(app.detail.id, Some(9));
        assert_eq!(app.home.selected_id(), None);

        let recentered = app
            .home
            .poll(Instant::now() + std::time::Duration::from_secs(1))
            .unwrap();
        let _ = app.update(Message::RestaurantsLoaded(
            recentered.seq,
            Ok(vec![summary(1), summary(9)]),
        ));
        assert_eq!(app.detail.id, Some(9));
        assert_eq!(app.home.selected_id(), Some(9));
    }

    #[test]
    fn marker_panel_closes_when_restaurant_leaves_list() {
        let mut app = app();
        let bounds = BoundingBox::new(37.29, 127.05, 37.27, 127.04).unwrap();
        app.home.bounds_changed(bounds, Instant::now() - std::time::Duration::from_secs(1));
        let first = app.home.poll(Instant::now()).unwrap();
        let _ = app.update(Message::RestaurantsLoaded(first.seq, Ok(vec![summary(1)])));
        let _ = app.update(Message::Map(MapEvent::Clicked(Some(1))));
        let second = app.home.category_selected(Some(Category::Cafe)).unwrap();
        let _ = app.update(Message::RestaurantsLoaded(second.seq, Ok(vec![summary(2)])));
        assert_eq!(app.detail.id, None);
    }

    #[test]
    fn failed_guide_load_empties_list() {
        let mut app = app();
        let request = app.guide.begin();
        app.guide.entries = vec![summary(1)];
        let failure = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "서버 오류".into(),
        };
        let _ = app.update(Message::GuideLoaded(request, Err(failure)));
        assert!(app.guide.entries.is_empty());
        assert_eq!(app.guide.error.as_deref(), Some("서버 오류"));
    }
}
