//! In-memory state behind the fixture API.

mod ranking;

pub use ranking::recommend;

use chrono::{
    DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, Offset, SecondsFormat, TimeZone,
    Utc,
};
use hankkicore::model::{
    BoundingBox, Category, MyReview, MyReviewsResponse, RankingPeriod, RankingRestaurant,
    RestaurantDetail, RestaurantId, RestaurantPage, RestaurantSummary, Review, ReviewDraft, User,
    ValidationError, Visit, VisitsResponse,
};
use std::collections::HashMap;
use warp::http::StatusCode;

pub const LIST_PAGE_SIZE: u32 = 20;
pub const PROFILE_PAGE_SIZE: u32 = 10;
pub const RANKING_LIMIT: usize = 10;

/// Korea Standard Time; visit days and ranking windows follow it.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&kst()).date_naive()
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&kst())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone)]
pub struct StoredReview {
    pub review_id: u64,
    pub restaurant_id: RestaurantId,
    pub user_login_id: String,
    pub score: u8,
    pub comment: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredVisit {
    pub visit_id: u64,
    pub restaurant_id: RestaurantId,
    pub user_login_id: String,
    pub at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("식당을 찾을 수 없습니다: {0}")]
    NotFound(RestaurantId),
    #[error("로그인이 필요합니다.")]
    Unauthorized,
    #[error("오늘 이미 방문한 식당입니다")]
    AlreadyVisited,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            StoreError::AlreadyVisited | StoreError::Invalid(_) | StoreError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    reviews: u32,
    score_sum: u32,
    visits: u32,
}

/// Restaurants, reviews, visits, users and live sessions.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    restaurants: Vec<RestaurantDetail>,
    reviews: Vec<StoredReview>,
    visits: Vec<StoredVisit>,
    users: HashMap<String, User>,
    sessions: HashMap<String, String>,
    next_review_id: u64,
    next_visit_id: u64,
    next_session: u64,
}

impl Dataset {
    pub fn new(restaurants: Vec<RestaurantDetail>, users: Vec<User>) -> Self {
        Self {
            restaurants,
            users: users
                .into_iter()
                .map(|user| (user.user_login_id.clone(), user))
                .collect(),
            next_review_id: 1,
            next_visit_id: 1,
            next_session: 1,
            ..Default::default()
        }
    }

    pub fn restaurant_count(&self) -> usize {
        self.restaurants.len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Restaurant count per category label, in `Category::ALL` order.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let count = self
                    .restaurants
                    .iter()
                    .filter(|r| r.summary.category == category.label())
                    .count();
                (category, count)
            })
            .collect()
    }

    fn tallies(&self) -> HashMap<RestaurantId, Tally> {
        let mut tallies: HashMap<RestaurantId, Tally> = HashMap::new();
        for review in &self.reviews {
            let tally = tallies.entry(review.restaurant_id).or_default();
            tally.reviews += 1;
            tally.score_sum += u32::from(review.score);
        }
        for visit in &self.visits {
            tallies.entry(visit.restaurant_id).or_default().visits += 1;
        }
        tallies
    }

    fn with_counts(summary: &RestaurantSummary, tally: Tally) -> RestaurantSummary {
        let mut summary = summary.clone();
        summary.review_count = tally.reviews;
        summary.visit_count = tally.visits;
        summary.avg_score = if tally.reviews == 0 {
            0.0
        } else {
            (f64::from(tally.score_sum) / f64::from(tally.reviews) * 10.0).round() / 10.0
        };
        summary
    }

    fn find(&self, id: RestaurantId) -> Result<&RestaurantDetail, StoreError> {
        self.restaurants
            .iter()
            .find(|r| r.summary.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn summaries(&self) -> Vec<RestaurantSummary> {
        let tallies = self.tallies();
        self.restaurants
            .iter()
            .map(|r| Self::with_counts(&r.summary, tallies.get(&r.summary.id).copied().unwrap_or_default()))
            .collect()
    }

    /// Viewport listing when `bounds` is set, otherwise the guide listing
    /// ordered by score and paged.
    pub fn list(
        &self,
        bounds: Option<BoundingBox>,
        category: Option<Category>,
        page: u32,
    ) -> RestaurantPage {
        let mut restaurants: Vec<RestaurantSummary> = self
            .summaries()
            .into_iter()
            .filter(|r| category.map_or(true, |c| r.category == c.label()))
            .collect();

        if let Some(bounds) = bounds {
            restaurants.retain(|r| r.position().is_some_and(|p| bounds.contains(p)));
            let total = restaurants.len() as u32;
            return RestaurantPage {
                total_count: total,
                total_pages: u32::from(total > 0),
                current_page: 1,
                items_per_page: total,
                restaurants,
            };
        }

        restaurants.sort_by(|a, b| {
            b.restaurant_score
                .unwrap_or_default()
                .total_cmp(&a.restaurant_score.unwrap_or_default())
                .then(a.id.cmp(&b.id))
        });
        let (restaurants, total_count, total_pages, current_page) =
            paginate(restaurants, page, LIST_PAGE_SIZE);
        RestaurantPage {
            total_count,
            total_pages,
            current_page,
            items_per_page: LIST_PAGE_SIZE,
            restaurants,
        }
    }

    pub fn detail(&self, id: RestaurantId) -> Result<RestaurantDetail, StoreError> {
        let detail = self.find(id)?;
        let tally = self.tallies().get(&id).copied().unwrap_or_default();
        Ok(RestaurantDetail {
            summary: Self::with_counts(&detail.summary, tally),
            menus: detail.menus.clone(),
            one_line_comment: detail.one_line_comment.clone(),
        })
    }

    fn reviewer_name(&self, login_id: &str) -> String {
        self.users
            .get(login_id)
            .map(|u| u.user_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| login_id.to_string())
    }

    /// Reviews of one restaurant, newest first.
    pub fn reviews(&self, id: RestaurantId) -> Result<Vec<Review>, StoreError> {
        self.find(id)?;
        let mut reviews: Vec<&StoredReview> =
            self.reviews.iter().filter(|r| r.restaurant_id == id).collect();
        reviews.sort_by(|a, b| b.at.cmp(&a.at).then(b.review_id.cmp(&a.review_id)));
        Ok(reviews
            .into_iter()
            .map(|r| Review {
                review_id: r.review_id,
                reviewer: self.reviewer_name(&r.user_login_id),
                score: r.score,
                comment: r.comment.clone(),
                created_at: timestamp(r.at),
            })
            .collect())
    }

    pub fn add_review(
        &mut self,
        id: RestaurantId,
        login_id: &str,
        draft: &ReviewDraft,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.find(id)?;
        draft.validate(true)?;
        let review_id = self.next_review_id;
        self.next_review_id += 1;
        self.reviews.push(StoredReview {
            review_id,
            restaurant_id: id,
            user_login_id: login_id.to_string(),
            score: draft.score,
            comment: draft.comment.trim().to_string(),
            at: now,
        });
        Ok(review_id)
    }

    /// One visit per user, restaurant and KST calendar day.
    pub fn add_visit(
        &mut self,
        id: RestaurantId,
        login_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.find(id)?;
        let today = local_day(now);
        let duplicate = self.visits.iter().any(|v| {
            v.restaurant_id == id && v.user_login_id == login_id && local_day(v.at) == today
        });
        if duplicate {
            return Err(StoreError::AlreadyVisited);
        }
        let visit_id = self.next_visit_id;
        self.next_visit_id += 1;
        self.visits.push(StoredVisit {
            visit_id,
            restaurant_id: id,
            user_login_id: login_id.to_string(),
            at: now,
        });
        Ok(visit_id)
    }

    fn visits_since(&self, id: RestaurantId, since: DateTime<Utc>) -> u32 {
        self.visits
            .iter()
            .filter(|v| v.restaurant_id == id && v.at >= since)
            .count() as u32
    }

    /// Start of the counting window for `period`.
    pub fn period_start(period: RankingPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
        match period {
            RankingPeriod::Daily => {
                let midnight = local_day(now).and_hms_opt(0, 0, 0).unwrap_or_default();
                kst()
                    .from_local_datetime(&midnight)
                    .earliest()
                    .map(|at| at.with_timezone(&Utc))
                    .unwrap_or(now)
            }
            RankingPeriod::Weekly => now - ChronoDuration::days(7),
            RankingPeriod::Monthly => now - ChronoDuration::days(30),
        }
    }

    /// Most visited restaurants in the period; restaurants without visits are left out.
    pub fn visit_ranking(
        &self,
        period: RankingPeriod,
        category: Option<Category>,
        now: DateTime<Utc>,
    ) -> Vec<RankingRestaurant> {
        let since = Self::period_start(period, now);
        let mut ranking: Vec<RankingRestaurant> = self
            .summaries()
            .into_iter()
            .filter(|r| category.map_or(true, |c| r.category == c.label()))
            .map(|summary| RankingRestaurant {
                period_visit_count: self.visits_since(summary.id, since),
                summary,
            })
            .filter(|r| r.period_visit_count > 0)
            .collect();
        ranking.sort_by(|a, b| {
            b.period_visit_count
                .cmp(&a.period_visit_count)
                .then(a.summary.id.cmp(&b.summary.id))
        });
        ranking.truncate(RANKING_LIMIT);
        ranking
    }

    /// Signs in the account behind an OAuth code, creating it on first use.
    pub fn login(&mut self, auth_code: &str) -> Result<(String, User), StoreError> {
        let code = auth_code.trim();
        if code.is_empty() {
            return Err(StoreError::BadRequest("auth_code가 필요합니다.".into()));
        }
        let login_id = format!("google-{code}");
        let user = self
            .users
            .entry(login_id.clone())
            .or_insert_with(|| User {
                user_login_id: login_id.clone(),
                user_name: format!("아주인 {code}"),
            })
            .clone();
        let token = format!("session-{:08}", self.next_session);
        self.next_session += 1;
        self.sessions.insert(token.clone(), login_id);
        Ok((token, user))
    }

    pub fn logout(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn session_user(&self, token: Option<&str>) -> Result<&User, StoreError> {
        token
            .and_then(|token| self.sessions.get(token))
            .and_then(|login_id| self.users.get(login_id))
            .ok_or(StoreError::Unauthorized)
    }

    /// Session for a fixture user, bypassing OAuth.
    pub fn open_session(&mut self, login_id: &str) -> Option<String> {
        self.users.get(login_id)?;
        let token = format!("session-{:08}", self.next_session);
        self.next_session += 1;
        self.sessions.insert(token.clone(), login_id.to_string());
        Some(token)
    }

    pub fn my_reviews(&self, login_id: &str, page: u32) -> MyReviewsResponse {
        let mut mine: Vec<&StoredReview> = self
            .reviews
            .iter()
            .filter(|r| r.user_login_id == login_id)
            .collect();
        mine.sort_by(|a, b| b.at.cmp(&a.at).then(b.review_id.cmp(&a.review_id)));
        let reviews: Vec<MyReview> = mine
            .into_iter()
            .map(|r| MyReview {
                review_id: r.review_id,
                restaurant_id: r.restaurant_id,
                reviewer: self.reviewer_name(&r.user_login_id),
                score: r.score,
                comment: r.comment.clone(),
                created_at: timestamp(r.at),
            })
            .collect();
        let (reviews, total_count, total_pages, current_page) =
            paginate(reviews, page, PROFILE_PAGE_SIZE);
        MyReviewsResponse {
            total_count,
            total_pages,
            current_page,
            items_per_page: PROFILE_PAGE_SIZE,
            reviews,
        }
    }

    pub fn my_visits(&self, login_id: &str, page: u32) -> VisitsResponse {
        let mut mine: Vec<&StoredVisit> = self
            .visits
            .iter()
            .filter(|v| v.user_login_id == login_id)
            .collect();
        mine.sort_by(|a, b| b.at.cmp(&a.at).then(b.visit_id.cmp(&a.visit_id)));
        let visits: Vec<Visit> = mine
            .into_iter()
            .map(|v| {
                let restaurant = self.find(v.restaurant_id).ok().map(|r| &r.summary);
                Visit {
                    visit_id: v.visit_id,
                    restaurant_id: v.restaurant_id,
                    created_at: timestamp(v.at),
                    restaurant_name: restaurant.map(|r| r.name.clone()),
                    restaurant_category: restaurant.map(|r| r.category.clone()),
                    restaurant_address: restaurant.map(|r| r.address.clone()),
                }
            })
            .collect();
        let (visits, total_count, total_pages, current_page) =
            paginate(visits, page, PROFILE_PAGE_SIZE);
        VisitsResponse {
            total_count,
            total_pages,
            current_page,
            items_per_page: PROFILE_PAGE_SIZE,
            visits,
        }
    }

    pub(crate) fn restaurants(&self) -> &[RestaurantDetail] {
        &self.restaurants
    }

    pub(crate) fn monthly_visits(&self, id: RestaurantId, now: DateTime<Utc>) -> u32 {
        self.visits_since(id, Self::period_start(RankingPeriod::Monthly, now))
    }

    pub(crate) fn summary(&self, id: RestaurantId) -> Result<RestaurantSummary, StoreError> {
        self.detail(id).map(|detail| detail.summary)
    }

    pub(crate) fn seed_review(&mut self, review: StoredReview) {
        self.next_review_id = self.next_review_id.max(review.review_id + 1);
        self.reviews.push(review);
    }

    pub(crate) fn seed_visit(&mut self, visit: StoredVisit) {
        self.next_visit_id = self.next_visit_id.max(visit.visit_id + 1);
        self.visits.push(visit);
    }
}

/// Slices one 1-based page; returns `(items, total_count, total_pages, page)`.
fn paginate<T>(items: Vec<T>, page: u32, per_page: u32) -> (Vec<T>, u32, u32, u32) {
    let total_count = items.len() as u32;
    let total_pages = total_count.div_ceil(per_page.max(1));
    let page = page.max(1);
    let skip = ((page - 1) * per_page) as usize;
    let items = items
        .into_iter()
        .skip(skip)
        .take(per_page as usize)
        .collect();
    (items, total_count, total_pages, page)
}
