use crate::api::error::{ApiError, ApiResult};
use crate::api::query::{RecommendationRequest, RestaurantQuery};
use crate::model::review::ReviewDraft;
use crate::model::user::GoogleAuthRequest;
use crate::model::{
    CategoryFilter, MyReviewsResponse, RankingPeriod, RankingRestaurant, RestaurantDetail,
    RestaurantId, RestaurantPage, RestaurantRecommendation, RestaurantSummary, Review, User,
    VisitOutcome, VisitRankingResponse, VisitsResponse,
};
use crate::prelude::RestaurantSource;
use crate::session::Session;
use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Connection settings for the REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Thin typed wrapper over the restaurant REST API. Cloning shares the
/// connection pool and the session cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let mut base_str = config.base_url.trim().to_string();
        if !base_str.ends_with('/') {
            base_str.push('/');
        }
        let base =
            Url::parse(&base_str).map_err(|err| ApiError::BaseUrl(config.base_url.clone(), err))?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::BaseUrl(self.base.to_string(), err))
    }

    async fn checked(response: Response, fallback: &str) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("{fallback}: {}", status.as_u16()));
        Err(ApiError::Status { status, message })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, fallback: &str) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        let response = Self::checked(response, fallback).await?;
        Self::decode(response).await
    }

    /// `GET /restaurants` with the viewport and category of `query`.
    pub async fn restaurants_in(&self, query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>> {
        let mut url = self.endpoint("restaurants")?;
        url.set_query(Some(&query.query_string()));
        let page: RestaurantPage = self.get_json(url, "식당 목록을 불러오는 데 실패했습니다").await?;
        Ok(page.restaurants)
    }

    /// `GET /restaurants` without a viewport, used by the guide ranking.
    pub async fn restaurants(&self, category: CategoryFilter) -> ApiResult<RestaurantPage> {
        let mut url = self.endpoint("restaurants")?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("category", category.label());
        }
        self.get_json(url, "식당 목록을 불러오는 데 실패했습니다").await
    }

    pub async fn restaurant(&self, id: RestaurantId) -> ApiResult<RestaurantDetail> {
        let url = self.endpoint(&format!("restaurants/{id}"))?;
        self.get_json(url, "데이터를 불러오는 데 실패했습니다").await
    }

    pub async fn reviews(&self, id: RestaurantId) -> ApiResult<Vec<Review>> {
        let url = self.endpoint(&format!("restaurants/{id}/reviews"))?;
        self.get_json(url, "리뷰를 불러오는 데 실패했습니다").await
    }

    /// Validates `draft` against the session, then posts it.
    pub async fn submit_review(
        &self,
        id: RestaurantId,
        draft: &ReviewDraft,
        session: &Session,
    ) -> ApiResult<()> {
        draft.validate(session.is_logged_in())?;
        let url = self.endpoint(&format!("restaurants/{id}/reviews"))?;
        let body = ReviewDraft {
            score: draft.score,
            comment: draft.comment.trim().to_string(),
        };
        let response = self.http.post(url).json(&body).send().await?;
        Self::checked(response, "리뷰 작성에 실패했습니다").await?;
        Ok(())
    }

    pub async fn record_visit(&self, id: RestaurantId) -> ApiResult<VisitOutcome> {
        let url = self.endpoint(&format!("restaurants/{id}/visit"))?;
        let response = self.http.post(url).send().await?;
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(VisitOutcome::AlreadyVisitedToday);
        }
        Self::checked(response, "방문 기록에 실패했습니다").await?;
        Ok(VisitOutcome::Recorded)
    }

    pub async fn visit_rankings(
        &self,
        period: RankingPeriod,
        category: CategoryFilter,
    ) -> ApiResult<Vec<RankingRestaurant>> {
        let mut url = self.endpoint("restaurants/rankings/visits")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("period", period.as_str());
            if let Some(category) = category {
                pairs.append_pair("category", category.label());
            }
        }
        let response: VisitRankingResponse =
            self.get_json(url, "랭킹을 불러오는 데 실패했습니다").await?;
        Ok(response.restaurants)
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> ApiResult<Vec<RestaurantRecommendation>> {
        let url = self.endpoint("restaurants/recommend")?;
        let response = self.http.post(url).json(request).send().await?;
        let response = Self::checked(response, "추천을 받아오는 데 실패했습니다").await?;
        let value: serde_json::Value = Self::decode(response).await?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        let url = self.endpoint("users/me")?;
        self.get_json(url, "Failed to fetch user data").await
    }

    /// Exchanges an OAuth authorization code for a session cookie.
    pub async fn login_with_google(&self, auth_code: &str) -> ApiResult<User> {
        let url = self.endpoint("auth/google")?;
        let body = GoogleAuthRequest {
            auth_code: auth_code.to_string(),
        };
        let response = self.http.post(url).json(&body).send().await?;
        let response = Self::checked(response, "Backend login failed").await?;
        Self::decode(response).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let url = self.endpoint("auth/logout")?;
        let response = self.http.post(url).send().await?;
        Self::checked(response, "로그아웃 실패").await?;
        Ok(())
    }

    pub async fn my_reviews(&self, page: u32) -> ApiResult<MyReviewsResponse> {
        let mut url = self.endpoint("users/me/reviews")?;
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string());
        self.get_json(url, "리뷰를 불러오는 데 실패했습니다").await
    }

    pub async fn my_visits(&self, page: u32) -> ApiResult<VisitsResponse> {
        let mut url = self.endpoint("users/me/visits")?;
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string());
        self.get_json(url, "방문 기록을 불러오는 데 실패했습니다").await
    }
}

#[async_trait]
impl RestaurantSource for ApiClient {
    async fn restaurants_in(&self, query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>> {
        ApiClient::restaurants_in(self, query).await
    }
}
