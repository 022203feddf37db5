use crate::dataset::{recommend, Dataset, StoreError};
use chrono::Utc;
use hankkicore::api::RecommendationRequest;
use hankkicore::model::{
    BoundingBox, Category, RankingPeriod, RestaurantId, ReviewDraft, VisitRankingResponse,
};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use warp::http::{header::SET_COOKIE, StatusCode};
use warp::reply::Response;
use warp::{Rejection, Reply};

pub type Shared = Arc<RwLock<Dataset>>;
pub type Params = HashMap<String, String>;

pub const SESSION_COOKIE: &str = "session";

fn read(state: &Shared) -> RwLockReadGuard<'_, Dataset> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(state: &Shared) -> RwLockWriteGuard<'_, Dataset> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

pub fn message_reply(status: StatusCode, message: &str) -> Response {
    json_reply(&json!({ "message": message }), status)
}

fn error_reply(err: &StoreError) -> Response {
    debug!("request refused: {err}");
    message_reply(err.status(), &err.to_string())
}

fn respond<T: Serialize>(result: Result<T, StoreError>) -> Result<Response, Rejection> {
    Ok(match result {
        Ok(body) => json_reply(&body, StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

fn bad_request(message: impl Into<String>) -> StoreError {
    StoreError::BadRequest(message.into())
}

fn page_param(params: &Params) -> u32 {
    params
        .get("page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1)
}

fn category_param(params: &Params) -> Result<Option<Category>, StoreError> {
    match params.get("category").map(|raw| raw.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<Category>()
            .map(Some)
            .map_err(|err| bad_request(err.to_string())),
    }
}

/// All four corners or none; anything in between is a client error.
fn bounds_param(params: &Params) -> Result<Option<BoundingBox>, StoreError> {
    let keys = ["ne_lat", "ne_lng", "sw_lat", "sw_lng"];
    let present = keys.iter().filter(|key| params.contains_key(**key)).count();
    if present == 0 {
        return Ok(None);
    }
    if present < keys.len() {
        return Err(bad_request("ne_lat, ne_lng, sw_lat, sw_lng 값이 모두 필요합니다."));
    }
    let mut values = [0.0_f64; 4];
    for (slot, key) in values.iter_mut().zip(keys) {
        *slot = params[key]
            .parse()
            .map_err(|_| bad_request(format!("{key} 값이 올바르지 않습니다.")))?;
    }
    BoundingBox::new(values[0], values[1], values[2], values[3])
        .map(Some)
        .map_err(|err| bad_request(err.to_string()))
}

fn period_param(params: &Params) -> Result<RankingPeriod, StoreError> {
    let raw = params.get("period").map(String::as_str).unwrap_or("daily");
    RankingPeriod::ALL
        .into_iter()
        .find(|period| period.as_str() == raw)
        .ok_or_else(|| bad_request(format!("알 수 없는 기간입니다: {raw}")))
}

pub async fn list_restaurants(params: Params, state: Shared) -> Result<Response, Rejection> {
    respond(bounds_param(&params).and_then(|bounds| {
        let category = category_param(&params)?;
        Ok(read(&state).list(bounds, category, page_param(&params)))
    }))
}

pub async fn restaurant_detail(id: RestaurantId, state: Shared) -> Result<Response, Rejection> {
    respond(read(&state).detail(id))
}

pub async fn restaurant_reviews(id: RestaurantId, state: Shared) -> Result<Response, Rejection> {
    respond(read(&state).reviews(id))
}

pub async fn create_review(
    id: RestaurantId,
    token: Option<String>,
    draft: ReviewDraft,
    state: Shared,
) -> Result<Response, Rejection> {
    let mut data = write(&state);
    let result = data
        .session_user(token.as_deref())
        .map(|user| user.user_login_id.clone())
        .and_then(|login_id| data.add_review(id, &login_id, &draft, Utc::now()));
    Ok(match result {
        Ok(review_id) => {
            info!("review {review_id} added to restaurant {id}");
            json_reply(&json!({ "review_id": review_id }), StatusCode::CREATED)
        }
        Err(err) => error_reply(&err),
    })
}

pub async fn record_visit(
    id: RestaurantId,
    token: Option<String>,
    state: Shared,
) -> Result<Response, Rejection> {
    let mut data = write(&state);
    let result = data
        .session_user(token.as_deref())
        .map(|user| user.user_login_id.clone())
        .and_then(|login_id| data.add_visit(id, &login_id, Utc::now()));
    respond(result.map(|visit_id| json!({ "visit_id": visit_id })))
}

pub async fn visit_rankings(params: Params, state: Shared) -> Result<Response, Rejection> {
    respond(period_param(&params).and_then(|period| {
        let category = category_param(&params)?;
        let restaurants = read(&state).visit_ranking(period, category, Utc::now());
        Ok(VisitRankingResponse { restaurants })
    }))
}

pub async fn recommend_restaurants(
    body: RecommendationRequest,
    state: Shared,
) -> Result<Response, Rejection> {
    let result = RecommendationRequest::new(&body.situation, body.category)
        .map_err(StoreError::from)
        .map(|request| recommend(&read(&state), &request, Utc::now()));
    respond(result)
}

#[derive(Debug, serde::Deserialize)]
pub struct GoogleLogin {
    auth_code: String,
}

pub async fn google_login(body: GoogleLogin, state: Shared) -> Result<Response, Rejection> {
    match write(&state).login(&body.auth_code) {
        Ok((token, user)) => {
            info!("{} signed in", user.user_login_id);
            let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
            Ok(warp::reply::with_header(warp::reply::json(&user), SET_COOKIE, cookie).into_response())
        }
        Err(err) => Ok(error_reply(&err)),
    }
}

pub async fn logout(token: Option<String>, state: Shared) -> Result<Response, Rejection> {
    if let Some(token) = token {
        write(&state).logout(&token);
    }
    let cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
    let body = json!({ "message": "로그아웃되었습니다." });
    Ok(warp::reply::with_header(warp::reply::json(&body), SET_COOKIE, cookie).into_response())
}

pub async fn current_user(token: Option<String>, state: Shared) -> Result<Response, Rejection> {
    respond(read(&state).session_user(token.as_deref()).cloned())
}

pub async fn my_reviews(
    params: Params,
    token: Option<String>,
    state: Shared,
) -> Result<Response, Rejection> {
    let data = read(&state);
    respond(
        data.session_user(token.as_deref())
            .map(|user| data.my_reviews(&user.user_login_id, page_param(&params))),
    )
}

pub async fn my_visits(
    params: Params,
    token: Option<String>,
    state: Shared,
) -> Result<Response, Rejection> {
    let data = read(&state);
    respond(
        data.session_user(token.as_deref())
            .map(|user| data.my_visits(&user.user_login_id, page_param(&params))),
    )
}

/// Maps warp's own rejections to the `{ "message": .. }` error body.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "요청한 경로를 찾을 수 없습니다.")
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "요청 본문을 해석할 수 없습니다.")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "쿼리 문자열이 올바르지 않습니다.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "허용되지 않은 메서드입니다.")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "서버 오류가 발생했습니다.")
    };
    Ok(message_reply(status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn partial_bounds_are_rejected() {
        assert_eq!(bounds_param(&params(&[])), Ok(None));
        assert!(bounds_param(&params(&[("ne_lat", "37.3")])).is_err());
        let full = params(&[
            ("ne_lat", "37.29"),
            ("ne_lng", "127.05"),
            ("sw_lat", "37.27"),
            ("sw_lng", "127.04"),
        ]);
        assert!(bounds_param(&full).unwrap().is_some());
    }

    #[test]
    fn category_and_period_parse_wire_values() {
        assert_eq!(
            category_param(&params(&[("category", "카페")])),
            Ok(Some(Category::Cafe))
        );
        assert!(category_param(&params(&[("category", "피자")])).is_err());
        assert_eq!(
            period_param(&params(&[("period", "weekly")])),
            Ok(RankingPeriod::Weekly)
        );
        assert!(period_param(&params(&[("period", "yearly")])).is_err());
    }
}
