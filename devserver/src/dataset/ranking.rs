use super::Dataset;
use chrono::{DateTime, Utc};
use hankkicore::api::RecommendationRequest;
use hankkicore::model::{Category, RestaurantRecommendation};
use std::cmp::Ordering;

pub const RECOMMENDATION_LIMIT: usize = 3;

/// Situation keywords and the category each one points at.
pub const SITUATION_HINTS: [(&str, Category); 16] = [
    ("커피", Category::Cafe),
    ("디저트", Category::Cafe),
    ("달콤", Category::Cafe),
    ("술", Category::Pub),
    ("안주", Category::Pub),
    ("간단", Category::Snack),
    ("떡볶이", Category::Snack),
    ("혼자", Category::FastFood),
    ("햄버거", Category::FastFood),
    ("데이트", Category::Western),
    ("분위기", Category::Western),
    ("가족", Category::Korean),
    ("시험", Category::Korean),
    ("초밥", Category::Japanese),
    ("짜장", Category::Chinese),
    ("쌀국수", Category::Asian),
];

struct Candidate<'a> {
    keyword: Option<&'a str>,
    score: f64,
    monthly_visits: u32,
    recommendation: RestaurantRecommendation,
}

fn reason(keyword: Option<&str>, category: &str, monthly_visits: u32) -> String {
    match keyword {
        Some(keyword) => format!("'{keyword}' 상황에 잘 어울리는 {category} 맛집이에요."),
        None if monthly_visits > 0 => {
            format!("최근 한 달 동안 {monthly_visits}번 방문한 인기 {category} 맛집이에요.")
        }
        None => format!("평점이 좋은 {category} 맛집이에요."),
    }
}

/// Keyword-scored picks: matching hints first, then restaurant score, then
/// monthly visits.
pub fn recommend(
    data: &Dataset,
    request: &RecommendationRequest,
    now: DateTime<Utc>,
) -> Vec<RestaurantRecommendation> {
    let hints: Vec<(&str, Category)> = SITUATION_HINTS
        .into_iter()
        .filter(|(keyword, _)| request.situation.contains(keyword))
        .collect();

    let mut candidates: Vec<Candidate> = data
        .restaurants()
        .iter()
        .filter(|r| {
            request
                .category
                .map_or(true, |c| r.summary.category == c.label())
        })
        .filter_map(|r| {
            let summary = data.summary(r.summary.id).ok()?;
            let keyword = hints
                .iter()
                .find(|(_, category)| category.label() == summary.category)
                .map(|(keyword, _)| *keyword);
            let monthly_visits = data.monthly_visits(summary.id, now);
            let score = summary.restaurant_score.unwrap_or(summary.avg_score);
            Some(Candidate {
                keyword,
                score,
                monthly_visits,
                recommendation: RestaurantRecommendation {
                    recommendation_reason: reason(keyword, &summary.category, monthly_visits),
                    monthly_visits,
                    summary,
                },
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.keyword
            .is_some()
            .cmp(&a.keyword.is_some())
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            .then_with(|| b.monthly_visits.cmp(&a.monthly_visits))
            .then_with(|| a.recommendation.summary.id.cmp(&b.recommendation.summary.id))
    });
    candidates
        .into_iter()
        .take(RECOMMENDATION_LIMIT)
        .map(|candidate| candidate.recommendation)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, FixtureConfig};
    use chrono::TimeZone;

    fn data() -> Dataset {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 3, 0, 0).unwrap();
        generate(&FixtureConfig::default(), now)
    }

    #[test]
    fn keyword_steers_category() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 3, 0, 0).unwrap();
        let request = RecommendationRequest::new("달콤한 디저트와 커피가 마시고 싶어요", None).unwrap();
        let picks = recommend(&data(), &request, now);
        assert_eq!(picks.len(), RECOMMENDATION_LIMIT);
        assert!(picks.iter().all(|p| p.summary.category == "카페"));
        assert!(picks[0].recommendation_reason.contains("'커피'"));
    }

    #[test]
    fn explicit_category_filters_candidates() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 3, 0, 0).unwrap();
        let request =
            RecommendationRequest::new("아무거나 먹고 싶어요", Some(Category::Chinese)).unwrap();
        let picks = recommend(&data(), &request, now);
        assert!(!picks.is_empty());
        assert!(picks.iter().all(|p| p.summary.category == "중식"));
    }
}
