use crate::model::{BoundingBox, Category, CategoryFilter, ValidationError};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Parameters of one viewport fetch. Equality is by value so an unchanged
/// viewport never produces a second request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestaurantQuery {
    pub bounds: BoundingBox,
    pub category: CategoryFilter,
}

impl RestaurantQuery {
    pub fn new(bounds: BoundingBox, category: CategoryFilter) -> Self {
        Self { bounds, category }
    }

    /// Decoded query pairs in request order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("ne_lat", self.bounds.ne_lat().to_string()),
            ("ne_lng", self.bounds.ne_lng().to_string()),
            ("sw_lat", self.bounds.sw_lat().to_string()),
            ("sw_lng", self.bounds.sw_lng().to_string()),
        ];
        if let Some(category) = self.category {
            pairs.push(("category", category.label().to_string()));
        }
        pairs
    }

    /// Percent-encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

/// Body of `POST /restaurants/recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub situation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl RecommendationRequest {
    pub fn new(situation: &str, category: CategoryFilter) -> Result<Self, ValidationError> {
        let situation = situation.trim();
        if situation.is_empty() {
            return Err(ValidationError::SituationMissing);
        }
        Ok(Self {
            situation: situation.to_string(),
            category,
        })
    }
}

pub const EXAMPLE_SITUATIONS: [&str; 6] = [
    "친구와 함께 시험 끝나고 맛있는 걸 먹고 싶어요",
    "혼자서 간단하게 점심을 먹고 싶어요",
    "데이트하기 좋은 분위기 있는 곳을 찾고 있어요",
    "가족과 함께 저녁식사를 하려고 해요",
    "술 한잔하면서 안주를 먹고 싶어요",
    "달콤한 디저트와 커피가 마시고 싶어요",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_carries_coordinates_and_category() {
        let bounds = BoundingBox::new(37.28, 127.05, 37.27, 127.04).unwrap();
        let query = RestaurantQuery::new(bounds, Some(Category::Korean));

        let encoded = query.query_string();
        let decoded: Vec<(String, String)> = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            decoded,
            vec![
                ("ne_lat".to_string(), "37.28".to_string()),
                ("ne_lng".to_string(), "127.05".to_string()),
                ("sw_lat".to_string(), "37.27".to_string()),
                ("sw_lng".to_string(), "127.04".to_string()),
                ("category".to_string(), "한식".to_string()),
            ]
        );
    }

    #[test]
    fn unfiltered_query_omits_category() {
        let bounds = BoundingBox::new(37.28, 127.05, 37.27, 127.04).unwrap();
        let query = RestaurantQuery::new(bounds, None);
        assert_eq!(
            query.query_string(),
            "ne_lat=37.28&ne_lng=127.05&sw_lat=37.27&sw_lng=127.04"
        );
    }

    #[test]
    fn recommendation_requires_situation() {
        assert_eq!(
            RecommendationRequest::new("   ", None),
            Err(ValidationError::SituationMissing)
        );
        let request = RecommendationRequest::new(" 혼밥 ", Some(Category::Snack)).unwrap();
        assert_eq!(request.situation, "혼밥");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["category"], "분식");
    }
}
