use super::geo::LatLng;
use serde::{Deserialize, Serialize};

pub type RestaurantId = u64;

/// Restaurant as listed on the map and in rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSummary {
    #[serde(rename = "restaurant_id")]
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub category: String,
    pub lat: String,
    pub lng: String,
    #[serde(default)]
    pub local_currency: bool,
    #[serde(default)]
    pub goodness: bool,
    #[serde(default)]
    pub kind_price: bool,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub visit_count: u32,
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_score: Option<f64>,
}

impl RestaurantSummary {
    /// Parsed position; `None` when either coordinate string is not numeric.
    pub fn position(&self) -> Option<LatLng> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lng.trim().parse::<f64>().ok()?;
        (lat.is_finite() && lng.is_finite()).then_some(LatLng::new(lat, lng))
    }

    /// Badge labels for the public certification flags.
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.local_currency {
            badges.push("지역화폐 가능");
        }
        if self.goodness {
            badges.push("모범음식점");
        }
        if self.kind_price {
            badges.push("착한가격업소");
        }
        badges
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    #[serde(default)]
    pub menus: Vec<String>,
    #[serde(default)]
    pub one_line_comment: String,
}

/// Body of `GET /restaurants`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantPage {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub items_per_page: u32,
    pub restaurants: Vec<RestaurantSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl RankingPeriod {
    pub const ALL: [RankingPeriod; 3] = [
        RankingPeriod::Daily,
        RankingPeriod::Weekly,
        RankingPeriod::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RankingPeriod::Daily => "daily",
            RankingPeriod::Weekly => "weekly",
            RankingPeriod::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankingPeriod::Daily => "일별",
            RankingPeriod::Weekly => "주별",
            RankingPeriod::Monthly => "월별",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRestaurant {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    #[serde(default)]
    pub period_visit_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitRankingResponse {
    pub restaurants: Vec<RankingRestaurant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecommendation {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    #[serde(default)]
    pub recommendation_reason: String,
    #[serde(default)]
    pub monthly_visits: u32,
}
