use super::restaurant::RestaurantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub visit_id: u64,
    pub restaurant_id: RestaurantId,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitsResponse {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub items_per_page: u32,
    pub visits: Vec<Visit>,
}

impl VisitsResponse {
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Result of `POST /restaurants/{id}/visit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    Recorded,
    AlreadyVisitedToday,
}

impl VisitOutcome {
    pub fn message(self) -> &'static str {
        match self {
            VisitOutcome::Recorded => "방문 기록이 저장되었습니다!",
            VisitOutcome::AlreadyVisitedToday => "오늘 이미 방문한 식당입니다",
        }
    }
}
