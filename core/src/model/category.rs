use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cuisine categories offered as map and ranking filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "한식")]
    Korean,
    #[serde(rename = "중식")]
    Chinese,
    #[serde(rename = "일식")]
    Japanese,
    #[serde(rename = "양식")]
    Western,
    #[serde(rename = "분식")]
    Snack,
    #[serde(rename = "아시안")]
    Asian,
    #[serde(rename = "패스트푸드")]
    FastFood,
    #[serde(rename = "카페")]
    Cafe,
    #[serde(rename = "주점")]
    Pub,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Korean,
        Category::Chinese,
        Category::Japanese,
        Category::Western,
        Category::Snack,
        Category::Asian,
        Category::FastFood,
        Category::Cafe,
        Category::Pub,
    ];

    /// Wire and display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Korean => "한식",
            Category::Chinese => "중식",
            Category::Japanese => "일식",
            Category::Western => "양식",
            Category::Snack => "분식",
            Category::Asian => "아시안",
            Category::FastFood => "패스트푸드",
            Category::Cafe => "카페",
            Category::Pub => "주점",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Selected category, or no filter. The UI shows "랜덤" for the unfiltered state.
pub type CategoryFilter = Option<Category>;

pub const NO_FILTER_LABEL: &str = "랜덤";

pub fn filter_label(filter: CategoryFilter) -> &'static str {
    filter.map(Category::label).unwrap_or(NO_FILTER_LABEL)
}
