pub mod client;
pub mod error;
pub mod query;

pub use client::{ApiClient, ApiConfig};
pub use error::{ApiError, ApiResult};
pub use reqwest::StatusCode;
pub use query::{RecommendationRequest, RestaurantQuery, EXAMPLE_SITUATIONS};
