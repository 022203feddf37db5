pub mod category;
pub mod geo;
pub mod restaurant;
pub mod review;
pub mod user;
pub mod visit;

pub use category::{Category, CategoryFilter};
pub use geo::{BoundingBox, BoundsError, LatLng};
pub use restaurant::{
    RankingPeriod, RankingRestaurant, RestaurantDetail, RestaurantId, RestaurantPage,
    RestaurantRecommendation, RestaurantSummary, VisitRankingResponse,
};
pub use review::{MyReview, MyReviewsResponse, Review, ReviewDraft, ValidationError};
pub use user::User;
pub use visit::{Visit, VisitOutcome, VisitsResponse};
