pub mod cache;
pub mod paging;
pub mod rating;
pub mod timeline;

pub use cache::RestaurantCache;
pub use paging::page_window;
pub use rating::{rating_option, score_badge, RatingOption, RATING_OPTIONS};
pub use timeline::{day_label, format_timestamp, group_by_day, parse_timestamp, VisitDay};
