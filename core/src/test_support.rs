use crate::model::{RestaurantId, RestaurantSummary};

pub(crate) fn restaurant(id: RestaurantId) -> RestaurantSummary {
    RestaurantSummary {
        id,
        name: format!("식당 {id}"),
        address: "수원시 영통구".into(),
        phone: None,
        category: "한식".into(),
        lat: "37.2800".into(),
        lng: "127.0440".into(),
        local_currency: false,
        goodness: false,
        kind_price: false,
        review_count: 0,
        visit_count: 0,
        avg_score: 0.0,
        restaurant_score: None,
    }
}
