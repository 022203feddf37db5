use crate::api::{ApiResult, RestaurantQuery};
use crate::map::geolocation::GeolocationError;
use crate::model::{LatLng, RestaurantSummary};
use async_trait::async_trait;

/// Where the map loop gets restaurants from. `ApiClient` is the production
/// implementation; tests substitute scripted sources.
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    async fn restaurants_in(&self, query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>>;
}

/// Platform location lookup. Called at most once per user request.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<LatLng, GeolocationError>;
}

#[async_trait]
impl<T: RestaurantSource + ?Sized> RestaurantSource for std::sync::Arc<T> {
    async fn restaurants_in(&self, query: &RestaurantQuery) -> ApiResult<Vec<RestaurantSummary>> {
        (**self).restaurants_in(query).await
    }
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for std::sync::Arc<T> {
    async fn current_position(&self) -> Result<LatLng, GeolocationError> {
        (**self).current_position().await
    }
}
