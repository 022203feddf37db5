use crate::model::LatLng;
use crate::prelude::LocationProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Location lookup failure, classified the way platform location APIs report it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("location lookup failed: {0}")]
    Other(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "위치 정보 접근 권한이 거부되었습니다. 설정에서 위치 권한을 허용해주세요."
            }
            GeolocationError::PositionUnavailable => "현재 위치 정보를 사용할 수 없습니다.",
            GeolocationError::Timeout => "위치 정보를 가져오는 데 시간이 초과되었습니다.",
            GeolocationError::Other(_) => "위치 정보를 가져오는 중 알 수 없는 오류가 발생했습니다.",
        }
    }
}

/// Re-entrancy guard and last known position for "내 위치" requests.
#[derive(Debug, Clone, Default)]
pub struct GeolocationAdapter {
    busy: bool,
    user_location: Option<LatLng>,
}

impl GeolocationAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a lookup as started. Returns `false` while one is already pending.
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self, result: Result<LatLng, GeolocationError>) -> Result<LatLng, GeolocationError> {
        self.busy = false;
        if let Ok(position) = &result {
            self.user_location = Some(*position);
        }
        result
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }
}

/// One provider call bounded by `timeout`.
pub async fn locate<P: LocationProvider + ?Sized>(
    provider: &P,
    timeout: Duration,
) -> Result<LatLng, GeolocationError> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout),
    }
}

/// Configured location source for platforms without a positioning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StaticLocation {
    Fixed {
        lat: f64,
        lng: f64,
    },
    Denied,
    #[default]
    Unavailable,
}

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_position(&self) -> Result<LatLng, GeolocationError> {
        match self {
            StaticLocation::Fixed { lat, lng } => Ok(LatLng::new(*lat, *lng)),
            StaticLocation::Denied => Err(GeolocationError::PermissionDenied),
            StaticLocation::Unavailable => Err(GeolocationError::PositionUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl LocationProvider for Stalled {
        async fn current_position(&self) -> Result<LatLng, GeolocationError> {
            std::future::pending().await
        }
    }

    #[test]
    fn permission_denied_has_its_own_message() {
        let denied = GeolocationError::PermissionDenied;
        assert_ne!(
            denied.user_message(),
            GeolocationError::Other(String::new()).user_message()
        );
        assert!(denied.user_message().contains("권한"));
    }

    #[test]
    fn busy_flag_blocks_reentry() {
        let mut adapter = GeolocationAdapter::new();
        assert!(adapter.begin());
        assert!(!adapter.begin());
        let position = LatLng::new(37.28, 127.04);
        assert_eq!(adapter.finish(Ok(position)), Ok(position));
        assert_eq!(adapter.user_location(), Some(position));
        assert!(adapter.begin());
        assert!(adapter.finish(Err(GeolocationError::Timeout)).is_err());
        assert_eq!(adapter.user_location(), Some(position));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out() {
        let result = locate(&Stalled, Duration::from_secs(5)).await;
        assert_eq!(result, Err(GeolocationError::Timeout));
    }

    #[tokio::test]
    async fn static_location_reports_configured_outcome() {
        let fixed = StaticLocation::Fixed {
            lat: 37.2830,
            lng: 127.0448,
        };
        assert_eq!(
            fixed.current_position().await,
            Ok(LatLng::new(37.2830, 127.0448))
        );
        assert_eq!(
            StaticLocation::Denied.current_position().await,
            Err(GeolocationError::PermissionDenied)
        );
    }
}
