use reqwest::StatusCode;
use std::sync::Arc;

/// Failure talking to the REST API. Cheap to clone so results can travel
/// through UI messages.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ApiError {
    #[error("invalid api base url {0}: {1}")]
    BaseUrl(String, #[source] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
    #[error(transparent)]
    Validation(#[from] crate::model::ValidationError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Message for list-loading pages, matching the wording used across the app.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Validation(err) => err.to_string(),
            _ => "데이터를 불러오는 중 알 수 없는 오류가 발생했습니다.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(Arc::new(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
