use std::sync::Arc;

use crate::task::TaskState;

use axum::Router;

pub mod v1 {
    use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use serde::Serialize;
    use utoipa::ToSchema;

    use crate::nextdate::NextDateError;
    use crate::task::TaskServiceError;

    /// JSON response for API errors
    #[derive(Debug, Serialize, ToSchema)]
    pub struct ErrorResponse {
        pub error: String,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>) -> Self {
            Self {
                error: error.into(),
            }
        }
    }

    /// Error returned by the JSON API handlers.
    #[derive(Debug, thiserror::Error)]
    pub enum ApiError {
        #[error("{0}")]
        BadRequest(String),
        #[error("{0}")]
        NotFound(String),
        #[error(transparent)]
        Rule(#[from] NextDateError),
        #[error(transparent)]
        Service(#[from] TaskServiceError),
    }

    impl ApiError {
        fn status(&self) -> StatusCode {
            match self {
                ApiError::BadRequest(_) | ApiError::Rule(_) => StatusCode::BAD_REQUEST,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Service(err) => match err {
                    TaskServiceError::Validation(_) | TaskServiceError::Rule(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    TaskServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                    TaskServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            }
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status = self.status();
            let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("Request failed: {}", self);
                "Internal server error".to_string()
            } else {
                self.to_string()
            };
            (status, Json(ErrorResponse::new(message))).into_response()
        }
    }

}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    let task_router = crate::task::api::v1::create_api_router(task_state);
    let next_date_router = crate::nextdate::api::v1::create_api_router();
    Router::new().nest("/api", task_router.merge(next_date_router))
}
