use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::ApiResponse;

/// Failures the HTTP surface can report. Rendered as the `ApiResponse`
/// envelope with `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing store did not answer. The cause is logged, not returned.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg) => msg,
            Self::ServiceUnavailable(cause) => {
                tracing::error!(%cause, "Database unavailable");
                "Database is unavailable".to_string()
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let response = ApiError::NotFound("No route for /nowhere".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No route for /nowhere");
    }

    #[tokio::test]
    async fn test_unavailable_masks_cause() {
        let response =
            ApiError::ServiceUnavailable("unable to open database file".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Database is unavailable");
    }
}
