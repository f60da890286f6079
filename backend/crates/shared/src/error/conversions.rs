//! Error conversions - HTTP rendering of [`AppError`]
//!
//! Behind the `axum` feature, [`AppError`] renders as the `{error, code}`
//! JSON envelope that every gate endpoint uses.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "error": self.message(),
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;
    use axum::response::IntoResponse;

    async fn render(err: AppError) -> (u16, serde_json::Value) {
        let response = err.into_response();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = render(AppError::not_found("Route not found")).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_custom_code_wins() {
        let err = AppError::new(ErrorKind::TooManyRequests, "Slow down").with_code("RATE_LIMITED");
        let (status, body) = render(err).await;
        assert_eq!(status, 429);
        assert_eq!(body["code"], "RATE_LIMITED");
    }
}
