#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::error::{AppError, OptionExt};
    use crate::store::StoreError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes_and_body_shape() {
        let (status, body) = render(AppError::NotFound("Paper not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Paper not found");

        let (status, body) = render(AppError::BadRequest("bad multipart".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad multipart");

        let (status, body) = render(AppError::Database("no such table: papers".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no such table: papers");

        let (status, body) = render(AppError::Upstream("Cloudflare API error".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Cloudflare API error");
    }

    #[tokio::test]
    async fn test_internal_details_stay_server_side() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let msg = body["error"].as_str().unwrap();
        assert!(msg.starts_with("An internal server error occurred"));
        assert!(!msg.contains("secret"));

        let (status, body) = render(std::io::Error::other("disk on fire").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An I/O error occurred");
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            AppError::from(StoreError::Driver("syntax error".into())),
            AppError::Database(ref m) if m == "syntax error"
        ));
        assert!(matches!(
            AppError::from(StoreError::Decode { column: "title".into(), message: "invalid utf-8".into() }),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::DecodeRow { target: "Paper".into(), message: "missing field".into() }),
            AppError::Internal(_)
        ));
        assert!(matches!(AppError::from(StoreError::UnsupportedUrl("mysql://x".into())), AppError::Internal(_)));
        assert!(matches!(
            AppError::from(StoreError::Io(std::io::Error::other("full"))),
            AppError::IoError(_)
        ));
    }

    #[test]
    fn test_ok_or_not_found() {
        let err = None::<i64>.ok_or_not_found("Paper").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Paper not found"));
        assert_eq!(Some(3).ok_or_not_found("Paper").unwrap(), 3);
    }
}
