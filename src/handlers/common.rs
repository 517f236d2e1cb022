use crate::{errors::ServiceError, ApiResponse};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Created response wrapped in the admin envelope
pub fn created_envelope<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Parses a path segment that must be a database id. `what` names the
/// operation in the error, e.g. "PATCH".
pub fn require_db_id(raw: &str, what: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ServiceError::BadRequest(format!(
            "{} requires database ID, not confirmation code",
            what
        ))
    })
}

/// `Json` extractor whose rejections render as the standard 400 error body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ServiceError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ServiceError::BadRequest("Expected a JSON request body".to_string())
        }
        other => ServiceError::BadRequest(format!("Invalid request body: {}", other.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        value: i32,
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = JsonBody::<Probe>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let req = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"value":1}"#))
            .unwrap();
        let err = JsonBody::<Probe>::from_request(req, &()).await.err().unwrap();
        assert_matches!(err, ServiceError::BadRequest(msg) if msg == "Expected a JSON request body");
    }

    #[test]
    fn confirmation_codes_are_not_db_ids() {
        assert_matches!(
            require_db_id("ABCD2345", "DELETE"),
            Err(ServiceError::BadRequest(msg)) if msg == "DELETE requires database ID, not confirmation code"
        );
        assert!(require_db_id(&Uuid::new_v4().to_string(), "DELETE").is_ok());
    }
}
