use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::api::error::ErrorKind;

pub type ApiObject<T> = (StatusCode, Json<T>);

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    error: String,
    error_kind: ErrorKind,
    error_code: String,
}

pub fn error_response(
    status: StatusCode,
    kind: ErrorKind,
    code: impl Into<String>,
    message: impl Into<String>,
    error: impl Into<String>,
) -> ApiObject<Value> {
    (
        status,
        into_json(ErrorResponse {
            success: false,
            message: message.into(),
            error: error.into(),
            error_kind: kind,
            error_code: code.into(),
        }),
    )
}

/// Undecodable request bodies. Missing or wrong content types and syntax
/// errors all land here as a 400.
pub fn json_rejection_response(rejection: JsonRejection) -> ApiObject<Value> {
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorKind::Validation,
        "invalid_request_body",
        "Failed to parse request body",
        rejection.body_text(),
    )
}

pub fn internal_error(message: impl Into<String>) -> ApiObject<Value> {
    let detail = message.into();
    error!(detail = %detail, "internal api error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Infra,
        "internal_error",
        "Internal server error",
        "Internal server error",
    )
}

pub fn into_json(payload: impl Serialize) -> Json<Value> {
    match serde_json::to_value(payload) {
        Ok(value) => Json(value),
        Err(source) => {
            error!(error = %source, "api payload failed to serialize");
            Json(json!({
                "success": false,
                "message": "Internal server error",
                "error": "Internal server error",
                "error_kind": "infra",
                "error_code": "internal_error",
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::{error_response, internal_error};
    use crate::api::error::ErrorKind;

    #[test]
    fn error_response_carries_taxonomy_fields() {
        let (status, payload) = error_response(
            StatusCode::BAD_REQUEST,
            ErrorKind::Config,
            "config_invalid",
            "Configuration update rejected",
            "conversion tool executable does not exist: /nope",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload.0,
            json!({
                "success": false,
                "message": "Configuration update rejected",
                "error": "conversion tool executable does not exist: /nope",
                "error_kind": "config",
                "error_code": "config_invalid",
            })
        );
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let (status, payload) = internal_error("sensitive detail");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload.0["success"], json!(false));
        assert_eq!(payload.0["error"], json!("Internal server error"));
        assert_eq!(payload.0["error_kind"], json!("infra"));
        assert_eq!(payload.0["error_code"], json!("internal_error"));
    }
}
