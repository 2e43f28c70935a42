use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::api::handler_utils::{internal_error, into_json, json_rejection_response, ApiObject};
use crate::api::server::AppState;
use crate::conversion::{BatchConversionRequest, ConversionRequest};

pub async fn convert_single_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConversionRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let conversions = state.conversions.clone();
    let result = tokio::task::spawn_blocking(move || conversions.convert_single(&request)).await;

    match result {
        Ok(response) => (StatusCode::OK, into_json(response)),
        Err(join_error) => internal_error(format!("conversion task failed: {join_error}")),
    }
}

pub async fn convert_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchConversionRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let conversions = state.conversions.clone();
    let result = tokio::task::spawn_blocking(move || conversions.convert_batch(&request)).await;

    match result {
        Ok(response) => (StatusCode::OK, into_json(response)),
        Err(join_error) => internal_error(format!("batch conversion task failed: {join_error}")),
    }
}
