use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ErrorKind;
use crate::api::handler_utils::{
    error_response, internal_error, into_json, json_rejection_response, ApiObject,
};
use crate::api::server::AppState;
use crate::config::tool::{validate_template, validate_tool};
use crate::config::{AppSettings, ConfigError, ToolConfigUpdate};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigRequest {
    #[serde(default)]
    pub pandoc_path: Option<String>,
    #[serde(default)]
    pub template_file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ConfigResponse {
    success: bool,
    message: &'static str,
    pandoc_path: String,
    template_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pandoc_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ConfigResponse {
    fn from_settings(message: &'static str, settings: &AppSettings) -> Self {
        Self {
            success: true,
            message,
            pandoc_path: settings.tool.tool_path.clone(),
            template_file: settings.tool.template_file.clone(),
            pandoc_version: None,
            error: None,
            error_kind: None,
            error_code: None,
        }
    }

    fn invalid(mut self, kind: ErrorKind, code: &'static str, error: String) -> Self {
        self.success = false;
        self.message = "Configuration is invalid";
        self.error = Some(error);
        self.error_kind = Some(kind);
        self.error_code = Some(code);
        self
    }
}

pub async fn get_config_handler(State(state): State<AppState>) -> ApiObject<Value> {
    let settings = state.config.snapshot();
    (
        StatusCode::OK,
        into_json(ConfigResponse::from_settings(
            "Configuration loaded",
            &settings,
        )),
    )
}

pub async fn update_config_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConfigRequest>, JsonRejection>,
) -> ApiObject<Value> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    let store = state.config.clone();
    let runner = state.conversions.runner().clone();
    let result = tokio::task::spawn_blocking(move || {
        store.update_tool(
            ToolConfigUpdate {
                tool_path: request.pandoc_path,
                template_file: request.template_file,
            },
            runner.as_ref(),
        )
    })
    .await;

    match result {
        Ok(Ok(settings)) => (
            StatusCode::OK,
            into_json(ConfigResponse::from_settings(
                "Configuration updated",
                &settings,
            )),
        ),
        Ok(Err(error)) => map_config_error(error),
        Err(join_error) => internal_error(format!("config update task failed: {join_error}")),
    }
}

/// Checks the active configuration: the tool first, then the template.
/// Always answers 200; `success` carries the verdict.
pub async fn validate_config_handler(State(state): State<AppState>) -> ApiObject<Value> {
    let settings = state.config.snapshot();
    let runner = state.conversions.runner().clone();
    let result = tokio::task::spawn_blocking(move || {
        let response = ConfigResponse::from_settings("Configuration is valid", &settings);
        let resolved = match validate_tool(&settings.tool, runner.as_ref()) {
            Ok(resolved) => resolved,
            Err(error) => {
                return response.invalid(
                    ErrorKind::Tool,
                    "config_invalid",
                    format!("pandoc configuration is invalid: {error}"),
                )
            }
        };
        if let Err(error) = validate_template(settings.tool.template_file.as_str()) {
            return response.invalid(
                ErrorKind::Config,
                "template_invalid",
                format!("template configuration is invalid: {error}"),
            );
        }
        ConfigResponse {
            pandoc_version: Some(resolved.version),
            ..response
        }
    })
    .await;

    match result {
        Ok(response) => (StatusCode::OK, into_json(response)),
        Err(join_error) => internal_error(format!("config validation task failed: {join_error}")),
    }
}

fn map_config_error(error: ConfigError) -> ApiObject<Value> {
    match error {
        ConfigError::ToolInvalid(_) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorKind::for_config(&error),
            "config_invalid",
            "Configuration update rejected",
            error.to_string(),
        ),
        other => internal_error(format!("config update failed: {other}")),
    }
}
