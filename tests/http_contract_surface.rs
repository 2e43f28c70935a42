use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use md2docx_backend_core::api::routes::route_catalog;
use md2docx_backend_core::api::server::build_router_with_runner;
use md2docx_backend_core::config::{AppSettings, ConfigStore, ToolConfig};
use md2docx_backend_core::contract::HttpMethod;
use md2docx_backend_core::conversion::runner::{CommandOutput, CommandSpec, ToolCommandRunner};

#[tokio::test]
async fn every_contract_route_is_http_mounted() {
    let app = test_app();

    for route in route_catalog().expect("route catalog should be valid") {
        let request = Request::builder()
            .method(to_http_method(route.spec.method))
            .uri(route.spec.path.as_str())
            .header("content-type", "application/json")
            .body(request_body(route.spec.method, route.spec.path.as_str()))
            .expect("request should build");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should return response");

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "unexpected status for {} {}",
            route.spec.method,
            route.spec.path
        );
    }
}

#[tokio::test]
async fn wrong_method_is_method_not_allowed() {
    let app = test_app();

    for (method, path) in [
        (Method::GET, "/api/convert/single"),
        (Method::GET, "/api/convert/batch"),
        (Method::GET, "/api/config/validate"),
        (Method::POST, "/api/health"),
        (Method::DELETE, "/api/config"),
    ] {
        let request = Request::builder()
            .method(method.clone())
            .uri(path)
            .body(Body::empty())
            .expect("request should build");
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should return response");
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "unexpected status for {method} {path}"
        );
    }
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/convert")
        .body(Body::empty())
        .expect("request should build");
    let response = test_app()
        .oneshot(request)
        .await
        .expect("router should return response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_is_answered_for_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/convert/single")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request should build");

    let response = test_app()
        .oneshot(request)
        .await
        .expect("router should return response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

fn to_http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

fn request_body(method: HttpMethod, path: &str) -> Body {
    match (method, path) {
        (HttpMethod::Post, "/api/convert/batch") => Body::from(r#"{"input_files":[]}"#),
        (HttpMethod::Post, _) => Body::from("{}"),
        _ => Body::empty(),
    }
}

fn test_app() -> axum::Router {
    let store = Arc::new(ConfigStore::in_memory(AppSettings {
        tool: ToolConfig {
            tool_path: String::from("pandoc"),
            template_file: String::new(),
        },
        ..AppSettings::default()
    }));
    build_router_with_runner(store, Arc::new(ProbeOnly)).expect("router should build")
}

struct ProbeOnly;

impl ToolCommandRunner for ProbeOnly {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, std::io::Error> {
        Ok(CommandOutput {
            status_code: 0,
            combined_output: format!("{} 3.1.9\n", spec.program),
        })
    }
}
