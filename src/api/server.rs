use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::routes::{route_catalog, RouteDefinition};
use crate::config::tool::validate_tool;
use crate::config::SharedConfigStore;
use crate::contract::{ContractError, HttpMethod};
use crate::conversion::orchestrator::ConversionService;
use crate::conversion::runner::{SharedToolCommandRunner, StdToolCommandRunner};

#[derive(Clone)]
pub struct AppState {
    pub service_name: &'static str,
    pub service_version: &'static str,
    pub started_unix_ms: u128,
    pub route_count: usize,
    pub config: SharedConfigStore,
    pub conversions: ConversionService,
}

impl AppState {
    pub fn new(
        route_count: usize,
        config: SharedConfigStore,
        runner: SharedToolCommandRunner,
    ) -> Self {
        Self {
            service_name: "md2docx-backend-core",
            service_version: env!("CARGO_PKG_VERSION"),
            started_unix_ms: now_unix_ms(),
            route_count,
            conversions: ConversionService::new(config.clone(), runner),
            config,
        }
    }
}

pub fn build_router(config: SharedConfigStore) -> Result<Router, ContractError> {
    build_router_with_runner(config, Arc::new(StdToolCommandRunner))
}

pub fn build_router_with_runner(
    config: SharedConfigStore,
    runner: SharedToolCommandRunner,
) -> Result<Router, ContractError> {
    let catalog = route_catalog()?;
    let state = AppState::new(catalog.len(), config, runner);
    Ok(build_router_with_catalog(catalog, state))
}

fn build_router_with_catalog(catalog: Vec<RouteDefinition>, state: AppState) -> Router {
    let mut router = Router::new();
    for (path, method_router) in group_by_path(catalog) {
        router = router.route(path.as_str(), method_router);
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// axum wants one `route` call per path, so methods sharing a path are merged.
fn group_by_path(catalog: Vec<RouteDefinition>) -> Vec<(String, MethodRouter<AppState>)> {
    let mut grouped: Vec<(String, Vec<RouteDefinition>)> = Vec::new();
    for route in catalog {
        match grouped
            .iter()
            .position(|(path, _)| *path == route.spec.path)
        {
            Some(index) => grouped[index].1.push(route),
            None => grouped.push((route.spec.path.clone(), vec![route])),
        }
    }

    grouped
        .into_iter()
        .map(|(path, routes)| {
            let method_router = routes
                .iter()
                .fold(MethodRouter::new(), |merged, route| {
                    merged.merge(method_router_for(route))
                });
            (path, method_router)
        })
        .collect()
}

pub async fn serve(addr: SocketAddr, config: SharedConfigStore) -> std::io::Result<()> {
    let app = build_router(config).map_err(std::io::Error::other)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(bind = %addr, "starting md2docx-backend-core HTTP surface");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn method_router_for(route: &RouteDefinition) -> MethodRouter<AppState> {
    match (route.spec.method, route.spec.path.as_str()) {
        (HttpMethod::Get, "/api/health") => get(health_handler),
        (HttpMethod::Get, "/api/config") => get(crate::api::config::get_config_handler),
        (HttpMethod::Post, "/api/config") => post(crate::api::config::update_config_handler),
        (HttpMethod::Post, "/api/config/validate") => {
            post(crate::api::config::validate_config_handler)
        }
        (HttpMethod::Post, "/api/convert/single") => {
            post(crate::api::convert::convert_single_handler)
        }
        (HttpMethod::Post, "/api/convert/batch") => {
            post(crate::api::convert::convert_batch_handler)
        }
        (method, path) => {
            warn!(%method, path, handler_id = %route.handler_id, "route has no handler attached");
            MethodRouter::new()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let settings = state.config.snapshot();
    let runner = state.conversions.runner().clone();
    let tool_check =
        tokio::task::spawn_blocking(move || validate_tool(&settings.tool, runner.as_ref()))
            .await
            .map_err(|join_error| format!("tool check task failed: {join_error}"))
            .and_then(|validated| validated.map_err(|error| error.to_string()));

    let mut body = json!({
        "status": "ok",
        "message": "Service is running",
        "service": state.service_name,
        "version": state.service_version,
        "started_unix_ms": state.started_unix_ms,
        "route_count": state.route_count,
        "pandoc_status": "ok",
    });
    if let Err(error) = tool_check {
        body["pandoc_status"] = json!("error");
        body["pandoc_error"] = json!(error);
    }

    (StatusCode::OK, Json(body))
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
