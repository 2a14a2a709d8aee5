//! # 服务状态路由
//!
//! 健康检查与服务信息，不依赖数据是否就绪。

use std::collections::BTreeMap;
use std::path::Path;

use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::{HealthResponse, ServiceInfoResponse};

/// 健康检查
///
/// 进程存活即返回 200，通过 `ready` / `state` 反映数据加载进度。
#[utoipa::path(
    get,
    path = "/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = state.query_service.health().await;
    let database_path = state.app_config.database.path.clone();
    let database_exists = Path::new(&database_path).exists();

    Json(HealthResponse {
        status: "ok".to_string(),
        ready: health.ready,
        state: health.state.to_string(),
        row_count: health.row_count,
        database_path,
        database_exists,
    })
}

/// 服务信息
#[utoipa::path(
    get,
    path = "/",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务信息与接口列表", body = ServiceInfoResponse)
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfoResponse> {
    let health = state.query_service.health().await;

    let endpoints = BTreeMap::from([
        (
            "/metrics/sector_summary".to_string(),
            "Sector summary for a period (YYYY or YYYY-MM)".to_string(),
        ),
        (
            "/data/daily_prices".to_string(),
            "Company summary for a period, ordered by market cap".to_string(),
        ),
        ("/health".to_string(), "Service and data readiness".to_string()),
        ("/swagger-ui/".to_string(), "Interactive API documentation".to_string()),
    ]);

    Json(ServiceInfoResponse {
        message: "Stock Data Analysis API".to_string(),
        status: "running".to_string(),
        ready: health.ready,
        row_count: health.row_count,
        endpoints,
    })
}
