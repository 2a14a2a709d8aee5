//! # 指标路由控制器
//!
//! 实现 `/metrics` 路径下的板块汇总接口。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::error::ApiError;
use crate::routes::query_params;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, PeriodQuery, SectorSummaryResponse};

/// 板块汇总
///
/// 返回指定周期内各板块的收盘价均值、成交量合计与波动率均值，按成交量降序。
#[utoipa::path(
    get,
    path = "/metrics/sector_summary",
    tag = "指标 (Metrics)",
    params(
        ("period" = String, Query, description = "YYYY 或 YYYY-MM")
    ),
    responses(
        (status = 200, description = "汇总成功", body = Vec<SectorSummaryResponse>),
        (status = 400, description = "周期缺失或格式错误", body = ApiErrorResponse),
        (status = 404, description = "该周期没有数据", body = ApiErrorResponse),
        (status = 500, description = "数据表缺少所需列", body = ApiErrorResponse),
        (status = 503, description = "数据尚未加载", body = ApiErrorResponse)
    )
)]
pub async fn sector_summary(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<SectorSummaryResponse>>, ApiError> {
    let query = query_params(query)?;
    let summaries = state
        .query_service
        .sector_summary(query.period.as_deref())
        .await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(SectorSummaryResponse::from)
            .collect(),
    ))
}
