//! # 行情数据路由控制器
//!
//! 实现 `/data` 路径下的公司汇总接口。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::error::ApiError;
use crate::routes::query_params;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, CompanySummaryResponse, PricesQuery};

/// 公司汇总
///
/// 按 (公司, 板块) 汇总指定周期内的价格、成交量与市值，按市值降序截取前 `limit` 条。
/// 对应原看板中的公司价格表。
#[utoipa::path(
    get,
    path = "/data/daily_prices",
    tag = "行情 (Data)",
    params(
        ("period" = String, Query, description = "YYYY 或 YYYY-MM"),
        ("limit" = Option<i64>, Query, description = "最多返回条数，默认 500，<= 0 时返回空列表")
    ),
    responses(
        (status = 200, description = "汇总成功", body = Vec<CompanySummaryResponse>),
        (status = 400, description = "参数缺失或格式错误", body = ApiErrorResponse),
        (status = 404, description = "该周期没有数据", body = ApiErrorResponse),
        (status = 500, description = "数据表缺少所需列", body = ApiErrorResponse),
        (status = 503, description = "数据尚未加载", body = ApiErrorResponse)
    )
)]
pub async fn daily_prices(
    State(state): State<AppState>,
    query: Result<Query<PricesQuery>, QueryRejection>,
) -> Result<Json<Vec<CompanySummaryResponse>>, ApiError> {
    let query = query_params(query)?;
    let summaries = state
        .query_service
        .daily_prices(query.period.as_deref(), query.limit)
        .await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(CompanySummaryResponse::from)
            .collect(),
    ))
}
