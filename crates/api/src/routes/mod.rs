//! # 路由控制器
//!
//! 每个子模块对应一组 REST 接口，Handler 只负责参数提取与 DTO 转换，
//! 业务逻辑全部委托给 `QueryService`。

pub mod data;
pub mod health;
pub mod metrics;

use axum::extract::Query;
use axum::extract::rejection::QueryRejection;

use crate::error::ApiError;

/// 将查询串解析失败 (如 `limit=abc`) 统一转换为 JSON 格式的 400 响应
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
