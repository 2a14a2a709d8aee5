//! # API 统一错误处理
//!
//! 将查询管线的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stockscope_core::query::error::QueryError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 数据尚未就绪 (503)
    #[error("服务不可用: {0}")]
    ServiceUnavailable(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 内部错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                // 内部错误同样把缺失列等详情返回给调用方
                tracing::error!("内部服务错误: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `QueryError` 转换
impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let message = err.to_string();
        match err {
            QueryError::DataUnavailable => ApiError::ServiceUnavailable(message),
            QueryError::MissingPeriod | QueryError::InvalidPeriod(_) => ApiError::BadRequest(message),
            QueryError::NoDataForPeriod(_) | QueryError::EmptyResult { .. } => {
                ApiError::NotFound(message)
            }
            QueryError::SchemaMismatch { .. } | QueryError::GroupJoinMismatch { .. } => {
                ApiError::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscope_core::query::error::SummaryKind;

    fn status_of(err: QueryError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_query_error_status_mapping() {
        assert_eq!(status_of(QueryError::DataUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(QueryError::MissingPeriod), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(QueryError::InvalidPeriod("23".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(QueryError::NoDataForPeriod("2024".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(QueryError::EmptyResult {
                kind: SummaryKind::Sector,
                period: "2023".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(QueryError::SchemaMismatch {
                missing: vec!["Volume".into()],
                available: vec!["Date".into()]
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
