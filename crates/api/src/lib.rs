//! # `stockscope-api` - HTTP API 网关
//!
//! 本 crate 是 stockscope 行情分析服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收 HTTP 请求并提取 `period` / `limit` 查询参数
//! - 调用下层 `QueryService` 完成过滤与汇总
//! - 将领域模型转换为 DTO，将 `QueryError` 映射为 HTTP 状态码

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
