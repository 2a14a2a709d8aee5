//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  汇总相关 DTO
// ============================================================

/// 板块汇总 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorSummaryResponse {
    /// 板块
    #[schema(example = "Technology")]
    pub sector: String,
    /// 收盘价均值
    #[schema(example = 152.37)]
    pub avg_close: Option<f64>,
    /// 成交量合计
    #[schema(example = 1250000)]
    pub total_volume: i64,
    /// 波动率均值
    #[schema(example = 0.21)]
    pub avg_volatility: Option<f64>,
}

/// 公司汇总 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanySummaryResponse {
    /// 公司名称
    #[schema(example = "Acme Corp")]
    pub company: String,
    /// 板块
    #[schema(example = "Technology")]
    pub sector: String,
    /// 开盘价均值
    pub open: Option<f64>,
    /// 最高价均值
    pub high: Option<f64>,
    /// 最低价均值
    pub low: Option<f64>,
    /// 收盘价均值
    pub close: Option<f64>,
    /// 成交量合计
    pub volume: i64,
    /// 波动率均值
    pub volatility: Option<f64>,
    /// 市盈率均值
    pub pe_ratio: Option<f64>,
    /// 市值合计
    pub market_cap: f64,
    /// 趋势众数
    #[schema(example = "Bullish")]
    pub trend: String,
    /// 查询周期 (仅用于展示)
    #[schema(example = "2023-07")]
    pub date: String,
}

// ============================================================
//  服务状态 DTO
// ============================================================

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 进程存活即为 "ok"
    #[schema(example = "ok")]
    pub status: String,
    /// 数据是否已就绪
    pub ready: bool,
    /// 就绪状态 (uninitialized / loading / ready / failed)
    #[schema(example = "ready")]
    pub state: String,
    /// 已加载行数
    #[schema(example = 1000)]
    pub row_count: usize,
    /// 数据库文件路径
    #[schema(example = "data/stock_data.db")]
    pub database_path: String,
    /// 数据库文件是否存在
    pub database_exists: bool,
}

/// 服务信息 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfoResponse {
    #[schema(example = "Stock Data Analysis API")]
    pub message: String,
    #[schema(example = "running")]
    pub status: String,
    pub ready: bool,
    pub row_count: usize,
    /// 路径 → 说明
    pub endpoints: BTreeMap<String, String>,
}

// ============================================================
//  查询参数
// ============================================================

/// 板块汇总查询参数
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PeriodQuery {
    /// YYYY 或 YYYY-MM
    pub period: Option<String>,
}

/// 公司汇总查询参数
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PricesQuery {
    /// YYYY 或 YYYY-MM
    pub period: Option<String>,
    /// 最多返回条数
    pub limit: Option<i64>,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

impl From<stockscope_core::market::entity::SectorSummary> for SectorSummaryResponse {
    fn from(s: stockscope_core::market::entity::SectorSummary) -> Self {
        Self {
            sector: s.sector,
            avg_close: s.avg_close,
            total_volume: s.total_volume,
            avg_volatility: s.avg_volatility,
        }
    }
}

impl From<stockscope_core::market::entity::CompanySummary> for CompanySummaryResponse {
    fn from(c: stockscope_core::market::entity::CompanySummary) -> Self {
        Self {
            company: c.company,
            sector: c.sector,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            volatility: c.volatility,
            pe_ratio: c.pe_ratio,
            market_cap: c.market_cap,
            trend: c.trend,
            date: c.date,
        }
    }
}
