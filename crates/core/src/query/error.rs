use thiserror::Error;

/// # Summary
/// 汇总结果的类别，用于在空结果错误中说明是哪一类查询。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Sector,
    Company,
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryKind::Sector => write!(f, "sector"),
            SummaryKind::Company => write!(f, "company price"),
        }
    }
}

/// # Summary
/// 查询管线 (周期过滤 → 分组汇总) 的错误枚举。
///
/// # Invariants
/// - 所有错误均可在请求边界恢复，不会终止进程。
/// - 每个变体都携带周期文本或缺失字段等上下文。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    // 数据尚未加载、加载失败或加载结果为空
    #[error("Data not loaded. Please check if database file exists and contains the required table.")]
    DataUnavailable,
    // 未提供周期参数
    #[error("Period parameter is required.")]
    MissingPeriod,
    // 周期格式非法
    #[error("Invalid period format '{0}'. Use YYYY or YYYY-MM.")]
    InvalidPeriod(String),
    // 周期合法但没有任何行落在其中
    #[error("No data found for period {0}")]
    NoDataForPeriod(String),
    // 数据源缺少汇总所需的列
    #[error("Missing required columns in data: {missing:?}. Available columns: {available:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        available: Vec<String>,
    },
    // 过滤后有数据，但汇总后没有任何分组保留下来
    #[error("No {kind} data found for period {period}")]
    EmptyResult { kind: SummaryKind, period: String },
    // 数值汇总与趋势众数的分组键无法一一对应
    #[error("Group join mismatch for company '{company}' in sector '{sector}'")]
    GroupJoinMismatch { company: String, sector: String },
}
