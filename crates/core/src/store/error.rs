use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理数据源缺失、表缺失、读写失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据源文件不存在
    #[error("Source not found: {0}")]
    SourceMissing(String),
    /// 数据库中不存在目标表
    #[error("Table '{table}' not found, available tables: {available:?}")]
    TableMissing {
        table: String,
        available: Vec<String>,
    },
    /// 目标表缺少必需的列
    #[error("Table '{table}' has no '{column}' column, available columns: {available:?}")]
    MissingColumn {
        table: String,
        column: String,
        available: Vec<String>,
    },
    /// 表名不是合法的 SQL 标识符
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// CSV 读取或解析失败
    #[error("CSV error: {0}")]
    Csv(String),
    /// 文件系统错误
    #[error("IO error: {0}")]
    Io(String),
}
