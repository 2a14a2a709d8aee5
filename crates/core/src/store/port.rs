use super::error::StoreError;
use crate::market::entity::RowSet;
use async_trait::async_trait;

/// # Summary
/// 行数据来源接口，负责一次性读出完整的 `RowSet`。
///
/// # Invariants
/// - 实现者必须返回构建完成的快照，不得返回部分结果。
/// - 加载期缺失值策略 (volume / market_cap 补 0) 由 `Row::from_cells` 统一应用。
#[async_trait]
pub trait RowSource: Send + Sync {
    /// # Summary
    /// 读取全部行。
    ///
    /// # Logic
    /// 1. 校验数据源与目标表存在。
    /// 2. 读取表中所有可识别的列并逐行解析。
    ///
    /// # Returns
    /// 完整的 `RowSet` 或 `StoreError`。
    async fn load(&self) -> Result<RowSet, StoreError>;

    /// 数据源的可读描述 (例如数据库文件路径)，用于日志与健康检查
    fn describe(&self) -> String;
}
