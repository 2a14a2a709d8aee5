use std::sync::Arc;

use stockscope_core::market::entity::{CompanySummary, RowSet, SectorSummary};
use stockscope_core::query::error::QueryError;
use stockscope_core::store::error::StoreError;
use stockscope_core::store::port::RowSource;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::aggregate::{aggregate_by_company, aggregate_by_sector};
use crate::filter::filter_by_period;

/// # Summary
/// 数据就绪状态。
///
/// # Invariants
/// - 状态流转：`Uninitialized → Loading → {Ready, Failed}`，重载可从任意状态再次开始。
/// - `Ready` 持有的快照构建完成后才会被发布。
#[derive(Debug)]
pub enum DataState {
    Uninitialized,
    Loading,
    Ready(Arc<RowSet>),
    Failed(String),
}

impl DataState {
    pub fn label(&self) -> &'static str {
        match self {
            DataState::Uninitialized => "uninitialized",
            DataState::Loading => "loading",
            DataState::Ready(_) => "ready",
            DataState::Failed(_) => "failed",
        }
    }
}

/// 健康检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub ready: bool,
    pub state: &'static str,
    pub row_count: usize,
}

/// # Summary
/// 查询服务门面：持有就绪状态容器，编排 周期过滤 → 分组汇总。
///
/// # Invariants
/// - 请求只克隆当前状态的 `Arc`，之后的计算不持有任何锁。
/// - 重载通过一次指针替换发布新快照，进行中的查询只会看到旧快照或新快照。
pub struct QueryService {
    // 当前数据状态
    state: RwLock<Arc<DataState>>,
    // daily_prices 的默认返回条数
    default_limit: i64,
}

impl QueryService {
    /// # Summary
    /// 创建处于 `Uninitialized` 状态的查询服务。
    ///
    /// # Arguments
    /// * `default_limit` - 公司汇总未指定 limit 时的默认值。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的服务实例。
    pub fn new(default_limit: i64) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(Arc::new(DataState::Uninitialized)),
            default_limit,
        })
    }

    /// 当前状态快照
    pub async fn state(&self) -> Arc<DataState> {
        self.state.read().await.clone()
    }

    async fn publish(&self, next: DataState) {
        *self.state.write().await = Arc::new(next);
    }

    /// # Summary
    /// 从数据源 (重新) 加载行数据。
    ///
    /// # Logic
    /// 1. 尚无可用快照时切换为 `Loading`；已 `Ready` 时继续对外提供旧快照。
    /// 2. 在锁外完成整个加载。
    /// 3. 成功发布 `Ready`，失败记录日志并发布 `Failed`。
    ///
    /// # Arguments
    /// * `source` - 行数据来源。
    ///
    /// # Returns
    /// * `Result<usize, StoreError>` - 成功时返回加载的行数。
    pub async fn reload(&self, source: &dyn RowSource) -> Result<usize, StoreError> {
        {
            let mut guard = self.state.write().await;
            if !matches!(**guard, DataState::Ready(_)) {
                *guard = Arc::new(DataState::Loading);
            }
        }

        info!("Loading rows from {}", source.describe());
        match source.load().await {
            Ok(set) => {
                let count = set.len();
                info!(
                    "Data loaded successfully. Total rows: {}, columns: {:?}",
                    count,
                    set.columns()
                );
                self.publish(DataState::Ready(Arc::new(set))).await;
                Ok(count)
            }
            Err(e) => {
                error!("Failed to load data from {}: {}", source.describe(), e);
                self.publish(DataState::Failed(e.to_string())).await;
                Err(e)
            }
        }
    }

    /// 就绪且快照非空时返回当前快照，否则在处理周期参数前返回 `DataUnavailable`
    async fn snapshot(&self) -> Result<Arc<RowSet>, QueryError> {
        match &*self.state().await {
            DataState::Ready(set) if !set.is_empty() => Ok(set.clone()),
            _ => Err(QueryError::DataUnavailable),
        }
    }

    /// # Summary
    /// 指定周期内按板块汇总。
    ///
    /// # Arguments
    /// * `period` - 周期文本，None 表示调用方未提供。
    ///
    /// # Returns
    /// * `Result<Vec<SectorSummary>, QueryError>`
    pub async fn sector_summary(
        &self,
        period: Option<&str>,
    ) -> Result<Vec<SectorSummary>, QueryError> {
        let set = self.snapshot().await?;
        let period = period.ok_or(QueryError::MissingPeriod)?;
        let subset = filter_by_period(&set, period)?;
        aggregate_by_sector(&subset)
    }

    /// # Summary
    /// 指定周期内按 (公司, 板块) 汇总。
    ///
    /// # Arguments
    /// * `period` - 周期文本，None 表示调用方未提供。
    /// * `limit` - 最多返回条数，None 时使用默认值。
    ///
    /// # Returns
    /// * `Result<Vec<CompanySummary>, QueryError>`
    pub async fn daily_prices(
        &self,
        period: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<CompanySummary>, QueryError> {
        let set = self.snapshot().await?;
        let period = period.ok_or(QueryError::MissingPeriod)?;
        let subset = filter_by_period(&set, period)?;
        aggregate_by_company(&subset, limit.unwrap_or(self.default_limit))
    }

    pub async fn health(&self) -> Health {
        let state = self.state().await;
        let row_count = match &*state {
            DataState::Ready(set) => set.len(),
            _ => 0,
        };
        Health {
            ready: matches!(*state, DataState::Ready(_)),
            state: state.label(),
            row_count,
        }
    }
}
