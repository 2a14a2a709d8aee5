//! # `stockscope-query` - 查询管线
//!
//! 周期过滤 → 分组汇总，以及持有数据就绪状态的 [`service::QueryService`] 门面。

pub mod aggregate;
pub mod filter;
pub mod service;
