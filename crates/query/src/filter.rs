use stockscope_core::common::Period;
use stockscope_core::market::entity::{Row, RowSet};
use stockscope_core::query::error::QueryError;

/// # Summary
/// 按周期过滤后的只读视图，借用共享快照中的行，不复制也不修改源数据。
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    source: &'a RowSet,
    period: String,
    rows: Vec<&'a Row>,
}

impl<'a> Subset<'a> {
    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    /// 去除首尾空白后的周期文本
    pub fn period(&self) -> &str {
        &self.period
    }

    /// 视图所属的快照，用于字段校验与诊断
    pub fn source(&self) -> &'a RowSet {
        self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// # Summary
/// 选出日期落在指定周期内的行。
///
/// # Logic
/// 1. 快照为空时视为数据不可用，先于周期解析返回。
/// 2. 解析周期文本 (年或年-月)，非法形态不触碰数据即返回。
/// 3. 日期缺失的行不匹配任何周期。
/// 4. 结果为空时返回 `NoDataForPeriod`。
///
/// # Arguments
/// * `set`: 共享的行快照。
/// * `period`: 调用方提供的周期文本。
///
/// # Returns
/// 匹配行的视图或 `QueryError`。
pub fn filter_by_period<'a>(set: &'a RowSet, period: &str) -> Result<Subset<'a>, QueryError> {
    if set.is_empty() {
        return Err(QueryError::DataUnavailable);
    }

    let parsed: Period = period.parse()?;
    let period = period.trim().to_string();

    let rows: Vec<&Row> = set
        .rows()
        .iter()
        .filter(|row| row.date.is_some_and(|date| parsed.contains(date)))
        .collect();

    if rows.is_empty() {
        return Err(QueryError::NoDataForPeriod(period));
    }

    Ok(Subset {
        source: set,
        period,
        rows,
    })
}
