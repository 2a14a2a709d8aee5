use std::collections::BTreeMap;

use stockscope_core::market::entity::{CompanySummary, Field, SectorSummary};
use stockscope_core::query::error::{QueryError, SummaryKind};

use crate::filter::Subset;

/// 板块汇总所需字段
pub const SECTOR_FIELDS: [Field; 4] = [Field::Sector, Field::Close, Field::Volume, Field::Volatility];

/// 公司汇总所需字段
pub const COMPANY_FIELDS: [Field; 11] = [
    Field::Company,
    Field::Sector,
    Field::Open,
    Field::High,
    Field::Low,
    Field::Close,
    Field::Volume,
    Field::Volatility,
    Field::PeRatio,
    Field::MarketCap,
    Field::Trend,
];

/// 分组内没有任何趋势值时使用的默认趋势
pub const DEFAULT_TREND: &str = "Neutral";

/// 跳过缺失值的均值累加器
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Default)]
struct SectorAcc {
    close: Mean,
    volume: i64,
    volatility: Mean,
}

#[derive(Debug, Default)]
struct CompanyAcc {
    open: Mean,
    high: Mean,
    low: Mean,
    close: Mean,
    volatility: Mean,
    pe_ratio: Mean,
    volume: i64,
    market_cap: f64,
}

type CompanyKey<'a> = (&'a str, &'a str);

/// 校验快照包含所需字段，缺失时报告缺失列与现有列
fn require_fields(subset: &Subset<'_>, required: &[Field]) -> Result<(), QueryError> {
    let source = subset.source();
    let missing = source.missing_fields(required);
    if missing.is_empty() {
        return Ok(());
    }
    Err(QueryError::SchemaMismatch {
        missing: missing.iter().map(|f| f.column().to_string()).collect(),
        available: source.columns().to_vec(),
    })
}

/// # Summary
/// 取众数。并列时返回升序排列中的第一个值。
///
/// # Returns
/// 输入为空时返回 None。
pub fn mode<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// # Summary
/// 按板块汇总。
///
/// # Logic
/// 1. 校验 `Sector / Close / Volume / Volatility` 字段存在。
/// 2. 以板块分组 (板块缺失的行不参与)：收盘价均值、成交量求和、波动率均值。
/// 3. 丢弃 `total_volume <= 0` 的分组。
/// 4. 按 `total_volume` 降序稳定排序，并列时保持板块名升序。
///
/// # Arguments
/// * `subset`: 已按周期过滤的视图。
///
/// # Returns
/// 汇总列表；没有分组保留时返回 `EmptyResult`。
pub fn aggregate_by_sector(subset: &Subset<'_>) -> Result<Vec<SectorSummary>, QueryError> {
    require_fields(subset, &SECTOR_FIELDS)?;

    let mut groups: BTreeMap<&str, SectorAcc> = BTreeMap::new();
    for &row in subset.rows() {
        let Some(sector) = row.sector.as_deref() else {
            continue;
        };
        let acc = groups.entry(sector).or_default();
        acc.close.push(row.close);
        acc.volume = acc.volume.saturating_add(row.volume);
        acc.volatility.push(row.volatility);
    }

    let mut summaries: Vec<SectorSummary> = groups
        .into_iter()
        .filter(|(_, acc)| acc.volume > 0)
        .map(|(sector, acc)| SectorSummary {
            sector: sector.to_string(),
            avg_close: acc.close.value(),
            total_volume: acc.volume,
            avg_volatility: acc.volatility.value(),
        })
        .collect();
    summaries.sort_by(|a, b| b.total_volume.cmp(&a.total_volume));

    if summaries.is_empty() {
        return Err(QueryError::EmptyResult {
            kind: SummaryKind::Sector,
            period: subset.period().to_string(),
        });
    }
    Ok(summaries)
}

/// 每个 (公司, 板块) 分组的趋势众数；没有趋势值的分组同样出现在结果中
fn trend_modes<'a>(subset: &Subset<'a>) -> BTreeMap<CompanyKey<'a>, String> {
    let mut values: BTreeMap<CompanyKey<'a>, Vec<&'a str>> = BTreeMap::new();
    for &row in subset.rows() {
        let (Some(company), Some(sector)) = (row.company.as_deref(), row.sector.as_deref()) else {
            continue;
        };
        let entry = values.entry((company, sector)).or_default();
        if let Some(trend) = row.trend.as_deref() {
            entry.push(trend);
        }
    }

    values
        .into_iter()
        .map(|(key, trends)| {
            let trend = mode(trends).unwrap_or(DEFAULT_TREND).to_string();
            (key, trend)
        })
        .collect()
}

/// # Summary
/// 按 (公司, 板块) 汇总。
///
/// # Logic
/// 1. 校验所需字段存在。
/// 2. 分组计算价格、波动率、市盈率均值与成交量、市值之和 (键缺失的行不参与)。
/// 3. 单独计算各分组的趋势众数，再按分组键一一连接；任一侧多出的键视为错误。
/// 4. 附加查询周期作为展示字段。
/// 5. 按市值降序稳定排序后截取前 `limit` 条，`limit <= 0` 返回空列表。
///
/// # Arguments
/// * `subset`: 已按周期过滤的视图。
/// * `limit`: 最多返回的条数。
///
/// # Returns
/// 汇总列表；没有任何分组时返回 `EmptyResult`。
pub fn aggregate_by_company(
    subset: &Subset<'_>,
    limit: i64,
) -> Result<Vec<CompanySummary>, QueryError> {
    require_fields(subset, &COMPANY_FIELDS)?;

    let mut groups: BTreeMap<CompanyKey<'_>, CompanyAcc> = BTreeMap::new();
    for &row in subset.rows() {
        let (Some(company), Some(sector)) = (row.company.as_deref(), row.sector.as_deref()) else {
            continue;
        };
        let acc = groups.entry((company, sector)).or_default();
        acc.open.push(row.open);
        acc.high.push(row.high);
        acc.low.push(row.low);
        acc.close.push(row.close);
        acc.volatility.push(row.volatility);
        acc.pe_ratio.push(row.pe_ratio);
        acc.volume = acc.volume.saturating_add(row.volume);
        acc.market_cap += row.market_cap;
    }

    let mut trends = trend_modes(subset);
    let period = subset.period().to_string();

    let mut summaries = Vec::with_capacity(groups.len());
    for ((company, sector), acc) in groups {
        let trend = trends
            .remove(&(company, sector))
            .ok_or_else(|| QueryError::GroupJoinMismatch {
                company: company.to_string(),
                sector: sector.to_string(),
            })?;
        summaries.push(CompanySummary {
            company: company.to_string(),
            sector: sector.to_string(),
            open: acc.open.value(),
            high: acc.high.value(),
            low: acc.low.value(),
            close: acc.close.value(),
            volume: acc.volume,
            volatility: acc.volatility.value(),
            pe_ratio: acc.pe_ratio.value(),
            market_cap: acc.market_cap,
            trend,
            date: period.clone(),
        });
    }
    if let Some(((company, sector), _)) = trends.into_iter().next() {
        return Err(QueryError::GroupJoinMismatch {
            company: company.to_string(),
            sector: sector.to_string(),
        });
    }

    if summaries.is_empty() {
        return Err(QueryError::EmptyResult {
            kind: SummaryKind::Company,
            period,
        });
    }

    summaries.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    let limit = usize::try_from(limit).unwrap_or(0);
    summaries.truncate(limit);
    Ok(summaries)
}
