use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// # Summary
/// 数据源中可识别的列。
///
/// # Invariants
/// - `column()` 返回的名称与入库表结构中的列名一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Date,
    Company,
    Sector,
    Open,
    High,
    Low,
    Close,
    Volume,
    MarketCap,
    PeRatio,
    DividendYield,
    Volatility,
    SentimentScore,
    Trend,
}

impl Field {
    /// 全部字段，顺序与表结构一致
    pub const ALL: [Field; 14] = [
        Field::Date,
        Field::Company,
        Field::Sector,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::MarketCap,
        Field::PeRatio,
        Field::DividendYield,
        Field::Volatility,
        Field::SentimentScore,
        Field::Trend,
    ];

    /// 数据源中的列名
    pub fn column(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Company => "Company",
            Field::Sector => "Sector",
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::Volume => "Volume",
            Field::MarketCap => "Market_Cap",
            Field::PeRatio => "PE_Ratio",
            Field::DividendYield => "Dividend_Yield",
            Field::Volatility => "Volatility",
            Field::SentimentScore => "Sentiment_Score",
            Field::Trend => "Trend",
        }
    }

    /// 按列名查找字段 (忽略大小写)
    pub fn from_column(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.column().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// # Summary
/// 数据源中的单元格，保留其原始存储类型。
///
/// # Invariants
/// - 数值单元格直接携带数值，不经过文本往返，精度与存储值一致。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// 文本形式：数值单元格按其十进制表示转换
    fn text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(v) => Some(v.to_string()),
            Cell::Real(v) => Some(v.to_string()),
            Cell::Text(v) => Some(v.clone()),
        }
    }

    /// 只有文本单元格可以表示日期
    fn date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Text(v) => parse_date(v),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn number(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v).filter(|v| !v.is_nan()),
            Cell::Text(v) => parse_number(v),
        }
    }

    fn integer(&self) -> Option<i64> {
        match self {
            Cell::Null => None,
            Cell::Integer(v) => Some(*v),
            Cell::Real(v) => real_to_integer(*v),
            Cell::Text(v) => parse_integer(v),
        }
    }
}

/// # Summary
/// 单条行情观测记录。
///
/// # Invariants
/// - `date` 为 None 表示原始日期无法解析，该行不会匹配任何周期。
/// - 数值字段解析失败时为 None (缺失)，唯独 `volume` 与 `market_cap` 在加载时补 0。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    // 交易日期
    pub date: Option<NaiveDate>,
    // 公司名称
    pub company: Option<String>,
    // 所属板块
    pub sector: Option<String>,
    // 开盘价
    pub open: Option<f64>,
    // 最高价
    pub high: Option<f64>,
    // 最低价
    pub low: Option<f64>,
    // 收盘价
    pub close: Option<f64>,
    // 成交量 (实数四舍五入，缺失补 0)
    pub volume: i64,
    // 市值 (缺失补 0)
    pub market_cap: f64,
    // 市盈率
    pub pe_ratio: Option<f64>,
    // 股息率
    pub dividend_yield: Option<f64>,
    // 波动率，通常为 [0, 1) 之间的小数
    pub volatility: Option<f64>,
    // 情绪得分
    pub sentiment_score: Option<f64>,
    // 趋势标签 (Bullish / Bearish / Neutral)
    pub trend: Option<String>,
}

impl Row {
    /// # Summary
    /// 由一组 (字段, 单元格) 构建一行，并应用加载期的缺失值策略。
    ///
    /// # Logic
    /// 1. 日期只从文本单元格按若干常见格式宽松解析，失败记为 None。
    /// 2. 文本字段保留原值，数值单元格转为其十进制文本，NULL 记为 None。
    /// 3. 数值单元格原样使用；文本单元格解析失败或为 NaN 记为 None。
    /// 4. `volume` 中的实数四舍五入取整。
    /// 5. `volume` / `market_cap` 缺失时补 0。
    ///
    /// # Arguments
    /// * `cells`: 单元格迭代器。
    ///
    /// # Returns
    /// 构建完成的 `Row`。
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (Field, Cell)>,
    {
        let mut row = Row::default();
        for (field, cell) in cells {
            match field {
                Field::Date => row.date = cell.date(),
                Field::Company => row.company = cell.text(),
                Field::Sector => row.sector = cell.text(),
                Field::Trend => row.trend = cell.text(),
                Field::Open => row.open = cell.number(),
                Field::High => row.high = cell.number(),
                Field::Low => row.low = cell.number(),
                Field::Close => row.close = cell.number(),
                Field::PeRatio => row.pe_ratio = cell.number(),
                Field::DividendYield => row.dividend_yield = cell.number(),
                Field::Volatility => row.volatility = cell.number(),
                Field::SentimentScore => row.sentiment_score = cell.number(),
                Field::Volume => row.volume = cell.integer().unwrap_or(0),
                Field::MarketCap => row.market_cap = cell.number().unwrap_or(0.0),
            }
        }
        row
    }
}

/// # Summary
/// 全量行数据的不可变快照。
///
/// # Invariants
/// - 构建后不再修改；所有过滤操作产生新的视图。
/// - `fields` 由 `columns` 推导，只包含可识别的列。
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    // 数据源中的原始列名 (用于诊断)
    columns: Vec<String>,
    // 数据源中实际存在的字段
    fields: BTreeSet<Field>,
    // 全部行
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let fields = columns.iter().filter_map(|c| Field::from_column(c)).collect();
        Self {
            columns,
            fields,
            rows,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// 返回 `required` 中数据源缺失的字段，保持传入顺序
    pub fn missing_fields(&self, required: &[Field]) -> Vec<Field> {
        required
            .iter()
            .copied()
            .filter(|f| !self.fields.contains(f))
            .collect()
    }
}

/// # Summary
/// 按板块汇总的结果。
///
/// # Invariants
/// - `total_volume` 恒大于 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: String,
    // 收盘价均值 (无有效值时为 None)
    pub avg_close: Option<f64>,
    pub total_volume: i64,
    pub avg_volatility: Option<f64>,
}

/// # Summary
/// 按 (公司, 板块) 汇总的结果。
///
/// # Invariants
/// - `trend` 为分组内众数，无趋势值时为 "Neutral"。
/// - `date` 仅用于展示，等于查询周期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub company: String,
    pub sector: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: i64,
    pub volatility: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub market_cap: f64,
    pub trend: String,
    pub date: String,
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 宽松解析日期文本，无法识别时返回 None
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// 解析浮点数，空串、非法文本及 NaN 视为缺失
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 解析整数；实数形式的文本 (如 "1200.0"、"12.5") 按 [`real_to_integer`] 取整
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    raw.parse::<f64>().ok().and_then(real_to_integer)
}

/// 实数转整数：四舍五入 (0.5 远离零)，超出 i64 范围时饱和到边界，NaN 视为缺失
#[allow(clippy::cast_possible_truncation)]
pub fn real_to_integer(v: f64) -> Option<i64> {
    if v.is_nan() {
        return None;
    }
    // float → int 的 `as` 转换在越界时饱和
    Some(v.round() as i64)
}
