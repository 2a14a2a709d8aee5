use crate::query::error::QueryError;
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

/// # Summary
/// 查询周期，由调用方以文本形式提供，选中某个自然年或某个自然月。
///
/// # Invariants
/// - 年份来源于恰好 4 位的 ASCII 数字。
/// - 月份不做 1..=12 的范围校验，越界月份不会匹配任何日期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    // 整年 (例如: 2023)
    Year(i32),
    // 年-月 (例如: 2023-07)
    YearMonth { year: i32, month: u32 },
}

impl Period {
    /// # Summary
    /// 判断某个日期是否落在该周期内。
    ///
    /// # Arguments
    /// * `date`: 待判断的日历日期。
    ///
    /// # Returns
    /// 日期的年份 (及月份) 与周期一致时返回 true。
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::Year(year) => date.year() == year,
            Period::YearMonth { year, month } => date.year() == year && date.month() == month,
        }
    }
}

impl FromStr for Period {
    type Err = QueryError;

    /// # Summary
    /// 解析周期文本。
    ///
    /// # Logic
    /// 1. 去除首尾空白，空串视为缺失参数。
    /// 2. 恰好 4 位数字 → `Year`。
    /// 3. 恰好 7 个字符且仅含一个 `-`，左侧为 4 位数字、右侧可解析为整数 → `YearMonth`。
    /// 4. 其余形态一律 `InvalidPeriod`。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(QueryError::MissingPeriod);
        }
        let invalid = || QueryError::InvalidPeriod(raw.to_string());

        let len = raw.chars().count();
        if len == 4 && is_four_digits(raw) {
            let year = raw.parse::<i32>().map_err(|_| invalid())?;
            return Ok(Period::Year(year));
        }

        if len == 7 && raw.matches('-').count() == 1 {
            let (year_part, month_part) = raw.split_once('-').ok_or_else(invalid)?;
            if is_four_digits(year_part) {
                let year = year_part.parse::<i32>().map_err(|_| invalid())?;
                let month = month_part.trim().parse::<u32>().map_err(|_| invalid())?;
                return Ok(Period::YearMonth { year, month });
            }
        }

        Err(invalid())
    }
}

fn is_four_digits(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_digit())
}
