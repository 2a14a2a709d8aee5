use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use stockscope_core::market::entity::{Field, parse_date, parse_integer, parse_number};
use stockscope_core::store::error::StoreError;
use tracing::{info, warn};

use crate::sql::{quote_ident, validate_table_name};

/// 一次导入的统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    // CSV 中读到的数据行数
    pub read: usize,
    // 新插入的行数
    pub inserted: usize,
    // 因 Date 已存在 (库中或同一文件中更早出现) 而跳过的行数
    pub skipped_duplicate: usize,
    // 因 Date 无法解析而跳过的行数
    pub skipped_invalid: usize,
}

/// CSV 中的一行，`Date` 已规范化为 `%Y-%m-%d`
struct StagedRecord {
    date: String,
    cells: HashMap<Field, String>,
}

impl StagedRecord {
    fn cell(&self, field: Field) -> Option<&str> {
        self.cells.get(&field).map(String::as_str)
    }
}

/// CSV → SQLite 导入器。
///
/// # Summary
/// 读取行情 CSV，按 `Date` 主键去重后追加到目标表。
///
/// # Invariants
/// * 目标表不存在时按固定结构创建，`Date` 为主键。
/// * 一次导入在单个事务中完成，失败时不会留下部分数据。
pub struct CsvIngestor {
    db_path: PathBuf,
    table: String,
}

impl CsvIngestor {
    /// 创建导入器。
    ///
    /// # Arguments
    /// * `db_path` - SQLite 数据库文件路径 (不存在时自动创建)。
    /// * `table` - 目标表名。
    pub fn new(db_path: impl Into<PathBuf>, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        Ok(Self {
            db_path: db_path.into(),
            table: table.to_string(),
        })
    }

    /// # Summary
    /// 执行一次导入。
    ///
    /// # Logic
    /// 1. 读取并暂存 CSV，日期无法解析的行计入 `skipped_invalid`。
    /// 2. 打开 (必要时创建) 数据库并确保表结构存在。
    /// 3. 读出已有的 `Date` 集合，只插入新日期的行。
    /// 4. 在单个事务中提交。
    ///
    /// # Arguments
    /// * `csv_path` - 待导入的 CSV 文件。
    ///
    /// # Returns
    /// * `Result<IngestReport, StoreError>`
    pub async fn ingest(&self, csv_path: &Path) -> Result<IngestReport, StoreError> {
        if !csv_path.exists() {
            return Err(StoreError::SourceMissing(csv_path.display().to_string()));
        }

        let mut report = IngestReport::default();
        let staged = read_csv(csv_path, &mut report)?;

        let pool = self.connect().await?;
        self.ensure_table_schema(&pool).await?;

        let select_sql = format!(
            "SELECT CAST(\"Date\" AS TEXT) FROM {}",
            quote_ident(&self.table)
        );
        let existing: Vec<Option<String>> = sqlx::query_scalar(&select_sql)
            .fetch_all(&pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let mut seen: HashSet<String> = existing.into_iter().flatten().collect();

        let columns = Field::ALL
            .iter()
            .map(|f| quote_ident(f.column()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; Field::ALL.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            columns,
            placeholders
        );

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for record in &staged {
            if !seen.insert(record.date.clone()) {
                report.skipped_duplicate += 1;
                continue;
            }

            let mut query = sqlx::query(&insert_sql);
            for field in Field::ALL {
                query = match field {
                    Field::Date => query.bind(record.date.clone()),
                    Field::Company | Field::Sector | Field::Trend => {
                        query.bind(record.cell(field).map(str::to_string))
                    }
                    Field::Volume => query.bind(record.cell(field).and_then(parse_integer)),
                    _ => query.bind(record.cell(field).and_then(parse_number)),
                };
            }
            query
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
            report.inserted += 1;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        pool.close().await;

        if report.inserted == 0 {
            info!("No new rows to insert. {} is up to date.", self.table);
        } else {
            info!("Ingested {} new rows into {}", report.inserted, self.table);
        }
        Ok(report)
    }

    async fn connect(&self) -> Result<SqlitePool, StoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn ensure_table_schema(&self, pool: &SqlitePool) -> Result<(), StoreError> {
        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                Date TEXT PRIMARY KEY,
                Company TEXT,
                Sector TEXT,
                Open REAL,
                High REAL,
                Low REAL,
                Close REAL,
                Volume INTEGER,
                Market_Cap REAL,
                PE_Ratio REAL,
                Dividend_Yield REAL,
                Volatility REAL,
                Sentiment_Score REAL,
                Trend TEXT
            );
            "#,
            quote_ident(&self.table)
        );
        sqlx::query(&create_sql)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

/// 读取 CSV 并按表头映射到字段，空单元格视为缺失，未知列忽略。
fn read_csv(path: &Path, report: &mut IngestReport) -> Result<Vec<StagedRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| StoreError::Csv(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| StoreError::Csv(e.to_string()))?
        .clone();
    let mapping: Vec<Option<Field>> = headers.iter().map(Field::from_column).collect();
    if !mapping.contains(&Some(Field::Date)) {
        return Err(StoreError::Csv(format!(
            "missing Date column in {}, headers: {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let mut staged = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| StoreError::Csv(e.to_string()))?;
        report.read += 1;

        let mut cells = HashMap::new();
        for (value, field) in record.iter().zip(&mapping) {
            if let Some(field) = field {
                if !value.is_empty() {
                    cells.entry(*field).or_insert_with(|| value.to_string());
                }
            }
        }

        let date = cells
            .get(&Field::Date)
            .and_then(|raw| parse_date(raw))
            .map(|d| d.format("%Y-%m-%d").to_string());
        match date {
            Some(date) => staged.push(StagedRecord { date, cells }),
            None => {
                warn!("Skipping CSV record {} with unparseable Date", line + 1);
                report.skipped_invalid += 1;
            }
        }
    }
    Ok(staged)
}
