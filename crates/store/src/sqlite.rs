use async_trait::async_trait;
use sqlx::{
    Row as _, SqlitePool, TypeInfo, ValueRef,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use std::path::PathBuf;
use stockscope_core::market::entity::{Cell, Field, Row, RowSet};
use stockscope_core::store::error::StoreError;
use stockscope_core::store::port::RowSource;
use tracing::{info, warn};

use crate::sql::{quote_ident, validate_table_name};

/// RowSource 的 SQLite 实现。
///
/// # Summary
/// 从单个 SQLite 数据库文件的指定表中读出全部行，构建不可变的 `RowSet`。
///
/// # Invariants
/// * 数据库文件必须已存在，读取时不会隐式创建。
/// * `table` 在构造时已校验为合法标识符。
pub struct SqliteRowSource {
    path: PathBuf,
    table: String,
}

impl SqliteRowSource {
    /// 创建新的 SqliteRowSource 实例。
    ///
    /// # Arguments
    /// * `path` - SQLite 数据库文件路径。
    /// * `table` - 行情数据表名。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 表名非法时返回 `InvalidTableName`。
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        Ok(Self {
            path: path.into(),
            table: table.to_string(),
        })
    }

    /// 以只读方式打开数据库。
    ///
    /// # Logic
    /// 1. 文件不存在时直接返回 `SourceMissing`。
    /// 2. 使用单连接池，加载只发生在启动或重载时。
    async fn connect(&self) -> Result<SqlitePool, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::SourceMissing(self.path.display().to_string()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// 确认目标表存在，否则列出库中现有的表以便排查。
    async fn ensure_table(&self, pool: &SqlitePool) -> Result<(), StoreError> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(&self.table)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if found.is_some() {
            return Ok(());
        }

        let available: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        warn!(
            "Table '{}' not found in {}, available tables: {:?}",
            self.table,
            self.path.display(),
            available
        );
        Err(StoreError::TableMissing {
            table: self.table.clone(),
            available,
        })
    }
}

#[async_trait]
impl RowSource for SqliteRowSource {
    /// # Summary
    /// 读取整张表。
    ///
    /// # Logic
    /// 1. 打开数据库并确认表存在。
    /// 2. 通过 `pragma_table_info` 获取列名，筛出可识别的字段 (同一字段只取首列)；缺少 `Date` 列时报错。
    /// 3. 逐个单元格按其实际存储类型读出，再交由 `Row::from_cells` 解析。
    ///
    /// # Returns
    /// * `Result<RowSet, StoreError>`
    async fn load(&self) -> Result<RowSet, StoreError> {
        let pool = self.connect().await?;
        self.ensure_table(&pool).await?;

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                .bind(&self.table)
                .fetch_all(&pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut selected: Vec<(Field, &str)> = Vec::new();
        for column in &columns {
            if let Some(field) = Field::from_column(column) {
                if selected.iter().all(|(f, _)| *f != field) {
                    selected.push((field, column.as_str()));
                }
            }
        }

        if selected.iter().all(|(f, _)| *f != Field::Date) {
            pool.close().await;
            warn!(
                "Table '{}' in {} has no {} column, columns: {:?}",
                self.table,
                self.path.display(),
                Field::Date,
                columns
            );
            return Err(StoreError::MissingColumn {
                table: self.table.clone(),
                column: Field::Date.column().to_string(),
                available: columns,
            });
        }

        let select_list = selected
            .iter()
            .map(|(_, column)| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", select_list, quote_ident(&self.table));

        let records = sqlx::query(&sql)
            .fetch_all(&pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            let mut cells = Vec::with_capacity(selected.len());
            for (idx, (field, _)) in selected.iter().enumerate() {
                cells.push((*field, read_cell(record, idx)?));
            }
            rows.push(Row::from_cells(cells));
        }

        pool.close().await;

        info!(
            "Loaded {} rows from {}.{} (columns: {:?})",
            rows.len(),
            self.path.display(),
            self.table,
            columns
        );
        Ok(RowSet::new(columns, rows))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 按单元格的实际存储类型 (而非列声明类型) 读取，数值不经过文本转换
fn read_cell(record: &SqliteRow, idx: usize) -> Result<Cell, StoreError> {
    let decode_err = |e: sqlx::Error| StoreError::Database(e.to_string());

    let raw = record.try_get_raw(idx).map_err(decode_err)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let storage = raw.type_info().name().to_string();

    let cell = match storage.as_str() {
        "INTEGER" => Cell::Integer(record.try_get_unchecked::<i64, _>(idx).map_err(decode_err)?),
        "REAL" => Cell::Real(record.try_get_unchecked::<f64, _>(idx).map_err(decode_err)?),
        "TEXT" => Cell::Text(record.try_get_unchecked::<String, _>(idx).map_err(decode_err)?),
        // BLOB 等无法解释的存储类型视为缺失
        _ => Cell::Null,
    };
    Ok(cell)
}
