//! # `stockscope-store` - 存储适配层
//!
//! - [`sqlite::SqliteRowSource`]: 从 SQLite 表中一次性读出 `RowSet`。
//! - [`ingest::CsvIngestor`]: 将 CSV 去重后导入 SQLite 表。

pub mod ingest;
pub mod sqlite;
mod sql;
