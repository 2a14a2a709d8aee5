use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use stockscope_core::market::entity::Field;
use stockscope_core::store::error::StoreError;
use stockscope_core::store::port::RowSource;
use stockscope_store::sqlite::SqliteRowSource;
use tempfile::tempdir;

/// 建一个只有部分列、且列值类型混杂的表
async fn seed(path: &std::path::Path, ddl: &str, inserts: &[&str]) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::query(ddl).execute(&pool).await?;
    for sql in inserts {
        sqlx::query(sql).execute(&pool).await?;
    }
    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn test_load_reads_and_coerces_rows() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("stock.db");
    seed(
        &db,
        "CREATE TABLE stock_data (Date TEXT, Sector TEXT, Close REAL, Volume INTEGER, Volatility REAL, Extra TEXT)",
        &[
            "INSERT INTO stock_data VALUES ('2023-01-05', 'Tech', 100.0, 10, 0.1, 'x')",
            "INSERT INTO stock_data VALUES ('2023-06-01 00:00:00', 'Tech', '200', NULL, 'bad', NULL)",
            "INSERT INTO stock_data VALUES ('garbage', NULL, NULL, 7.0, NULL, NULL)",
        ],
    )
    .await?;

    let set = SqliteRowSource::new(&db, "stock_data")?.load().await?;
    assert_eq!(set.len(), 3);
    assert_eq!(
        set.columns(),
        &["Date", "Sector", "Close", "Volume", "Volatility", "Extra"]
    );
    assert!(set.has_field(Field::Volatility));
    assert!(!set.has_field(Field::Company));

    let rows = set.rows();
    assert_eq!(rows[0].close, Some(100.0));
    assert_eq!(rows[0].volume, 10);
    assert_eq!(rows[1].close, Some(200.0));
    assert_eq!(rows[1].volume, 0);
    assert_eq!(rows[1].volatility, None);
    assert_eq!(rows[1].date, chrono::NaiveDate::from_ymd_opt(2023, 6, 1));
    assert_eq!(rows[2].date, None);
    assert_eq!(rows[2].volume, 7);
    Ok(())
}

#[tokio::test]
async fn test_load_keeps_stored_real_precision() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("stock.db");
    seed(
        &db,
        "CREATE TABLE stock_data (Date TEXT, Close REAL, Market_Cap REAL, Volume REAL)",
        &["INSERT INTO stock_data VALUES ('2023-01-05', 0.1 + 0.2, 1234567890123.4567, 12.5)"],
    )
    .await?;

    let set = SqliteRowSource::new(&db, "stock_data")?.load().await?;
    let row = &set.rows()[0];
    assert_eq!(row.close, Some(0.1 + 0.2));
    assert_eq!(row.market_cap, 1_234_567_890_123.456_7);
    // 实数成交量四舍五入
    assert_eq!(row.volume, 13);
    Ok(())
}

#[tokio::test]
async fn test_load_matches_columns_case_insensitively() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("stock.db");
    seed(
        &db,
        "CREATE TABLE stock_data (date TEXT, SECTOR TEXT, close REAL, market_cap REAL)",
        &["INSERT INTO stock_data VALUES ('2023-03-01', 'Energy', 55.5, 900.0)"],
    )
    .await?;

    let set = SqliteRowSource::new(&db, "stock_data")?.load().await?;
    assert!(set.has_field(Field::Date));
    assert!(set.has_field(Field::Sector));
    assert!(set.has_field(Field::MarketCap));
    let row = &set.rows()[0];
    assert_eq!(row.date, chrono::NaiveDate::from_ymd_opt(2023, 3, 1));
    assert_eq!(row.sector.as_deref(), Some("Energy"));
    assert_eq!(row.close, Some(55.5));
    assert_eq!(row.market_cap, 900.0);
    Ok(())
}

#[tokio::test]
async fn test_load_without_date_column_fails() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("stock.db");
    seed(
        &db,
        "CREATE TABLE stock_data (Sector TEXT, Close REAL, Volume INTEGER, Volatility REAL)",
        &["INSERT INTO stock_data VALUES ('Tech', 100.0, 10, 0.1)"],
    )
    .await?;

    let result = SqliteRowSource::new(&db, "stock_data")?.load().await;
    assert!(matches!(
        result,
        Err(StoreError::MissingColumn { ref column, ref available, .. })
            if column == "Date" && available.len() == 4
    ));
    Ok(())
}

#[tokio::test]
async fn test_load_missing_database() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let source = SqliteRowSource::new(tmp.path().join("nope.db"), "stock_data")?;
    assert!(matches!(source.load().await, Err(StoreError::SourceMissing(_))));
    // 读取失败时不会创建文件
    assert!(!tmp.path().join("nope.db").exists());
    Ok(())
}

#[tokio::test]
async fn test_load_missing_table_lists_available() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let db = tmp.path().join("stock.db");
    seed(&db, "CREATE TABLE other (id INTEGER)", &[]).await?;

    let err = SqliteRowSource::new(&db, "stock_data")?.load().await;
    match err {
        Err(StoreError::TableMissing { table, available }) => {
            assert_eq!(table, "stock_data");
            assert_eq!(available, vec!["other".to_string()]);
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
    }
    Ok(())
}
