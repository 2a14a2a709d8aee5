
use mock_source::{company_row, date, full_set, sector_row};
use stockscope_core::market::entity::{Field, Row, RowSet, SectorSummary};
use stockscope_core::query::error::{QueryError, SummaryKind};
use stockscope_query::aggregate::{aggregate_by_company, aggregate_by_sector, mode};
use stockscope_query::filter::filter_by_period;

fn tech_rows() -> RowSet {
    full_set(vec![
        sector_row(date(2023, 1, 5), "Tech", 100.0, 10, 0.1),
        sector_row(date(2023, 6, 1), "Tech", 200.0, 0, 0.2),
    ])
}

#[test]
fn test_year_filter_and_sector_scenario() {
    let set = tech_rows();
    let subset = filter_by_period(&set, "2023").expect("2023 has rows");
    assert_eq!(subset.len(), 2);

    let summary = aggregate_by_sector(&subset).expect("one sector");
    assert_eq!(summary.len(), 1);
    let tech = &summary[0];
    assert_eq!(tech.sector, "Tech");
    assert_eq!(tech.total_volume, 10);
    assert!((tech.avg_close.unwrap_or_default() - 150.0).abs() < 1e-9);
    assert!((tech.avg_volatility.unwrap_or_default() - 0.15).abs() < 1e-9);
}

#[test]
fn test_period_errors() {
    let set = tech_rows();
    assert_eq!(
        filter_by_period(&set, "2024").err(),
        Some(QueryError::NoDataForPeriod("2024".to_string()))
    );
    assert!(matches!(
        filter_by_period(&set, "23"),
        Err(QueryError::InvalidPeriod(_))
    ));
    assert_eq!(filter_by_period(&set, "  ").err(), Some(QueryError::MissingPeriod));
    // 越界月份不是格式错误，只是没有数据
    assert_eq!(
        filter_by_period(&set, "2023-13").err(),
        Some(QueryError::NoDataForPeriod("2023-13".to_string()))
    );
}

#[test]
fn test_empty_snapshot_is_unavailable_before_parsing() {
    let set = full_set(vec![]);
    assert_eq!(
        filter_by_period(&set, "not-a-period").err(),
        Some(QueryError::DataUnavailable)
    );
}

#[test]
fn test_year_month_filter_matches_exactly() {
    let set = full_set(vec![
        sector_row(date(2023, 7, 1), "Tech", 1.0, 1, 0.1),
        sector_row(date(2023, 7, 31), "Tech", 1.0, 1, 0.1),
        sector_row(date(2023, 8, 1), "Tech", 1.0, 1, 0.1),
        sector_row(date(2022, 7, 15), "Tech", 1.0, 1, 0.1),
        sector_row(None, "Tech", 1.0, 1, 0.1),
    ]);

    let july = filter_by_period(&set, "2023-07").expect("july rows");
    assert_eq!(july.len(), 2);
    assert!(july.rows().iter().all(|r| r.date == date(2023, 7, 1) || r.date == date(2023, 7, 31)));

    let year = filter_by_period(&set, "2023").expect("2023 rows");
    assert_eq!(year.len(), 3);
    // 源快照未被修改
    assert_eq!(set.len(), 5);
}

#[test]
fn test_sector_drops_zero_volume_and_sorts_desc() {
    let set = full_set(vec![
        sector_row(date(2023, 1, 1), "Energy", 50.0, 30, 0.3),
        sector_row(date(2023, 1, 2), "Tech", 100.0, 70, 0.1),
        sector_row(date(2023, 1, 3), "Health", 10.0, 0, 0.2),
        sector_row(date(2023, 1, 4), "Banks", 20.0, 30, 0.4),
        Row {
            date: date(2023, 1, 5),
            sector: None,
            volume: 1000,
            ..Row::default()
        },
    ]);
    let subset = filter_by_period(&set, "2023").expect("rows");
    let summary = aggregate_by_sector(&subset).expect("sectors");

    let names: Vec<&str> = summary.iter().map(|s| s.sector.as_str()).collect();
    // 并列时保持板块名升序
    assert_eq!(names, vec!["Tech", "Banks", "Energy"]);
    assert!(summary.iter().all(|s| s.total_volume > 0));
    assert!(summary.windows(2).all(|w| w[0].total_volume >= w[1].total_volume));

    // 幂等：重复调用结果一致
    let again: Vec<SectorSummary> = aggregate_by_sector(&subset).expect("sectors");
    assert_eq!(summary, again);
}

#[test]
fn test_sector_all_zero_volume_is_empty_result() {
    let set = full_set(vec![sector_row(date(2023, 1, 1), "Tech", 1.0, 0, 0.1)]);
    let subset = filter_by_period(&set, "2023").expect("rows");
    assert_eq!(
        aggregate_by_sector(&subset).err(),
        Some(QueryError::EmptyResult {
            kind: SummaryKind::Sector,
            period: "2023".to_string(),
        })
    );
}

#[test]
fn test_schema_mismatch_names_missing_and_available() {
    let set = RowSet::new(
        vec!["Date".to_string(), "Sector".to_string(), "Close".to_string()],
        vec![sector_row(date(2023, 1, 1), "Tech", 1.0, 1, 0.1)],
    );
    let subset = filter_by_period(&set, "2023").expect("rows");
    match aggregate_by_sector(&subset) {
        Err(QueryError::SchemaMismatch { missing, available }) => {
            assert_eq!(missing, vec!["Volume".to_string(), "Volatility".to_string()]);
            assert_eq!(available, vec!["Date", "Sector", "Close"]);
        }
        other => panic!("expected schema mismatch, got {:?}", other),
    }
    assert!(matches!(
        aggregate_by_company(&subset, 10),
        Err(QueryError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_mode_tie_break() {
    assert_eq!(mode(["Bullish", "Bearish", "Bullish"]), Some("Bullish"));
    assert_eq!(mode(["Neutral", "Bearish"]), Some("Bearish"));
    assert_eq!(mode(Vec::<&str>::new()), None);
}

#[test]
fn test_company_aggregation() {
    let set = full_set(vec![
        company_row(date(2023, 3, 1), "Acme", "Tech", 10.0, 100.0, Some("Bullish")),
        company_row(date(2023, 3, 2), "Acme", "Tech", 20.0, 150.0, Some("Bearish")),
        company_row(date(2023, 3, 3), "Acme", "Tech", 30.0, 50.0, Some("Bullish")),
        company_row(date(2023, 3, 1), "Zeta", "Energy", 5.0, 900.0, None),
        // 同名公司在不同板块是不同分组
        company_row(date(2023, 3, 1), "Acme", "Energy", 7.0, 10.0, Some("Neutral")),
        company_row(date(2023, 4, 1), "Other", "Tech", 1.0, 5000.0, Some("Bullish")),
    ]);
    let subset = filter_by_period(&set, "2023-03").expect("march rows");
    let summary = aggregate_by_company(&subset, 500).expect("companies");

    let keys: Vec<(&str, &str)> = summary
        .iter()
        .map(|s| (s.company.as_str(), s.sector.as_str()))
        .collect();
    assert_eq!(keys, vec![("Zeta", "Energy"), ("Acme", "Tech"), ("Acme", "Energy")]);

    let acme = &summary[1];
    assert_eq!(acme.market_cap, 300.0);
    assert_eq!(acme.volume, 300);
    assert_eq!(acme.close, Some(20.0));
    assert_eq!(acme.high, Some(22.0));
    assert_eq!(acme.trend, "Bullish");
    assert_eq!(acme.date, "2023-03");

    // 没有趋势值的分组默认 Neutral
    assert_eq!(summary[0].trend, "Neutral");
}

#[test]
fn test_company_limit() {
    let rows = (0..5)
        .map(|i| {
            let cap = f64::from(i) * 10.0;
            company_row(date(2023, 1, 1), &format!("C{}", i), "Tech", 1.0, cap, None)
        })
        .collect();
    let set = full_set(rows);
    let subset = filter_by_period(&set, "2023").expect("rows");

    assert_eq!(aggregate_by_company(&subset, 3).map(|v| v.len()), Ok(3));
    assert_eq!(aggregate_by_company(&subset, 500).map(|v| v.len()), Ok(5));
    assert_eq!(aggregate_by_company(&subset, 0).map(|v| v.len()), Ok(0));
    assert_eq!(aggregate_by_company(&subset, -1).map(|v| v.len()), Ok(0));

    let top = aggregate_by_company(&subset, 2).expect("top two");
    assert_eq!(top[0].company, "C4");
    assert_eq!(top[1].company, "C3");
}

#[test]
fn test_company_rows_without_keys_are_not_grouped() {
    let set = full_set(vec![Row {
        date: date(2023, 1, 1),
        company: None,
        sector: Some("Tech".to_string()),
        ..Row::default()
    }]);
    let subset = filter_by_period(&set, "2023").expect("rows");
    assert_eq!(
        aggregate_by_company(&subset, 10).err(),
        Some(QueryError::EmptyResult {
            kind: SummaryKind::Company,
            period: "2023".to_string(),
        })
    );
}

#[test]
fn test_fields_constant_cover_company_requirements() {
    let set = full_set(vec![]);
    assert!(set.missing_fields(&Field::ALL).is_empty());
}
