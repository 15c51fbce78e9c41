//! Integration tests for exports and summaries built from a scored portfolio.

use chrono::NaiveDate;
use privcap_data::InvestmentRecord;
use privcap_metrics::{Horizon, MetricKind, MetricsEngine};
use privcap_output::{
    ExportFormat, Exporter, PortfolioSummary, RankingTable, ReportBuilder, fund_rows, record_rows,
};
use privcap_portfolio::{SortOrder, aggregate_by_fund, overview, top_n};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn portfolio() -> Vec<InvestmentRecord> {
    vec![
        InvestmentRecord::new("Acme Robotics", "Fund II", 1_000_000.0, 2_500_000.0, date(2019, 6, 30))
            .with_realized(true),
        InvestmentRecord::new("Globex", "Fund II", 500_000.0, 450_000.0, date(2021, 3, 15))
            .with_realized(false),
        InvestmentRecord::new("Umbrella", "Fund III", 250_000.0, 0.0, date(2018, 11, 1))
            .with_realized(true),
        InvestmentRecord::new("Hooli", "Fund III", 750_000.0, 900_000.0, date(2022, 9, 1))
            .with_realized(false),
    ]
}

#[test]
fn test_full_summary_workflow() {
    let records = portfolio();
    let engine = MetricsEngine::new(date(2024, 6, 30)).with_horizon(Horizon::ThreeYears);

    let summary = PortfolioSummary::new(
        "Venture Portfolio",
        engine.horizon(),
        overview(&records, &engine),
        aggregate_by_fund(&records, &engine),
    );

    let ascii = summary.to_ascii_table();
    assert!(ascii.contains("Venture Portfolio"));
    assert!(ascii.contains("Fund III"));
    assert!(ascii.contains("3 Years"));
    assert!(ascii.contains("DPI"));
    assert!(ascii.contains("3,850,000.00"));

    let markdown = summary.to_markdown();
    assert!(markdown.contains("# Venture Portfolio"));
    assert!(markdown.contains("| Fund II | 2 |"));
}

#[test]
fn test_full_export_workflow() {
    let records = portfolio();
    let engine = MetricsEngine::new(date(2024, 6, 30));
    let scored = engine.score(&records);

    let csv = record_rows(&scored).export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.contains("Umbrella,Fund III,250000.0,0.0,0.0,-1.0,"));

    let funds = fund_rows(&aggregate_by_fund(&records, &engine));
    let json = funds.export_to_string(ExportFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["Fund Name"], "Fund II");
}

#[test]
fn test_ranking_and_report() {
    let records = portfolio();
    let engine = MetricsEngine::new(date(2024, 6, 30));
    let scored = engine.score(&records);

    let worst = top_n(&scored, MetricKind::Roi, 1, SortOrder::Ascending);
    assert_eq!(worst[0].record.name, "Umbrella");

    let table = RankingTable::new(MetricKind::Roi, SortOrder::Ascending, worst);
    assert!(table.to_ascii_table().contains("Bottom 1 by ROI"));
    assert!(table.to_ascii_table().contains("-100.00%"));

    let report = ReportBuilder::new()
        .source("portfolio.csv")
        .evaluation_date(engine.evaluation_date())
        .contents(&record_rows(&scored))
        .unwrap()
        .build()
        .unwrap();
    let json = report.to_json().unwrap();
    assert!(json.contains("\"Investment Name\": \"Hooli\""));
}
