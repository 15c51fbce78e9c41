//! End-to-end tests for the analysis pipeline.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use privcap::data::{CanonicalField, ColumnMapping, RawTable, ResolutionMode, ResolveOptions};
use privcap::metrics::{Horizon, MetricKind};
use privcap::portfolio::{Bounds, RecordFilter};
use privcap::{AnalysisConfig, run_analysis};
use rstest::rstest;

const ADURO_EXPORT: &str = "\
Investment Name,Total Invested Amount,Fair Value,Date,Fund Name,Status
Acme Robotics,100000,250000,2019-01-15,Fund I,Realized
Globex,200000,180000,2020-03-01,Fund I,Unrealized
Initech,N/A,90000,2020-06-30,Fund II,Unrealized
Hooli,150000,450000,2018-09-10,Fund II,Realized
Umbrella,50000,0,2017-02-01,Fund II,Realized
Stark,300000,330000,2022-11-11,Fund III,Unrealized
Wayne,250000,500000,2021-04-20,Fund III,Unrealized
Tyrell,0,75000,2021-08-08,Fund III,Unrealized
Cyberdyne,120000,60000,2023-01-03,Fund I,Unrealized
Soylent,80000,96000,2023-05-05,Fund II,Unrealized
";

fn config() -> AnalysisConfig {
    AnalysisConfig {
        evaluation_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        ..AnalysisConfig::default()
    }
}

fn table() -> RawTable {
    RawTable::from_csv_reader(ADURO_EXPORT.as_bytes()).unwrap()
}

#[test]
fn test_ten_rows_one_bad_cost() {
    let analysis = run_analysis(&table(), &config()).unwrap();

    assert_eq!(analysis.preset.as_deref(), Some("Aduro"));
    assert_eq!(analysis.diagnostics.total_rows, 10);
    assert_eq!(analysis.diagnostics.dropped_rows, 1);
    assert_eq!(analysis.diagnostics.failures[0].field, CanonicalField::Cost);
    assert_eq!(analysis.records.len(), 9);
    assert_eq!(analysis.mapping.get(CanonicalField::Realized), Some("Status"));
}

#[test]
fn test_zero_cost_record_is_undefined_and_excluded() {
    let analysis = run_analysis(&table(), &config()).unwrap();

    let tyrell = analysis
        .records
        .iter()
        .find(|s| s.record.name == "Tyrell")
        .unwrap();
    assert_eq!(tyrell.metrics.moic, None);
    assert_eq!(analysis.diagnostics.undefined_metrics[&MetricKind::Moic], 1);

    let fund_three = analysis.funds.iter().find(|f| f.fund_name == "Fund III").unwrap();
    assert_eq!(fund_three.record_count, 3);
    assert_abs_diff_eq!(fund_three.metrics.moic.unwrap(), 830_000.0 / 550_000.0, epsilon = 1e-12);
}

#[test]
fn test_portfolio_irr_differs_from_mean_record_irr() {
    let analysis = run_analysis(&table(), &config()).unwrap();

    let irrs: Vec<f64> = analysis.records.iter().filter_map(|s| s.metrics.irr).collect();
    let mean = irrs.iter().sum::<f64>() / irrs.len() as f64;
    let portfolio = analysis.overview.metrics.irr.unwrap();

    assert!((portfolio - mean).abs() > 1e-3);
}

#[test]
fn test_realization_multiples_from_status_column() {
    let analysis = run_analysis(&table(), &config()).unwrap();
    let multiples = analysis.overview.realization.unwrap();

    // Paid-in excludes the zero-cost record: 1,250,000.
    assert_abs_diff_eq!(multiples.dpi.unwrap(), 700_000.0 / 1_250_000.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        multiples.tvpi.unwrap(),
        (700_000.0 + 1_166_000.0) / 1_250_000.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_filters_apply_before_metrics() {
    let config = AnalysisConfig {
        filter: RecordFilter {
            fund_names: vec!["Fund II".into()],
            moic_range: Some(Bounds::new(Some(1.0), None)),
            ..RecordFilter::default()
        },
        ..config()
    };
    let analysis = run_analysis(&table(), &config).unwrap();

    let names: Vec<&str> = analysis.records.iter().map(|s| s.record.name.as_str()).collect();
    assert_eq!(names, vec!["Hooli", "Soylent"]);
    assert_eq!(analysis.diagnostics.filtered_out, 7);
    assert_eq!(analysis.funds.len(), 1);
}

#[rstest]
#[case(Some(true), 3)]
#[case(Some(false), 6)]
#[case(None, 9)]
fn test_realized_filter(#[case] realized: Option<bool>, #[case] expected: usize) {
    let config = AnalysisConfig {
        filter: RecordFilter {
            realized,
            ..RecordFilter::default()
        },
        ..config()
    };
    let analysis = run_analysis(&table(), &config).unwrap();
    assert_eq!(analysis.records.len(), expected);
    assert_eq!(analysis.diagnostics.filtered_out, 9 - expected);
}

#[test]
fn test_horizon_changes_only_annualized_roi() {
    let inception = run_analysis(&table(), &config()).unwrap();
    let one_year = run_analysis(
        &table(),
        &AnalysisConfig {
            horizon: Horizon::OneYear,
            ..config()
        },
    )
    .unwrap();

    let hooli = |a: &privcap::Analysis| {
        a.records
            .iter()
            .find(|s| s.record.name == "Hooli")
            .map(|s| s.metrics)
            .unwrap()
    };
    assert_eq!(hooli(&inception).roi, hooli(&one_year).roi);
    assert_eq!(hooli(&inception).irr, hooli(&one_year).irr);
    assert!(hooli(&one_year).annualized_roi.unwrap() > hooli(&inception).annualized_roi.unwrap());
    assert_abs_diff_eq!(
        hooli(&one_year).annualized_roi.unwrap(),
        2.0 * 365.25 / 365.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_manual_override_beats_preset() {
    let csv = "\
Investment Name,Total Invested Amount,Fair Value,Date,Fund Name,Marked Value
Acme,100,250,2020-01-01,Fund I,400
";
    let table = RawTable::from_csv_reader(csv.as_bytes()).unwrap();
    let overrides: ColumnMapping = [(CanonicalField::FairValue, "Marked Value".to_string())]
        .into_iter()
        .collect();
    let config = AnalysisConfig {
        columns: ResolveOptions {
            mode: ResolutionMode::Auto,
            overrides,
        },
        ..config()
    };

    let analysis = run_analysis(&table, &config).unwrap();
    assert_eq!(analysis.mapping.get(CanonicalField::FairValue), Some("Marked Value"));
    assert_eq!(analysis.records[0].metrics.moic, Some(4.0));
}

#[test]
fn test_trailing_blank_columns_are_tolerated() {
    let csv = "\
Investment Name,Total Invested Amount,Fair Value,Date,Fund Name,,
Acme,100,250,2020-01-01,Fund I,,
Globex,200,100,2021-06-01,Fund II,,
";
    let table = RawTable::from_csv_reader(csv.as_bytes()).unwrap();
    let analysis = run_analysis(&table, &config()).unwrap();

    assert_eq!(analysis.preset.as_deref(), Some("Aduro"));
    assert_eq!(analysis.records.len(), 2);
    assert_eq!(analysis.diagnostics.dropped_rows, 0);
}

#[test]
fn test_analysis_serializes_to_json() {
    let analysis = run_analysis(&table(), &config()).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["records"].as_array().unwrap().len(), 9);
    assert!(json["records"][6]["metrics"]["moic"].is_null());
    assert_eq!(json["mapping"]["Cost"], "Total Invested Amount");
}
