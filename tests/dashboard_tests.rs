use agri_exports::dashboard::{Dashboard, TrendsOutcome, NO_DATA_NOTICE};
use agri_exports::data::{self, DataLoader, FilterSelection, LoaderError, Month};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const CSV: &str = "\
Product,Year,Month,Production (Mn.Kg/Nuts),Exports (US Mn),Notes
Tea,2020,March,20.5,110,
Coconut,2020,January,250,60,
Tea,2020,January,22,105,
Rubber,2021,December,6.5,70,x
Tea,2021,March,24,120,
Coconut,2021,March,240,65,
Rubber,2020,January,7,68,
Tea,2021,December,19,98,
";

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn dashboard(file: &NamedTempFile) -> Dashboard {
    Dashboard::new(Arc::new(DataLoader::load_csv(file.path()).unwrap()))
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn full_selection_matches_unfiltered_totals() {
    let file = write_csv(CSV);
    let d = dashboard(&file);
    let metrics = d.metrics().unwrap();
    let selection = d.default_selection().unwrap();

    let outcome = d.trends(&selection).unwrap();
    let charts = outcome.charts().unwrap();
    assert_close(charts.annual_production.total(), metrics.total_production);
    assert_close(charts.annual_exports.total(), metrics.total_exports);
    assert_close(charts.cumulative_exports.total(), metrics.total_exports);
    assert_close(charts.production_vs_exports.exports_total(), metrics.total_exports);
    assert_close(metrics.total_production, 589.0);
    assert_close(metrics.total_exports, 696.0);
}

#[test]
fn filtered_chart_totals_equal_filtered_column_sums() {
    let file = write_csv(CSV);
    let d = dashboard(&file);

    let outcome = d.trends(&FilterSelection::new(["Tea"], [2021])).unwrap();
    let charts = outcome.charts().unwrap();
    assert_close(charts.annual_production.total(), 24.0 + 19.0);
    assert_close(charts.annual_exports.total(), 120.0 + 98.0);
    assert_close(charts.production_vs_exports.production_total(), 43.0);
    assert_close(charts.cumulative_exports.total(), 218.0);
}

#[test]
fn monthly_bars_follow_calendar_order() {
    let file = write_csv(CSV);
    let d = dashboard(&file);
    let selection = d.default_selection().unwrap();
    let outcome = d.trends(&selection).unwrap();
    let bars = &outcome.charts().unwrap().monthly_exports.bars;

    let months: Vec<Month> = bars.iter().map(|(m, _)| *m).collect();
    assert_eq!(months, vec![Month::January, Month::March, Month::December]);
    // January: 60, 105, 68
    assert_close(bars[0].1, (60.0 + 105.0 + 68.0) / 3.0);
}

#[test]
fn empty_selection_shows_notice() {
    let file = write_csv(CSV);
    let d = dashboard(&file);

    let outcome = d.trends(&FilterSelection::default()).unwrap();
    assert!(matches!(outcome, TrendsOutcome::NoData));
    assert_eq!(outcome.notice(), Some(NO_DATA_NOTICE));

    let outcome = d.trends(&FilterSelection::new(["Coconut"], [2019])).unwrap();
    assert!(outcome.charts().is_none());
}

#[test]
fn top_export_product_is_reported() {
    let file = write_csv(CSV);
    let metrics = dashboard(&file).metrics().unwrap();
    let top = metrics.top_product.unwrap();
    assert_eq!(top.product, "Tea");
    assert_close(top.exports, 433.0);
}

#[test]
fn overview_lists_snippet_and_share() {
    let file = write_csv(CSV);
    let overview = dashboard(&file).with_preview_rows(3).overview().unwrap();
    assert_eq!(overview.row_count, 8);
    assert_eq!(overview.preview.len(), 3);
    assert_eq!(overview.preview[0].product, "Tea");
    assert_close(overview.export_share.total(), 696.0);
}

#[test]
fn cache_returns_shared_dataset() {
    let file = write_csv(CSV);
    let first = data::load_cached(file.path()).unwrap();
    let second = data::load_cached(file.path()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn missing_column_is_fatal() {
    let file = write_csv("Product,Year,Month,Exports (US Mn)\nTea,2020,March,110\n");
    match DataLoader::load_csv(file.path()) {
        Err(LoaderError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["Production (Mn.Kg/Nuts)".to_string()]);
        }
        other => panic!("expected missing column error, got {other:?}"),
    }
}

#[test]
fn export_writes_every_chart_as_png() {
    let file = write_csv(CSV);
    let d = dashboard(&file);
    let dir = tempfile::tempdir().unwrap();
    let selection = d.default_selection().unwrap();

    let (outcome, paths) = d.export_pngs(&selection, dir.path(), 400, 300).unwrap();
    assert!(outcome.charts().is_some());
    assert_eq!(paths.len(), 7);
    for path in &paths {
        assert!(path.starts_with(dir.path()));
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (400, 300));
    }
}

#[test]
fn export_with_empty_selection_writes_only_pie() {
    let file = write_csv(CSV);
    let d = dashboard(&file);
    let dir = tempfile::tempdir().unwrap();

    let (outcome, paths) = d
        .export_pngs(&FilterSelection::default(), dir.path(), 400, 300)
        .unwrap();
    assert_eq!(outcome.notice(), Some(NO_DATA_NOTICE));
    assert_eq!(paths.len(), 1);
    assert_eq!(
        paths[0].file_name().and_then(|n| n.to_str()),
        Some("export_distribution_by_product.png")
    );
    assert!(image::open(&paths[0]).is_ok());
}
