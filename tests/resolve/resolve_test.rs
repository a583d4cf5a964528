//! Integration tests for report resolution, execution, and export.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use gridline::config::Limits;
use gridline::model::{
    ColumnDef, ColumnType, CurrencyFormatting, DataSource, DataSourceKind, FilterCondition,
    FormattingConfig, ReportColumn, ReportConfig, SortCondition, SymbolPosition, TableDef, ViewDef,
};
use gridline::provider::{
    AiService, DiscoveredTable, QueryService, Row, ServiceError, ServiceResult, XlsxWriter,
};
use gridline::resolve::{
    build_export_sheet, export_filename, export_report, resolve_projection, run_report,
    DataOrigin, ExportError, ResolveError, ViewSession, ViewState,
};
use serde_json::json;

// ----------------------------------------------------------------------------
// Stub collaborators
// ----------------------------------------------------------------------------

#[derive(Default)]
struct StubQuery {
    rows: Vec<Row>,
    fail: bool,
    calls: AtomicUsize,
    seen_columns: Mutex<Vec<String>>,
    seen_limit: AtomicUsize,
}

#[async_trait]
impl QueryService for StubQuery {
    async fn fetch_rows(
        &self,
        _source: &DataSource,
        _table: &str,
        columns: &[String],
        limit: usize,
        _filters: &[FilterCondition],
        _sorts: &[SortCondition],
    ) -> ServiceResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_columns.lock().expect("lock") = columns.to_vec();
        self.seen_limit.store(limit, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::Network("connection refused".to_string()));
        }
        Ok(self.rows.clone())
    }
}

#[derive(Default)]
struct StubAi {
    rows: Vec<Row>,
    fail: bool,
    calls: AtomicUsize,
    seen_row_count: AtomicUsize,
}

#[async_trait]
impl AiService for StubAi {
    async fn discover_schema(
        &self,
        _kind: DataSourceKind,
        _name: &str,
        _context: &str,
    ) -> ServiceResult<Vec<DiscoveredTable>> {
        Ok(Vec::new())
    }

    async fn generate_rows(
        &self,
        _source: &DataSource,
        _report: &ReportConfig,
        row_count: usize,
    ) -> ServiceResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_row_count.store(row_count, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::remote("500", "model unavailable"));
        }
        Ok(self.rows.clone())
    }
}

fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

fn live_source() -> DataSource {
    let mut source = DataSource::new("ds-live", "Warehouse", DataSourceKind::Postgres);
    source.tables = vec![TableDef::new(
        "t-orders",
        "orders",
        vec![
            ColumnDef::new("c-amount", "amount", ColumnType::Currency).with_alias("Amount"),
            ColumnDef::new("c-region", "region", ColumnType::String),
        ],
    )
    .expose()];
    source.views = vec![ViewDef::new(
        "v-revenue",
        "monthly_revenue",
        vec![ColumnDef::new("c-total", "total", ColumnType::Currency)],
    )
    .expose()];
    source
}

fn ai_source() -> DataSource {
    let mut source = DataSource::new("ds-ai", "Imagined CRM", DataSourceKind::Custom);
    source.tables = vec![TableDef::new(
        "t-leads",
        "leads",
        vec![
            ColumnDef::new("c-name", "name", ColumnType::String),
            ColumnDef::new("c-score", "score", ColumnType::Number),
        ],
    )
    .expose()];
    source
}

fn live_report() -> ReportConfig {
    let mut report = ReportConfig::new("user-1");
    report.data_source_id = "ds-live".to_string();
    report.selected_columns = vec![
        ReportColumn::new("t-orders", "c-amount"),
        ReportColumn::new("t-orders", "c-region"),
    ];
    report
}

// ----------------------------------------------------------------------------
// Projection
// ----------------------------------------------------------------------------

#[test]
fn test_projection_prefers_aliases_and_keeps_physical_keys() {
    let source = live_source();
    let report = live_report();

    let resolution = resolve_projection(&source, &report).expect("resolves");
    assert_eq!(resolution.table_name, "orders");
    assert!(!resolution.is_view);

    assert_eq!(resolution.columns.len(), 2);
    assert_eq!(resolution.columns[0].key, "amount");
    assert_eq!(resolution.columns[0].label, "Amount");
    assert_eq!(resolution.columns[0].column_type, Some(ColumnType::Currency));
    assert_eq!(resolution.columns[1].key, "region");
    assert_eq!(resolution.columns[1].label, "region");
}

#[test]
fn test_projection_resolves_views_after_tables() {
    let source = live_source();
    let mut report = live_report();
    report.selected_columns = vec![ReportColumn::new("v-revenue", "c-total")];

    let resolution = resolve_projection(&source, &report).expect("resolves");
    assert_eq!(resolution.table_name, "monthly_revenue");
    assert!(resolution.is_view);
}

#[test]
fn test_projection_keeps_vanished_columns_renderable() {
    let source = live_source();
    let mut report = live_report();
    report
        .selected_columns
        .push(ReportColumn::new("t-orders", "c-dropped"));

    let resolution = resolve_projection(&source, &report).expect("resolves");
    let vanished = &resolution.columns[2];
    assert_eq!(vanished.key, "c-dropped");
    assert_eq!(vanished.label, "c-dropped");
    assert_eq!(vanished.column_type, None);
}

#[test]
fn test_empty_selection_fails_resolution() {
    let source = live_source();
    let mut report = live_report();
    report.selected_columns.clear();

    let err = resolve_projection(&source, &report).expect_err("must fail");
    assert!(matches!(err, ResolveError::NoColumnsSelected));
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "No columns selected for this report.");
}

#[test]
fn test_unresolvable_table_fails_resolution() {
    let source = live_source();
    let mut report = live_report();
    report.selected_columns = vec![ReportColumn::new("t-gone", "c-x")];

    let err = resolve_projection(&source, &report).expect_err("must fail");
    assert!(matches!(err, ResolveError::TableNotFound));
    assert_eq!(
        err.to_string(),
        "Table/View not found in the selected data source."
    );
}

// ----------------------------------------------------------------------------
// Execution
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_multi_table_selection_fails_before_any_fetch() {
    let source = live_source();
    let mut report = live_report();
    report
        .selected_columns
        .push(ReportColumn::new("v-revenue", "c-total"));

    let query = StubQuery::default();
    let ai = StubAi::default();

    let err = run_report(&query, &ai, &source, &report, &Limits::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ResolveError::MultipleTables));
    assert_eq!(
        err.to_string(),
        "Live data fetch supports a single table or view per report."
    );
    assert_eq!(query.calls.load(Ordering::SeqCst), 0);
    assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_live_sources_fetch_through_the_query_service() {
    let source = live_source();
    let report = live_report();
    let query = StubQuery {
        rows: vec![
            row(&[("amount", json!(1200)), ("region", json!("north"))]),
            row(&[("amount", json!(90.5)), ("region", json!("south"))]),
        ],
        ..StubQuery::default()
    };
    let ai = StubAi::default();

    let data = run_report(&query, &ai, &source, &report, &Limits::default())
        .await
        .expect("runs");

    assert_eq!(data.origin, DataOrigin::Live);
    assert_eq!(data.record_count(), 2);
    assert_eq!(query.calls.load(Ordering::SeqCst), 1);
    assert_eq!(ai.calls.load(Ordering::SeqCst), 0);
    assert_eq!(query.seen_limit.load(Ordering::SeqCst), 1_000_000);
    assert_eq!(
        *query.seen_columns.lock().expect("lock"),
        vec!["amount".to_string(), "region".to_string()]
    );
}

#[tokio::test]
async fn test_custom_sources_delegate_to_the_ai_service() {
    let source = ai_source();
    let mut report = ReportConfig::new("user-1");
    report.data_source_id = "ds-ai".to_string();
    report.selected_columns = vec![
        ReportColumn::new("t-leads", "c-name"),
        ReportColumn::new("t-leads", "c-score"),
    ];

    let query = StubQuery::default();
    let ai = StubAi {
        rows: vec![row(&[("name", json!("Acme")), ("score", json!(87))])],
        ..StubAi::default()
    };

    let data = run_report(&query, &ai, &source, &report, &Limits::default())
        .await
        .expect("runs");

    assert_eq!(data.origin, DataOrigin::Ai);
    assert_eq!(data.record_count(), 1);
    assert_eq!(ai.seen_row_count.load(Ordering::SeqCst), 100);
    assert_eq!(query.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_failures_surface_origin_specific_messages() {
    let live = live_source();
    let query = StubQuery {
        fail: true,
        ..StubQuery::default()
    };
    let ai = StubAi {
        fail: true,
        ..StubAi::default()
    };

    let err = run_report(&query, &ai, &live, &live_report(), &Limits::default())
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Failed to fetch live data.");
    assert!(!err.is_validation());

    let custom = ai_source();
    let mut report = ReportConfig::new("user-1");
    report.data_source_id = "ds-ai".to_string();
    report.selected_columns = vec![ReportColumn::new("t-leads", "c-name")];

    let err = run_report(&query, &ai, &custom, &report, &Limits::default())
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Failed to generate AI data.");
}

// ----------------------------------------------------------------------------
// View session
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_view_session_walks_idle_resolving_ready() {
    let source = live_source();
    let report = live_report();
    let query = StubQuery {
        rows: vec![row(&[("amount", json!(10)), ("region", json!("n"))])],
        ..StubQuery::default()
    };
    let ai = StubAi::default();

    let mut session = ViewSession::new();
    assert!(matches!(session.state(), ViewState::Idle));

    let token = session.begin_refresh();
    assert!(matches!(session.state(), ViewState::Resolving));

    let outcome = run_report(&query, &ai, &source, &report, &Limits::default()).await;
    assert!(session.complete(token, outcome));

    let data = session.data().expect("ready");
    assert_eq!(data.record_count(), 1);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_superseded_refreshes_are_discarded() {
    let source = live_source();
    let report = live_report();
    let query = StubQuery {
        rows: vec![row(&[("amount", json!(10)), ("region", json!("n"))])],
        ..StubQuery::default()
    };
    let ai = StubAi::default();

    let mut session = ViewSession::new();
    let stale = session.begin_refresh();
    let current = session.begin_refresh();

    let outcome = run_report(&query, &ai, &source, &report, &Limits::default()).await;
    // the first refresh lost the race; its result must not land
    assert!(!session.complete(stale, outcome));
    assert!(matches!(session.state(), ViewState::Resolving));

    let outcome = run_report(&query, &ai, &source, &report, &Limits::default()).await;
    assert!(session.complete(current, outcome));
    assert!(session.data().is_some());
}

#[tokio::test]
async fn test_a_failed_refresh_clears_the_previous_result_set() {
    let source = live_source();
    let report = live_report();
    let ai = StubAi::default();

    let ok_query = StubQuery {
        rows: vec![row(&[("amount", json!(10)), ("region", json!("n"))])],
        ..StubQuery::default()
    };
    let mut session = ViewSession::new();
    let token = session.begin_refresh();
    let outcome = run_report(&ok_query, &ai, &source, &report, &Limits::default()).await;
    session.complete(token, outcome);
    assert!(session.data().is_some());

    let failing_query = StubQuery {
        fail: true,
        ..StubQuery::default()
    };
    let token = session.begin_refresh();
    // the stale rows are gone the moment the refresh starts
    assert!(session.data().is_none());
    let outcome = run_report(&failing_query, &ai, &source, &report, &Limits::default()).await;
    session.complete(token, outcome);

    assert!(session.data().is_none());
    assert_eq!(session.error(), Some("Failed to fetch live data."));
}

// ----------------------------------------------------------------------------
// Export
// ----------------------------------------------------------------------------

fn currency_formatting() -> FormattingConfig {
    FormattingConfig::Currency(CurrencyFormatting {
        symbol: "$".to_string(),
        decimal_places: 2,
        thousand_separator: true,
        symbol_position: SymbolPosition::Before,
    })
}

async fn ready_data(formatting: Option<FormattingConfig>) -> gridline::resolve::ReportData {
    let source = live_source();
    let mut report = live_report();
    report.selected_columns[0].formatting = formatting;
    let query = StubQuery {
        rows: vec![
            row(&[("amount", json!(1234.5)), ("region", json!("north"))]),
            row(&[("amount", json!(null)), ("region", json!("south"))]),
        ],
        ..StubQuery::default()
    };
    run_report(&query, &StubAi::default(), &source, &report, &Limits::default())
        .await
        .expect("runs")
}

#[tokio::test]
async fn test_export_rows_are_keyed_by_display_label_and_formatted() {
    let data = ready_data(Some(currency_formatting())).await;
    let sheet = build_export_sheet(&data);

    assert_eq!(sheet.headers, vec!["Amount".to_string(), "region".to_string()]);
    assert_eq!(sheet.rows[0], vec!["$1,234.50".to_string(), "north".to_string()]);
    // nulls export as empty cells
    assert_eq!(sheet.rows[1], vec!["".to_string(), "south".to_string()]);
}

#[test]
fn test_export_filenames_derive_from_the_report_name() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date");
    assert_eq!(
        export_filename("Quarterly Sales (EU)", date),
        "Quarterly_Sales_EU__2026-08-07.xlsx"
    );
}

#[tokio::test]
async fn test_export_writes_a_workbook() {
    let data = ready_data(Some(currency_formatting())).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = XlsxWriter::new(dir.path());

    let date = NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date");
    let filename = export_report(&writer, "Quarterly Sales", &data, date)
        .await
        .expect("exports");

    assert_eq!(filename, "Quarterly_Sales_2026-08-07.xlsx");
    assert!(dir.path().join(&filename).exists());
}

#[tokio::test]
async fn test_exporting_an_empty_result_set_fails_loudly() {
    let source = live_source();
    let report = live_report();
    let query = StubQuery::default();
    let data = run_report(&query, &StubAi::default(), &source, &report, &Limits::default())
        .await
        .expect("runs");

    let dir = tempfile::tempdir().expect("tempdir");
    let writer = XlsxWriter::new(dir.path());
    let date = NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date");

    let err = export_report(&writer, "Empty", &data, date)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ExportError::NoData));
    assert_eq!(err.to_string(), "No data to export.");
}
